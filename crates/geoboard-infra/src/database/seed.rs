//! Fixed Tokyo boards. The seed migration inserts these rows and the
//! in-memory store loads them when no database is configured.

use geoboard_core::domain::{Board, BoardCategory, NewBoard};
use geoboard_core::geo::Coordinate;

/// One seeded board, in the column order of the `boards` table.
#[derive(Debug, Clone, Copy)]
pub struct SeedBoard {
    pub name: &'static str,
    pub category: BoardCategory,
    pub lat: f64,
    pub lng: f64,
    pub access_radius_m: f64,
    pub view_radius_m: f64,
    pub description: &'static str,
}

const fn row(
    name: &'static str,
    category: BoardCategory,
    (lat, lng): (f64, f64),
    (access_radius_m, view_radius_m): (f64, f64),
    description: &'static str,
) -> SeedBoard {
    SeedBoard {
        name,
        category,
        lat,
        lng,
        access_radius_m,
        view_radius_m,
        description,
    }
}

pub const SEED_BOARDS: &[SeedBoard] = &[
    row(
        "Shibuya Station",
        BoardCategory::Station,
        (35.6580, 139.7016),
        (300.0, 1500.0),
        "Scramble crossing and Hachiko exit",
    ),
    row(
        "Shinjuku Station",
        BoardCategory::Station,
        (35.6896, 139.7006),
        (400.0, 2000.0),
        "Busiest station in the world",
    ),
    row(
        "Tokyo Station",
        BoardCategory::Station,
        (35.6812, 139.7671),
        (400.0, 2000.0),
        "Marunouchi and Yaesu sides",
    ),
    row(
        "Shibuya Ward",
        BoardCategory::Ward,
        (35.6640, 139.6982),
        (2500.0, 5000.0),
        "Neighbourhood news for Shibuya",
    ),
    row(
        "Yoyogi Park",
        BoardCategory::Park,
        (35.6716, 139.6949),
        (500.0, 2000.0),
        "Weekend events and picnics",
    ),
    row(
        "Ueno Park",
        BoardCategory::Park,
        (35.7148, 139.7745),
        (600.0, 2500.0),
        "Museums, the zoo and cherry blossoms",
    ),
];

impl From<&SeedBoard> for NewBoard {
    fn from(seed: &SeedBoard) -> Self {
        NewBoard {
            name: seed.name.to_string(),
            category: seed.category,
            location: Coordinate::new(seed.lat, seed.lng),
            access_radius_m: seed.access_radius_m,
            view_radius_m: seed.view_radius_m,
            description: seed.description.to_string(),
        }
    }
}

/// Build the seed boards with fresh ids. Invalid rows are logged and skipped.
pub fn seed_boards() -> Vec<Board> {
    SEED_BOARDS
        .iter()
        .filter_map(|seed| match Board::new(seed.into()) {
            Ok(board) => Some(board),
            Err(e) => {
                tracing::error!(board = seed.name, error = %e, "Skipping invalid seed board");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_every_seed_row_is_a_valid_board() {
        let boards = seed_boards();
        assert_eq!(boards.len(), SEED_BOARDS.len());

        let names: HashSet<&str> = boards.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names.len(), boards.len(), "seed names are unique");
    }

    #[test]
    fn test_seed_covers_every_category() {
        for category in BoardCategory::ALL {
            assert!(
                SEED_BOARDS.iter().any(|seed| seed.category == category),
                "no seed board for {category}"
            );
        }
    }
}
