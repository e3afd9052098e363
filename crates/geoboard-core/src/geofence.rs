//! Geofence access evaluator.
//!
//! Decides whether an observer may view or post to a board and ranks board
//! listings by proximity.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::{Board, BoardCategory};
use crate::error::DomainError;
use crate::geo::{Coordinate, Observer, distance_m};

/// Listings never return more than this many boards.
pub const MAX_BOARDS_PER_QUERY: usize = 3;

/// Evaluator configuration.
#[derive(Debug, Clone)]
pub struct GeofenceConfig {
    /// Viewpoint used to rank listings when the observer is unknown.
    /// Never consulted by the access predicates.
    pub fallback_viewpoint: Option<Coordinate>,
    pub max_results: usize,
}

impl Default for GeofenceConfig {
    fn default() -> Self {
        Self {
            fallback_viewpoint: None,
            max_results: MAX_BOARDS_PER_QUERY,
        }
    }
}

/// Which boards a listing should keep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoardFilter {
    #[default]
    All,
    Category(BoardCategory),
    /// Only boards the observer may post to.
    Accessible,
}

impl FromStr for BoardFilter {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" | "all" => Ok(Self::All),
            "accessible" => Ok(Self::Accessible),
            other => other.parse().map(Self::Category).map_err(|_| {
                DomainError::Validation(format!("Unknown board filter: {other}"))
            }),
        }
    }
}

impl fmt::Display for BoardFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Category(category) => f.write_str(category.as_str()),
            Self::Accessible => f.write_str("accessible"),
        }
    }
}

/// Where an observer stands relative to one board.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Proximity {
    /// Meters from the observer (or ranking viewpoint); 0 when neither is known.
    pub distance_m: f64,
    pub viewable: bool,
    pub accessible: bool,
}

/// A board annotated with its proximity to the observer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedBoard {
    pub board: Board,
    #[serde(flatten)]
    pub proximity: Proximity,
}

/// Per-tab counts, each capped at [`MAX_BOARDS_PER_QUERY`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCounts {
    pub all: usize,
    pub station: usize,
    pub ward: usize,
    pub park: usize,
    pub accessible: usize,
}

impl CategoryCounts {
    fn capped(self, cap: usize) -> Self {
        Self {
            all: self.all.min(cap),
            station: self.station.min(cap),
            ward: self.ward.min(cap),
            park: self.park.min(cap),
            accessible: self.accessible.min(cap),
        }
    }
}

/// Result of a board-listing query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardListing {
    pub boards: Vec<RankedBoard>,
    pub counts: CategoryCounts,
    /// Point the ranking was computed from, if any.
    pub viewpoint: Option<Coordinate>,
}

#[derive(Debug, Clone, Default)]
pub struct GeofenceEvaluator {
    config: GeofenceConfig,
}

impl GeofenceEvaluator {
    pub fn new(config: GeofenceConfig) -> Self {
        Self { config }
    }

    /// Read access. Unknown observers may read everything.
    pub fn is_viewable(&self, board: &Board, observer: Observer) -> bool {
        match observer.coordinate() {
            Some(at) => distance_m(board.location, at) <= board.view_radius_m,
            None => true,
        }
    }

    /// Write access. Unknown observers may post nowhere.
    pub fn is_accessible(&self, board: &Board, observer: Observer) -> bool {
        match observer.coordinate() {
            Some(at) => distance_m(board.location, at) <= board.access_radius_m,
            None => false,
        }
    }

    pub fn evaluate(&self, board: &Board, observer: Observer) -> Proximity {
        let distance = self
            .viewpoint(observer)
            .map(|at| distance_m(board.location, at))
            .unwrap_or(0.0);

        Proximity {
            distance_m: distance,
            viewable: self.is_viewable(board, observer),
            accessible: self.is_accessible(board, observer),
        }
    }

    /// Sort boards by distance, filter, and cap the result.
    pub fn rank(
        &self,
        boards: Vec<Board>,
        observer: Observer,
        filter: BoardFilter,
    ) -> BoardListing {
        let cap = self.config.max_results;

        let mut ranked: Vec<RankedBoard> = boards
            .into_iter()
            .map(|board| {
                let proximity = self.evaluate(&board, observer);
                RankedBoard { board, proximity }
            })
            .collect();

        ranked.sort_by(|a, b| {
            a.proximity
                .distance_m
                .partial_cmp(&b.proximity.distance_m)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.board.name.cmp(&b.board.name))
        });

        let mut counts = CategoryCounts {
            all: ranked.len(),
            ..CategoryCounts::default()
        };
        for rb in &ranked {
            match rb.board.category {
                BoardCategory::Station => counts.station += 1,
                BoardCategory::Ward => counts.ward += 1,
                BoardCategory::Park => counts.park += 1,
            }
            if rb.proximity.accessible {
                counts.accessible += 1;
            }
        }
        let counts = counts.capped(cap);

        let boards = ranked
            .into_iter()
            .filter(|rb| match filter {
                BoardFilter::All => true,
                BoardFilter::Category(category) => rb.board.category == category,
                BoardFilter::Accessible => rb.proximity.accessible,
            })
            .take(cap)
            .collect();

        BoardListing {
            boards,
            counts,
            viewpoint: self.viewpoint(observer),
        }
    }

    fn viewpoint(&self, observer: Observer) -> Option<Coordinate> {
        observer.coordinate().or(self.config.fallback_viewpoint)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use super::*;

    fn board(name: &str, category: BoardCategory, lat: f64, lng: f64) -> Board {
        Board {
            id: Uuid::new_v4(),
            name: name.to_string(),
            category,
            location: Coordinate::new(lat, lng),
            access_radius_m: 300.0,
            view_radius_m: 1500.0,
            description: String::new(),
            created_at: Utc::now(),
        }
    }

    fn shibuya() -> Board {
        board("Shibuya Station", BoardCategory::Station, 35.6580, 139.7016)
    }

    #[test]
    fn test_observer_nearby_can_view_and_post() {
        let evaluator = GeofenceEvaluator::default();
        let observer = Observer::at(Coordinate::new(35.6580, 139.7020));
        let board = shibuya();

        assert!(evaluator.is_viewable(&board, observer));
        assert!(evaluator.is_accessible(&board, observer));
    }

    #[test]
    fn test_observer_far_away_can_do_neither() {
        let evaluator = GeofenceEvaluator::default();
        let observer = Observer::at(Coordinate::new(35.6762, 139.6503));
        let board = shibuya();

        assert!(!evaluator.is_viewable(&board, observer));
        assert!(!evaluator.is_accessible(&board, observer));
    }

    #[test]
    fn test_observer_between_radii_can_only_view() {
        let evaluator = GeofenceEvaluator::default();
        // ~900m north of the board.
        let observer = Observer::at(Coordinate::new(35.6661, 139.7016));
        let board = shibuya();

        assert!(evaluator.is_viewable(&board, observer));
        assert!(!evaluator.is_accessible(&board, observer));
    }

    #[test]
    fn test_unknown_observer_defaults() {
        let evaluator = GeofenceEvaluator::default();
        let board = shibuya();

        assert!(evaluator.is_viewable(&board, Observer::UNKNOWN));
        assert!(!evaluator.is_accessible(&board, Observer::UNKNOWN));

        let sentinel = Observer::at(Coordinate::new(0.0, 0.0));
        assert!(evaluator.is_viewable(&board, sentinel));
        assert!(!evaluator.is_accessible(&board, sentinel));
    }

    #[test]
    fn test_accessible_implies_viewable() {
        let evaluator = GeofenceEvaluator::default();
        let board = shibuya();
        for step in 0..40 {
            let offset = step as f64 * 0.0005;
            let observer = Observer::at(Coordinate::new(35.6580 + offset, 139.7016));
            if evaluator.is_accessible(&board, observer) {
                assert!(evaluator.is_viewable(&board, observer));
            }
        }
    }

    #[test]
    fn test_rank_sorts_and_caps() {
        let evaluator = GeofenceEvaluator::default();
        let boards = vec![
            board("Ikebukuro", BoardCategory::Station, 35.7295, 139.7109),
            board("Shibuya", BoardCategory::Station, 35.6580, 139.7016),
            board("Yoyogi Park", BoardCategory::Park, 35.6717, 139.6949),
            board("Shinjuku", BoardCategory::Station, 35.6896, 139.7006),
            board("Harajuku", BoardCategory::Station, 35.6702, 139.7027),
        ];
        let observer = Observer::at(Coordinate::new(35.6580, 139.7020));

        let listing = evaluator.rank(boards, observer, BoardFilter::All);

        assert_eq!(listing.boards.len(), 3);
        let names: Vec<_> = listing.boards.iter().map(|rb| rb.board.name.as_str()).collect();
        assert_eq!(names, vec!["Shibuya", "Harajuku", "Yoyogi Park"]);
        assert_eq!(listing.counts.all, 3);
        assert_eq!(listing.counts.station, 3);
        assert_eq!(listing.counts.park, 1);
        assert_eq!(listing.counts.ward, 0);
        assert_eq!(listing.counts.accessible, 1);
    }

    #[test]
    fn test_rank_category_and_accessible_filters() {
        let evaluator = GeofenceEvaluator::default();
        let boards = vec![
            board("Shibuya", BoardCategory::Station, 35.6580, 139.7016),
            board("Yoyogi Park", BoardCategory::Park, 35.6717, 139.6949),
        ];
        let observer = Observer::at(Coordinate::new(35.6580, 139.7020));

        let parks = evaluator.rank(
            boards.clone(),
            observer,
            BoardFilter::Category(BoardCategory::Park),
        );
        assert_eq!(parks.boards.len(), 1);
        assert_eq!(parks.boards[0].board.name, "Yoyogi Park");

        let accessible = evaluator.rank(boards.clone(), observer, BoardFilter::Accessible);
        assert_eq!(accessible.boards.len(), 1);
        assert_eq!(accessible.boards[0].board.name, "Shibuya");

        let nothing = evaluator.rank(boards, Observer::UNKNOWN, BoardFilter::Accessible);
        assert!(nothing.boards.is_empty());
        assert_eq!(nothing.counts.accessible, 0);
    }

    #[test]
    fn test_rank_empty_is_not_an_error() {
        let evaluator = GeofenceEvaluator::default();
        let listing = evaluator.rank(Vec::new(), Observer::UNKNOWN, BoardFilter::All);
        assert!(listing.boards.is_empty());
        assert_eq!(listing.counts, CategoryCounts::default());
        assert_eq!(listing.viewpoint, None);
    }

    #[test]
    fn test_unknown_observer_ranks_with_zero_distance() {
        let evaluator = GeofenceEvaluator::default();
        let boards = vec![
            board("B", BoardCategory::Ward, 35.66, 139.69),
            board("A", BoardCategory::Park, 35.67, 139.69),
        ];

        let listing = evaluator.rank(boards, Observer::UNKNOWN, BoardFilter::All);

        assert!(listing.boards.iter().all(|rb| rb.proximity.distance_m == 0.0));
        assert!(listing.boards.iter().all(|rb| rb.proximity.viewable && !rb.proximity.accessible));
        assert_eq!(listing.boards[0].board.name, "A");
    }

    #[test]
    fn test_fallback_viewpoint_ranks_but_never_grants_access() {
        let evaluator = GeofenceEvaluator::new(GeofenceConfig {
            fallback_viewpoint: Some(Coordinate::new(35.6580, 139.7016)),
            ..GeofenceConfig::default()
        });
        let boards = vec![
            board("Shinjuku", BoardCategory::Station, 35.6896, 139.7006),
            board("Shibuya", BoardCategory::Station, 35.6580, 139.7016),
        ];

        let listing = evaluator.rank(boards, Observer::UNKNOWN, BoardFilter::All);

        assert_eq!(listing.boards[0].board.name, "Shibuya");
        assert!(!listing.boards[0].proximity.accessible);
        assert_eq!(listing.viewpoint, Some(Coordinate::new(35.6580, 139.7016)));
    }

    #[test]
    fn test_filter_parsing() {
        assert_eq!("all".parse::<BoardFilter>().unwrap(), BoardFilter::All);
        assert_eq!("accessible".parse::<BoardFilter>().unwrap(), BoardFilter::Accessible);
        assert_eq!(
            "park".parse::<BoardFilter>().unwrap(),
            BoardFilter::Category(BoardCategory::Park)
        );
        assert!("nearby".parse::<BoardFilter>().is_err());
    }
}
