use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;
use crate::geo::Coordinate;

/// The closed set of location kinds a board can be pinned to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoardCategory {
    /// Transit hub (railway station, bus terminal).
    Station,
    /// Administrative district.
    Ward,
    Park,
}

impl BoardCategory {
    pub const ALL: [BoardCategory; 3] = [Self::Station, Self::Ward, Self::Park];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Station => "station",
            Self::Ward => "ward",
            Self::Park => "park",
        }
    }
}

impl fmt::Display for BoardCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BoardCategory {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "station" => Ok(Self::Station),
            "ward" => Ok(Self::Ward),
            "park" => Ok(Self::Park),
            other => Err(DomainError::Validation(format!(
                "Unknown board category: {other}"
            ))),
        }
    }
}

/// A fixed-location board with two concentric radii.
///
/// Anyone within `view_radius_m` may read it; posting requires being within
/// `access_radius_m`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Board {
    pub id: Uuid,
    pub name: String,
    pub category: BoardCategory,
    pub location: Coordinate,
    pub access_radius_m: f64,
    pub view_radius_m: f64,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

/// Input for creating a board from seed or admin data.
#[derive(Debug, Clone)]
pub struct NewBoard {
    pub name: String,
    pub category: BoardCategory,
    pub location: Coordinate,
    pub access_radius_m: f64,
    pub view_radius_m: f64,
    pub description: String,
}

impl Board {
    /// Create a new board, enforcing `0 < access_radius <= view_radius`.
    pub fn new(input: NewBoard) -> Result<Self, DomainError> {
        let location = Coordinate::parse(input.location.lat, input.location.lng)?;

        if input.name.trim().is_empty() {
            return Err(DomainError::Validation(
                "Board name must not be empty".to_string(),
            ));
        }
        if !(input.access_radius_m > 0.0) {
            return Err(DomainError::Validation(
                "Access radius must be positive".to_string(),
            ));
        }
        if input.view_radius_m < input.access_radius_m {
            return Err(DomainError::Validation(
                "View radius must be at least the access radius".to_string(),
            ));
        }

        Ok(Self {
            id: Uuid::new_v4(),
            name: input.name,
            category: input.category,
            location,
            access_radius_m: input.access_radius_m,
            view_radius_m: input.view_radius_m,
            description: input.description,
            created_at: Utc::now(),
        })
    }
}
