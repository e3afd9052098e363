//! Coordinates and great-circle distance.
//!
//! Every distance in the system goes through [`distance_m`]; listing, single
//! board checks and posting all call it rather than carrying their own copy.

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Mean Earth radius used by the haversine formula, in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// A WGS84 point in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Validate a raw latitude/longitude pair.
    pub fn parse(lat: f64, lng: f64) -> Result<Self, DomainError> {
        if !lat.is_finite() || !lng.is_finite() {
            return Err(DomainError::Validation(
                "Coordinates must be finite numbers".to_string(),
            ));
        }
        if !(-90.0..=90.0).contains(&lat) {
            return Err(DomainError::Validation(format!(
                "Latitude {lat} is out of range [-90, 90]"
            )));
        }
        if !(-180.0..=180.0).contains(&lng) {
            return Err(DomainError::Validation(format!(
                "Longitude {lng} is out of range [-180, 180]"
            )));
        }
        Ok(Self { lat, lng })
    }

    /// `(0, 0)` is what clients send when they have no fix.
    pub fn is_unknown_sentinel(&self) -> bool {
        self.lat == 0.0 && self.lng == 0.0
    }
}

/// Where the request is coming from, if we know.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Observer(Option<Coordinate>);

impl Observer {
    pub const UNKNOWN: Observer = Observer(None);

    pub fn at(coordinate: Coordinate) -> Self {
        if coordinate.is_unknown_sentinel() {
            Self::UNKNOWN
        } else {
            Self(Some(coordinate))
        }
    }

    /// Build an observer from optional query parameters.
    ///
    /// Both absent means unknown; exactly one present is a validation error.
    pub fn from_parts(lat: Option<f64>, lng: Option<f64>) -> Result<Self, DomainError> {
        match (lat, lng) {
            (None, None) => Ok(Self::UNKNOWN),
            (Some(lat), Some(lng)) => Coordinate::parse(lat, lng).map(Self::at),
            _ => Err(DomainError::Validation(
                "Both lat and lng must be provided together".to_string(),
            )),
        }
    }

    pub fn coordinate(&self) -> Option<Coordinate> {
        self.0
    }

    pub fn is_known(&self) -> bool {
        self.0.is_some()
    }
}

/// Great-circle distance in meters (haversine).
pub fn distance_m(a: Coordinate, b: Coordinate) -> f64 {
    let phi1 = a.lat.to_radians();
    let phi2 = b.lat.to_radians();
    let d_phi = (b.lat - a.lat).to_radians();
    let d_lambda = (b.lng - a.lng).to_radians();

    let h = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    // Rounding can push h a hair outside [0, 1] near antipodes.
    let h = h.clamp(0.0, 1.0);

    2.0 * EARTH_RADIUS_M * h.sqrt().atan2((1.0 - h).sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHIBUYA: Coordinate = Coordinate::new(35.6580, 139.7016);
    const SHINJUKU: Coordinate = Coordinate::new(35.6762, 139.6503);

    #[test]
    fn test_distance_identity() {
        assert_eq!(distance_m(SHIBUYA, SHIBUYA), 0.0);
    }

    #[test]
    fn test_distance_symmetry() {
        let pairs = [
            (SHIBUYA, SHINJUKU),
            (Coordinate::new(-33.86, 151.21), Coordinate::new(51.5, -0.12)),
            (Coordinate::new(89.9, 0.0), Coordinate::new(-89.9, 179.9)),
        ];
        for (a, b) in pairs {
            assert!((distance_m(a, b) - distance_m(b, a)).abs() < 1e-9);
        }
    }

    #[test]
    fn test_distance_short_hop() {
        let nearby = Coordinate::new(35.6580, 139.7020);
        let d = distance_m(SHIBUYA, nearby);
        assert!((30.0..45.0).contains(&d), "got {d}");
    }

    #[test]
    fn test_distance_across_tokyo() {
        let d = distance_m(SHIBUYA, SHINJUKU);
        assert!(d > 4_000.0 && d < 6_000.0, "got {d}");
    }

    #[test]
    fn test_distance_antipodal_is_finite() {
        let d = distance_m(Coordinate::new(0.0, 0.0), Coordinate::new(0.0, 180.0));
        assert!(d.is_finite());
        let half_circumference = std::f64::consts::PI * EARTH_RADIUS_M;
        assert!((d - half_circumference).abs() < 1.0);
    }

    #[test]
    fn test_parse_rejects_out_of_range() {
        assert!(Coordinate::parse(91.0, 0.0).is_err());
        assert!(Coordinate::parse(0.0, -181.0).is_err());
        assert!(Coordinate::parse(f64::NAN, 0.0).is_err());
        assert!(Coordinate::parse(35.0, 139.0).is_ok());
    }

    #[test]
    fn test_observer_sentinel_is_unknown() {
        let observer = Observer::from_parts(Some(0.0), Some(0.0)).unwrap();
        assert!(!observer.is_known());
    }

    #[test]
    fn test_observer_requires_both_parts() {
        assert!(Observer::from_parts(Some(35.0), None).is_err());
        assert!(Observer::from_parts(None, Some(139.0)).is_err());
        assert_eq!(Observer::from_parts(None, None).unwrap(), Observer::UNKNOWN);
    }
}
