use std::fmt;

use serde::{Deserialize, Serialize};

/// Errors raised while turning raw map input into a [`Coordinate`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CoordinateError {
    #[error("Latitude must be a finite number, got {0}")]
    InvalidLatitude(f64),
    #[error("Longitude must be a finite number, got {0}")]
    InvalidLongitude(f64),
}

/// Map any longitude onto the canonical `[-180, 180)` range.
///
/// Works for negative inputs and for values several turns away from the
/// canonical range, e.g. `541.0` maps to `-179.0`.
pub fn normalize_longitude(lon: f64) -> f64 {
    ((lon + 180.0) % 360.0 + 360.0) % 360.0 - 180.0
}

/// A point on the map. Longitude is always stored normalized.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    latitude: f64,
    longitude: f64,
}

impl Coordinate {
    /// Build a coordinate from raw map-widget input.
    ///
    /// Longitude is wrapped into `[-180, 180)`; latitude is clamped into
    /// `[-90, 90]` since widgets can overshoot slightly at the poles.
    pub fn from_map(latitude: f64, longitude: f64) -> Result<Self, CoordinateError> {
        if !latitude.is_finite() {
            return Err(CoordinateError::InvalidLatitude(latitude));
        }
        if !longitude.is_finite() {
            return Err(CoordinateError::InvalidLongitude(longitude));
        }

        Ok(Self {
            latitude: latitude.clamp(-90.0, 90.0),
            longitude: normalize_longitude(longitude),
        })
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_wraps_far_positive_values() {
        assert_eq!(normalize_longitude(541.0), -179.0);
        assert_eq!(normalize_longitude(180.0), -180.0);
        assert_eq!(normalize_longitude(720.0), 0.0);
    }

    #[test]
    fn normalize_wraps_negative_values() {
        assert_eq!(normalize_longitude(-185.0), 175.0);
        assert_eq!(normalize_longitude(-180.0), -180.0);
        assert_eq!(normalize_longitude(-900.0), -180.0);
    }

    #[test]
    fn normalize_keeps_canonical_values() {
        for lon in [-180.0, -90.5, 0.0, 12.25, 139.0, 179.5] {
            assert_eq!(normalize_longitude(lon), lon);
        }
    }

    #[test]
    fn normalize_is_idempotent_and_in_range() {
        for i in -8000..=8000 {
            let lon = f64::from(i) * 0.25;
            let once = normalize_longitude(lon);
            assert!((-180.0..180.0).contains(&once), "{lon} -> {once}");
            assert_eq!(normalize_longitude(once), once);
        }
    }

    #[test]
    fn normalize_handles_tiny_negative_remainder() {
        let out = normalize_longitude(-180.0 - 1e-14);
        assert!((-180.0..180.0).contains(&out));
    }

    #[test]
    fn from_map_normalizes_and_clamps() {
        let c = Coordinate::from_map(91.2, 541.0).unwrap();
        assert_eq!(c.latitude(), 90.0);
        assert_eq!(c.longitude(), -179.0);
    }

    #[test]
    fn from_map_rejects_non_finite() {
        assert!(matches!(
            Coordinate::from_map(f64::NAN, 0.0),
            Err(CoordinateError::InvalidLatitude(_))
        ));
        assert!(matches!(
            Coordinate::from_map(0.0, f64::INFINITY),
            Err(CoordinateError::InvalidLongitude(_))
        ));
    }

    #[test]
    fn display_uses_four_decimals() {
        let c = Coordinate::from_map(35.0, 139.12346).unwrap();
        assert_eq!(c.to_string(), "35.0000, 139.1235");
    }
}
