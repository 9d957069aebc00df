/// Geographic primitives
///
/// `GeoPoint` is a definite position (the home point, a cached fix).
/// `Coordinates` is what a feed reports: each component may be missing, and
/// `(0, 0)` is a receiver's "no fix yet" marker rather than a real position.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Mean Earth radius in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0088;

/// A fully known latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        GeoPoint { latitude, longitude }
    }

    /// Great-circle (haversine) distance to `other` in kilometres
    pub fn distance_km(&self, other: &GeoPoint) -> f64 {
        let dlat = (other.latitude - self.latitude).to_radians();
        let dlon = (other.longitude - self.longitude).to_radians();
        let lat1 = self.latitude.to_radians();
        let lat2 = other.latitude.to_radians();
        let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_KM * a.sqrt().asin()
    }

    /// True if both components are finite and within geographic range
    pub fn is_in_range(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.latitude, self.longitude)
    }
}

/// Reported position of an entry; either component may be absent.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Coordinates {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl Coordinates {
    pub const NONE: Coordinates = Coordinates {
        latitude: None,
        longitude: None,
    };

    pub const ZERO: Coordinates = Coordinates {
        latitude: Some(0.0),
        longitude: Some(0.0),
    };

    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Coordinates {
            latitude: Some(latitude),
            longitude: Some(longitude),
        }
    }

    /// The "no reading at all" sentinel
    pub fn is_none(&self) -> bool {
        self.latitude.is_none() && self.longitude.is_none()
    }

    /// The "not yet fixed" sentinel
    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }

    /// A usable fix: both components present and not the `(0, 0)` marker.
    ///
    /// A half-present pair is never trusted.
    pub fn to_point(&self) -> Option<GeoPoint> {
        if self.is_zero() {
            return None;
        }
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Some(GeoPoint::new(lat, lon)),
            _ => None,
        }
    }

    pub fn is_fix(&self) -> bool {
        self.to_point().is_some()
    }
}

impl From<GeoPoint> for Coordinates {
    fn from(point: GeoPoint) -> Self {
        Coordinates::new(point.latitude, point.longitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_symmetric() {
        let home = GeoPoint::new(-31.0, 151.0);
        let other = GeoPoint::new(-34.234888, 150.533009);
        let d1 = home.distance_km(&other);
        let d2 = other.distance_km(&home);
        assert!((d1 - d2).abs() < 1e-9);
        assert!((d1 - 362.35).abs() < 0.1);
    }

    #[test]
    fn test_distance_to_self_is_zero() {
        let p = GeoPoint::new(51.47, -0.45);
        assert_eq!(p.distance_km(&p), 0.0);
    }

    #[test]
    fn test_sentinels() {
        assert!(Coordinates::NONE.is_none());
        assert!(!Coordinates::NONE.is_fix());
        assert!(Coordinates::ZERO.is_zero());
        assert!(!Coordinates::ZERO.is_fix());
        assert!(Coordinates::new(-32.0, 151.0).is_fix());
    }

    #[test]
    fn test_half_present_is_not_a_fix() {
        let half = Coordinates {
            latitude: Some(-32.0),
            longitude: None,
        };
        assert!(!half.is_none());
        assert!(!half.is_fix());
    }

    #[test]
    fn test_zero_latitude_alone_is_a_fix() {
        let equator = Coordinates::new(0.0, 151.0);
        assert_eq!(equator.to_point(), Some(GeoPoint::new(0.0, 151.0)));
    }

    #[test]
    fn test_range() {
        assert!(GeoPoint::new(-31.0, 151.0).is_in_range());
        assert!(!GeoPoint::new(91.0, 0.0).is_in_range());
        assert!(!GeoPoint::new(0.0, f64::NAN).is_in_range());
    }
}
