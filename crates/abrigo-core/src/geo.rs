//! Geographic points and great-circle distance.

use serde::{Deserialize, Serialize};

/// Mean Earth radius in metres, the same sphere the map widgets measure on.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// A (latitude, longitude) pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Both components are finite numbers.
    ///
    /// Records from the data API may carry `null` or garbage coordinates,
    /// which decode to NaN. Such points take no part in geometry.
    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lon.is_finite()
    }

    /// Haversine surface distance to `other`, in metres.
    ///
    /// Returns NaN when either point is not finite; callers comparing with
    /// `<` therefore get `false`, never a spurious hit.
    pub fn distance_m(&self, other: &GeoPoint) -> f64 {
        haversine_m(*self, *other)
    }
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lon)
    }
}

/// Great-circle distance between two points on a sphere of [`EARTH_RADIUS_M`].
pub fn haversine_m(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let dlat = (b.lat - a.lat).to_radians();
    let dlon = (b.lon - a.lon).to_radians();

    let sin_dlat = (dlat / 2.0).sin();
    let sin_dlon = (dlon / 2.0).sin();

    let h = sin_dlat * sin_dlat + lat1.cos() * lat2.cos() * sin_dlon * sin_dlon;
    2.0 * EARTH_RADIUS_M * h.sqrt().asin()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_distance_to_self() {
        let p = GeoPoint::new(-23.55, -46.63);
        assert_eq!(p.distance_m(&p), 0.0);
    }

    #[test]
    fn small_offsets_near_equator() {
        let origin = GeoPoint::new(0.0, 0.0);
        let east = GeoPoint::new(0.0, 0.002);
        let north = GeoPoint::new(0.0005, 0.0);
        assert!((origin.distance_m(&east) - 222.39).abs() < 0.1);
        assert!((origin.distance_m(&north) - 55.60).abs() < 0.1);
    }

    #[test]
    fn symmetric() {
        let a = GeoPoint::new(-22.9068, -43.1729);
        let b = GeoPoint::new(-23.5505, -46.6333);
        assert_eq!(a.distance_m(&b), b.distance_m(&a));
        // Rio de Janeiro to São Paulo is roughly 360 km.
        assert!((a.distance_m(&b) - 360_000.0).abs() < 10_000.0);
    }

    #[test]
    fn non_finite_yields_nan() {
        let a = GeoPoint::new(f64::NAN, 0.0);
        let b = GeoPoint::new(0.0, 0.0);
        assert!(!a.is_finite());
        assert!(a.distance_m(&b).is_nan());
        assert!(!(a.distance_m(&b) < 1.0e9));
    }
}
