//! Routes returned by the routing engine and their safety check.
//!
//! The routing engine knows nothing about hazards. After it answers, every
//! sampled point of the polyline is tested against every hazard zone.
//!
//! # Known limitation
//!
//! Only the discrete points the engine returned are tested. A path that
//! clips a zone between two widely spaced samples is reported as safe. This
//! is a sampled approximation, not an exact segment/circle intersection.

use serde::{Deserialize, Serialize};

use crate::geo::GeoPoint;
use crate::hazard::HazardZone;

/// Maneuver type of a turn-by-turn instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Maneuver {
    Head,
    Straight,
    SlightRight,
    Right,
    SharpRight,
    TurnAround,
    SharpLeft,
    Left,
    SlightLeft,
    Roundabout,
    Fork,
    Merge,
    OnRamp,
    OffRamp,
    EndOfRoad,
    WaypointReached,
    DestinationReached,
}

/// One turn-by-turn instruction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteInstruction {
    pub maneuver: Maneuver,
    pub text: String,
    /// Distance to the next maneuver, in metres.
    pub distance_m: f64,
    pub road: Option<String>,
}

/// Path geometry and instructions for one routing request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoutePath {
    pub points: Vec<GeoPoint>,
    pub instructions: Vec<RouteInstruction>,
    pub distance_m: f64,
    pub duration_s: f64,
}

/// Whether any sampled point of `path` lies strictly inside any zone.
///
/// Points outer, zones inner, first hit returns. Pairs where either side
/// has non-finite coordinates count as no evidence of intersection.
pub fn intersects_hazard(path: &RoutePath, zones: &[HazardZone]) -> bool {
    if zones.is_empty() {
        return false;
    }
    path.points
        .iter()
        .any(|point| zones.iter().any(|zone| zone.contains(point)))
}

/// Safety of a computed route against the current hazard zones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SafetyVerdict {
    Safe,
    CrossesHazard,
}

impl SafetyVerdict {
    pub fn assess(path: &RoutePath, zones: &[HazardZone]) -> Self {
        if intersects_hazard(path, zones) {
            Self::CrossesHazard
        } else {
            Self::Safe
        }
    }

    pub fn is_safe(&self) -> bool {
        matches!(self, Self::Safe)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zone() -> HazardZone {
        HazardZone {
            center: GeoPoint::new(0.0, 0.0),
            radius_m: 150.0,
        }
    }

    fn path(points: &[(f64, f64)]) -> RoutePath {
        RoutePath {
            points: points.iter().map(|&(lat, lon)| GeoPoint::new(lat, lon)).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn single_point_inside_is_enough() {
        let p = path(&[(0.0, -0.01), (0.0, -0.005), (0.0, 0.0005), (0.0, 0.005), (0.0, 0.01)]);
        assert!(intersects_hazard(&p, &[zone()]));
        assert_eq!(SafetyVerdict::assess(&p, &[zone()]), SafetyVerdict::CrossesHazard);
    }

    #[test]
    fn path_outside_all_zones() {
        let p = path(&[(0.01, -0.01), (0.01, 0.0), (0.01, 0.01)]);
        assert!(!intersects_hazard(&p, &[zone()]));
        assert!(SafetyVerdict::assess(&p, &[zone()]).is_safe());
    }

    #[test]
    fn no_zones_is_always_safe() {
        let p = path(&[(0.0, 0.0), (0.0, 0.0005)]);
        assert!(!intersects_hazard(&p, &[]));
    }

    #[test]
    fn empty_path_is_safe() {
        assert!(!intersects_hazard(&RoutePath::default(), &[zone()]));
    }

    #[test]
    fn result_does_not_depend_on_zone_order() {
        let far = HazardZone {
            center: GeoPoint::new(5.0, 5.0),
            radius_m: 100.0,
        };
        let p = path(&[(0.0, 0.0005)]);
        assert!(intersects_hazard(&p, &[far, zone()]));
        assert!(intersects_hazard(&p, &[zone(), far]));
    }

    #[test]
    fn non_finite_samples_are_skipped() {
        let p = path(&[(f64::NAN, 0.0), (0.0, f64::INFINITY), (0.01, 0.01)]);
        assert!(!intersects_hazard(&p, &[zone()]));

        let broken = HazardZone {
            center: GeoPoint::new(f64::NAN, f64::NAN),
            radius_m: 1.0e7,
        };
        assert!(!intersects_hazard(&path(&[(0.0, 0.0)]), &[broken]));
    }

    #[test]
    fn sparse_samples_can_miss_a_zone() {
        // Straight through (0,0) but sampled 1.1 km either side.
        let p = path(&[(0.0, -0.01), (0.0, 0.01)]);
        assert!(!intersects_hazard(&p, &[zone()]));
    }

    #[test]
    fn maneuver_serialises_kebab_case() {
        let json = serde_json::to_string(&Maneuver::DestinationReached).unwrap();
        assert_eq!(json, "\"destination-reached\"");
    }
}
