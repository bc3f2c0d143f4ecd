//! Core domain for Abrigo: hazard zones, safe-shelter selection and route
//! safety validation.
//!
//! Everything here is synchronous and pure over snapshots handed in by the
//! caller. Network collaborators live in `abrigo-sync`.

mod de;

pub mod city;
pub mod error;
pub mod geo;
pub mod hazard;
pub mod instructions;
pub mod lifecycle;
pub mod route;
pub mod shelter;

pub use city::City;
pub use error::{GeolocationError, RouteFailure, RoutingError, StaleTicket};
pub use geo::{GeoPoint, haversine_m};
pub use hazard::{HazardCategory, HazardOccurrence, HazardZone, Severity, zone_for, zones_for};
pub use instructions::{format_distance, translate_pt};
pub use lifecycle::{ActiveRoute, RouteSession, RouteState, Ticket};
pub use route::{Maneuver, RouteInstruction, RoutePath, SafetyVerdict, intersects_hazard};
pub use shelter::{Shelter, ShelterChoice, filter_safe, find_nearest_safe, nearest};
