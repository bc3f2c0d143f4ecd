//! Network edge for Abrigo: collaborator traits, the async route planner and,
//! behind the `http` feature, clients for the data API and the OSRM engine.

pub mod planner;
pub mod provider;

#[cfg(feature = "http")]
pub mod http;
#[cfg(feature = "http")]
pub mod osrm;

pub use planner::{DEFAULT_LOCATE_TIMEOUT, PlanError, PlannedRoute, RoutePlanner};
pub use provider::{FixedLocator, Geolocator, Router};

#[cfg(feature = "http")]
pub use http::{ApiClient, ApiError};
#[cfg(feature = "http")]
pub use osrm::{DEFAULT_OSRM_URL, OsrmRouter};
