use thiserror::Error;

/// Failure reported by a geolocation provider.
///
/// Each variant carries its own user-facing message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeolocationError {
    #[error("location permission was denied; allow location access and try again")]
    PermissionDenied,

    #[error("timed out waiting for the current location; try again")]
    Timeout,

    #[error("current location is unavailable; check the device's location service")]
    PositionUnavailable,

    #[error("geolocation is not supported or is disabled")]
    Unsupported,
}

/// Failure reported by the routing engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoutingError {
    #[error("routing engine returned {code}: {message}")]
    Engine { code: String, message: String },

    #[error("no route found between origin and destination")]
    NoRoute,

    #[error("routing request failed: {0}")]
    Transport(String),

    #[error("invalid routing response: {0}")]
    InvalidResponse(String),
}

/// Why a route attempt ended without a route.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteFailure {
    #[error("no shelter is available to route to")]
    NoShelters,

    #[error(
        "every known shelter is inside a hazard area or has no usable location; no safe route can be planned, contact local authorities"
    )]
    NoSafeShelter,

    #[error("could not get your location: {0}")]
    Geolocation(#[from] GeolocationError),

    #[error("could not compute the route: {0}")]
    Routing(#[from] RoutingError),
}

/// A response arrived for a route request that is no longer current.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("route request #{0} was superseded")]
pub struct StaleTicket(pub u64);
