//! Collaborator seams: where the origin comes from and who computes the path.

use abrigo_core::{GeoPoint, GeolocationError, RoutePath, RoutingError};
use async_trait::async_trait;

/// Source of the user's current position.
#[async_trait]
pub trait Geolocator: Send + Sync {
    async fn current_position(&self) -> Result<GeoPoint, GeolocationError>;
}

/// Routing engine computing a path between two points.
///
/// The engine has no notion of hazards; its output is validated afterwards.
#[async_trait]
pub trait Router: Send + Sync {
    async fn compute_route(
        &self,
        origin: GeoPoint,
        destination: GeoPoint,
    ) -> Result<RoutePath, RoutingError>;
}

/// Geolocator answering with a configured position.
///
/// Used by the CLI, where the position is passed on the command line.
#[derive(Debug, Clone, Copy)]
pub struct FixedLocator {
    position: Option<GeoPoint>,
}

impl FixedLocator {
    pub fn new(position: GeoPoint) -> Self {
        Self {
            position: Some(position),
        }
    }

    /// No position configured: every lookup reports
    /// [`GeolocationError::Unsupported`].
    pub fn unavailable() -> Self {
        Self { position: None }
    }
}

impl From<Option<GeoPoint>> for FixedLocator {
    fn from(position: Option<GeoPoint>) -> Self {
        Self { position }
    }
}

#[async_trait]
impl Geolocator for FixedLocator {
    async fn current_position(&self) -> Result<GeoPoint, GeolocationError> {
        match self.position {
            None => Err(GeolocationError::Unsupported),
            Some(p) if !p.is_finite() => Err(GeolocationError::PositionUnavailable),
            Some(p) => Ok(p),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fixed_locator_answers() {
        let p = GeoPoint::new(-22.9, -43.2);
        assert_eq!(FixedLocator::new(p).current_position().await, Ok(p));
    }

    #[tokio::test]
    async fn unavailable_and_invalid_positions() {
        assert_eq!(
            FixedLocator::unavailable().current_position().await,
            Err(GeolocationError::Unsupported)
        );
        assert_eq!(
            FixedLocator::new(GeoPoint::new(f64::NAN, 0.0))
                .current_position()
                .await,
            Err(GeolocationError::PositionUnavailable)
        );
    }
}
