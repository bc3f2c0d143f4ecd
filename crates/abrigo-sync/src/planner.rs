//! Async route planning: selector, geolocation, routing and validation in
//! sequence, driving a [`RouteSession`].
//!
//! The session sits behind a `std::sync::Mutex` that is only locked between
//! awaits. Requests already on the wire are never cancelled; when their
//! answer comes back for a retired ticket the planner reports
//! [`PlanError::Superseded`] and the session is left as the newer request
//! or the clear put it.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use abrigo_core::{
    GeoPoint, GeolocationError, HazardZone, RouteFailure, RoutePath, RouteSession, RouteState,
    SafetyVerdict, Shelter, StaleTicket, Ticket, filter_safe, nearest,
};
use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::provider::{Geolocator, Router};

/// Default bound on a geolocation lookup.
pub const DEFAULT_LOCATE_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlanError {
    #[error(transparent)]
    Failed(#[from] RouteFailure),
    /// The request was cleared or replaced while it was in flight.
    #[error(transparent)]
    Superseded(#[from] StaleTicket),
}

/// A route that reached `HasRoute`, safe or not.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedRoute {
    pub ticket: Ticket,
    pub shelter: Shelter,
    pub origin: GeoPoint,
    pub path: RoutePath,
    pub verdict: SafetyVerdict,
    /// Straight-line distance from origin to the shelter.
    pub direct_distance_m: f64,
    pub computed_at: DateTime<Utc>,
}

pub struct RoutePlanner<G, R> {
    locator: G,
    router: R,
    session: Mutex<RouteSession>,
    locate_timeout: Duration,
}

impl<G: Geolocator, R: Router> RoutePlanner<G, R> {
    pub fn new(locator: G, router: R) -> Self {
        Self {
            locator,
            router,
            session: Mutex::new(RouteSession::new()),
            locate_timeout: DEFAULT_LOCATE_TIMEOUT,
        }
    }

    pub fn with_locate_timeout(mut self, timeout: Duration) -> Self {
        self.locate_timeout = timeout;
        self
    }

    /// Snapshot of the current lifecycle state.
    pub fn state(&self) -> RouteState {
        self.session().state().clone()
    }

    pub fn last_failure(&self) -> Option<RouteFailure> {
        self.session().last_failure().cloned()
    }

    /// Drop the current route. An in-flight request will come back as
    /// [`PlanError::Superseded`].
    pub fn clear(&self) {
        self.session().clear();
        debug!("route cleared");
    }

    /// Route from the current position to a shelter the user picked.
    ///
    /// The shelter is not checked against hazard zones; only the path is.
    pub async fn route_to_shelter(
        &self,
        shelter: &Shelter,
        zones: &[HazardZone],
    ) -> Result<PlannedRoute, PlanError> {
        let ticket = self.session().begin();
        let destination = shelter.position();
        if !destination.is_finite() {
            debug!(id = %shelter.id, "shelter has no usable coordinates");
            return Err(self.abort(ticket, RouteFailure::NoShelters));
        }

        let origin = self.locate(ticket).await?;
        self.route(ticket, shelter, origin, zones).await
    }

    /// Route to the nearest shelter outside every hazard zone.
    ///
    /// When there is nothing to route to, the attempt fails before the
    /// geolocation provider is asked.
    pub async fn route_to_nearest_safe(
        &self,
        shelters: &[Shelter],
        zones: &[HazardZone],
    ) -> Result<PlannedRoute, PlanError> {
        let ticket = self.session().begin();
        if shelters.is_empty() {
            return Err(self.abort(ticket, RouteFailure::NoShelters));
        }
        let safe = filter_safe(shelters, zones);
        debug!(
            total = shelters.len(),
            safe = safe.len(),
            zones = zones.len(),
            "filtered shelters against hazard zones"
        );
        if safe.is_empty() {
            return Err(self.abort(ticket, RouteFailure::NoSafeShelter));
        }

        let origin = self.locate(ticket).await?;
        let Some(shelter) = nearest(origin, safe) else {
            return Err(self.abort(ticket, RouteFailure::NoSafeShelter));
        };
        self.route(ticket, shelter, origin, zones).await
    }

    async fn locate(&self, ticket: Ticket) -> Result<GeoPoint, PlanError> {
        let answer = tokio::time::timeout(self.locate_timeout, self.locator.current_position())
            .await
            .unwrap_or(Err(GeolocationError::Timeout));
        match answer {
            Ok(origin) if origin.is_finite() => {
                debug!(ticket = ticket.seq(), %origin, "location resolved");
                Ok(origin)
            }
            Ok(_) => Err(self.abort(ticket, GeolocationError::PositionUnavailable.into())),
            Err(err) => Err(self.abort(ticket, err.into())),
        }
    }

    async fn route(
        &self,
        ticket: Ticket,
        shelter: &Shelter,
        origin: GeoPoint,
        zones: &[HazardZone],
    ) -> Result<PlannedRoute, PlanError> {
        let destination = shelter.position();
        self.session()
            .location_resolved(ticket, origin, destination)?;

        let path = match self.router.compute_route(origin, destination).await {
            Ok(path) => path,
            Err(err) => return Err(self.abort(ticket, err.into())),
        };

        let verdict = self.session().route_found(ticket, path.clone(), zones)?;
        if verdict.is_safe() {
            info!(
                ticket = ticket.seq(),
                shelter = %shelter.id,
                distance_m = path.distance_m,
                points = path.points.len(),
                "route computed"
            );
        } else {
            warn!(
                ticket = ticket.seq(),
                shelter = %shelter.id,
                "route passes through a hazard zone"
            );
        }

        Ok(PlannedRoute {
            ticket,
            shelter: shelter.clone(),
            origin,
            path,
            verdict,
            direct_distance_m: origin.distance_m(&destination),
            computed_at: Utc::now(),
        })
    }

    /// End the attempt with `failure`, unless it was already superseded.
    fn abort(&self, ticket: Ticket, failure: RouteFailure) -> PlanError {
        match self.session().fail(ticket, failure.clone()) {
            Ok(()) => PlanError::Failed(failure),
            Err(stale) => PlanError::Superseded(stale),
        }
    }

    fn session(&self) -> MutexGuard<'_, RouteSession> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use abrigo_core::{RoutingError, zone_for};
    use async_trait::async_trait;
    use tokio::sync::Notify;

    use super::*;
    use crate::provider::FixedLocator;

    const ORIGIN: GeoPoint = GeoPoint::new(0.0, -0.01);

    fn shelter(id: &str, lat: f64, lon: f64) -> Shelter {
        serde_json::from_value(serde_json::json!({
            "idAbrigo": id,
            "nomeAbrigo": format!("Abrigo {id}"),
            "lat": lat,
            "lon": lon,
        }))
        .unwrap()
    }

    fn high_zone_at_origin() -> Vec<HazardZone> {
        let occurrence = serde_json::from_value(serde_json::json!({
            "idOcorrencia": "1",
            "lat": 0.0,
            "lon": 0.0,
            "tipoOcorrencia": "ENCHENTE",
            "nivelGravidade": "HIGH",
        }))
        .unwrap();
        vec![zone_for(&occurrence)]
    }

    /// Returns the straight segment between the endpoints.
    struct StraightRouter;

    #[async_trait]
    impl Router for StraightRouter {
        async fn compute_route(
            &self,
            origin: GeoPoint,
            destination: GeoPoint,
        ) -> Result<RoutePath, RoutingError> {
            Ok(RoutePath {
                points: vec![origin, destination],
                distance_m: origin.distance_m(&destination),
                ..Default::default()
            })
        }
    }

    /// Always routes through (0, 0.0005).
    struct ThroughCenterRouter;

    #[async_trait]
    impl Router for ThroughCenterRouter {
        async fn compute_route(
            &self,
            origin: GeoPoint,
            destination: GeoPoint,
        ) -> Result<RoutePath, RoutingError> {
            Ok(RoutePath {
                points: vec![origin, GeoPoint::new(0.0, 0.0005), destination],
                ..Default::default()
            })
        }
    }

    struct FailingRouter(RoutingError);

    #[async_trait]
    impl Router for FailingRouter {
        async fn compute_route(&self, _: GeoPoint, _: GeoPoint) -> Result<RoutePath, RoutingError> {
            Err(self.0.clone())
        }
    }

    /// Holds the first request until released; later requests pass straight through.
    #[derive(Default)]
    struct GatedRouter {
        calls: AtomicUsize,
        entered: Notify,
        release: Notify,
    }

    #[async_trait]
    impl Router for GatedRouter {
        async fn compute_route(
            &self,
            origin: GeoPoint,
            destination: GeoPoint,
        ) -> Result<RoutePath, RoutingError> {
            if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                self.entered.notify_one();
                self.release.notified().await;
            }
            StraightRouter.compute_route(origin, destination).await
        }
    }

    struct CountingLocator {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Geolocator for CountingLocator {
        async fn current_position(&self) -> Result<GeoPoint, GeolocationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(ORIGIN)
        }
    }

    struct SlowLocator;

    #[async_trait]
    impl Geolocator for SlowLocator {
        async fn current_position(&self) -> Result<GeoPoint, GeolocationError> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(ORIGIN)
        }
    }

    #[tokio::test]
    async fn routes_to_nearest_safe_shelter() {
        let planner = RoutePlanner::new(FixedLocator::new(ORIGIN), StraightRouter);
        let shelters = vec![shelter("A", 0.0, 0.002), shelter("B", 0.0005, 0.0)];

        let planned = planner
            .route_to_nearest_safe(&shelters, &high_zone_at_origin())
            .await
            .unwrap();

        assert_eq!(planned.shelter.id, "A");
        assert_eq!(planned.origin, ORIGIN);
        assert_eq!(planned.verdict, SafetyVerdict::Safe);
        assert!((planned.direct_distance_m - 1334.3).abs() < 1.0);
        match planner.state() {
            RouteState::HasRoute(route) => assert_eq!(route.destination, GeoPoint::new(0.0, 0.002)),
            other => panic!("unexpected state {other:?}"),
        }
    }

    #[tokio::test]
    async fn unsafe_route_is_kept_and_flagged() {
        let planner = RoutePlanner::new(FixedLocator::new(ORIGIN), ThroughCenterRouter);
        let shelters = vec![shelter("A", 0.0, 0.002)];

        let planned = planner
            .route_to_nearest_safe(&shelters, &high_zone_at_origin())
            .await
            .unwrap();

        assert_eq!(planned.verdict, SafetyVerdict::CrossesHazard);
        assert_eq!(planner.state().as_str(), "has-route");
    }

    #[tokio::test]
    async fn no_shelters_skips_geolocation() {
        let locator = CountingLocator {
            calls: AtomicUsize::new(0),
        };
        let planner = RoutePlanner::new(locator, StraightRouter);

        let err = planner.route_to_nearest_safe(&[], &[]).await.unwrap_err();

        assert_eq!(err, PlanError::Failed(RouteFailure::NoShelters));
        assert_eq!(planner.locator.calls.load(Ordering::SeqCst), 0);
        assert_eq!(planner.state(), RouteState::Idle);
        assert_eq!(planner.last_failure(), Some(RouteFailure::NoShelters));
    }

    #[tokio::test]
    async fn all_shelters_in_hazard_zones() {
        let locator = CountingLocator {
            calls: AtomicUsize::new(0),
        };
        let planner = RoutePlanner::new(locator, StraightRouter);
        let shelters = vec![shelter("B", 0.0005, 0.0), shelter("C", 0.0, 0.0)];

        let err = planner
            .route_to_nearest_safe(&shelters, &high_zone_at_origin())
            .await
            .unwrap_err();

        assert_eq!(err, PlanError::Failed(RouteFailure::NoSafeShelter));
        assert_eq!(planner.locator.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn unlocated_shelters_are_not_safe_candidates() {
        let locator = CountingLocator {
            calls: AtomicUsize::new(0),
        };
        let planner = RoutePlanner::new(locator, StraightRouter);
        let shelters = vec![shelter("X", f64::NAN, 0.0), shelter("Y", 0.0, f64::NAN)];

        let err = planner.route_to_nearest_safe(&shelters, &[]).await.unwrap_err();

        assert_eq!(err, PlanError::Failed(RouteFailure::NoSafeShelter));
        assert!(err.to_string().contains("no usable location"));
        assert_eq!(planner.locator.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn geolocation_failure_returns_to_idle() {
        let planner = RoutePlanner::new(FixedLocator::unavailable(), StraightRouter);
        let shelters = vec![shelter("A", 0.0, 0.002)];

        let err = planner.route_to_shelter(&shelters[0], &[]).await.unwrap_err();

        assert_eq!(
            err,
            PlanError::Failed(RouteFailure::Geolocation(GeolocationError::Unsupported))
        );
        assert_eq!(planner.state(), RouteState::Idle);
    }

    #[tokio::test]
    async fn slow_geolocation_times_out() {
        let planner = RoutePlanner::new(SlowLocator, StraightRouter)
            .with_locate_timeout(Duration::from_millis(50));
        let target = shelter("A", 0.0, 0.002);

        let err = planner.route_to_shelter(&target, &[]).await.unwrap_err();

        assert_eq!(
            err,
            PlanError::Failed(RouteFailure::Geolocation(GeolocationError::Timeout))
        );
    }

    #[tokio::test]
    async fn routing_failure_is_reported() {
        let planner =
            RoutePlanner::new(FixedLocator::new(ORIGIN), FailingRouter(RoutingError::NoRoute));
        let target = shelter("A", 0.0, 0.002);

        let err = planner.route_to_shelter(&target, &[]).await.unwrap_err();

        assert_eq!(err, PlanError::Failed(RouteFailure::Routing(RoutingError::NoRoute)));
        assert_eq!(
            planner.last_failure(),
            Some(RouteFailure::Routing(RoutingError::NoRoute))
        );
    }

    #[tokio::test]
    async fn shelter_without_coordinates_is_not_routed() {
        let planner = RoutePlanner::new(FixedLocator::new(ORIGIN), StraightRouter);
        let target = shelter("X", f64::NAN, 0.0);

        let err = planner.route_to_shelter(&target, &[]).await.unwrap_err();

        assert_eq!(err, PlanError::Failed(RouteFailure::NoShelters));
    }

    #[tokio::test]
    async fn clear_during_routing_supersedes() {
        let planner = RoutePlanner::new(FixedLocator::new(ORIGIN), GatedRouter::default());
        let target = shelter("A", 0.0, 0.002);

        let control = async {
            planner.router.entered.notified().await;
            assert_eq!(planner.state().as_str(), "routing");
            planner.clear();
            planner.router.release.notify_one();
        };
        let (result, ()) = tokio::join!(planner.route_to_shelter(&target, &[]), control);

        assert!(matches!(result, Err(PlanError::Superseded(_))));
        assert_eq!(planner.state(), RouteState::Idle);
        assert_eq!(planner.last_failure(), None);
    }

    #[tokio::test]
    async fn newer_request_wins() {
        let planner = RoutePlanner::new(FixedLocator::new(ORIGIN), GatedRouter::default());
        let first = shelter("A", 0.0, 0.002);
        let second = shelter("D", 0.0, -0.02);

        let control = async {
            planner.router.entered.notified().await;
            let newer = planner.route_to_shelter(&second, &[]).await;
            planner.router.release.notify_one();
            newer
        };
        let (older, newer) = tokio::join!(planner.route_to_shelter(&first, &[]), control);

        assert!(matches!(older, Err(PlanError::Superseded(StaleTicket(1)))));
        let newer = newer.unwrap();
        assert_eq!(newer.shelter.id, "D");
        match planner.state() {
            RouteState::HasRoute(route) => assert_eq!(route.destination, second.position()),
            other => panic!("unexpected state {other:?}"),
        }
    }
}
