//! Route lifecycle state machine.
//!
//! `Idle → RequestingLocation → Routing → HasRoute → Idle`
//!
//! Each attempt is identified by a [`Ticket`]. Starting a new attempt or
//! clearing the route retires the current ticket, and every transition
//! driven by an asynchronous answer must present the ticket it was issued
//! for. A late geolocation or routing response for a retired ticket is
//! rejected with [`StaleTicket`] and leaves the session untouched, so it can
//! never resurrect a cleared or replaced route.

use tracing::{debug, warn};

use crate::error::{RouteFailure, StaleTicket};
use crate::geo::GeoPoint;
use crate::hazard::HazardZone;
use crate::route::{RoutePath, SafetyVerdict};

/// Identifies one route attempt. Issued in strictly increasing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(u64);

impl Ticket {
    pub fn seq(&self) -> u64 {
        self.0
    }
}

/// A validated route on display.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveRoute {
    pub origin: GeoPoint,
    pub destination: GeoPoint,
    pub path: RoutePath,
    pub verdict: SafetyVerdict,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum RouteState {
    #[default]
    Idle,
    /// Waiting on the geolocation provider.
    RequestingLocation,
    /// Waiting on the routing engine.
    Routing {
        origin: GeoPoint,
        destination: GeoPoint,
    },
    /// Route shown; safe or not, it is displayed either way.
    HasRoute(ActiveRoute),
}

impl RouteState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::RequestingLocation => "requesting-location",
            Self::Routing { .. } => "routing",
            Self::HasRoute(_) => "has-route",
        }
    }

    fn in_flight(&self) -> bool {
        matches!(self, Self::RequestingLocation | Self::Routing { .. })
    }
}

/// Owner of the route state for one map view.
#[derive(Debug, Default)]
pub struct RouteSession {
    state: RouteState,
    current: Option<Ticket>,
    issued: u64,
    last_failure: Option<RouteFailure>,
}

impl RouteSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &RouteState {
        &self.state
    }

    /// Failure that ended the most recent attempt, until the next
    /// [`begin`](Self::begin) or [`clear`](Self::clear).
    pub fn last_failure(&self) -> Option<&RouteFailure> {
        self.last_failure.as_ref()
    }

    pub fn current_ticket(&self) -> Option<Ticket> {
        self.current
    }

    /// Start a new attempt, discarding any previous route and verdict.
    pub fn begin(&mut self) -> Ticket {
        self.issued += 1;
        let ticket = Ticket(self.issued);
        if let Some(previous) = self.current.replace(ticket) {
            debug!(previous = previous.0, ticket = ticket.0, "route attempt replaced");
        }
        self.state = RouteState::RequestingLocation;
        self.last_failure = None;
        ticket
    }

    /// Origin is known and the destination chosen: `RequestingLocation → Routing`.
    pub fn location_resolved(
        &mut self,
        ticket: Ticket,
        origin: GeoPoint,
        destination: GeoPoint,
    ) -> Result<(), StaleTicket> {
        self.check(ticket)?;
        if !matches!(self.state, RouteState::RequestingLocation) {
            return Err(self.reject(ticket));
        }
        self.state = RouteState::Routing {
            origin,
            destination,
        };
        Ok(())
    }

    /// The engine answered: `Routing → HasRoute`, running the safety check.
    pub fn route_found(
        &mut self,
        ticket: Ticket,
        path: RoutePath,
        zones: &[HazardZone],
    ) -> Result<SafetyVerdict, StaleTicket> {
        self.check(ticket)?;
        let RouteState::Routing {
            origin,
            destination,
        } = self.state
        else {
            return Err(self.reject(ticket));
        };
        let verdict = SafetyVerdict::assess(&path, zones);
        self.state = RouteState::HasRoute(ActiveRoute {
            origin,
            destination,
            path,
            verdict,
        });
        Ok(verdict)
    }

    /// The attempt ended without a route: back to `Idle`, remembering why.
    pub fn fail(&mut self, ticket: Ticket, failure: RouteFailure) -> Result<(), StaleTicket> {
        self.check(ticket)?;
        if !self.state.in_flight() {
            return Err(self.reject(ticket));
        }
        debug!(ticket = ticket.0, %failure, "route attempt failed");
        self.state = RouteState::Idle;
        self.current = None;
        self.last_failure = Some(failure);
        Ok(())
    }

    /// User cleared the route. Any in-flight answer becomes stale.
    pub fn clear(&mut self) {
        self.state = RouteState::Idle;
        self.current = None;
        self.last_failure = None;
    }

    fn check(&self, ticket: Ticket) -> Result<(), StaleTicket> {
        if self.current == Some(ticket) {
            Ok(())
        } else {
            Err(self.reject(ticket))
        }
    }

    fn reject(&self, ticket: Ticket) -> StaleTicket {
        warn!(
            ticket = ticket.0,
            current = ?self.current.map(|t| t.0),
            state = self.state.as_str(),
            "dropping stale route response"
        );
        StaleTicket(ticket.0)
    }
}
