//! Routing engine client for the OSRM HTTP API (`/route/v1`).
//!
//! Steps are turned into [`RouteInstruction`]s with English text in the
//! phrasing [`abrigo_core::translate_pt`] understands.

use abrigo_core::{GeoPoint, Maneuver, RouteInstruction, RoutePath, RoutingError};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info};

use crate::provider::Router;

pub const DEFAULT_OSRM_URL: &str = "https://router.project-osrm.org";

pub struct OsrmRouter {
    client: reqwest::Client,
    base_url: String,
    profile: String,
}

#[derive(Deserialize)]
struct OsrmResponse {
    code: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

#[derive(Deserialize)]
struct OsrmRoute {
    #[serde(default)]
    distance: f64,
    #[serde(default)]
    duration: f64,
    geometry: Geometry,
    #[serde(default)]
    legs: Vec<Leg>,
}

#[derive(Deserialize)]
struct Geometry {
    /// `[lon, lat]` pairs.
    coordinates: Vec<[f64; 2]>,
}

#[derive(Deserialize)]
struct Leg {
    #[serde(default)]
    steps: Vec<Step>,
}

#[derive(Deserialize)]
struct Step {
    #[serde(default)]
    distance: f64,
    #[serde(default)]
    name: String,
    #[serde(rename = "ref", default)]
    road_ref: Option<String>,
    maneuver: StepManeuver,
}

#[derive(Deserialize)]
struct StepManeuver {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    modifier: Option<String>,
    #[serde(default)]
    bearing_after: f64,
    #[serde(default)]
    exit: Option<u32>,
}

impl OsrmRouter {
    /// `profile` is the OSRM profile segment, usually `driving`.
    pub fn new(base_url: String, profile: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            profile,
        }
    }

    fn route_url(&self, origin: GeoPoint, destination: GeoPoint) -> String {
        format!(
            "{}/route/v1/{}/{},{};{},{}?overview=full&geometries=geojson&steps=true",
            self.base_url, self.profile, origin.lon, origin.lat, destination.lon, destination.lat
        )
    }
}

#[async_trait]
impl Router for OsrmRouter {
    async fn compute_route(
        &self,
        origin: GeoPoint,
        destination: GeoPoint,
    ) -> Result<RoutePath, RoutingError> {
        let url = self.route_url(origin, destination);

        info!(url = %url, "requesting route");
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| RoutingError::Transport(e.to_string()))?;
        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| RoutingError::Transport(e.to_string()))?;

        // Engine errors come back as 4xx with a JSON `code`, so try the body first.
        match parse_route(&body) {
            Err(RoutingError::InvalidResponse(reason)) if !status.is_success() => {
                debug!(%reason, "unparseable error body");
                Err(RoutingError::Transport(format!("server returned {status}")))
            }
            result => result,
        }
    }
}

fn parse_route(body: &str) -> Result<RoutePath, RoutingError> {
    let response: OsrmResponse =
        serde_json::from_str(body).map_err(|e| RoutingError::InvalidResponse(e.to_string()))?;

    match response.code.as_str() {
        "Ok" => {}
        "NoRoute" => return Err(RoutingError::NoRoute),
        _ => {
            return Err(RoutingError::Engine {
                code: response.code,
                message: response.message.unwrap_or_default(),
            });
        }
    }

    let Some(route) = response.routes.into_iter().next() else {
        return Err(RoutingError::NoRoute);
    };

    let points = route
        .geometry
        .coordinates
        .iter()
        .map(|[lon, lat]| GeoPoint::new(*lat, *lon))
        .collect();

    let leg_count = route.legs.len();
    let mut instructions = Vec::new();
    for (leg_index, leg) in route.legs.iter().enumerate() {
        let last_leg = leg_index + 1 == leg_count;
        for step in &leg.steps {
            instructions.push(instruction(step, last_leg));
        }
    }

    debug!(
        points = route.geometry.coordinates.len(),
        instructions = instructions.len(),
        "parsed route"
    );
    Ok(RoutePath {
        points,
        instructions,
        distance_m: route.distance,
        duration_s: route.duration,
    })
}

fn instruction(step: &Step, last_leg: bool) -> RouteInstruction {
    let road = if !step.name.is_empty() {
        Some(step.name.clone())
    } else {
        step.road_ref.clone().filter(|r| !r.is_empty())
    };
    let modifier = step.maneuver.modifier.as_deref().unwrap_or("straight");
    let maneuver = maneuver(&step.maneuver.kind, modifier, last_leg);
    RouteInstruction {
        maneuver,
        text: text(step, maneuver, modifier, road.as_deref()),
        distance_m: step.distance,
        road,
    }
}

fn maneuver(kind: &str, modifier: &str, last_leg: bool) -> Maneuver {
    match kind {
        "depart" => Maneuver::Head,
        "arrive" if last_leg => Maneuver::DestinationReached,
        "arrive" => Maneuver::WaypointReached,
        "roundabout" | "rotary" | "roundabout turn" => Maneuver::Roundabout,
        "merge" => Maneuver::Merge,
        "on ramp" => Maneuver::OnRamp,
        "off ramp" => Maneuver::OffRamp,
        "end of road" => Maneuver::EndOfRoad,
        "fork" => Maneuver::Fork,
        _ => match modifier {
            "slight right" => Maneuver::SlightRight,
            "right" => Maneuver::Right,
            "sharp right" => Maneuver::SharpRight,
            "sharp left" => Maneuver::SharpLeft,
            "left" => Maneuver::Left,
            "slight left" => Maneuver::SlightLeft,
            "uturn" => Maneuver::TurnAround,
            _ => Maneuver::Straight,
        },
    }
}

fn text(step: &Step, maneuver: Maneuver, modifier: &str, road: Option<&str>) -> String {
    let onto = road.map(|r| format!(" onto {r}")).unwrap_or_default();
    match maneuver {
        Maneuver::Head => {
            let on = road.map(|r| format!(" on {r}")).unwrap_or_default();
            format!("Head {}{on}", compass(step.maneuver.bearing_after))
        }
        Maneuver::DestinationReached => match modifier {
            "left" | "right" => format!("You have arrived at your destination, on the {modifier}"),
            _ => "You have arrived at your destination".to_string(),
        },
        Maneuver::WaypointReached => "Waypoint reached".to_string(),
        Maneuver::Roundabout => {
            let exit = step.maneuver.exit.unwrap_or(1);
            format!("At the roundabout, take the {}{} exit{onto}", exit, ordinal_suffix(exit))
        }
        Maneuver::Fork => format!("Keep {} at the fork{onto}", side(modifier)),
        Maneuver::Merge => format!("Merge{onto}"),
        Maneuver::OnRamp => format!("Take the ramp{onto}"),
        Maneuver::OffRamp => format!("Exit{onto}"),
        Maneuver::TurnAround => format!("Make a U-turn{onto}"),
        Maneuver::Straight if road.is_none() => "Continue straight".to_string(),
        Maneuver::Straight => format!("Continue{onto}"),
        // Plain continuations bend along the road rather than turn off it.
        _ if matches!(step.maneuver.kind.as_str(), "continue" | "new name") => {
            format!("Keep {}{onto}", side(modifier))
        }
        _ => format!("Turn {modifier}{onto}"),
    }
}

fn side(modifier: &str) -> &'static str {
    if modifier.contains("left") { "left" } else { "right" }
}

fn ordinal_suffix(n: u32) -> &'static str {
    match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    }
}

fn compass(bearing: f64) -> &'static str {
    const DIRECTIONS: [&str; 8] = [
        "north",
        "northeast",
        "east",
        "southeast",
        "south",
        "southwest",
        "west",
        "northwest",
    ];
    let index = ((bearing.rem_euclid(360.0) + 22.5) / 45.0) as usize % 8;
    DIRECTIONS[index]
}
