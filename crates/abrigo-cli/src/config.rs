//! Command line and environment configuration.

use std::time::Duration;

use abrigo_core::GeoPoint;
use abrigo_sync::{ApiClient, DEFAULT_OSRM_URL, FixedLocator, OsrmRouter, RoutePlanner};
use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "abrigo")]
#[command(version, about = "Find a shelter outside hazard zones and a route to it")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(flatten)]
    pub config: Config,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List cities
    Cities,

    /// Hazard occurrences of a city with their exclusion radius
    Zones {
        #[arg(long)]
        city: String,
    },

    /// Shelters of a city, flagging those inside a hazard zone
    Shelters {
        #[arg(long)]
        city: String,
        #[command(flatten)]
        position: PositionArgs,
    },

    /// Route to the nearest shelter outside every hazard zone
    Nearest {
        #[arg(long)]
        city: String,
        #[command(flatten)]
        position: PositionArgs,
    },

    /// Route to a specific shelter
    Route {
        #[arg(long)]
        city: String,
        /// Shelter id
        #[arg(long)]
        shelter: String,
        #[command(flatten)]
        position: PositionArgs,
    },
}

/// Current position. Without it, routing reports geolocation as unsupported.
#[derive(Args, Debug, Clone, Copy)]
pub struct PositionArgs {
    /// Latitude in decimal degrees
    #[arg(long, requires = "lon", allow_negative_numbers = true)]
    pub lat: Option<f64>,

    /// Longitude in decimal degrees
    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    pub lon: Option<f64>,
}

impl PositionArgs {
    pub fn point(&self) -> Option<GeoPoint> {
        Some(GeoPoint::new(self.lat?, self.lon?))
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Lang {
    En,
    Pt,
}

#[derive(Args, Debug, Clone)]
pub struct Config {
    /// Data API base URL
    #[arg(long, env = "ABRIGO_API_URL", default_value = "http://localhost:8080", global = true)]
    pub api_url: String,

    /// Value sent as `x-api-key`
    #[arg(long, env = "ABRIGO_API_KEY", default_value = "", hide_env_values = true, global = true)]
    pub api_key: String,

    /// OSRM server base URL
    #[arg(long, env = "ABRIGO_OSRM_URL", default_value = DEFAULT_OSRM_URL, global = true)]
    pub osrm_url: String,

    /// OSRM profile
    #[arg(long, env = "ABRIGO_PROFILE", default_value = "driving", global = true)]
    pub profile: String,

    /// Seconds to wait for the current position
    #[arg(long = "locate-timeout", env = "ABRIGO_LOCATE_TIMEOUT", default_value_t = 10, global = true)]
    pub locate_timeout_secs: u64,

    /// Instruction language
    #[arg(long, env = "ABRIGO_LANG", value_enum, default_value_t = Lang::En, global = true)]
    pub lang: Lang,
}

impl Config {
    pub fn api_client(&self) -> ApiClient {
        ApiClient::new(self.api_url.clone(), self.api_key.clone())
    }

    pub fn planner(&self, position: Option<GeoPoint>) -> RoutePlanner<FixedLocator, OsrmRouter> {
        let router = OsrmRouter::new(self.osrm_url.clone(), self.profile.clone());
        RoutePlanner::new(FixedLocator::from(position), router)
            .with_locate_timeout(Duration::from_secs(self.locate_timeout_secs))
    }
}
