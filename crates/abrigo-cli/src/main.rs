mod config;
mod display;

use abrigo_core::{HazardZone, Shelter, zones_for};
use abrigo_sync::{ApiClient, PlanError, PlannedRoute};
use anyhow::Context;
use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use config::{Cli, Command, Lang};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    debug!("abrigo v{}", env!("CARGO_PKG_VERSION"));

    let config = cli.config;
    let api = config.api_client();

    match cli.command {
        Command::Cities => {
            let cities = api.cities().await.context("failed to fetch cities")?;
            display::print_cities(&cities);
        }
        Command::Zones { city } => {
            let occurrences = api
                .occurrences_for_city(&city)
                .await
                .with_context(|| format!("failed to fetch occurrences for city {city}"))?;
            display::print_zones(&occurrences);
        }
        Command::Shelters { city, position } => {
            let (shelters, zones) = load_city(&api, &city).await?;
            display::print_shelters(&shelters, &zones, position.point());
        }
        Command::Nearest { city, position } => {
            let (shelters, zones) = load_city(&api, &city).await?;
            let planner = config.planner(position.point());
            let result = planner.route_to_nearest_safe(&shelters, &zones).await;
            report(result, config.lang)?;
        }
        Command::Route {
            city,
            shelter,
            position,
        } => {
            let (shelters, zones) = load_city(&api, &city).await?;
            let target = shelters
                .iter()
                .find(|s| s.id == shelter)
                .with_context(|| format!("shelter {shelter} not found in city {city}"))?;
            let planner = config.planner(position.point());
            let result = planner.route_to_shelter(target, &zones).await;
            report(result, config.lang)?;
        }
    }

    Ok(())
}

/// Shelters and hazard zones of a city, fetched together.
async fn load_city(api: &ApiClient, city: &str) -> anyhow::Result<(Vec<Shelter>, Vec<HazardZone>)> {
    let (details, shelters, occurrences) = futures::try_join!(
        api.city(city),
        api.shelters_for_city(city),
        api.occurrences_for_city(city)
    )
    .with_context(|| format!("failed to load data for city {city}"))?;
    let zones = zones_for(&occurrences);
    info!(
        city = %details.name,
        shelters = shelters.len(),
        zones = zones.len(),
        "city loaded"
    );
    display::print_city_header(&details);
    Ok((shelters, zones))
}

fn report(result: Result<PlannedRoute, PlanError>, lang: Lang) -> anyhow::Result<()> {
    match result {
        Ok(route) => {
            display::print_route_card(&route, lang);
            Ok(())
        }
        Err(PlanError::Failed(failure)) => {
            display::print_failure(&failure);
            Err(failure).context("no route planned")
        }
        Err(err @ PlanError::Superseded(_)) => Err(err.into()),
    }
}
