//! Shelters and safe-shelter selection.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::geo::GeoPoint;
use crate::hazard::HazardZone;

/// A shelter as published by the data API. Read-only for this crate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shelter {
    #[serde(rename = "idAbrigo", default, deserialize_with = "crate::de::id")]
    pub id: String,
    #[serde(rename = "nomeAbrigo", default)]
    pub name: String,
    #[serde(rename = "enderecoAbrigo", default)]
    pub address: Option<String>,
    #[serde(default)]
    pub cep: Option<String>,
    #[serde(rename = "capacidadeMaxima", default, deserialize_with = "crate::de::count")]
    pub capacity: Option<u32>,
    #[serde(rename = "telefoneContato", default)]
    pub phone: Option<String>,
    /// `NORMAL`, `PARCIAL` or `INTERDITADO` in practice.
    #[serde(rename = "statusFuncionamento", default)]
    pub operating_status: Option<String>,
    #[serde(rename = "nivelSegurancaAtual", default)]
    pub safety_level: Option<String>,
    #[serde(default, deserialize_with = "crate::de::flag")]
    pub deleted: bool,
    #[serde(default = "crate::de::nan", deserialize_with = "crate::de::coordinate")]
    pub lat: f64,
    #[serde(default = "crate::de::nan", deserialize_with = "crate::de::coordinate")]
    pub lon: f64,
}

impl Shelter {
    pub fn position(&self) -> GeoPoint {
        GeoPoint::new(self.lat, self.lon)
    }
}

/// Outcome of a "nearest safe shelter" search.
///
/// "Nothing to choose from" and "everything is inside a hazard zone" are
/// different situations for the user and stay distinct here.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShelterChoice<'a> {
    Found { shelter: &'a Shelter, distance_m: f64 },
    /// The candidate list was empty.
    NoShelters,
    /// Candidates existed but none is both located and outside every
    /// hazard zone.
    NoSafeShelter,
}

/// Shelters that lie outside every hazard zone.
///
/// A shelter is unsafe when `distance(shelter, zone.center) < zone.radius_m`
/// for any zone. Shelters with non-finite coordinates are dropped. Input
/// order is preserved so that downstream tie-breaking stays stable.
pub fn filter_safe<'a>(shelters: &'a [Shelter], zones: &[HazardZone]) -> Vec<&'a Shelter> {
    shelters
        .iter()
        .filter(|shelter| {
            let position = shelter.position();
            if !position.is_finite() {
                debug!(id = %shelter.id, "skipping shelter without usable coordinates");
                return false;
            }
            !zones.iter().any(|zone| zone.contains(&position))
        })
        .collect()
}

/// Distances closer than this are equal for tie-breaking, in metres.
pub const TIE_TOLERANCE_M: f64 = 1.0e-6;

/// Closest shelter to `origin` by haversine distance.
///
/// Linear scan; the first shelter at the minimum distance wins, so the
/// result is stable for a fixed input order. Distances within
/// [`TIE_TOLERANCE_M`] of the current best count as ties. Candidates with
/// non-finite coordinates are ignored. Returns `None` when there is no
/// usable candidate or `origin` itself is not finite.
pub fn nearest<'a, I>(origin: GeoPoint, shelters: I) -> Option<&'a Shelter>
where
    I: IntoIterator<Item = &'a Shelter>,
{
    nearest_with_distance(origin, shelters).map(|(shelter, _)| shelter)
}

fn nearest_with_distance<'a, I>(origin: GeoPoint, shelters: I) -> Option<(&'a Shelter, f64)>
where
    I: IntoIterator<Item = &'a Shelter>,
{
    if !origin.is_finite() {
        return None;
    }
    let mut best: Option<(&'a Shelter, f64)> = None;
    for shelter in shelters {
        let position = shelter.position();
        if !position.is_finite() {
            continue;
        }
        let distance = origin.distance_m(&position);
        match best {
            Some((_, d)) if distance >= d - TIE_TOLERANCE_M => {}
            _ => best = Some((shelter, distance)),
        }
    }
    best
}

/// Nearest shelter to `origin` that is outside every hazard zone.
///
/// Never falls back to an unsafe shelter.
pub fn find_nearest_safe<'a>(
    origin: GeoPoint,
    shelters: &'a [Shelter],
    zones: &[HazardZone],
) -> ShelterChoice<'a> {
    if shelters.is_empty() {
        return ShelterChoice::NoShelters;
    }
    let safe = filter_safe(shelters, zones);
    match nearest_with_distance(origin, safe) {
        Some((shelter, distance_m)) => ShelterChoice::Found {
            shelter,
            distance_m,
        },
        None => ShelterChoice::NoSafeShelter,
    }
}
