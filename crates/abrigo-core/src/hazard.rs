//! Hazard occurrences and the exclusion zones derived from them.
//!
//! Every occurrence is modelled as a circle around its position whose radius
//! depends only on the reported severity:
//!
//! | severity                               | radius |
//! |----------------------------------------|--------|
//! | LOW / BAIXO                            | 75 m   |
//! | MEDIUM / MODERATE / MÉDIO / MODERADO   | 100 m  |
//! | HIGH / CRITICAL / ALTO / CRÍTICO       | 150 m  |
//! | anything else, or missing              | 50 m   |

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::geo::GeoPoint;

/// Radius used when the severity is missing or not recognised.
pub const DEFAULT_RADIUS_M: f64 = 50.0;

/// Severity classification of an occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Low,
    Medium,
    High,
    /// Missing or unrecognised label.
    Unknown,
}

impl Severity {
    /// Parse a free-text severity label.
    ///
    /// Case-insensitive, surrounding whitespace ignored. English and
    /// Portuguese labels are recognised, with or without accents. Never
    /// fails: anything else is [`Severity::Unknown`].
    pub fn from_label(label: Option<&str>) -> Self {
        let Some(label) = label else {
            return Self::Unknown;
        };
        match label.trim().to_uppercase().as_str() {
            "LOW" | "BAIXO" => Self::Low,
            "MEDIUM" | "MODERATE" | "MÉDIO" | "MEDIO" | "MODERADO" => Self::Medium,
            "HIGH" | "CRITICAL" | "ALTO" | "CRÍTICO" | "CRITICO" => Self::High,
            _ => Self::Unknown,
        }
    }

    /// Exclusion radius in metres. Always positive.
    pub fn radius_m(&self) -> f64 {
        match self {
            Self::Low => 75.0,
            Self::Medium => 100.0,
            Self::High => 150.0,
            Self::Unknown => DEFAULT_RADIUS_M,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Unknown => "unknown",
        }
    }
}

/// What kind of hazard an occurrence reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HazardCategory {
    /// River flood (`ENCHENTE`).
    Flood,
    /// Urban flooding / waterlogging (`ALAGAMENTO`).
    Flooding,
    /// Landslide (`DESLIZAMENTO`).
    Landslide,
    /// Wildfire or fire (`QUEIMADA`, `INCENDIO`).
    Fire,
    Other(String),
}

impl HazardCategory {
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_uppercase().as_str() {
            "ENCHENTE" | "FLOOD" => Self::Flood,
            "ALAGAMENTO" | "FLOODING" => Self::Flooding,
            "DESLIZAMENTO" | "LANDSLIDE" => Self::Landslide,
            "QUEIMADA" | "INCENDIO" | "INCÊNDIO" | "FIRE" => Self::Fire,
            _ => Self::Other(label.trim().to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Flood => "flood",
            Self::Flooding => "flooding",
            Self::Landslide => "landslide",
            Self::Fire => "fire",
            Self::Other(s) => s,
        }
    }
}

/// A hazard occurrence as published by the data API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HazardOccurrence {
    #[serde(rename = "idOcorrencia", default, deserialize_with = "crate::de::id")]
    pub id: String,
    #[serde(default, deserialize_with = "crate::de::flag")]
    pub deleted: bool,
    /// ISO 8601 timestamp string.
    #[serde(rename = "dataCriacao", default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub cep: Option<String>,
    #[serde(default = "crate::de::nan", deserialize_with = "crate::de::coordinate")]
    pub lat: f64,
    #[serde(default = "crate::de::nan", deserialize_with = "crate::de::coordinate")]
    pub lon: f64,
    #[serde(rename = "tipoOcorrencia", default)]
    pub category: String,
    #[serde(rename = "nivelGravidade", default)]
    pub severity: Option<String>,
    #[serde(rename = "idCidade", default, deserialize_with = "crate::de::id")]
    pub city_id: String,
}

impl HazardOccurrence {
    pub fn position(&self) -> GeoPoint {
        GeoPoint::new(self.lat, self.lon)
    }

    pub fn severity(&self) -> Severity {
        Severity::from_label(self.severity.as_deref())
    }

    pub fn category(&self) -> HazardCategory {
        HazardCategory::from_label(&self.category)
    }
}

/// Circular exclusion zone around an occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HazardZone {
    pub center: GeoPoint,
    pub radius_m: f64,
}

impl HazardZone {
    /// `point` lies strictly inside the circle.
    ///
    /// Non-finite points or centers are never inside.
    pub fn contains(&self, point: &GeoPoint) -> bool {
        if !self.center.is_finite() || !point.is_finite() {
            return false;
        }
        self.center.distance_m(point) < self.radius_m
    }
}

/// Exclusion zone for a single occurrence.
///
/// Total over its input: an unknown or missing severity falls back to
/// [`DEFAULT_RADIUS_M`]. Coordinates are copied as-is, so a malformed record
/// yields a zone with a non-finite center that contains nothing.
pub fn zone_for(occurrence: &HazardOccurrence) -> HazardZone {
    HazardZone {
        center: occurrence.position(),
        radius_m: occurrence.severity().radius_m(),
    }
}

/// Zones for a snapshot of occurrences, skipping deleted records.
pub fn zones_for(occurrences: &[HazardOccurrence]) -> Vec<HazardZone> {
    occurrences
        .iter()
        .filter(|o| !o.deleted)
        .map(|o| {
            let zone = zone_for(o);
            if !zone.center.is_finite() {
                debug!(id = %o.id, "occurrence has no usable coordinates");
            }
            zone
        })
        .collect()
}
