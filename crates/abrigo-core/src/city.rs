//! Cities as published by the data API.

use serde::{Deserialize, Serialize};

use crate::geo::GeoPoint;

/// A city with its map center and cached counters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct City {
    #[serde(rename = "idCidade", default, deserialize_with = "crate::de::id")]
    pub id: String,
    #[serde(default, deserialize_with = "crate::de::flag")]
    pub deleted: bool,
    /// ISO 8601 timestamp string.
    #[serde(rename = "dataCriacao", default)]
    pub created_at: Option<String>,
    #[serde(rename = "nomeCidade", default)]
    pub name: String,
    #[serde(rename = "cepCidade", default)]
    pub cep: Option<String>,
    #[serde(rename = "quantidadeOcorrencias", default, deserialize_with = "crate::de::count")]
    pub occurrence_count: Option<u32>,
    #[serde(rename = "quantidadeAbrigos", default, deserialize_with = "crate::de::count")]
    pub shelter_count: Option<u32>,
    #[serde(default = "crate::de::nan", deserialize_with = "crate::de::coordinate")]
    pub lat: f64,
    #[serde(default = "crate::de::nan", deserialize_with = "crate::de::coordinate")]
    pub lon: f64,
    #[serde(rename = "zoomPadrao", default)]
    pub default_zoom: Option<u8>,
}

impl City {
    pub fn center(&self) -> GeoPoint {
        GeoPoint::new(self.lat, self.lon)
    }
}
