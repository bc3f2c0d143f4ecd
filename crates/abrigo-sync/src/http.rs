//! HTTP client for the shelter data API.

use abrigo_core::{City, HazardOccurrence, Shelter};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned {status}: {body}")]
    Server { status: u16, body: String },
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Read-only client for the city, shelter and occurrence endpoints.
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

/// Collection responses wrap their records in `{ "data": [...] }`.
#[derive(Deserialize)]
struct Envelope {
    #[serde(default)]
    data: Option<Vec<serde_json::Value>>,
}

impl ApiClient {
    /// `base_url` like `http://localhost:8080`; a trailing slash is dropped.
    /// An empty `api_key` sends no `x-api-key` header.
    pub fn new(base_url: String, api_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    /// All cities that are not deleted.
    pub async fn cities(&self) -> Result<Vec<City>, ApiError> {
        let body = self.get("/cidade/search").await?;
        let mut cities: Vec<City> = decode_records(&body, "city")?;
        cities.retain(|c| !c.deleted);
        info!(count = cities.len(), "fetched cities");
        Ok(cities)
    }

    /// A single city. This endpoint answers with the bare object.
    pub async fn city(&self, id: &str) -> Result<City, ApiError> {
        let body = self.get(&format!("/cidade/{id}")).await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Shelters of a city, deleted ones dropped.
    pub async fn shelters_for_city(&self, city_id: &str) -> Result<Vec<Shelter>, ApiError> {
        let body = self.get(&format!("/abrigo/cidade/{city_id}")).await?;
        let mut shelters: Vec<Shelter> = decode_records(&body, "shelter")?;
        shelters.retain(|s| !s.deleted);
        info!(city = city_id, count = shelters.len(), "fetched shelters");
        Ok(shelters)
    }

    /// Hazard occurrences of a city, deleted ones dropped.
    pub async fn occurrences_for_city(
        &self,
        city_id: &str,
    ) -> Result<Vec<HazardOccurrence>, ApiError> {
        let body = self.get(&format!("/ocorrencia/cidade/{city_id}")).await?;
        let mut occurrences: Vec<HazardOccurrence> = decode_records(&body, "occurrence")?;
        occurrences.retain(|o| !o.deleted);
        info!(city = city_id, count = occurrences.len(), "fetched occurrences");
        Ok(occurrences)
    }

    async fn get(&self, path: &str) -> Result<String, ApiError> {
        let url = format!("{}{}", self.base_url, path);

        info!(url = %url, "requesting data API");
        let mut request = self.client.get(&url);
        if !self.api_key.is_empty() {
            request = request.header("x-api-key", &self.api_key);
        }
        let resp = request.send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ApiError::Server {
                status: status.as_u16(),
                body,
            });
        }
        Ok(resp.text().await?)
    }
}

/// Decode an envelope record by record. A record that does not fit the
/// model is logged and skipped; a missing or null `data` is an empty list.
fn decode_records<T: DeserializeOwned>(body: &str, kind: &str) -> Result<Vec<T>, ApiError> {
    let envelope: Envelope = serde_json::from_str(body)?;
    let records = envelope.data.unwrap_or_default();
    let mut out = Vec::with_capacity(records.len());
    for (index, value) in records.into_iter().enumerate() {
        match serde_json::from_value(value) {
            Ok(record) => out.push(record),
            Err(err) => warn!(kind, index, error = %err, "skipping malformed record"),
        }
    }
    Ok(out)
}
