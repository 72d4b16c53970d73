use std::error::Error as _;
use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::models::LatLng;

#[derive(Debug, Error)]
pub enum DistanceError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Distance matrix returned status {0}")]
    Status(String),

    #[error("Bad upstream response: {0}")]
    BadResponse(String),

    #[error("Deserialization error: {0}")]
    Deserialize(#[from] serde_json::Error),
}

impl DistanceError {
    /// Whether the same request could succeed if tried again
    pub fn is_transient(&self) -> bool {
        match self {
            DistanceError::Request(e) => !e.is_builder() && !e.is_decode(),
            DistanceError::Api { status, .. } => *status == 429 || *status >= 500,
            DistanceError::Status(status) => {
                status.starts_with("OVER_QUERY_LIMIT") || status.starts_with("UNKNOWN_ERROR")
            }
            DistanceError::BadResponse(_) | DistanceError::Deserialize(_) => false,
        }
    }
}

/// Distance matrix response structure
#[derive(Debug, Deserialize)]
struct DistanceMatrixResponse {
    status: Option<String>,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    rows: Vec<DistanceMatrixRow>,
}

#[derive(Debug, Deserialize)]
struct DistanceMatrixRow {
    #[serde(default)]
    elements: Vec<DistanceMatrixElement>,
}

#[derive(Debug, Deserialize)]
struct DistanceMatrixElement {
    status: Option<String>,
    duration: Option<TextValue>,
}

#[derive(Debug, Deserialize)]
struct TextValue {
    value: f64,
}

/// Pull the `[0][0]` duration in seconds out of a distance-matrix response
pub fn parse_duration(body: &Value) -> Result<f64, DistanceError> {
    let response = DistanceMatrixResponse::deserialize(body)
        .map_err(|e| DistanceError::BadResponse(e.to_string()))?;

    match response.status.as_deref() {
        Some("OK") => {}
        Some(status) => {
            return Err(DistanceError::Status(match response.error_message {
                Some(message) => format!("{}: {}", status, message),
                None => status.to_string(),
            }));
        }
        None => return Err(DistanceError::BadResponse("missing status".to_string())),
    }

    let element = response
        .rows
        .first()
        .and_then(|row| row.elements.first())
        .ok_or_else(|| DistanceError::BadResponse("missing rows[0].elements[0]".to_string()))?;

    match element.status.as_deref() {
        Some("OK") | None => {}
        Some(status) => return Err(DistanceError::Status(status.to_string())),
    }

    element
        .duration
        .as_ref()
        .map(|duration| duration.value)
        .ok_or_else(|| DistanceError::BadResponse("missing duration.value".to_string()))
}

pub struct DistanceMatrixParams {
    pub api_url: String,
    pub api_key: String,
    pub units: String,
    pub timeout: Duration,
}

/// Client for a single-origin, single-destination distance matrix query
pub struct DistanceMatrixClient {
    params: DistanceMatrixParams,
    client: reqwest::Client,
}

impl DistanceMatrixClient {
    pub fn new(params: DistanceMatrixParams) -> Result<Self, DistanceError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("commute-service/", env!("CARGO_PKG_VERSION")))
            .timeout(params.timeout)
            .build()?;

        Ok(Self { params, client })
    }

    /// Query the upstream API and hand back its JSON body untouched
    pub async fn fetch_raw(&self, origin: LatLng, dest: LatLng) -> Result<Value, DistanceError> {
        let origins = origin.to_string();
        let destinations = dest.to_string();

        tracing::debug!("Querying distance matrix {} -> {}", origins, destinations);

        let response = self
            .client
            .get(&self.params.api_url)
            .query(&[
                ("units", self.params.units.as_str()),
                ("origins", origins.as_str()),
                ("destinations", destinations.as_str()),
                ("key", self.params.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| {
                // Log full error chain for debugging, minus the URL which carries the key
                let e = e.without_url();
                let mut error_msg = format!("Distance matrix request failed: {}", e);
                let mut source = e.source();
                while let Some(err) = source {
                    error_msg.push_str(&format!("\n  Caused by: {}", err));
                    source = err.source();
                }
                tracing::warn!("{}", error_msg);
                DistanceError::Request(e)
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            tracing::warn!("Distance matrix API returned HTTP {}", status);
            return Err(DistanceError::Api { status, message });
        }

        let text = response.text().await.map_err(|e| e.without_url())?;
        let body: Value = serde_json::from_str(&text)?;

        Ok(body)
    }

    pub async fn fetch_duration(&self, origin: LatLng, dest: LatLng) -> Result<f64, DistanceError> {
        let body = self.fetch_raw(origin, dest).await?;
        parse_duration(&body)
    }
}
