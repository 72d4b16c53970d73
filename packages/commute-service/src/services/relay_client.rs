use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::models::{LatLng, RelayRequest};
use crate::services::distance_matrix::{parse_duration, DistanceError};
use crate::services::provider::DistanceProvider;

/// Fetches durations through a distance relay instead of the upstream API,
/// the same way a browser client without the API key would.
pub struct RelayClient {
    relay_url: String,
    client: reqwest::Client,
}

impl RelayClient {
    pub fn new(relay_url: String, timeout: Duration) -> Result<Self, DistanceError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self { relay_url, client })
    }
}

#[async_trait]
impl DistanceProvider for RelayClient {
    async fn duration_seconds(&self, origin: LatLng, dest: LatLng) -> Result<f64, DistanceError> {
        let response = self
            .client
            .post(&self.relay_url)
            .json(&RelayRequest { origin, dest })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            tracing::warn!("Relay returned HTTP {}: {}", status, message);
            return Err(DistanceError::Api { status, message });
        }

        let text = response.text().await?;
        let body: Value = serde_json::from_str(&text)?;

        parse_duration(&body)
    }
}
