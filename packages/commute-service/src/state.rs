use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::watch;
use tracing::info;

use crate::config::Config;
use crate::libraries::{
    AggregatorConfig, CommuteAggregator, CommuteRecomputer, MarkerSession, SharedSession,
};
use crate::models::CommuteView;
use crate::services::{
    DistanceError, DistanceMatrixClient, DistanceMatrixParams, DistanceProvider, RelayClient,
    RetryPolicy, RetryingProvider,
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub distance_client: Arc<DistanceMatrixClient>,
    pub aggregator: Arc<CommuteAggregator>,
    pub session: SharedSession,
    pub commute_view: watch::Receiver<CommuteView>,
}

impl AppState {
    /// Build every service from config and start the commute recompute loop.
    ///
    /// Must be called from within a tokio runtime.
    pub fn initialize(config: Config) -> Result<Self, DistanceError> {
        let timeout = Duration::from_secs(config.request_timeout_secs);

        let distance_client = Arc::new(DistanceMatrixClient::new(DistanceMatrixParams {
            api_url: config.distance_api_url.clone(),
            api_key: config.maps_api_key.clone(),
            units: config.distance_units.clone(),
            timeout,
        })?);

        let retry_policy = RetryPolicy {
            max_retries: config.max_retries,
            initial_backoff: Duration::from_millis(config.retry_backoff_ms),
        };

        let relay_url = config.relay_url.clone().filter(|url| !url.is_empty());
        let provider: Arc<dyn DistanceProvider> = match relay_url {
            Some(url) => {
                info!("Aggregating commute times through relay at {}", url);
                Arc::new(RetryingProvider::new(
                    RelayClient::new(url, timeout)?,
                    retry_policy,
                ))
            }
            None => {
                info!("Aggregating commute times directly against the distance matrix API");
                Arc::new(RetryingProvider::new(
                    Arc::clone(&distance_client),
                    retry_policy,
                ))
            }
        };

        let aggregator = Arc::new(CommuteAggregator::with_config(
            provider,
            AggregatorConfig {
                round_trip_factor: config.round_trip_factor,
                max_concurrent_requests: config.max_concurrent_requests,
            },
        ));

        let (session, snapshots) = MarkerSession::new();
        let (recomputer, commute_view) = CommuteRecomputer::new(Arc::clone(&aggregator));
        tokio::spawn(recomputer.run(snapshots));

        Ok(Self {
            config: Arc::new(config),
            distance_client,
            aggregator,
            session: Arc::new(Mutex::new(session)),
            commute_view,
        })
    }
}
