use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;

use crate::models::LatLng;
use crate::services::distance_matrix::DistanceError;
use crate::services::provider::DistanceProvider;

const MAX_BACKOFF: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub initial_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            initial_backoff: Duration::from_millis(200),
        }
    }
}

impl RetryPolicy {
    /// Exponential backoff with up to 25% jitter, capped at `MAX_BACKOFF` before jitter
    fn backoff(&self, attempt: u32) -> Duration {
        let base = self
            .initial_backoff
            .saturating_mul(2u32.saturating_pow(attempt.min(16)))
            .min(MAX_BACKOFF);
        let jitter = rand::thread_rng().gen_range(0.0..0.25);
        base.mul_f64(1.0 + jitter)
    }
}

/// Retries transient failures of the wrapped provider
pub struct RetryingProvider<P> {
    inner: P,
    policy: RetryPolicy,
}

impl<P> RetryingProvider<P> {
    pub fn new(inner: P, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }
}

#[async_trait]
impl<P: DistanceProvider> DistanceProvider for RetryingProvider<P> {
    async fn duration_seconds(&self, origin: LatLng, dest: LatLng) -> Result<f64, DistanceError> {
        let mut attempt = 0;
        loop {
            match self.inner.duration_seconds(origin, dest).await {
                Ok(seconds) => return Ok(seconds),
                Err(e) if e.is_transient() && attempt < self.policy.max_retries => {
                    let delay = self.policy.backoff(attempt);
                    attempt += 1;
                    tracing::debug!(
                        "Transient distance error ({}), retry {}/{} in {:?}",
                        e,
                        attempt,
                        self.policy.max_retries,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
