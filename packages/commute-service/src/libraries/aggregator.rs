use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, warn};

use crate::models::{CommuteResult, Marker, PairFailure};
use crate::services::DistanceProvider;

/// Configuration for commute aggregation
#[derive(Debug, Clone)]
pub struct AggregatorConfig {
    pub round_trip_factor: f64,      // Multiplier on one-way durations (2 = there and back)
    pub max_concurrent_requests: usize, // Cap on in-flight distance requests
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            round_trip_factor: 2.0,
            max_concurrent_requests: 16,
        }
    }
}

/// Weighted contribution of one (home, destination) pair, truncated toward zero.
pub fn pair_contribution(duration_seconds: f64, visits_per_week: u32, round_trip_factor: f64) -> u64 {
    let weighted = duration_seconds * round_trip_factor * f64::from(visits_per_week);
    if weighted.is_finite() && weighted > 0.0 {
        weighted.trunc() as u64
    } else {
        0
    }
}

/// Split markers into (homes, destinations), keeping their relative order
pub fn partition(markers: &[Marker]) -> (Vec<&Marker>, Vec<&Marker>) {
    markers.iter().partition(|marker| marker.is_home)
}

/// Computes weekly commute totals for every home marker.
///
/// Each (home, destination) pair is one distance request. All requests are
/// spawned up front and the totals are only returned once every one of them
/// has settled. A failed pair is recorded on its home's result instead of
/// counting as zero.
pub struct CommuteAggregator {
    provider: Arc<dyn DistanceProvider>,
    config: AggregatorConfig,
    permits: Arc<Semaphore>,
}

impl CommuteAggregator {
    pub fn new(provider: Arc<dyn DistanceProvider>) -> Self {
        Self::with_config(provider, AggregatorConfig::default())
    }

    pub fn with_config(provider: Arc<dyn DistanceProvider>, config: AggregatorConfig) -> Self {
        let permits = Arc::new(Semaphore::new(config.max_concurrent_requests.max(1)));
        Self {
            provider,
            config,
            permits,
        }
    }

    pub async fn aggregate(&self, markers: &[Marker]) -> Vec<CommuteResult> {
        let (homes, destinations) = partition(markers);

        debug!(
            "Aggregating {} homes x {} destinations",
            homes.len(),
            destinations.len()
        );

        let mut totals = vec![0u64; homes.len()];
        let mut failures: Vec<Vec<PairFailure>> = vec![Vec::new(); homes.len()];
        let mut settled = vec![vec![false; destinations.len()]; homes.len()];

        let mut pairs = JoinSet::new();
        for (home_index, home) in homes.iter().enumerate() {
            for (destination_index, destination) in destinations.iter().enumerate() {
                let provider = Arc::clone(&self.provider);
                let permits = Arc::clone(&self.permits);
                let origin = home.position;
                let dest = destination.position;

                pairs.spawn(async move {
                    // The semaphore is never closed, so acquiring only waits
                    let _permit = permits.acquire_owned().await.ok();
                    let result = provider.duration_seconds(origin, dest).await;
                    (home_index, destination_index, result)
                });
            }
        }

        // Only this loop touches the per-home accumulators
        while let Some(joined) = pairs.join_next().await {
            let (home_index, destination_index, result) = match joined {
                Ok(outcome) => outcome,
                Err(e) => {
                    error!("Distance request task failed: {}", e);
                    continue;
                }
            };
            settled[home_index][destination_index] = true;

            let destination = destinations[destination_index];
            match result {
                Ok(duration) => {
                    let contribution = pair_contribution(
                        duration,
                        destination.visits_per_week,
                        self.config.round_trip_factor,
                    );
                    totals[home_index] = totals[home_index].saturating_add(contribution);
                }
                Err(e) => {
                    warn!(
                        "Distance request {} -> {} failed: {}",
                        homes[home_index].address, destination.address, e
                    );
                    failures[home_index].push(PairFailure {
                        destination: destination.address.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        // A task that panicked never reported its pair, so find it here
        for (home_index, row) in settled.iter().enumerate() {
            for (destination_index, done) in row.iter().enumerate() {
                if !done {
                    failures[home_index].push(PairFailure {
                        destination: destinations[destination_index].address.clone(),
                        error: "distance request did not complete".to_string(),
                    });
                }
            }
        }

        homes
            .iter()
            .zip(totals)
            .zip(failures)
            .map(|((home, weekly_commute_seconds), failures)| CommuteResult {
                address: home.address.clone(),
                weekly_commute_seconds,
                failures,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LatLng;
    use crate::testing::ScriptedProvider;
    use std::time::Duration;

    fn point(n: u32) -> LatLng {
        LatLng::new(49.0 + f64::from(n) * 0.01, -97.0)
    }

    fn aggregator(provider: &Arc<ScriptedProvider>) -> CommuteAggregator {
        CommuteAggregator::new(provider.clone())
    }

    #[test]
    fn test_pair_contribution_truncates() {
        assert_eq!(pair_contribution(600.0, 3, 2.0), 3600);
        assert_eq!(pair_contribution(100.3, 1, 2.0), 200);
        assert_eq!(pair_contribution(999.0, 0, 2.0), 0);
        assert_eq!(pair_contribution(f64::NAN, 2, 2.0), 0);
        assert_eq!(pair_contribution(-5.0, 2, 2.0), 0);
    }

    #[test]
    fn test_partition_keeps_order() {
        let markers = vec![
            Marker::home(point(0), "H1"),
            Marker::destination(point(1), "D1", 1),
            Marker::home(point(2), "H2"),
            Marker::destination(point(3), "D2", 1),
        ];
        let (homes, destinations) = partition(&markers);
        let homes: Vec<_> = homes.iter().map(|m| m.address.as_str()).collect();
        let destinations: Vec<_> = destinations.iter().map(|m| m.address.as_str()).collect();
        assert_eq!(homes, vec!["H1", "H2"]);
        assert_eq!(destinations, vec!["D1", "D2"]);
    }

    #[tokio::test]
    async fn test_single_pair_example() {
        let provider = Arc::new(ScriptedProvider::new().route(point(0), point(1), 600.0));
        let markers = vec![
            Marker::home(point(0), "H1"),
            Marker::destination(point(1), "D1", 3),
        ];

        let results = aggregator(&provider).aggregate(&markers).await;

        assert_eq!(results, vec![CommuteResult::new("H1", 3600)]);
    }

    #[tokio::test]
    async fn test_zero_visit_destination_contributes_nothing() {
        let provider = Arc::new(
            ScriptedProvider::new()
                .route(point(0), point(1), 300.0)
                .route(point(0), point(2), 999.0),
        );
        let markers = vec![
            Marker::home(point(0), "H1"),
            Marker::destination(point(1), "D1", 2),
            Marker::destination(point(2), "D2", 0),
        ];

        let results = aggregator(&provider).aggregate(&markers).await;

        assert_eq!(results[0].weekly_commute_seconds, 1200);
        // Zero-visit destinations are still queried
        assert_eq!(provider.calls(), 2);
    }

    #[tokio::test]
    async fn test_truncation_happens_per_pair() {
        // 100.3 * 2 = 200.6 -> 200 for each pair; truncating the sum would give 401
        let provider = Arc::new(
            ScriptedProvider::new()
                .route(point(0), point(1), 100.3)
                .route(point(0), point(2), 100.3),
        );
        let markers = vec![
            Marker::home(point(0), "H1"),
            Marker::destination(point(1), "D1", 1),
            Marker::destination(point(2), "D2", 1),
        ];

        let results = aggregator(&provider).aggregate(&markers).await;

        assert_eq!(results[0].weekly_commute_seconds, 400);
    }

    #[tokio::test]
    async fn test_issues_one_request_per_pair_in_home_order() {
        let provider = Arc::new(ScriptedProvider::new().fallback(60.0));
        let markers = vec![
            Marker::destination(point(10), "D1", 1),
            Marker::home(point(0), "H1"),
            Marker::destination(point(11), "D2", 2),
            Marker::home(point(1), "H2"),
            Marker::destination(point(12), "D3", 3),
            Marker::home(point(2), "H3"),
        ];

        let results = aggregator(&provider).aggregate(&markers).await;

        assert_eq!(provider.calls(), 9);
        let addresses: Vec<_> = results.iter().map(|r| r.address.as_str()).collect();
        assert_eq!(addresses, vec!["H1", "H2", "H3"]);
        for result in &results {
            assert_eq!(result.weekly_commute_seconds, 60 * 2 * (1 + 2 + 3));
        }
    }

    #[tokio::test]
    async fn test_no_destinations_gives_zero_totals() {
        let provider = Arc::new(ScriptedProvider::new().fallback(60.0));
        let markers = vec![Marker::home(point(0), "H1"), Marker::home(point(1), "H2")];

        let results = aggregator(&provider).aggregate(&markers).await;

        assert_eq!(
            results,
            vec![CommuteResult::new("H1", 0), CommuteResult::new("H2", 0)]
        );
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn test_no_homes_gives_empty_result() {
        let provider = Arc::new(ScriptedProvider::new().fallback(60.0));
        let markers = vec![Marker::destination(point(1), "D1", 4)];

        let results = aggregator(&provider).aggregate(&markers).await;

        assert!(results.is_empty());
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn test_failed_pair_is_isolated_to_its_home() {
        let provider = Arc::new(
            ScriptedProvider::new()
                .failing(point(0), point(10), "ZERO_RESULTS")
                .route(point(0), point(11), 100.0)
                .route(point(1), point(10), 50.0)
                .route(point(1), point(11), 70.0),
        );
        let markers = vec![
            Marker::home(point(0), "H1"),
            Marker::home(point(1), "H2"),
            Marker::destination(point(10), "D1", 1),
            Marker::destination(point(11), "D2", 1),
        ];

        let results = aggregator(&provider).aggregate(&markers).await;

        assert!(results[0].is_partial());
        assert_eq!(results[0].weekly_commute_seconds, 200);
        assert_eq!(results[0].failures.len(), 1);
        assert_eq!(results[0].failures[0].destination, "D1");
        assert!(results[0].failures[0].error.contains("ZERO_RESULTS"));

        assert!(!results[1].is_partial());
        assert_eq!(results[1].weekly_commute_seconds, 240);
    }

    #[tokio::test]
    async fn test_round_trip_factor_is_configurable() {
        let provider = Arc::new(ScriptedProvider::new().fallback(600.0));
        let aggregator = CommuteAggregator::with_config(
            provider.clone(),
            AggregatorConfig {
                round_trip_factor: 1.5,
                ..Default::default()
            },
        );
        let markers = vec![
            Marker::home(point(0), "H1"),
            Marker::destination(point(1), "D1", 2),
        ];

        let results = aggregator.aggregate(&markers).await;

        assert_eq!(results[0].weekly_commute_seconds, 1800);
    }

    #[tokio::test]
    async fn test_concurrency_cap_is_respected() {
        let provider = Arc::new(
            ScriptedProvider::new()
                .fallback(10.0)
                .delay(Duration::from_millis(20)),
        );
        let aggregator = CommuteAggregator::with_config(
            provider.clone(),
            AggregatorConfig {
                max_concurrent_requests: 2,
                ..Default::default()
            },
        );
        let mut markers = vec![Marker::home(point(0), "H1"), Marker::home(point(1), "H2")];
        for n in 0..4 {
            markers.push(Marker::destination(point(10 + n), format!("D{}", n), 1));
        }

        let results = aggregator.aggregate(&markers).await;

        assert_eq!(provider.calls(), 8);
        assert!(provider.max_in_flight() <= 2);
        assert_eq!(results[0].weekly_commute_seconds, 80);
    }
}
