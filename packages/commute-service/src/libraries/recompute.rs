use std::sync::Arc;

use chrono::Utc;
use tokio::sync::watch;
use tracing::{debug, info};

use crate::libraries::aggregator::CommuteAggregator;
use crate::libraries::session::MarkerSnapshot;
use crate::models::CommuteView;

/// Re-runs the aggregator whenever the marker list changes.
///
/// Only the newest generation is ever worked on. When a new snapshot arrives
/// while an aggregation is still running, that aggregation is dropped, which
/// aborts its outstanding distance requests, and a fresh one starts.
pub struct CommuteRecomputer {
    aggregator: Arc<CommuteAggregator>,
    views: watch::Sender<CommuteView>,
}

impl CommuteRecomputer {
    pub fn new(aggregator: Arc<CommuteAggregator>) -> (Self, watch::Receiver<CommuteView>) {
        let (views, receiver) = watch::channel(CommuteView::default());
        (Self { aggregator, views }, receiver)
    }

    /// Runs until the session's sender goes away
    pub async fn run(self, mut snapshots: watch::Receiver<MarkerSnapshot>) {
        let mut snapshot = snapshots.borrow_and_update().clone();

        loop {
            let generation = snapshot.generation;
            self.views.send_modify(|view| {
                view.generation = generation;
                view.loading = true;
            });

            let aggregator = Arc::clone(&self.aggregator);
            let markers = snapshot.markers;
            let aggregation = async move { aggregator.aggregate(&markers).await };
            tokio::pin!(aggregation);

            tokio::select! {
                results = &mut aggregation => {
                    // A newer generation may have landed while the last request settled
                    if snapshots.has_changed().unwrap_or(false) {
                        debug!("Discarding results for superseded generation {}", generation);
                    } else {
                        debug!("Publishing {} results for generation {}", results.len(), generation);
                        self.views.send_replace(CommuteView {
                            generation,
                            loading: false,
                            results,
                            computed_at: Some(Utc::now()),
                        });
                        if snapshots.changed().await.is_err() {
                            break;
                        }
                    }
                }
                changed = snapshots.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    debug!("Generation {} superseded, cancelling in-flight requests", generation);
                }
            }

            snapshot = snapshots.borrow_and_update().clone();
        }

        info!("Marker session closed, stopping commute recompute loop");
    }
}
