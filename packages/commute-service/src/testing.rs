//! In-memory distance providers for unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use crate::models::LatLng;
use crate::services::{DistanceError, DistanceProvider};

enum Outcome {
    Seconds(f64),
    Fail(String),
}

/// Answers with fixed durations per (origin, dest) and counts every call.
#[derive(Default)]
pub struct ScriptedProvider {
    routes: Vec<(LatLng, LatLng, Outcome)>,
    fallback: Option<f64>,
    delay: Duration,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(mut self, origin: LatLng, dest: LatLng, seconds: f64) -> Self {
        self.routes.push((origin, dest, Outcome::Seconds(seconds)));
        self
    }

    pub fn failing(mut self, origin: LatLng, dest: LatLng, message: &str) -> Self {
        self.routes
            .push((origin, dest, Outcome::Fail(message.to_string())));
        self
    }

    /// Duration for any pair without a scripted route
    pub fn fallback(mut self, seconds: f64) -> Self {
        self.fallback = Some(seconds);
        self
    }

    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DistanceProvider for ScriptedProvider {
    async fn duration_seconds(&self, origin: LatLng, dest: LatLng) -> Result<f64, DistanceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let outcome = self
            .routes
            .iter()
            .find(|(o, d, _)| *o == origin && *d == dest)
            .map(|(_, _, outcome)| match outcome {
                Outcome::Seconds(seconds) => Ok(*seconds),
                Outcome::Fail(message) => Err(DistanceError::Status(message.clone())),
            })
            .or_else(|| self.fallback.map(Ok))
            .unwrap_or_else(|| {
                Err(DistanceError::BadResponse(format!(
                    "no route scripted for {} -> {}",
                    origin, dest
                )))
            });

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        outcome
    }
}

/// Fails a fixed number of times before answering.
pub struct FlakyProvider {
    failures: usize,
    seconds: f64,
    transient: bool,
    calls: AtomicUsize,
}

impl FlakyProvider {
    pub fn transient(failures: usize, seconds: f64) -> Self {
        Self {
            failures,
            seconds,
            transient: true,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn permanent(failures: usize, seconds: f64) -> Self {
        Self {
            transient: false,
            ..Self::transient(failures, seconds)
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DistanceProvider for FlakyProvider {
    async fn duration_seconds(&self, _origin: LatLng, _dest: LatLng) -> Result<f64, DistanceError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call >= self.failures {
            return Ok(self.seconds);
        }
        if self.transient {
            Err(DistanceError::Api {
                status: 503,
                message: "Service Unavailable".to_string(),
            })
        } else {
            Err(DistanceError::Status("NOT_FOUND".to_string()))
        }
    }
}
