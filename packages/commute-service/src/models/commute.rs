use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single (home, destination) request that could not be completed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairFailure {
    pub destination: String,
    pub error: String,
}

/// Weekly commute estimate for one home marker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommuteResult {
    pub address: String,
    pub weekly_commute_seconds: u64,

    // When non-empty the total only covers the destinations that succeeded
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<PairFailure>,
}

impl CommuteResult {
    pub fn new(address: impl Into<String>, weekly_commute_seconds: u64) -> Self {
        Self {
            address: address.into(),
            weekly_commute_seconds,
            failures: Vec::new(),
        }
    }

    pub fn is_partial(&self) -> bool {
        !self.failures.is_empty()
    }

    pub fn weekly_commute_minutes(&self) -> u64 {
        self.weekly_commute_seconds / 60
    }
}

/// The latest published aggregation, tagged with the marker generation it was computed from.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommuteView {
    pub generation: u64,
    pub loading: bool,
    pub results: Vec<CommuteResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub computed_at: Option<DateTime<Utc>>,
}
