use serde::{Deserialize, Serialize};

use super::location::LatLng;

/// A location the user placed on the map.
///
/// Markers are either a candidate home or a destination visited some number
/// of times per week. The visit count only means something for destinations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Marker {
    pub position: LatLng,
    pub address: String,
    #[serde(default)]
    pub is_home: bool,
    #[serde(default)]
    pub visits_per_week: u32,
}

impl Marker {
    /// New markers start out as destinations with no visits
    pub fn new(position: LatLng, address: impl Into<String>) -> Self {
        Self {
            position,
            address: address.into(),
            is_home: false,
            visits_per_week: 0,
        }
    }

    pub fn home(position: LatLng, address: impl Into<String>) -> Self {
        Self {
            is_home: true,
            ..Self::new(position, address)
        }
    }

    pub fn destination(position: LatLng, address: impl Into<String>, visits_per_week: u32) -> Self {
        Self {
            visits_per_week,
            ..Self::new(position, address)
        }
    }

    /// Flip between home and destination. Visits are reset either way.
    pub fn toggle_home(&mut self) {
        self.is_home = !self.is_home;
        self.visits_per_week = 0;
    }

    /// Returns false for home markers, which don't track visits
    pub fn increment_visits(&mut self) -> bool {
        if self.is_home {
            return false;
        }
        self.visits_per_week = self.visits_per_week.saturating_add(1);
        true
    }

    /// Floored at zero. Returns whether the count changed.
    pub fn decrement_visits(&mut self) -> bool {
        if self.visits_per_week == 0 {
            return false;
        }
        self.visits_per_week -= 1;
        true
    }
}
