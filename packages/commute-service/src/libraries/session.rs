use std::sync::Arc;

use parking_lot::Mutex;
use thiserror::Error;
use tokio::sync::watch;

use crate::models::{LatLng, Marker};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SessionError {
    #[error("No marker at index {0}")]
    MarkerNotFound(usize),

    #[error("Marker {0} is a home; only destinations have visits")]
    NotADestination(usize),
}

/// The marker list as of one generation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarkerSnapshot {
    pub generation: u64,
    pub markers: Vec<Marker>,
}

pub type SharedSession = Arc<Mutex<MarkerSession>>;

/// Single owner of the marker list.
///
/// Every change to the markers bumps the generation and publishes a snapshot
/// to subscribers. Selection changes are not published since they don't
/// affect commute totals.
pub struct MarkerSession {
    markers: Vec<Marker>,
    selected: Option<usize>,
    generation: u64,
    sender: watch::Sender<MarkerSnapshot>,
}

impl MarkerSession {
    pub fn new() -> (Self, watch::Receiver<MarkerSnapshot>) {
        let (sender, receiver) = watch::channel(MarkerSnapshot::default());
        let session = Self {
            markers: Vec::new(),
            selected: None,
            generation: 0,
            sender,
        };
        (session, receiver)
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Add a destination marker for a geocoded address, returning its index
    pub fn add_marker(&mut self, position: LatLng, address: String) -> usize {
        self.markers.push(Marker::new(position, address));
        self.publish();
        self.markers.len() - 1
    }

    pub fn delete_marker(&mut self, index: usize) -> Result<Marker, SessionError> {
        if index >= self.markers.len() {
            return Err(SessionError::MarkerNotFound(index));
        }
        // Clear selection first so it can never point past the end
        self.selected = None;
        let removed = self.markers.remove(index);
        self.publish();
        Ok(removed)
    }

    pub fn toggle_home(&mut self, index: usize) -> Result<&Marker, SessionError> {
        self.marker_mut(index)?.toggle_home();
        self.publish();
        Ok(&self.markers[index])
    }

    pub fn increment_visits(&mut self, index: usize) -> Result<&Marker, SessionError> {
        if !self.marker_mut(index)?.increment_visits() {
            return Err(SessionError::NotADestination(index));
        }
        self.publish();
        Ok(&self.markers[index])
    }

    /// Decrementing at zero leaves the generation untouched
    pub fn decrement_visits(&mut self, index: usize) -> Result<&Marker, SessionError> {
        if self.marker_mut(index)?.decrement_visits() {
            self.publish();
        }
        Ok(&self.markers[index])
    }

    pub fn select(&mut self, index: usize) -> Result<(), SessionError> {
        if index >= self.markers.len() {
            return Err(SessionError::MarkerNotFound(index));
        }
        self.selected = Some(index);
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    fn marker_mut(&mut self, index: usize) -> Result<&mut Marker, SessionError> {
        self.markers
            .get_mut(index)
            .ok_or(SessionError::MarkerNotFound(index))
    }

    fn publish(&mut self) {
        self.generation += 1;
        self.sender.send_replace(MarkerSnapshot {
            generation: self.generation,
            markers: self.markers.clone(),
        });
        tracing::debug!(
            "Marker list now at generation {} ({} markers)",
            self.generation,
            self.markers.len()
        );
    }
}
