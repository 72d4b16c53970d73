use serde::{Deserialize, Serialize};

use super::{commute::CommuteView, location::LatLng, marker::Marker, CommuteResult};

/// Body accepted by the distance relay
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayRequest {
    pub origin: LatLng,
    pub dest: LatLng,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddMarkerRequest {
    pub position: LatLng,
    pub address: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommuteRequest {
    pub markers: Vec<Marker>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommuteResponse {
    pub results: Vec<CommuteResult>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionResponse {
    pub generation: u64,
    pub markers: Vec<Marker>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected: Option<usize>,
    pub commute: CommuteView,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}
