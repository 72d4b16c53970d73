pub mod commute;
pub mod location;
pub mod marker;
pub mod requests;

// Re-export commonly used types
pub use commute::{CommuteResult, CommuteView, PairFailure};
pub use location::LatLng;
pub use marker::Marker;
pub use requests::{
    AddMarkerRequest, CommuteRequest, CommuteResponse, ErrorResponse, RelayRequest,
    SessionResponse,
};
