pub mod distance_matrix;
pub mod provider;
pub mod relay_client;
pub mod retry;

pub use distance_matrix::{DistanceError, DistanceMatrixClient, DistanceMatrixParams};
pub use provider::DistanceProvider;
pub use relay_client::RelayClient;
pub use retry::{RetryPolicy, RetryingProvider};
