use std::sync::Arc;

use async_trait::async_trait;

use crate::models::LatLng;
use crate::services::distance_matrix::{DistanceError, DistanceMatrixClient};

/// Something that can tell how long a one-way trip takes, in seconds.
#[async_trait]
pub trait DistanceProvider: Send + Sync {
    async fn duration_seconds(&self, origin: LatLng, dest: LatLng) -> Result<f64, DistanceError>;
}

#[async_trait]
impl DistanceProvider for DistanceMatrixClient {
    async fn duration_seconds(&self, origin: LatLng, dest: LatLng) -> Result<f64, DistanceError> {
        self.fetch_duration(origin, dest).await
    }
}

#[async_trait]
impl<P: DistanceProvider + ?Sized> DistanceProvider for Arc<P> {
    async fn duration_seconds(&self, origin: LatLng, dest: LatLng) -> Result<f64, DistanceError> {
        (**self).duration_seconds(origin, dest).await
    }
}
