pub mod aggregator;
pub mod recompute;
pub mod session;

pub use aggregator::{AggregatorConfig, CommuteAggregator};
pub use recompute::CommuteRecomputer;
pub use session::{MarkerSession, MarkerSnapshot, SessionError, SharedSession};
