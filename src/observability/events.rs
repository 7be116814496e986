//! Health-change event stream.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::health::HealthState;

/// Emitted whenever an upstream's classification changes tier.
///
/// Delivered over a `tokio::sync::broadcast` channel; slow subscribers lose
/// the oldest events rather than backpressuring the probing pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthChange {
    pub address: String,
    pub old_state: HealthState,
    pub new_state: HealthState,
    pub timestamp: DateTime<Utc>,
}
