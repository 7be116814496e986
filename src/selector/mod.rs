//! Selection subsystem.
//!
//! # Data Flow
//! ```text
//! Request path → Selector::select(snapshot)
//!     → tier ladder: Healthy → Degraded → (fail-open: anything) → error
//!     → policy pick within the tier:
//!         - highest_block.rs (greatest height, latency/hash tie-breaks)
//!         - latency.rs (min latency, or weighted-random opt-in)
//!         - round_robin.rs (stable rotation)
//! ```
//!
//! # Design Decisions
//! - Selection never performs I/O and never mutates the pool
//! - The fallback ladder is identical across policies
//! - The round-robin cursor is the only selector state

pub(crate) mod highest_block;
mod latency;
mod round_robin;

use std::sync::atomic::AtomicUsize;

use thiserror::Error;

use crate::config::SelectionPolicy;
use crate::health::HealthState;
use crate::pool::{PoolSnapshot, UpstreamView};

/// Selection-time failure, handed back to the proxy layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SelectError {
    /// Neither the Healthy nor the Degraded tier has any member (and
    /// fail-open is off or the pool is empty).
    #[error("no healthy upstream available")]
    NoHealthyUpstream,
}

/// Applies the configured policy to pool snapshots.
#[derive(Debug)]
pub struct Selector {
    policy: SelectionPolicy,
    fail_open: bool,
    /// Cursor for the round-robin policy; unused otherwise.
    cursor: AtomicUsize,
}

impl Selector {
    pub fn new(policy: SelectionPolicy, fail_open: bool) -> Self {
        Self {
            policy,
            fail_open,
            cursor: AtomicUsize::new(0),
        }
    }

    /// Choose one upstream from a snapshot.
    pub fn select(&self, snapshot: &PoolSnapshot) -> Result<UpstreamView, SelectError> {
        let candidates = self.candidate_tier(snapshot);
        let picked = match self.policy {
            SelectionPolicy::HighestBlock => highest_block::pick(&candidates),
            SelectionPolicy::LatencyWeighted => latency::pick_min(&candidates),
            SelectionPolicy::LatencyWeightedProbabilistic => latency::pick_weighted(&candidates),
            SelectionPolicy::RoundRobinHealthy => round_robin::pick(&candidates, &self.cursor),
        };
        picked.cloned().ok_or(SelectError::NoHealthyUpstream)
    }

    /// The widened candidate tier: Healthy, then Degraded, then (fail-open
    /// only) whatever the pool has. `Unhealthy` and `Unknown` upstreams are
    /// otherwise never candidates.
    pub(crate) fn candidate_tier<'a>(&self, snapshot: &'a PoolSnapshot) -> Vec<&'a UpstreamView> {
        let healthy: Vec<&UpstreamView> = snapshot
            .upstreams
            .iter()
            .filter(|u| u.state == HealthState::Healthy)
            .collect();
        if !healthy.is_empty() {
            return healthy;
        }

        let degraded: Vec<&UpstreamView> = snapshot
            .upstreams
            .iter()
            .filter(|u| u.state == HealthState::Degraded)
            .collect();
        if !degraded.is_empty() {
            return degraded;
        }

        if self.fail_open {
            return snapshot.upstreams.iter().collect();
        }
        Vec::new()
    }
}
