//! Immutable, point-in-time pool views handed to read-only consumers.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::ChainFamily;
use crate::health::HealthState;

/// Read-only copy of one upstream's current classification.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpstreamView {
    pub address: String,
    pub chain_family: ChainFamily,
    pub state: HealthState,
    pub score: f64,
    pub height: Option<u64>,
    pub latency: Option<Duration>,
    pub last_probe_at: Option<DateTime<Utc>>,
}

/// Consistent copy of the whole pool. Readers never observe a partially
/// updated upstream; the pool republishes a fresh snapshot after every
/// applied update.
#[derive(Debug, Clone, Serialize)]
pub struct PoolSnapshot {
    pub taken_at: DateTime<Utc>,
    /// Ordered by address for stable iteration.
    pub upstreams: Vec<UpstreamView>,
}

impl PoolSnapshot {
    pub(crate) fn empty() -> Self {
        Self {
            taken_at: Utc::now(),
            upstreams: Vec::new(),
        }
    }

    pub fn get(&self, address: &str) -> Option<&UpstreamView> {
        self.upstreams.iter().find(|u| u.address == address)
    }

    pub fn len(&self) -> usize {
        self.upstreams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.upstreams.is_empty()
    }

    /// Best known block height among members of one chain family.
    pub fn best_height(&self, family: ChainFamily) -> Option<u64> {
        self.upstreams
            .iter()
            .filter(|u| u.chain_family == family)
            .filter_map(|u| u.height)
            .max()
    }
}
