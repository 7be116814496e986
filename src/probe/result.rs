//! Probe outcome types.

use chrono::{DateTime, Utc};
use std::time::Duration;
use thiserror::Error;

/// Classified probe failure. Recoverable by design: failures become ordinary
/// failing samples feeding the health state machine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProbeError {
    /// The whole probe exchange exceeded the configured timeout.
    #[error("probe timed out after {0}ms")]
    Timeout(u64),

    /// Connection, DNS or other transport-level failure.
    #[error("transport error: {0}")]
    Transport(String),

    /// The node answered, but not with what the chain family promises.
    #[error("protocol error: {0}")]
    Protocol(String),
}

/// One bounded health query outcome for a single upstream.
///
/// `seq` is monotonic per upstream and assigned by the scheduler; the
/// evaluator uses it to drop stale or reordered results.
#[derive(Debug, Clone)]
pub struct ProbeResult {
    pub seq: u64,
    pub timestamp: DateTime<Utc>,
    /// Round-trip latency of the block-height query, or time spent until
    /// failure.
    pub latency: Duration,
    pub height: Option<u64>,
    pub syncing: Option<bool>,
    pub peer_count: Option<u64>,
    /// `None` on success; the classified failure otherwise.
    pub error: Option<ProbeError>,
}

impl ProbeResult {
    pub fn failure(seq: u64, error: ProbeError, latency: Duration) -> Self {
        Self {
            seq,
            timestamp: Utc::now(),
            latency,
            height: None,
            syncing: None,
            peer_count: None,
            error: Some(error),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}
