//! Per-upstream mutable record.
//!
//! Owned exclusively by the pool; everything outside the pool sees
//! [`crate::pool::UpstreamView`] copies instead.

use std::collections::VecDeque;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::config::UpstreamSpec;
use crate::health::{Evaluation, HealthRecord, HealthState};
use crate::probe::ProbeResult;

/// How many recent probe outcomes each upstream retains.
pub(crate) const RECENT_OUTCOMES: usize = 16;

#[derive(Debug, Clone)]
pub(crate) struct Upstream {
    pub spec: UpstreamSpec,
    pub state: HealthState,
    pub score: f64,
    pub consecutive_successes: u32,
    pub consecutive_failures: u32,
    pub last_applied_seq: u64,
    pub last_probe_at: Option<DateTime<Utc>>,
    pub last_height: Option<u64>,
    pub last_latency: Option<Duration>,
    /// Ring of recent pass/fail outcomes, newest last.
    pub recent: VecDeque<bool>,
}

impl Upstream {
    pub fn new(spec: UpstreamSpec) -> Self {
        Self {
            spec,
            state: HealthState::Unknown,
            score: 0.0,
            consecutive_successes: 0,
            consecutive_failures: 0,
            last_applied_seq: 0,
            last_probe_at: None,
            last_height: None,
            last_latency: None,
            recent: VecDeque::with_capacity(RECENT_OUTCOMES),
        }
    }

    pub fn health_record(&self) -> HealthRecord {
        HealthRecord {
            state: self.state,
            consecutive_successes: self.consecutive_successes,
            consecutive_failures: self.consecutive_failures,
            last_applied_seq: self.last_applied_seq,
        }
    }

    /// Fold an accepted evaluation and its probe result into the record.
    pub fn record(&mut self, eval: &Evaluation, result: &ProbeResult) {
        self.state = eval.state;
        self.score = eval.score;
        self.consecutive_successes = eval.consecutive_successes;
        self.consecutive_failures = eval.consecutive_failures;
        self.last_applied_seq = result.seq;
        self.last_probe_at = Some(result.timestamp);
        self.last_latency = Some(result.latency);
        if let Some(height) = result.height {
            self.last_height = Some(height);
        }
        if self.recent.len() == RECENT_OUTCOMES {
            self.recent.pop_front();
        }
        self.recent.push_back(eval.passed);
    }
}
