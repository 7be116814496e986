//! Health evaluation: hysteresis state machine plus numeric scoring.
//!
//! Pure computation; no I/O, no shared state. The pool feeds each accepted
//! probe result through [`evaluate`] and applies the returned verdict.

use std::time::Duration;

use crate::config::PoolConfig;
use crate::health::state::HealthState;
use crate::probe::ProbeResult;

/// Score weights. Terms with no data are dropped and the remaining weights
/// renormalized, so a chain family without a peer-count query is not
/// penalized for it.
const WEIGHT_LATENCY: f64 = 40.0;
const WEIGHT_BLOCK_LAG: f64 = 40.0;
const WEIGHT_PEERS: f64 = 20.0;

/// The evaluator's view of one upstream's accumulated history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HealthRecord {
    pub state: HealthState,
    pub consecutive_successes: u32,
    pub consecutive_failures: u32,
    /// Sequence number of the last probe result applied to this upstream.
    pub last_applied_seq: u64,
}

impl HealthRecord {
    /// History of a freshly registered upstream.
    pub fn initial() -> Self {
        Self {
            state: HealthState::Unknown,
            consecutive_successes: 0,
            consecutive_failures: 0,
            last_applied_seq: 0,
        }
    }
}

/// Verdict for one accepted probe result.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluation {
    pub state: HealthState,
    /// Normalized quality score in [0, 100]; recomputed on every accepted
    /// sample, independent of state-transition hysteresis.
    pub score: f64,
    /// Whether the raw sample classified as passing.
    pub passed: bool,
    pub consecutive_successes: u32,
    pub consecutive_failures: u32,
}

/// Evaluate one probe result against an upstream's history.
///
/// Returns `None` when the result is stale (sequence number not greater than
/// the last applied one); stale results must not change state or score.
/// `best_height` is the best known block height among pool members of the
/// same chain family, when available.
pub fn evaluate(
    record: &HealthRecord,
    result: &ProbeResult,
    config: &PoolConfig,
    best_height: Option<u64>,
) -> Option<Evaluation> {
    if result.seq <= record.last_applied_seq {
        return None;
    }

    let passed = sample_passes(result, config, best_height);

    let (mut successes, mut failures) = if passed {
        (record.consecutive_successes.saturating_add(1), 0)
    } else {
        (0, record.consecutive_failures.saturating_add(1))
    };

    let mut state = record.state;
    if passed && successes >= config.promote_after_n_successes && state != HealthState::Healthy {
        state = state.promoted();
        successes = 0;
        failures = 0;
    } else if !passed && failures >= config.demote_after_n_failures && state != HealthState::Unhealthy
    {
        state = state.demoted();
        successes = 0;
        failures = 0;
    }

    Some(Evaluation {
        state,
        score: compute_score(result, config, best_height),
        passed,
        consecutive_successes: successes,
        consecutive_failures: failures,
    })
}

/// Classify one raw sample as pass or fail.
fn sample_passes(result: &ProbeResult, config: &PoolConfig, best_height: Option<u64>) -> bool {
    if result.error.is_some() {
        return false;
    }
    if result.latency > config.max_latency() {
        return false;
    }
    if result.syncing == Some(true) {
        return false;
    }
    if let Some(peers) = result.peer_count {
        if peers < config.min_peer_count {
            return false;
        }
    }
    if let (Some(height), Some(best)) = (result.height, best_height) {
        if best.saturating_sub(height) > config.max_block_lag {
            return false;
        }
    }
    true
}

/// Weighted quality score in [0, 100]. Failed probes score zero; terms
/// without data are left out of both numerator and denominator.
fn compute_score(result: &ProbeResult, config: &PoolConfig, best_height: Option<u64>) -> f64 {
    if result.error.is_some() {
        return 0.0;
    }

    let mut weighted = 0.0;
    let mut total_weight = 0.0;

    weighted += WEIGHT_LATENCY * latency_headroom(result.latency, config.max_latency());
    total_weight += WEIGHT_LATENCY;

    if let (Some(height), Some(best)) = (result.height, best_height) {
        weighted += WEIGHT_BLOCK_LAG * lag_headroom(best.saturating_sub(height), config.max_block_lag);
        total_weight += WEIGHT_BLOCK_LAG;
    }

    if let Some(peers) = result.peer_count {
        weighted += WEIGHT_PEERS * peer_sufficiency(peers, config.min_peer_count);
        total_weight += WEIGHT_PEERS;
    }

    if total_weight == 0.0 {
        return 0.0;
    }
    (100.0 * weighted / total_weight).clamp(0.0, 100.0)
}

fn latency_headroom(latency: Duration, max: Duration) -> f64 {
    if max.is_zero() {
        return 0.0;
    }
    (1.0 - latency.as_secs_f64() / max.as_secs_f64()).clamp(0.0, 1.0)
}

fn lag_headroom(lag: u64, max_lag: u64) -> f64 {
    if max_lag == 0 {
        return if lag == 0 { 1.0 } else { 0.0 };
    }
    (1.0 - lag as f64 / max_lag as f64).clamp(0.0, 1.0)
}

fn peer_sufficiency(peers: u64, min_peers: u64) -> f64 {
    if min_peers == 0 {
        return 1.0;
    }
    (peers as f64 / min_peers as f64).clamp(0.0, 1.0)
}
