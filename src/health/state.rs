//! Upstream health state machine.
//!
//! # States
//! - Unknown: no classification yet (never selected unless fail-open)
//! - Healthy: preferred selection tier
//! - Degraded: fallback tier when no Healthy upstream exists
//! - Unhealthy: excluded from selection (fail-open escape hatch only)
//!
//! # State Transitions
//! ```text
//! Unknown   → Healthy:   consecutive successes >= promote threshold
//! Unknown   → Unhealthy: consecutive failures  >= demote threshold
//! Healthy   → Degraded  → Unhealthy: one tier per full failure run
//! Unhealthy → Degraded  → Healthy:   one tier per full success run
//! ```
//! Counters reset on every transition, so each tier requires its own full
//! run of consistent samples. No single sample ever flips classification.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Classification of one upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthState {
    Unknown,
    Healthy,
    Degraded,
    Unhealthy,
}

impl HealthState {
    /// The next tier up. `Unknown` jumps straight to `Healthy`: the first
    /// full success run decides the initial classification.
    pub fn promoted(self) -> HealthState {
        match self {
            HealthState::Unknown => HealthState::Healthy,
            HealthState::Unhealthy => HealthState::Degraded,
            HealthState::Degraded | HealthState::Healthy => HealthState::Healthy,
        }
    }

    /// The next tier down. `Unknown` jumps straight to `Unhealthy`.
    pub fn demoted(self) -> HealthState {
        match self {
            HealthState::Unknown => HealthState::Unhealthy,
            HealthState::Healthy => HealthState::Degraded,
            HealthState::Degraded | HealthState::Unhealthy => HealthState::Unhealthy,
        }
    }

    /// Numeric value for metrics gauges (higher is worse).
    pub fn as_gauge(self) -> f64 {
        match self {
            HealthState::Healthy => 0.0,
            HealthState::Degraded => 1.0,
            HealthState::Unhealthy => 2.0,
            HealthState::Unknown => 3.0,
        }
    }
}

impl fmt::Display for HealthState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HealthState::Unknown => write!(f, "unknown"),
            HealthState::Healthy => write!(f, "healthy"),
            HealthState::Degraded => write!(f, "degraded"),
            HealthState::Unhealthy => write!(f, "unhealthy"),
        }
    }
}
