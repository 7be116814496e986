//! Metrics recording.
//!
//! # Metrics
//! - `steer_upstream_health` (gauge): 0=healthy, 1=degraded, 2=unhealthy, 3=unknown
//! - `steer_upstream_score` (gauge): current 0-100 quality score
//! - `steer_probes_total` (counter): probes by upstream and outcome
//!
//! Uses the `metrics` facade only; installing an exporter is the host's
//! concern.

use crate::health::HealthState;

/// Record an upstream's classification and score after an applied update.
pub fn record_upstream_health(address: &str, state: HealthState, score: f64) {
    metrics::gauge!("steer_upstream_health", "upstream" => address.to_string()).set(state.as_gauge());
    metrics::gauge!("steer_upstream_score", "upstream" => address.to_string()).set(score);
}

/// Count one completed probe.
pub fn record_probe(address: &str, passed: bool) {
    let outcome = if passed { "pass" } else { "fail" };
    metrics::counter!(
        "steer_probes_total",
        "upstream" => address.to_string(),
        "outcome" => outcome
    )
    .increment(1);
}
