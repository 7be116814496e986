//! Configuration validation.
//!
//! Semantic validation on top of serde's syntactic checks: threshold sanity,
//! address well-formedness, duplicate detection. Returns all violations, not
//! just the first, so a misconfigured pool can be fixed in one pass. Runs
//! once at engine construction; a validation failure is the only fatal error
//! class in the crate.

use thiserror::Error;
use url::Url;

use crate::config::schema::{PoolConfig, UpstreamSpec};

/// A single semantic violation in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("probe_interval_ms must be greater than zero")]
    ZeroProbeInterval,

    #[error("probe_timeout_ms must be greater than zero")]
    ZeroProbeTimeout,

    #[error("probe_timeout_ms ({timeout_ms}) must not exceed probe_interval_ms ({interval_ms})")]
    TimeoutExceedsInterval { timeout_ms: u64, interval_ms: u64 },

    #[error("promote_after_n_successes must be at least 1")]
    ZeroPromoteThreshold,

    #[error("demote_after_n_failures must be at least 1")]
    ZeroDemoteThreshold,

    #[error("max_latency_ms must be greater than zero")]
    ZeroMaxLatency,

    #[error("invalid upstream address '{address}': {reason}")]
    InvalidUpstreamAddress { address: String, reason: String },

    #[error("duplicate upstream address '{0}'")]
    DuplicateUpstream(String),
}

/// Validate pool settings and the initial upstream list.
pub fn validate_config(
    config: &PoolConfig,
    upstreams: &[UpstreamSpec],
) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.probe_interval_ms == 0 {
        errors.push(ValidationError::ZeroProbeInterval);
    }
    if config.probe_timeout_ms == 0 {
        errors.push(ValidationError::ZeroProbeTimeout);
    }
    if config.probe_interval_ms > 0 && config.probe_timeout_ms > config.probe_interval_ms {
        errors.push(ValidationError::TimeoutExceedsInterval {
            timeout_ms: config.probe_timeout_ms,
            interval_ms: config.probe_interval_ms,
        });
    }
    if config.promote_after_n_successes == 0 {
        errors.push(ValidationError::ZeroPromoteThreshold);
    }
    if config.demote_after_n_failures == 0 {
        errors.push(ValidationError::ZeroDemoteThreshold);
    }
    if config.max_latency_ms == 0 {
        errors.push(ValidationError::ZeroMaxLatency);
    }

    let mut seen = std::collections::HashSet::new();
    for spec in upstreams {
        if let Err(e) = validate_address(&spec.address) {
            errors.push(e);
        }
        if !seen.insert(spec.address.as_str()) {
            errors.push(ValidationError::DuplicateUpstream(spec.address.clone()));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Check that an upstream address is an absolute http(s) URL.
pub fn validate_address(address: &str) -> Result<(), ValidationError> {
    let url = Url::parse(address).map_err(|e| ValidationError::InvalidUpstreamAddress {
        address: address.to_string(),
        reason: e.to_string(),
    })?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(ValidationError::InvalidUpstreamAddress {
            address: address.to_string(),
            reason: format!("unsupported scheme '{other}'"),
        }),
    }
}
