//! Engine facade: explicit construction and lifecycle of the whole pipeline.
//!
//! There is no global registry; hosts build an [`Engine`] from a config and
//! an initial upstream list, start it, and hand its provider surface to the
//! proxy layer.

use std::sync::Arc;

use tokio::sync::broadcast;

use crate::config::{validate_address, validate_config, ConfigError, PoolConfig, UpstreamSpec};
use crate::observability::HealthChange;
use crate::pool::{PoolSnapshot, UpstreamPool, UpstreamView};
use crate::provider::{RequestContext, UpstreamProvider};
use crate::scheduler::Scheduler;
use crate::selector::{SelectError, Selector};

/// Health-probing and upstream-selection engine.
pub struct Engine {
    pool: Arc<UpstreamPool>,
    scheduler: Scheduler,
    selector: Selector,
}

impl Engine {
    /// Validate the configuration and build the pipeline. `InvalidConfig`
    /// here is the only fatal error class: contradictory thresholds must
    /// never reach a running scheduler.
    pub fn new(config: PoolConfig, upstreams: Vec<UpstreamSpec>) -> Result<Self, ConfigError> {
        validate_config(&config, &upstreams).map_err(ConfigError::Invalid)?;

        let pool = Arc::new(UpstreamPool::new(config.clone()));
        for spec in upstreams {
            pool.register(spec);
        }
        let selector = Selector::new(config.selection_policy, config.fail_open);
        let scheduler = Scheduler::new(pool.clone(), config);

        Ok(Self {
            pool,
            scheduler,
            selector,
        })
    }

    /// Start background probing for all registered upstreams.
    pub fn start(&self) {
        self.scheduler.start();
    }

    /// Stop all probing loops, waiting out in-flight probes briefly.
    pub async fn stop(&self) {
        self.scheduler.stop().await;
    }

    /// Register an upstream at runtime and start probing it immediately.
    pub fn register(&self, spec: UpstreamSpec) -> bool {
        if let Err(e) = validate_address(&spec.address) {
            tracing::warn!(error = %e, "rejecting upstream registration");
            return false;
        }
        if !self.pool.register(spec.clone()) {
            return false;
        }
        self.scheduler.watch(spec);
        true
    }

    /// Deregister an upstream. The pool entry goes first, then the probe
    /// loop is cancelled; a result from an already in-flight probe finds no
    /// entry and is discarded.
    pub fn deregister(&self, address: &str) -> bool {
        let removed = self.pool.deregister(address);
        self.scheduler.unwatch(address);
        removed
    }

    /// Choose one upstream for a request under the configured policy.
    pub fn select(&self) -> Result<UpstreamView, SelectError> {
        self.selector.select(&self.pool.snapshot())
    }

    /// Current pool snapshot, for status and introspection endpoints.
    pub fn status(&self) -> Arc<PoolSnapshot> {
        self.pool.snapshot()
    }

    /// Subscribe to health-change events for logging or metrics export.
    pub fn subscribe_events(&self) -> broadcast::Receiver<HealthChange> {
        self.pool.subscribe()
    }
}

impl UpstreamProvider for Engine {
    fn get_upstreams(&self, _ctx: &RequestContext) -> Result<Vec<String>, SelectError> {
        let snapshot = self.pool.snapshot();
        let primary = self.selector.select(&snapshot)?;

        // Failover candidates: the rest of the selectable tier, best score
        // first.
        let mut rest: Vec<&UpstreamView> = self
            .selector
            .candidate_tier(&snapshot)
            .into_iter()
            .filter(|u| u.address != primary.address)
            .collect();
        rest.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.address.cmp(&b.address))
        });

        let mut addresses = Vec::with_capacity(rest.len() + 1);
        addresses.push(primary.address);
        addresses.extend(rest.into_iter().map(|u| u.address.clone()));
        Ok(addresses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ChainFamily;

    #[test]
    fn test_invalid_config_is_fatal() {
        let config = PoolConfig {
            demote_after_n_failures: 0,
            ..PoolConfig::default()
        };
        let Err(err) = Engine::new(config, vec![]) else {
            panic!("contradictory thresholds must not construct an engine");
        };
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[tokio::test]
    async fn test_runtime_registration_rejects_bad_address() {
        let engine = Engine::new(PoolConfig::default(), vec![]).unwrap();
        assert!(!engine.register(UpstreamSpec::new("not a url", ChainFamily::Evm)));
        assert!(engine.register(UpstreamSpec::new("http://127.0.0.1:1", ChainFamily::Evm)));
        assert_eq!(engine.status().len(), 1);
        engine.stop().await;
    }

    #[test]
    fn test_empty_pool_selects_nothing() {
        let engine = Engine::new(PoolConfig::default(), vec![]).unwrap();
        assert_eq!(engine.select(), Err(SelectError::NoHealthyUpstream));
        assert_eq!(
            engine.get_upstreams(&RequestContext::empty()),
            Err(SelectError::NoHealthyUpstream)
        );
    }
}
