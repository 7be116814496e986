//! The authoritative upstream registry.
//!
//! All mutation funnels through one brief mutex; after every change the pool
//! publishes a fresh immutable snapshot, so readers on the request path do a
//! lock-free `Arc` load and never contend with background probing.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use arc_swap::ArcSwap;
use chrono::Utc;
use tokio::sync::broadcast;

use crate::config::{PoolConfig, UpstreamSpec};
use crate::health::evaluate;
use crate::observability::{metrics, HealthChange};
use crate::pool::snapshot::{PoolSnapshot, UpstreamView};
use crate::pool::upstream::Upstream;
use crate::probe::ProbeResult;

/// Capacity of the health-change broadcast channel. Slow subscribers drop
/// the oldest events.
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Concurrency-safe registry of upstreams and their classifications.
///
/// Single logical writer (the scheduler pipeline); any number of snapshot
/// readers.
#[derive(Debug)]
pub struct UpstreamPool {
    config: PoolConfig,
    inner: Mutex<HashMap<String, Upstream>>,
    published: ArcSwap<PoolSnapshot>,
    events: broadcast::Sender<HealthChange>,
}

impl UpstreamPool {
    pub fn new(config: PoolConfig) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            config,
            inner: Mutex::new(HashMap::new()),
            published: ArcSwap::from_pointee(PoolSnapshot::empty()),
            events,
        }
    }

    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Add an upstream in state `Unknown`. Returns false if the address is
    /// already registered.
    pub fn register(&self, spec: UpstreamSpec) -> bool {
        let mut inner = self.lock();
        if inner.contains_key(&spec.address) {
            tracing::warn!(address = %spec.address, "upstream already registered");
            return false;
        }
        tracing::info!(address = %spec.address, chain_family = %spec.chain_family, "upstream registered");
        inner.insert(spec.address.clone(), Upstream::new(spec));
        self.republish(&inner);
        true
    }

    /// Remove an upstream. Any in-flight probe result for it arriving later
    /// finds no entry and is discarded, so it can never reappear in a
    /// snapshot.
    pub fn deregister(&self, address: &str) -> bool {
        let mut inner = self.lock();
        let removed = inner.remove(address).is_some();
        if removed {
            tracing::info!(address = %address, "upstream deregistered");
            self.republish(&inner);
        }
        removed
    }

    /// Apply one probe result. Returns false when the result was discarded:
    /// unknown address (deregistered mid-probe) or stale sequence number.
    pub fn apply_update(&self, address: &str, result: ProbeResult) -> bool {
        let (change, passed, state, score) = {
            let mut inner = self.lock();
            let Some(family) = inner.get(address).map(|u| u.spec.chain_family) else {
                tracing::debug!(address = %address, seq = result.seq, "discarding probe result for unknown upstream");
                return false;
            };

            // Include the incoming height so the pool leader lags itself by
            // zero rather than being measured against its own stale sample.
            let best_height = inner
                .values()
                .filter(|u| u.spec.chain_family == family)
                .filter_map(|u| u.last_height)
                .chain(result.height)
                .max();

            let Some(upstream) = inner.get_mut(address) else {
                return false;
            };
            let record = upstream.health_record();
            let Some(eval) = evaluate(&record, &result, &self.config, best_height) else {
                tracing::debug!(address = %address, seq = result.seq, "discarding stale probe result");
                return false;
            };

            let old_state = record.state;
            upstream.record(&eval, &result);
            self.republish(&inner);

            let change = (old_state != eval.state).then(|| HealthChange {
                address: address.to_string(),
                old_state,
                new_state: eval.state,
                timestamp: result.timestamp,
            });
            (change, eval.passed, eval.state, eval.score)
        };

        metrics::record_probe(address, passed);
        metrics::record_upstream_health(address, state, score);

        if let Some(change) = change {
            tracing::info!(
                address = %change.address,
                old_state = %change.old_state,
                new_state = %change.new_state,
                score = score,
                "upstream health changed"
            );
            let _ = self.events.send(change);
        }
        true
    }

    /// Lock-free read of the current published snapshot.
    pub fn snapshot(&self) -> Arc<PoolSnapshot> {
        self.published.load_full()
    }

    pub fn contains(&self, address: &str) -> bool {
        self.lock().contains_key(address)
    }

    /// Specs of all registered upstreams, in stable address order.
    pub fn specs(&self) -> Vec<UpstreamSpec> {
        let inner = self.lock();
        let mut specs: Vec<UpstreamSpec> = inner.values().map(|u| u.spec.clone()).collect();
        specs.sort_by(|a, b| a.address.cmp(&b.address));
        specs
    }

    /// Subscribe to health-change events.
    pub fn subscribe(&self) -> broadcast::Receiver<HealthChange> {
        self.events.subscribe()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Upstream>> {
        // Held only for short critical sections; poisoning would mean a
        // panic mid-update, in which case continuing with the data is still
        // sound.
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn republish(&self, inner: &HashMap<String, Upstream>) {
        let mut upstreams: Vec<UpstreamView> = inner
            .values()
            .map(|u| UpstreamView {
                address: u.spec.address.clone(),
                chain_family: u.spec.chain_family,
                state: u.state,
                score: u.score,
                height: u.last_height,
                latency: u.last_latency,
                last_probe_at: u.last_probe_at,
            })
            .collect();
        upstreams.sort_by(|a, b| a.address.cmp(&b.address));
        self.published.store(Arc::new(PoolSnapshot {
            taken_at: Utc::now(),
            upstreams,
        }));
    }
}
