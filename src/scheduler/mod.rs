//! Probe scheduling.
//!
//! # Data Flow
//! ```text
//! Scheduler::start
//!     → one tokio task per upstream (immediate first probe)
//!     → loop: probe with timeout → apply_update to the pool
//!              → sleep interval + jitter, ×2 backoff while failing
//!     → exits on per-upstream cancel, engine shutdown, or deregistration
//! ```
//!
//! # Design Decisions
//! - Loops are independent; no cross-upstream ordering
//! - Sequence numbers are assigned here, monotonic per upstream
//! - stop() waits a grace period, then aborts stragglers

pub mod backoff;

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;

use crate::config::{PoolConfig, UpstreamSpec};
use crate::lifecycle::Shutdown;
use crate::pool::UpstreamPool;
use crate::probe::Prober;
use crate::scheduler::backoff::probe_delay;

/// How long stop() waits for in-flight probes before abandoning them.
const STOP_GRACE: Duration = Duration::from_secs(2);

struct ProbeTask {
    cancel: watch::Sender<()>,
    handle: JoinHandle<()>,
}

/// Owns the background probing lifecycle: one loop per registered upstream.
pub struct Scheduler {
    pool: Arc<UpstreamPool>,
    prober: Prober,
    config: PoolConfig,
    tasks: DashMap<String, ProbeTask>,
    shutdown: Shutdown,
}

impl Scheduler {
    pub fn new(pool: Arc<UpstreamPool>, config: PoolConfig) -> Self {
        Self {
            pool,
            prober: Prober::new(),
            config,
            tasks: DashMap::new(),
            shutdown: Shutdown::new(),
        }
    }

    /// Spawn a probing loop for every upstream currently registered.
    pub fn start(&self) {
        let specs = self.pool.specs();
        tracing::info!(
            upstreams = specs.len(),
            interval_ms = self.config.probe_interval_ms,
            "scheduler starting"
        );
        for spec in specs {
            self.watch(spec);
        }
    }

    /// Start probing one upstream. New upstreams probe immediately so
    /// classification converges quickly after a fleet change.
    pub fn watch(&self, spec: UpstreamSpec) {
        if self.tasks.contains_key(&spec.address) {
            return;
        }
        let (cancel, cancel_rx) = watch::channel(());
        let handle = tokio::spawn(run_probe_loop(
            self.pool.clone(),
            self.prober.clone(),
            self.config.clone(),
            spec.clone(),
            cancel_rx,
            self.shutdown.subscribe(),
        ));
        self.tasks.insert(spec.address, ProbeTask { cancel, handle });
    }

    /// Cancel one upstream's probing loop promptly.
    pub fn unwatch(&self, address: &str) {
        if let Some((_, task)) = self.tasks.remove(address) {
            let _ = task.cancel.send(());
        }
    }

    /// Cancel all loops, wait for in-flight probes within the grace period,
    /// abort whatever is left.
    pub async fn stop(&self) {
        self.shutdown.trigger();
        let drained = self.shutdown.drained(STOP_GRACE).await;
        if !drained {
            tracing::warn!("probe loops still running after grace period, aborting");
        }

        let addresses: Vec<String> = self.tasks.iter().map(|e| e.key().clone()).collect();
        for address in addresses {
            if let Some((_, task)) = self.tasks.remove(&address) {
                task.handle.abort();
            }
        }
        tracing::info!("scheduler stopped");
    }

    /// Number of live probing loops.
    pub fn watched(&self) -> usize {
        self.tasks.len()
    }
}

async fn run_probe_loop(
    pool: Arc<UpstreamPool>,
    prober: Prober,
    config: PoolConfig,
    spec: UpstreamSpec,
    mut cancel: watch::Receiver<()>,
    mut shutdown: broadcast::Receiver<()>,
) {
    let interval = config.probe_interval();
    let timeout = config.probe_timeout();
    let mut seq: u64 = 0;
    let mut failed_run: u32 = 0;

    tracing::debug!(address = %spec.address, "probe loop starting");

    loop {
        seq += 1;
        // A cancelled in-flight probe is simply abandoned; if its result
        // were ever to land anyway, the pool's sequence guard drops it.
        let result = tokio::select! {
            result = prober.probe(&spec, seq, timeout) => result,
            _ = cancel.changed() => break,
            _ = shutdown.recv() => break,
        };

        let passed = result.is_ok();
        if !pool.apply_update(&spec.address, result) && !pool.contains(&spec.address) {
            // Deregistered while we were probing.
            break;
        }

        failed_run = if passed { 0 } else { failed_run.saturating_add(1) };

        let delay = probe_delay(interval, failed_run);
        tokio::select! {
            _ = tokio::time::sleep(delay) => {}
            _ = cancel.changed() => break,
            _ = shutdown.recv() => break,
        }
    }

    tracing::debug!(address = %spec.address, "probe loop exited");
}
