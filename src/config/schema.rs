//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the health
//! engine. All types derive Serde traits for deserialization from config
//! files; the engine itself never mutates configuration after construction.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Which probe query shape an upstream speaks.
///
/// This is a closed set: each variant maps to a fixed set of RPC methods for
/// block height, sync status and peer count (see the `probe` module).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChainFamily {
    /// Ethereum-style JSON-RPC (`eth_blockNumber`, `eth_syncing`, `net_peerCount`).
    Evm,
    /// Tendermint/CometBFT RPC (`status`, `net_info`).
    Cosmos,
    /// Solana JSON-RPC (`getSlot`, `getHealth`). Peer count is unsupported.
    Solana,
}

impl fmt::Display for ChainFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChainFamily::Evm => write!(f, "evm"),
            ChainFamily::Cosmos => write!(f, "cosmos"),
            ChainFamily::Solana => write!(f, "solana"),
        }
    }
}

/// One candidate upstream node.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct UpstreamSpec {
    /// RPC endpoint URL (e.g., "http://10.0.0.5:8545").
    pub address: String,

    /// Query shape this node speaks.
    pub chain_family: ChainFamily,
}

impl UpstreamSpec {
    pub fn new(address: impl Into<String>, chain_family: ChainFamily) -> Self {
        Self {
            address: address.into(),
            chain_family,
        }
    }
}

/// Selection policy applied to the healthy candidate tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SelectionPolicy {
    /// Greatest observed block height; ties broken by lowest latency, then
    /// by a stable hash of the address.
    #[default]
    HighestBlock,

    /// Lowest observed latency (deterministic).
    LatencyWeighted,

    /// Weighted random pick with weight inversely proportional to latency.
    /// The only policy with intentional randomness.
    LatencyWeightedProbabilistic,

    /// Rotate through healthy upstreams in stable address order.
    RoundRobinHealthy,
}

/// Per-pool health and selection configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Base interval between probes of one upstream, in milliseconds.
    pub probe_interval_ms: u64,

    /// Upper bound on one whole probe exchange, in milliseconds.
    pub probe_timeout_ms: u64,

    /// Consecutive passing samples required to promote one tier.
    pub promote_after_n_successes: u32,

    /// Consecutive failing samples required to demote one tier.
    pub demote_after_n_failures: u32,

    /// Maximum blocks an upstream may lag the best known height of its
    /// chain family before a sample counts as failing.
    pub max_block_lag: u64,

    /// Maximum acceptable probe round-trip latency, in milliseconds.
    pub max_latency_ms: u64,

    /// Minimum acceptable peer count. Zero disables the check. Upstreams
    /// whose chain family cannot report peers are never penalized.
    pub min_peer_count: u64,

    /// Policy used to pick among selectable upstreams.
    pub selection_policy: SelectionPolicy,

    /// Serve from `Unhealthy`/`Unknown` upstreams when nothing better
    /// exists, instead of failing the request.
    ///
    /// This trades correctness for availability: a fail-open pick may be
    /// stale or still syncing. Off by default; enable deliberately.
    pub fail_open: bool,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            probe_interval_ms: 10_000,
            probe_timeout_ms: 5_000,
            promote_after_n_successes: 2,
            demote_after_n_failures: 3,
            max_block_lag: 5,
            max_latency_ms: 2_000,
            min_peer_count: 1,
            selection_policy: SelectionPolicy::default(),
            fail_open: false,
        }
    }
}

impl PoolConfig {
    pub fn probe_interval(&self) -> Duration {
        Duration::from_millis(self.probe_interval_ms)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    pub fn max_latency(&self) -> Duration {
        Duration::from_millis(self.max_latency_ms)
    }
}

/// Root of the on-disk configuration file.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Health and selection settings.
    pub pool: PoolConfig,

    /// Upstreams registered at startup.
    pub upstreams: Vec<UpstreamSpec>,
}
