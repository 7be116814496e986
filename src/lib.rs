//! Blockchain-aware upstream health probing and selection.
//!
//! # Architecture Overview
//!
//! ```text
//!   ┌───────────┐     ┌────────┐     ┌───────────┐     ┌──────────────┐
//!   │ scheduler │────▶│ probe  │────▶│  health   │────▶│     pool     │
//!   │ one loop  │     │ chain- │     │ hysteresis│     │ single writer│
//!   │per upstream     │specific│     │  + score  │     │  + snapshots │
//!   └───────────┘     └────────┘     └───────────┘     └──────┬───────┘
//!                                                             │
//!                            request path (host proxy)        ▼
//!                           ─────────────────────────▶ ┌──────────────┐
//!                                                      │   selector   │
//!                                                      │ policy picks │
//!                                                      └──────────────┘
//! ```
//!
//! The scheduler is the only writer into the pool. The request-serving path
//! and status reporters only ever read immutable pool snapshots, so the hot
//! path never contends with background probing.
//!
//! Everything is built through [`Engine`]; there is no process-wide state.

pub mod config;
pub mod engine;
pub mod health;
pub mod lifecycle;
pub mod observability;
pub mod pool;
pub mod probe;
pub mod provider;
pub mod scheduler;
pub mod selector;

pub use config::{ChainFamily, PoolConfig, SelectionPolicy, UpstreamSpec};
pub use engine::Engine;
pub use lifecycle::Shutdown;
pub use observability::HealthChange;
pub use pool::{PoolSnapshot, UpstreamPool, UpstreamView};
pub use provider::{RequestContext, UpstreamProvider};
pub use selector::SelectError;
