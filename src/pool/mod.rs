//! Upstream pool subsystem.
//!
//! # Data Flow
//! ```text
//! Scheduler pipeline (single writer)
//!     → registry.rs (apply_update under one brief mutex)
//!     → upstream.rs (per-upstream record mutation)
//!     → snapshot.rs (fresh immutable PoolSnapshot republished)
//!     → selector / status reporters (lock-free Arc loads)
//! ```

mod registry;
mod snapshot;
pub(crate) mod upstream;

pub use registry::UpstreamPool;
pub use snapshot::{PoolSnapshot, UpstreamView};
