//! Probing subsystem.
//!
//! # Data Flow
//! ```text
//! Scheduler loop
//!     → prober.rs (timeout-bounded JSON-RPC exchange)
//!     → evm.rs / cosmos.rs / solana.rs (chain-family query shapes)
//!     → result.rs (ProbeResult, success or classified failure)
//! ```
//!
//! # Design Decisions
//! - Chain families are a closed enum, not open-ended dynamic dispatch
//! - A probe never raises; failures are data inside the result
//! - One shared HTTP client, no mutable state across concurrent probes

mod cosmos;
mod evm;
mod prober;
mod result;
mod solana;

pub use prober::Prober;
pub use result::{ProbeError, ProbeResult};
