//! Health classification subsystem.
//!
//! # Data Flow
//! ```text
//! Probe result (probe/)
//!     → evaluator.rs (stale guard, pass/fail classification)
//!     → state.rs (hysteresis transitions, one tier per run)
//!     → verdict applied by the pool
//! ```
//!
//! # Design Decisions
//! - Evaluation is a pure function of (history, sample, config)
//! - State transitions require consecutive runs; score updates every sample
//! - Probe failures are ordinary failing samples, not exceptions

pub mod evaluator;
pub mod state;

pub use evaluator::{evaluate, Evaluation, HealthRecord};
pub use state::HealthState;
