//! Lifecycle management.
//!
//! Startup order is explicit and owned by [`crate::engine::Engine`]: validate
//! config, build the pool, register upstreams, then start probe loops.
//! Shutdown is coordinated here.

pub mod shutdown;

pub use shutdown::Shutdown;
