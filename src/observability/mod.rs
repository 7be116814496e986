//! Observability hooks: health-change events and metric recording.
//!
//! The core logs with `tracing` throughout and never installs a global
//! subscriber; hosts wire their own subscriber and metrics exporter.

pub mod events;
pub mod metrics;

pub use events::HealthChange;
