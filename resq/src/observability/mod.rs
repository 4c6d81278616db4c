//! Observability module
//!
//! Provides Prometheus metrics. Logging goes through `tracing`; installing a
//! subscriber is left to the application.

pub mod metrics;

pub use metrics::{ResqMetrics, Timer};
