//! Observability setup for the relayer.

pub mod telemetry;

pub use telemetry::{init_telemetry, TelemetryConfig, LOG_FILTER_ENV};
