//! Observability setup for Sherpa: structured logging with optional
//! OpenTelemetry span export.

pub mod tracing_setup;
