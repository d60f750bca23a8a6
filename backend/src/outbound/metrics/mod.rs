//! Prometheus-backed metrics adapters.

mod prometheus_idempotency;

pub use prometheus_idempotency::PrometheusIdempotencyMetrics;
