//! Domain port surface for recording admission outcome metrics.
//!
//! This port enables observability of gate decisions without coupling domain
//! logic to a specific metrics backend. Implementations may export to
//! Prometheus or simply discard metrics in tests.

use async_trait::async_trait;

/// Errors exposed when recording idempotency metrics.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdempotencyMetricsError {
    /// Metric exporter rejected the write.
    #[error("idempotency metrics exporter failed: {message}")]
    Export {
        /// Exporter diagnostic.
        message: String,
    },
}

/// Labels attached to every admission metric.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdempotencyMetricLabels {
    /// Logical cache the decision was taken against.
    pub cache_name: String,
}

/// Metrics recording port for admission outcomes.
///
/// One method per outcome keeps adapters free of outcome parsing.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdempotencyMetrics: Send + Sync {
    /// Record an admitted executor.
    async fn record_proceed(
        &self,
        labels: &IdempotencyMetricLabels,
    ) -> Result<(), IdempotencyMetricsError>;

    /// Record an attempt told to retry because work is in flight.
    async fn record_retry(
        &self,
        labels: &IdempotencyMetricLabels,
    ) -> Result<(), IdempotencyMetricsError>;

    /// Record an attempt rejected for a payload mismatch.
    async fn record_reject(
        &self,
        labels: &IdempotencyMetricLabels,
    ) -> Result<(), IdempotencyMetricsError>;

    /// Record an attempt answered with a stored result.
    async fn record_replay(
        &self,
        labels: &IdempotencyMetricLabels,
    ) -> Result<(), IdempotencyMetricsError>;
}

/// No-op implementation for when metrics are disabled or in tests.
///
/// All methods immediately return `Ok(())` without side effects.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpIdempotencyMetrics;

#[async_trait]
impl IdempotencyMetrics for NoOpIdempotencyMetrics {
    async fn record_proceed(
        &self,
        _labels: &IdempotencyMetricLabels,
    ) -> Result<(), IdempotencyMetricsError> {
        Ok(())
    }

    async fn record_retry(
        &self,
        _labels: &IdempotencyMetricLabels,
    ) -> Result<(), IdempotencyMetricsError> {
        Ok(())
    }

    async fn record_reject(
        &self,
        _labels: &IdempotencyMetricLabels,
    ) -> Result<(), IdempotencyMetricsError> {
        Ok(())
    }

    async fn record_replay(
        &self,
        _labels: &IdempotencyMetricLabels,
    ) -> Result<(), IdempotencyMetricsError> {
        Ok(())
    }
}
