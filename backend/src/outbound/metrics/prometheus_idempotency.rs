//! Prometheus adapter for admission outcome metrics.
//!
//! Metrics are registered with a provided registry and exposed via the
//! `/metrics` endpoint.

use async_trait::async_trait;
use prometheus::{IntCounterVec, Opts, Registry};

use crate::domain::ports::{IdempotencyMetricLabels, IdempotencyMetrics, IdempotencyMetricsError};

/// Metric name for admission decisions.
pub const ADMISSIONS_TOTAL: &str = "gatekeeper_idempotency_admissions_total";

/// Prometheus-backed admission metrics recorder.
///
/// # Metric
///
/// - **Name**: `gatekeeper_idempotency_admissions_total`
/// - **Type**: Counter
/// - **Labels**:
///   - `outcome`: `proceed`, `retry`, `reject`, or `replay`
///   - `cache_name`: logical cache the decision was taken against
pub struct PrometheusIdempotencyMetrics {
    admissions_total: IntCounterVec,
}

impl PrometheusIdempotencyMetrics {
    /// Create and register metrics with the given registry.
    ///
    /// # Errors
    ///
    /// Returns an error if the metric cannot be registered, for example when
    /// a metric with the same name already exists in the registry.
    pub fn new(registry: &Registry) -> Result<Self, prometheus::Error> {
        let admissions_total = IntCounterVec::new(
            Opts::new(ADMISSIONS_TOTAL, "Idempotent admission decisions by outcome"),
            &["outcome", "cache_name"],
        )?;
        registry.register(Box::new(admissions_total.clone()))?;
        Ok(Self { admissions_total })
    }

    fn record(&self, outcome: &str, labels: &IdempotencyMetricLabels) {
        self.admissions_total
            .with_label_values(&[outcome, labels.cache_name.as_str()])
            .inc();
    }
}

#[async_trait]
impl IdempotencyMetrics for PrometheusIdempotencyMetrics {
    async fn record_proceed(
        &self,
        labels: &IdempotencyMetricLabels,
    ) -> Result<(), IdempotencyMetricsError> {
        self.record("proceed", labels);
        Ok(())
    }

    async fn record_retry(
        &self,
        labels: &IdempotencyMetricLabels,
    ) -> Result<(), IdempotencyMetricsError> {
        self.record("retry", labels);
        Ok(())
    }

    async fn record_reject(
        &self,
        labels: &IdempotencyMetricLabels,
    ) -> Result<(), IdempotencyMetricsError> {
        self.record("reject", labels);
        Ok(())
    }

    async fn record_replay(
        &self,
        labels: &IdempotencyMetricLabels,
    ) -> Result<(), IdempotencyMetricsError> {
        self.record("replay", labels);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn labels() -> IdempotencyMetricLabels {
        IdempotencyMetricLabels {
            cache_name: "idempotency-cache".to_owned(),
        }
    }

    #[rstest]
    fn registers_counter_with_registry() {
        let registry = Registry::new();
        let metrics =
            PrometheusIdempotencyMetrics::new(&registry).expect("metric registration succeeds");
        metrics.record("proceed", &labels());

        assert!(
            registry
                .gather()
                .iter()
                .any(|family| family.name() == ADMISSIONS_TOTAL)
        );
    }

    #[rstest]
    fn duplicate_registration_fails() {
        let registry = Registry::new();
        let _first =
            PrometheusIdempotencyMetrics::new(&registry).expect("metric registration succeeds");
        assert!(PrometheusIdempotencyMetrics::new(&registry).is_err());
    }

    #[rstest]
    #[tokio::test]
    async fn each_outcome_increments_its_own_series() {
        let registry = Registry::new();
        let metrics =
            PrometheusIdempotencyMetrics::new(&registry).expect("metric registration succeeds");

        metrics.record_retry(&labels()).await.expect("recorded");
        metrics.record_retry(&labels()).await.expect("recorded");
        metrics.record_replay(&labels()).await.expect("recorded");

        let series = |outcome: &str| {
            metrics
                .admissions_total
                .with_label_values(&[outcome, "idempotency-cache"])
                .get()
        };
        assert_eq!(series("retry"), 2);
        assert_eq!(series("replay"), 1);
        assert_eq!(series("proceed"), 0);
    }
}
