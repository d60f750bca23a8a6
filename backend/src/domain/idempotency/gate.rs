//! Admission gate coordinating executors through the shared cache.
//!
//! [`IdempotencyGate::admit`] runs before the protected operation and
//! [`IdempotencyGate::finalize`] after it. The gate keeps no state of its
//! own; every decision is derived from the record stored under the key, so
//! any number of gate instances may share one cache.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, warn};

use super::{
    AdmissionOutcome, FinalizeOutcome, IdempotencyConfig, IdempotencyKey, IdempotencyRecord,
    Payload, PayloadHash, RecordDecodeError, RecordState, RejectReason, RetryReason,
    is_failure_status,
};
use crate::domain::ports::{
    CacheLookup, ConditionalWrite, IdempotencyCache, IdempotencyCacheError,
    IdempotencyMetricLabels, IdempotencyMetrics, NoOpIdempotencyMetrics,
};

/// Faults that stop the gate from reaching a decision.
///
/// None of these are retried internally. During admission they mean the
/// protected operation must not run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdempotencyGateError {
    /// The cache could not be reached.
    #[error("idempotency cache unavailable: {message}")]
    StoreUnavailable {
        /// Adapter diagnostic.
        message: String,
    },
    /// The cache was reached but a command failed.
    #[error("idempotency cache command failed: {message}")]
    Transport {
        /// Adapter diagnostic.
        message: String,
    },
    /// The value stored under the key is not a valid record.
    #[error("idempotency record is corrupt: {message}")]
    CorruptRecord {
        /// Decoder diagnostic.
        message: String,
    },
}

impl From<IdempotencyCacheError> for IdempotencyGateError {
    fn from(value: IdempotencyCacheError) -> Self {
        match value {
            IdempotencyCacheError::Connection { message } => Self::StoreUnavailable { message },
            IdempotencyCacheError::Command { message } => Self::Transport { message },
        }
    }
}

impl From<RecordDecodeError> for IdempotencyGateError {
    fn from(value: RecordDecodeError) -> Self {
        Self::CorruptRecord {
            message: value.to_string(),
        }
    }
}

/// Idempotent admission over an [`IdempotencyCache`].
///
/// The `M` type parameter allows injection of a metrics recorder. When
/// metrics are not needed, use [`NoOpIdempotencyMetrics`] as the default.
pub struct IdempotencyGate<C: ?Sized, M = NoOpIdempotencyMetrics> {
    cache: Arc<C>,
    metrics: Arc<M>,
    config: IdempotencyConfig,
}

impl<C> IdempotencyGate<C, NoOpIdempotencyMetrics>
where
    C: IdempotencyCache + ?Sized,
{
    /// Create a gate that records no metrics.
    pub fn with_noop_metrics(cache: Arc<C>, config: IdempotencyConfig) -> Self {
        Self {
            cache,
            metrics: Arc::new(NoOpIdempotencyMetrics),
            config,
        }
    }
}

impl<C, M> IdempotencyGate<C, M>
where
    C: IdempotencyCache + ?Sized,
    M: IdempotencyMetrics,
{
    /// Create a gate over the given cache and metrics recorder.
    pub fn new(cache: Arc<C>, metrics: Arc<M>, config: IdempotencyConfig) -> Self {
        Self {
            cache,
            metrics,
            config,
        }
    }

    /// Configuration the gate was built with.
    pub fn config(&self) -> &IdempotencyConfig {
        &self.config
    }

    /// Decide whether the caller may execute the protected operation.
    ///
    /// Without a key the caller always proceeds and the cache is not
    /// touched. With a key the gate reads the record, claims the key with an
    /// in-progress record if none exists, and re-reads once if another
    /// attempt claimed it first.
    ///
    /// # Errors
    ///
    /// Returns an [`IdempotencyGateError`] for any cache fault or corrupt
    /// record. The caller must then not execute.
    pub async fn admit(
        &self,
        key: Option<&IdempotencyKey>,
        payload: Payload<'_>,
    ) -> Result<AdmissionOutcome, IdempotencyGateError> {
        let Some(key) = key else {
            debug!("no idempotency key supplied; admitting without deduplication");
            return Ok(AdmissionOutcome::Proceed);
        };

        let payload_hash = payload.fingerprint();
        let cache_name = self.config.cache_name();

        let outcome = match self.cache.get(cache_name, key.as_ref()).await? {
            CacheLookup::Hit(raw) => classify(key, &raw, &payload_hash)?,
            CacheLookup::Miss => self.claim(key, &payload_hash).await?,
        };

        debug!(
            idempotency_key = %key,
            outcome = outcome.label(),
            "idempotency admission decided"
        );
        self.record_outcome(&outcome).await;
        Ok(outcome)
    }

    /// Record the result of an admitted execution.
    ///
    /// Failed executions (status 400 and above) delete the record so a retry
    /// can run again. Successful ones overwrite it with a completed record
    /// that keeps the original payload hash and gets a fresh TTL.
    ///
    /// # Errors
    ///
    /// Returns an [`IdempotencyGateError`] for cache faults or a corrupt
    /// record.
    pub async fn finalize(
        &self,
        key: Option<&IdempotencyKey>,
        status_code: u16,
        body: Option<&str>,
    ) -> Result<FinalizeOutcome, IdempotencyGateError> {
        let Some(key) = key else {
            return Ok(FinalizeOutcome::Skipped);
        };
        let cache_name = self.config.cache_name();

        if is_failure_status(status_code) {
            self.cache.delete(cache_name, key.as_ref()).await?;
            debug!(idempotency_key = %key, status_code, "cleared record for failed execution");
            return Ok(FinalizeOutcome::Cleared);
        }

        let raw = match self.cache.get(cache_name, key.as_ref()).await? {
            CacheLookup::Hit(raw) => raw,
            CacheLookup::Miss => {
                warn!(
                    idempotency_key = %key,
                    status_code,
                    "idempotency record expired before finalization; result not stored"
                );
                return Ok(FinalizeOutcome::Expired);
            }
        };

        let record = decode(key, &raw)?;
        let completed =
            IdempotencyRecord::completed(record.payload_hash, status_code, body.map(str::to_owned));
        self.cache
            .set(cache_name, key.as_ref(), &completed.to_wire(), self.config.ttl())
            .await?;
        debug!(idempotency_key = %key, status_code, "stored completed idempotency record");
        Ok(FinalizeOutcome::Completed)
    }

    /// Try to claim an unseen key, falling back to a single re-read when
    /// another attempt got there first.
    async fn claim(
        &self,
        key: &IdempotencyKey,
        payload_hash: &PayloadHash,
    ) -> Result<AdmissionOutcome, IdempotencyGateError> {
        let cache_name = self.config.cache_name();
        let marker = IdempotencyRecord::in_progress(*payload_hash).to_wire();

        let write = self
            .cache
            .set_if_not_exists(cache_name, key.as_ref(), &marker, self.config.ttl())
            .await?;
        if write == ConditionalWrite::Stored {
            return Ok(AdmissionOutcome::Proceed);
        }

        debug!(idempotency_key = %key, "lost claim race; re-reading record");
        match self.cache.get(cache_name, key.as_ref()).await? {
            CacheLookup::Hit(raw) => classify(key, &raw, payload_hash),
            // The winner already failed and cleared the key; this attempt
            // waits for the next round rather than proceeding twice.
            CacheLookup::Miss => Ok(AdmissionOutcome::Retry(RetryReason::InProgress)),
        }
    }

    /// Report an outcome to the metrics port.
    ///
    /// Errors are ignored so metrics never affect admission.
    async fn record_outcome(&self, outcome: &AdmissionOutcome) {
        let labels = IdempotencyMetricLabels {
            cache_name: self.config.cache_name().to_owned(),
        };
        let result = match outcome {
            AdmissionOutcome::Proceed => self.metrics.record_proceed(&labels).await,
            AdmissionOutcome::Retry(_) => self.metrics.record_retry(&labels).await,
            AdmissionOutcome::Reject(_) => self.metrics.record_reject(&labels).await,
            AdmissionOutcome::Replay { .. } => self.metrics.record_replay(&labels).await,
        };
        if let Err(err) = result {
            debug!(error = %err, "failed to record idempotency metric");
        }
    }
}

fn decode(key: &IdempotencyKey, raw: &str) -> Result<IdempotencyRecord, IdempotencyGateError> {
    IdempotencyRecord::from_wire(raw).map_err(|err| {
        warn!(idempotency_key = %key, error = %err, "corrupt idempotency record");
        IdempotencyGateError::from(err)
    })
}

/// Map a stored record to an admission decision for the given payload.
fn classify(
    key: &IdempotencyKey,
    raw: &str,
    payload_hash: &PayloadHash,
) -> Result<AdmissionOutcome, IdempotencyGateError> {
    let record = decode(key, raw)?;
    if record.payload_hash != *payload_hash {
        return Ok(AdmissionOutcome::Reject(RejectReason::PayloadMismatch));
    }
    Ok(match record.state {
        RecordState::InProgress => AdmissionOutcome::Retry(RetryReason::InProgress),
        RecordState::Completed { status_code, body } => {
            AdmissionOutcome::Replay { status_code, body }
        }
    })
}

#[cfg(test)]
#[path = "gate_tests.rs"]
mod tests;
