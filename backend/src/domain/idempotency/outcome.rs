//! Admission and finalization outcomes reported by the gate.

/// Message returned when a key is reused with a different payload.
pub const PAYLOAD_MISMATCH_MESSAGE: &str = "The payload in the request does not match the original payload with the provided idempotency key.";

/// Message returned while the original request is still executing.
pub const REQUEST_IN_PROGRESS_MESSAGE: &str =
    "The original request with the matching idempotency key is still being processed.";

/// Status code reported for a payload mismatch.
pub const PAYLOAD_MISMATCH_STATUS: u16 = 400;

/// Status code reported while the original request is in flight.
pub const REQUEST_IN_PROGRESS_STATUS: u16 = 202;

/// Status codes at or above this value count as failed executions.
pub const FAILURE_STATUS_THRESHOLD: u16 = 400;

/// Why an attempt must be retried later.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryReason {
    /// Another attempt with the same key and payload is executing.
    InProgress,
}

/// Why an attempt was rejected outright.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// The key was previously claimed with a different payload.
    PayloadMismatch,
}

/// Decision taken by [`IdempotencyGate::admit`](super::IdempotencyGate::admit).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdmissionOutcome {
    /// The caller is the sole executor and must call `finalize` afterwards.
    Proceed,
    /// Work for this key is in flight; back off and retry.
    Retry(RetryReason),
    /// The attempt conflicts with the stored record.
    Reject(RejectReason),
    /// The operation already completed; hand back the stored result.
    Replay {
        /// Status code stored by the original executor.
        status_code: u16,
        /// Body stored by the original executor, byte for byte.
        body: Option<String>,
    },
}

impl AdmissionOutcome {
    /// Status code to surface for this outcome, if any.
    ///
    /// `Proceed` has no status of its own; the protected operation decides.
    ///
    /// # Example
    ///
    /// ```
    /// # use gatekeeper::domain::idempotency::{AdmissionOutcome, RejectReason};
    /// let outcome = AdmissionOutcome::Reject(RejectReason::PayloadMismatch);
    /// assert_eq!(outcome.status_code(), Some(400));
    /// assert_eq!(AdmissionOutcome::Proceed.status_code(), None);
    /// ```
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Proceed => None,
            Self::Retry(RetryReason::InProgress) => Some(REQUEST_IN_PROGRESS_STATUS),
            Self::Reject(RejectReason::PayloadMismatch) => Some(PAYLOAD_MISMATCH_STATUS),
            Self::Replay { status_code, .. } => Some(*status_code),
        }
    }

    /// Client-facing message for rejected or deferred attempts.
    pub fn message(&self) -> Option<&'static str> {
        match self {
            Self::Retry(RetryReason::InProgress) => Some(REQUEST_IN_PROGRESS_MESSAGE),
            Self::Reject(RejectReason::PayloadMismatch) => Some(PAYLOAD_MISMATCH_MESSAGE),
            Self::Proceed | Self::Replay { .. } => None,
        }
    }

    /// Short label used in logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Proceed => "proceed",
            Self::Retry(_) => "retry",
            Self::Reject(_) => "reject",
            Self::Replay { .. } => "replay",
        }
    }
}

/// What [`IdempotencyGate::finalize`](super::IdempotencyGate::finalize) did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinalizeOutcome {
    /// No key was supplied; nothing was recorded.
    Skipped,
    /// The execution failed and the record was deleted.
    Cleared,
    /// The record now holds the completed result.
    Completed,
    /// The record had already expired; the result was not stored.
    Expired,
}

/// Whether a status code marks the protected operation as failed.
pub fn is_failure_status(status_code: u16) -> bool {
    status_code >= FAILURE_STATUS_THRESHOLD
}
