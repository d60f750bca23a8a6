//! Idempotent request admission.
//!
//! A client attaches an idempotency key to a mutating request. The
//! [`IdempotencyGate`] consults a shared TTL cache before the protected
//! operation runs and decides, in at most three cache round trips, whether
//! the caller executes, retries later, is rejected, or receives a stored
//! result:
//!
//! - [`IdempotencyKey`]: validated client-supplied key.
//! - [`PayloadHash`]: SHA-256 fingerprint of the canonicalized payload, used
//!   to detect key reuse with a different payload.
//! - [`IdempotencyRecord`]: value stored under a key, in progress or
//!   completed, with its JSON wire format.
//! - [`AdmissionOutcome`] / [`FinalizeOutcome`]: decisions reported by the
//!   gate.
//! - [`IdempotencyConfig`]: record TTL and logical cache name.
//!
//! # Payload Canonicalization
//!
//! JSON payloads are canonicalized before hashing so that key order and
//! whitespace do not change the fingerprint:
//!
//! 1. JSON objects have their keys sorted recursively.
//! 2. The result is serialized to compact JSON (no whitespace).
//! 3. The SHA-256 hash is computed on the resulting bytes.
//!
//! # Failure semantics
//!
//! The gate fails closed. Any cache fault during admission is returned as an
//! [`IdempotencyGateError`] and the protected operation must not run.

mod config;
mod gate;
mod key;
mod outcome;
mod payload;
mod record;

pub use config::{
    DefaultIdempotencyEnv, IDEMPOTENCY_CACHE_NAME_ENV, IDEMPOTENCY_CACHE_TTL_SECONDS_ENV,
    IdempotencyConfig, IdempotencyEnv,
};
pub use gate::{IdempotencyGate, IdempotencyGateError};
pub use key::{IdempotencyKey, IdempotencyKeyValidationError};
pub use outcome::{
    AdmissionOutcome, FAILURE_STATUS_THRESHOLD, FinalizeOutcome, PAYLOAD_MISMATCH_MESSAGE,
    PAYLOAD_MISMATCH_STATUS, REQUEST_IN_PROGRESS_MESSAGE, REQUEST_IN_PROGRESS_STATUS,
    RejectReason, RetryReason, is_failure_status,
};
pub use payload::{Payload, PayloadHash, PayloadHashError, canonicalize_and_hash};
pub use record::{IdempotencyRecord, RecordDecodeError, RecordState};

#[cfg(test)]
mod tests;
