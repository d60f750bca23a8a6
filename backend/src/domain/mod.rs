//! Domain primitives, use-cases and ports.
//!
//! Purpose: keep idempotent admission and the protected use-cases free of
//! transport and storage concerns. Adapters live in `inbound` and `outbound`
//! and talk to the domain through the traits in [`ports`].
//!
//! Public surface:
//! - Error / ErrorCode: transport-agnostic failure payload.
//! - idempotency: keys, fingerprints, cache records and the admission gate.
//! - Goat / GoatDraft / GoatId: goat registration aggregate.
//! - GoatRegistrationService, OrderAdmissionService: gated use-cases.

pub mod error;
pub mod goat;
mod goat_registration;
pub mod idempotency;
mod order_admission;
pub mod ports;

pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::goat::{Goat, GoatDraft, GoatId, GoatValidationError};
pub use self::goat_registration::GoatRegistrationService;
pub use self::idempotency::{
    AdmissionOutcome, FinalizeOutcome, IdempotencyConfig, IdempotencyGate, IdempotencyGateError,
    IdempotencyKey, IdempotencyKeyValidationError, Payload, PayloadHash, canonicalize_and_hash,
};
pub use self::order_admission::OrderAdmissionService;

/// Generic message returned when a protected operation fails unexpectedly.
pub const GENERIC_FAILURE_MESSAGE: &str = "Something went wrong.";

/// Map a gate fault to a domain error.
///
/// The diagnostic stays in the logs; callers only learn that the request
/// could not be admitted or recorded.
pub(crate) fn map_gate_error(err: &IdempotencyGateError) -> Error {
    tracing::error!(error = %err, "idempotency gate fault");
    Error::internal(GENERIC_FAILURE_MESSAGE)
}
