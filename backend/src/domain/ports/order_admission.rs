//! Driving port for the order workflow's idempotency steps.
//!
//! An external orchestrator runs "verify → process order → finalize" and
//! calls this port for the first and last step. The order processing in
//! between is not part of this crate.

use async_trait::async_trait;

use crate::domain::{Error, FinalizeOutcome, IdempotencyKey};

/// State handed to the verify step.
#[derive(Debug, Clone)]
pub struct VerifyOrderState {
    /// Optional idempotency key; `None` disables deduplication.
    pub idempotency_key: Option<IdempotencyKey>,
    /// Order items, fingerprinted to detect key reuse.
    pub items: serde_json::Value,
}

/// Decision returned by the verify step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifyOrderResult {
    /// The orchestrator should process the order and then finalize.
    NewOrder,
    /// The order must not be processed now.
    Rejected {
        /// Status code describing the rejection (400 or 202).
        status_code: u16,
        /// Client-facing explanation.
        message: String,
    },
    /// The order was already processed; return the stored result.
    Replayed {
        /// Stored status code.
        status_code: u16,
        /// Stored body.
        body: Option<String>,
    },
    /// The admission check itself failed; the order must not be processed.
    Failed {
        /// Always 500.
        status_code: u16,
        /// Generic client-facing message.
        message: String,
    },
}

/// State handed to the finalize step.
#[derive(Debug, Clone)]
pub struct FinalizeOrderState {
    /// Idempotency key used during verification.
    pub idempotency_key: Option<IdempotencyKey>,
    /// Status code produced by order processing.
    pub status_code: u16,
    /// Body produced by order processing.
    pub result: Option<String>,
}

/// Use-case port for the order workflow's idempotency steps.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrderAdmission: Send + Sync {
    /// Decide whether the order may be processed.
    async fn verify(&self, state: VerifyOrderState) -> Result<VerifyOrderResult, Error>;

    /// Record the outcome of order processing.
    async fn finalize(&self, state: FinalizeOrderState) -> Result<FinalizeOutcome, Error>;
}
