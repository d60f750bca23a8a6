//! Verify and finalize steps of the order workflow.
//!
//! The orchestrator calls [`OrderAdmission::verify`] before processing an
//! order and [`OrderAdmission::finalize`] afterwards. Unlike goat
//! registration, a gate fault during verification is reported to the
//! orchestrator as a failed step rather than an error, so the workflow can
//! branch on it.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, error};

use super::idempotency::{AdmissionOutcome, FinalizeOutcome, Payload};
use super::ports::{
    FinalizeOrderState, IdempotencyCache, IdempotencyMetrics, NoOpIdempotencyMetrics,
    OrderAdmission, VerifyOrderResult, VerifyOrderState,
};
use super::{Error, GENERIC_FAILURE_MESSAGE, IdempotencyGate, map_gate_error};

/// Status reported when verification cannot reach a decision.
const VERIFY_FAILURE_STATUS: u16 = 500;

/// Concrete implementation of [`OrderAdmission`].
pub struct OrderAdmissionService<C: ?Sized, M = NoOpIdempotencyMetrics> {
    gate: Arc<IdempotencyGate<C, M>>,
}

impl<C, M> OrderAdmissionService<C, M>
where
    C: IdempotencyCache + ?Sized,
    M: IdempotencyMetrics,
{
    /// Create a new order admission service over a shared gate.
    pub fn new(gate: Arc<IdempotencyGate<C, M>>) -> Self {
        Self { gate }
    }
}

#[async_trait]
impl<C, M> OrderAdmission for OrderAdmissionService<C, M>
where
    C: IdempotencyCache + ?Sized,
    M: IdempotencyMetrics,
{
    async fn verify(&self, state: VerifyOrderState) -> Result<VerifyOrderResult, Error> {
        let outcome = match self
            .gate
            .admit(state.idempotency_key.as_ref(), Payload::Json(&state.items))
            .await
        {
            Ok(outcome) => outcome,
            Err(err) => {
                error!(error = %err, "order verification failed");
                return Ok(VerifyOrderResult::Failed {
                    status_code: VERIFY_FAILURE_STATUS,
                    message: GENERIC_FAILURE_MESSAGE.to_owned(),
                });
            }
        };

        debug!(outcome = outcome.label(), "order verification decided");
        Ok(match outcome {
            AdmissionOutcome::Proceed => VerifyOrderResult::NewOrder,
            AdmissionOutcome::Replay { status_code, body } => {
                VerifyOrderResult::Replayed { status_code, body }
            }
            AdmissionOutcome::Retry(_) | AdmissionOutcome::Reject(_) => {
                VerifyOrderResult::Rejected {
                    status_code: outcome.status_code().unwrap_or(VERIFY_FAILURE_STATUS),
                    message: outcome
                        .message()
                        .unwrap_or(GENERIC_FAILURE_MESSAGE)
                        .to_owned(),
                }
            }
        })
    }

    async fn finalize(&self, state: FinalizeOrderState) -> Result<FinalizeOutcome, Error> {
        self.gate
            .finalize(
                state.idempotency_key.as_ref(),
                state.status_code,
                state.result.as_deref(),
            )
            .await
            .map_err(|err| map_gate_error(&err))
    }
}
