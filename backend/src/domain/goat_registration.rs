//! Goat registration protected by the admission gate.
//!
//! The service is the executor side of the protocol: it asks the gate for a
//! decision, persists the goat only when admitted, and always finalizes an
//! admitted key so that retries either replay the stored result or run
//! again after a failure.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::{error, info, warn};

use super::idempotency::{AdmissionOutcome, Payload};
use super::ports::{
    GoatRegistration, GoatRepository, IdempotencyCache, IdempotencyMetrics, NoOpIdempotencyMetrics,
    ProtectedResponse, RegisterGoatRequest,
};
use super::{
    Error, GENERIC_FAILURE_MESSAGE, Goat, GoatValidationError, IdempotencyGate, IdempotencyKey,
    map_gate_error,
};

/// Status returned when a goat is created.
const CREATED_STATUS: u16 = 201;

/// Status returned when persistence fails.
const FAILURE_STATUS: u16 = 500;

/// Concrete implementation of [`GoatRegistration`].
pub struct GoatRegistrationService<C: ?Sized, R, M = NoOpIdempotencyMetrics> {
    gate: Arc<IdempotencyGate<C, M>>,
    repository: Arc<R>,
    clock: Arc<dyn Clock>,
}

impl<C, R, M> GoatRegistrationService<C, R, M>
where
    C: IdempotencyCache + ?Sized,
    R: GoatRepository,
    M: IdempotencyMetrics,
{
    /// Create a new registration service.
    pub fn new(gate: Arc<IdempotencyGate<C, M>>, repository: Arc<R>, clock: Arc<dyn Clock>) -> Self {
        Self {
            gate,
            repository,
            clock,
        }
    }

    /// Record the executor's result, logging rather than failing on faults.
    ///
    /// The response has already been produced; a finalize fault only costs
    /// deduplication for this key until its TTL lapses.
    async fn finalize_quietly(&self, key: Option<&IdempotencyKey>, response: &ProtectedResponse) {
        if let Err(err) = self
            .gate
            .finalize(key, response.status_code, response.body.as_deref())
            .await
        {
            warn!(
                error = %err,
                status_code = response.status_code,
                "failed to finalize idempotency record"
            );
        }
    }
}

fn map_validation_error(err: GoatValidationError) -> Error {
    let field = match err {
        GoatValidationError::EmptyName | GoatValidationError::NameTooLong { .. } => "name",
    };
    Error::invalid_request(err.to_string()).with_details(json!({ "field": field }))
}

fn message_body(message: &str) -> String {
    json!({ "message": message }).to_string()
}

#[async_trait]
impl<C, R, M> GoatRegistration for GoatRegistrationService<C, R, M>
where
    C: IdempotencyCache + ?Sized,
    R: GoatRepository,
    M: IdempotencyMetrics,
{
    async fn register(&self, request: RegisterGoatRequest) -> Result<ProtectedResponse, Error> {
        let RegisterGoatRequest {
            idempotency_key,
            draft,
            payload,
        } = request;
        draft.validate().map_err(map_validation_error)?;

        let key = idempotency_key.as_ref();

        let outcome = self
            .gate
            .admit(key, Payload::Json(&payload))
            .await
            .map_err(|err| map_gate_error(&err))?;

        match outcome {
            AdmissionOutcome::Proceed => {}
            AdmissionOutcome::Replay { status_code, body } => {
                return Ok(ProtectedResponse::replayed(status_code, body));
            }
            AdmissionOutcome::Retry(_) | AdmissionOutcome::Reject(_) => {
                let status_code = outcome.status_code().unwrap_or(FAILURE_STATUS);
                let message = outcome.message().unwrap_or(GENERIC_FAILURE_MESSAGE);
                return Ok(ProtectedResponse::fresh(status_code, message_body(message)));
            }
        }

        let goat = Goat::from_draft(draft, self.clock.utc());
        let response = match self.repository.persist(&goat).await {
            Ok(()) => {
                info!(goat_id = %goat.id, "goat registered");
                ProtectedResponse::fresh(CREATED_STATUS, json!({ "id": goat.id }).to_string())
            }
            Err(err) => {
                error!(error = %err, "failed to persist goat");
                ProtectedResponse::fresh(FAILURE_STATUS, message_body(GENERIC_FAILURE_MESSAGE))
            }
        };

        self.finalize_quietly(key, &response).await;
        Ok(response)
    }
}

#[cfg(test)]
#[path = "goat_registration_tests.rs"]
mod tests;
