//! Order workflow step handlers.
//!
//! An orchestrator drives "verify, process, finalize" and calls these two
//! steps around its own order processing:
//!
//! ```text
//! POST /api/v1/workflow/orders/verify
//! POST /api/v1/workflow/orders/finalize
//! ```

use actix_web::{post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::{FinalizeOrderState, VerifyOrderResult, VerifyOrderState};
use crate::domain::{FinalizeOutcome, IdempotencyKey};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;

/// Workflow state handed to the verify step.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VerifyOrderRequestBody {
    /// Optional idempotency key; omitted or empty disables deduplication.
    pub idempotency_key: Option<String>,
    /// Order items, fingerprinted to detect key reuse.
    #[schema(value_type = Object)]
    pub items: serde_json::Value,
}

/// Decision returned by the verify step.
///
/// Exactly one shape is returned: `{"isNewOrder": true}` when the order
/// should be processed, `{"statusCode", "message"}` when it must not be,
/// or `{"statusCode", "body"}` when a stored result is replayed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(untagged)]
pub enum VerifyOrderResponseBody {
    /// Process the order, then call finalize.
    #[serde(rename_all = "camelCase")]
    NewOrder { is_new_order: bool },
    /// Do not process the order.
    #[serde(rename_all = "camelCase")]
    Rejected { status_code: u16, message: String },
    /// Return the stored result.
    #[serde(rename_all = "camelCase")]
    Replayed {
        status_code: u16,
        body: Option<String>,
    },
}

impl From<VerifyOrderResult> for VerifyOrderResponseBody {
    fn from(value: VerifyOrderResult) -> Self {
        match value {
            VerifyOrderResult::NewOrder => Self::NewOrder { is_new_order: true },
            VerifyOrderResult::Rejected {
                status_code,
                message,
            }
            | VerifyOrderResult::Failed {
                status_code,
                message,
            } => Self::Rejected {
                status_code,
                message,
            },
            VerifyOrderResult::Replayed { status_code, body } => {
                Self::Replayed { status_code, body }
            }
        }
    }
}

/// Workflow state handed to the finalize step.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FinalizeOrderRequestBody {
    pub idempotency_key: Option<String>,
    /// Status code produced by order processing.
    #[schema(example = 201)]
    pub status_code: u16,
    /// Body produced by order processing, stored verbatim for replays.
    pub result: Option<String>,
}

/// Result of the finalize step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FinalizeOrderResponseBody {
    /// One of `skipped`, `cleared`, `completed`, or `expired`.
    #[schema(example = "completed")]
    pub outcome: String,
}

impl From<FinalizeOutcome> for FinalizeOrderResponseBody {
    fn from(value: FinalizeOutcome) -> Self {
        let outcome = match value {
            FinalizeOutcome::Skipped => "skipped",
            FinalizeOutcome::Cleared => "cleared",
            FinalizeOutcome::Completed => "completed",
            FinalizeOutcome::Expired => "expired",
        };
        Self {
            outcome: outcome.to_owned(),
        }
    }
}

fn parse_key(raw: Option<&str>) -> ApiResult<Option<IdempotencyKey>> {
    IdempotencyKey::parse_optional(raw).map_err(|err| {
        crate::domain::Error::invalid_request(err.to_string())
            .with_details(serde_json::json!({ "field": "idempotencyKey" }))
    })
}

/// Verify step: decide whether the orchestrator may process the order.
#[utoipa::path(
    post,
    path = "/api/v1/workflow/orders/verify",
    request_body = VerifyOrderRequestBody,
    responses(
        (status = 200, description = "Step decision", body = VerifyOrderResponseBody),
        (status = 400, description = "Malformed idempotency key", body = ErrorSchema)
    ),
    tags = ["workflow"],
    operation_id = "verifyOrder"
)]
#[post("/workflow/orders/verify")]
pub async fn verify_order(
    state: web::Data<HttpState>,
    payload: web::Json<VerifyOrderRequestBody>,
) -> ApiResult<web::Json<VerifyOrderResponseBody>> {
    let body = payload.into_inner();
    let idempotency_key = parse_key(body.idempotency_key.as_deref())?;
    let result = state
        .orders
        .verify(VerifyOrderState {
            idempotency_key,
            items: body.items,
        })
        .await?;
    Ok(web::Json(result.into()))
}

/// Finalize step: record the outcome of order processing.
#[utoipa::path(
    post,
    path = "/api/v1/workflow/orders/finalize",
    request_body = FinalizeOrderRequestBody,
    responses(
        (status = 200, description = "Outcome recorded", body = FinalizeOrderResponseBody),
        (status = 400, description = "Malformed idempotency key", body = ErrorSchema),
        (status = 500, description = "Cache failure", body = ErrorSchema)
    ),
    tags = ["workflow"],
    operation_id = "finalizeOrder"
)]
#[post("/workflow/orders/finalize")]
pub async fn finalize_order(
    state: web::Data<HttpState>,
    payload: web::Json<FinalizeOrderRequestBody>,
) -> ApiResult<web::Json<FinalizeOrderResponseBody>> {
    let body = payload.into_inner();
    let idempotency_key = parse_key(body.idempotency_key.as_deref())?;
    let outcome = state
        .orders
        .finalize(FinalizeOrderState {
            idempotency_key,
            status_code: body.status_code,
            result: body.result,
        })
        .await?;
    Ok(web::Json(outcome.into()))
}

#[cfg(test)]
#[path = "orders_tests.rs"]
mod tests;
