//! Goat registration HTTP handler.
//!
//! ```text
//! POST /api/v1/goats
//! Idempotency-Key: <opaque key>
//! ```

use actix_web::http::StatusCode;
use actix_web::http::header::ContentType;
use actix_web::{HttpRequest, HttpResponse, post, web};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;
use utoipa::ToSchema;

use crate::domain::{Error, GoatDraft};
use crate::domain::ports::{ProtectedResponse, RegisterGoatRequest};
use crate::inbound::http::ApiResult;
use crate::inbound::http::idempotency::{extract_idempotency_key, map_idempotency_key_error};
use crate::inbound::http::schemas::{ErrorSchema, MessageSchema};
use crate::inbound::http::state::HttpState;

/// Response header set when the body was replayed from the cache.
pub const REPLAYED_HEADER: &str = "Idempotent-Replayed";

/// Request payload for registering a goat.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterGoatRequestBody {
    #[schema(example = "G1")]
    pub name: String,
    pub breed: Option<String>,
    pub owner: Option<String>,
}

impl From<RegisterGoatRequestBody> for GoatDraft {
    fn from(value: RegisterGoatRequestBody) -> Self {
        Self {
            name: value.name,
            breed: value.breed,
            owner: value.owner,
        }
    }
}

/// Response payload for a created goat.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RegisterGoatResponseBody {
    #[schema(format = "uuid")]
    pub id: String,
}

/// Turn a protected response into an HTTP response without re-encoding the
/// body, so replays are byte-identical.
pub(crate) fn protected_response(response: ProtectedResponse) -> HttpResponse {
    let status = StatusCode::from_u16(response.status_code).unwrap_or_else(|_| {
        warn!(
            status_code = response.status_code,
            "stored status code is not valid HTTP"
        );
        StatusCode::INTERNAL_SERVER_ERROR
    });
    let mut builder = HttpResponse::build(status);
    if response.replayed {
        builder.insert_header((REPLAYED_HEADER, "true"));
    }
    match response.body {
        Some(body) => builder.content_type(ContentType::json()).body(body),
        None => builder.finish(),
    }
}

fn parse_body(body: &Value) -> Result<RegisterGoatRequestBody, Error> {
    RegisterGoatRequestBody::deserialize(body)
        .map_err(|err| Error::invalid_request(format!("invalid goat payload: {err}")))
}

/// Register a goat, deduplicated by the `Idempotency-Key` header.
///
/// The whole JSON body is fingerprinted, so a retry that differs only in
/// fields the draft ignores is still treated as a different request.
#[utoipa::path(
    post,
    path = "/api/v1/goats",
    request_body = RegisterGoatRequestBody,
    params(
        ("Idempotency-Key" = Option<String>, Header, description = "Opaque retry key")
    ),
    responses(
        (status = 201, description = "Goat registered", body = RegisterGoatResponseBody),
        (status = 202, description = "Original request still in flight", body = MessageSchema),
        (status = 400, description = "Invalid request or key reused with another payload", body = ErrorSchema),
        (status = 500, description = "Admission or persistence failed", body = ErrorSchema)
    ),
    tags = ["goats"],
    operation_id = "registerGoat"
)]
#[post("/goats")]
pub async fn register_goat(
    state: web::Data<HttpState>,
    request: HttpRequest,
    payload: web::Json<Value>,
) -> ApiResult<HttpResponse> {
    let idempotency_key =
        extract_idempotency_key(request.headers()).map_err(map_idempotency_key_error)?;
    let payload = payload.into_inner();
    let draft = parse_body(&payload)?.into();
    let response = state
        .goats
        .register(RegisterGoatRequest {
            idempotency_key,
            draft,
            payload,
        })
        .await?;
    Ok(protected_response(response))
}

#[cfg(test)]
#[path = "goats_tests.rs"]
mod tests;
