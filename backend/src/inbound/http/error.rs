//! HTTP adapter mapping for domain errors.
//!
//! Purpose: keep the domain error type HTTP-agnostic while allowing Actix
//! handlers to turn domain failures into consistent JSON responses and status
//! codes.

use actix_web::error::JsonPayloadError;
use actix_web::{HttpRequest, HttpResponse, ResponseError, http::StatusCode, web};
use tracing::error;

use crate::domain::{Error, ErrorCode, GENERIC_FAILURE_MESSAGE};

/// Convenient result alias for HTTP handlers.
pub type ApiResult<T> = Result<T, Error>;

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
        ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn redact_if_internal(error: &Error) -> Error {
    if matches!(error.code(), ErrorCode::InternalError) {
        Error::internal(GENERIC_FAILURE_MESSAGE)
    } else {
        error.clone()
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        status_for(self.code())
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(redact_if_internal(self))
    }
}

impl From<actix_web::Error> for Error {
    fn from(err: actix_web::Error) -> Self {
        // Do not leak implementation details to clients.
        error!(error = %err, "actix error promoted to domain error");
        Error::internal(GENERIC_FAILURE_MESSAGE)
    }
}

/// JSON extractor configuration that reports malformed bodies as
/// `invalid_request` errors instead of actix's plain-text default.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(json_error_handler)
}

fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    Error::invalid_request(format!("request body is not valid: {err}")).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;
    use rstest::rstest;
    use serde_json::{Value, json};

    async fn body_of(error: &Error) -> Value {
        let response = ResponseError::error_response(error);
        let bytes = to_bytes(response.into_body())
            .await
            .expect("reading response body succeeds");
        serde_json::from_slice(&bytes).expect("error body is JSON")
    }

    #[rstest]
    #[case(Error::invalid_request("bad"), StatusCode::BAD_REQUEST)]
    #[case(Error::internal("boom"), StatusCode::INTERNAL_SERVER_ERROR)]
    fn status_code_matches_error_code(#[case] err: Error, #[case] status: StatusCode) {
        assert_eq!(ResponseError::status_code(&err), status);
    }

    #[actix_web::test]
    async fn internal_errors_are_redacted() {
        let error = Error::internal("redis://:token@cache refused")
            .with_details(json!({"secret": "x"}));

        let body = body_of(&error).await;

        assert_eq!(
            body,
            json!({"code": "internal_error", "message": "Something went wrong."})
        );
    }

    #[actix_web::test]
    async fn client_errors_keep_message_and_details() {
        let error = Error::invalid_request("name must not be empty")
            .with_details(json!({"field": "name"}));

        let body = body_of(&error).await;

        assert_eq!(
            body,
            json!({
                "code": "invalid_request",
                "message": "name must not be empty",
                "details": {"field": "name"}
            })
        );
    }
}
