//! Helpers for parsing idempotency headers in HTTP handlers.

use actix_web::http::header::HeaderMap;

use crate::domain::{Error, IdempotencyKey, IdempotencyKeyValidationError};

/// HTTP header name for idempotency keys.
pub const IDEMPOTENCY_KEY_HEADER: &str = "Idempotency-Key";

/// Error raised when the header cannot be read as a key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdempotencyHeaderError {
    /// The header value was not visible ASCII.
    NotText,
    /// The header value failed key validation.
    Invalid(IdempotencyKeyValidationError),
}

/// Extract the idempotency key from request headers.
///
/// An absent or empty header means the client opted out of deduplication.
///
/// # Errors
///
/// Returns [`IdempotencyHeaderError`] when a non-empty header is unusable.
pub fn extract_idempotency_key(
    headers: &HeaderMap,
) -> Result<Option<IdempotencyKey>, IdempotencyHeaderError> {
    let Some(header_value) = headers.get(IDEMPOTENCY_KEY_HEADER) else {
        return Ok(None);
    };

    let key_str = header_value
        .to_str()
        .map_err(|_| IdempotencyHeaderError::NotText)?;

    IdempotencyKey::parse_optional(Some(key_str)).map_err(IdempotencyHeaderError::Invalid)
}

/// Map idempotency header errors to domain errors.
pub fn map_idempotency_key_error(err: IdempotencyHeaderError) -> Error {
    let message = match err {
        IdempotencyHeaderError::NotText => {
            "Idempotency-Key header must be visible ASCII".to_owned()
        }
        IdempotencyHeaderError::Invalid(inner) => format!("Idempotency-Key header {inner}"),
    };
    Error::invalid_request(message)
        .with_details(serde_json::json!({ "header": IDEMPOTENCY_KEY_HEADER }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::header::{HeaderName, HeaderValue};
    use rstest::rstest;

    fn headers(value: Option<&[u8]>) -> HeaderMap {
        let mut map = HeaderMap::new();
        if let Some(value) = value {
            map.insert(
                HeaderName::from_static("idempotency-key"),
                HeaderValue::from_bytes(value).expect("valid header bytes"),
            );
        }
        map
    }

    #[rstest]
    #[case(None)]
    #[case(Some(b"".as_slice()))]
    fn missing_or_empty_header_means_no_key(#[case] value: Option<&[u8]>) {
        assert_eq!(extract_idempotency_key(&headers(value)), Ok(None));
    }

    #[rstest]
    fn present_header_is_parsed() {
        let key = extract_idempotency_key(&headers(Some(b"abc")))
            .expect("valid header")
            .expect("key present");
        assert_eq!(key.as_ref(), "abc");
    }

    #[rstest]
    fn non_ascii_header_is_rejected() {
        let err = extract_idempotency_key(&headers(Some("clé".as_bytes())))
            .expect_err("non-ascii header is rejected");
        assert_eq!(err, IdempotencyHeaderError::NotText);
    }

    #[rstest]
    fn overlong_header_maps_to_invalid_request() {
        let long = "k".repeat(IdempotencyKey::MAX_LEN + 1);
        let err = extract_idempotency_key(&headers(Some(long.as_bytes())))
            .expect_err("overlong header is rejected");
        let mapped = map_idempotency_key_error(err);
        assert_eq!(mapped.code(), crate::domain::ErrorCode::InvalidRequest);
    }
}
