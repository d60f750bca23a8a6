//! Driving port for registering goats behind the admission gate.
//!
//! Inbound adapters call [`GoatRegistration::register`] with the parsed draft,
//! the raw body it was parsed from, and the optional idempotency key; the service decides whether the goat is
//! created, replayed, rejected, or deferred.

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::{Error, GoatDraft, IdempotencyKey};

/// Request to register a goat.
#[derive(Debug, Clone)]
pub struct RegisterGoatRequest {
    /// Optional idempotency key; `None` disables deduplication.
    pub idempotency_key: Option<IdempotencyKey>,
    /// Goat attributes supplied by the client.
    pub draft: GoatDraft,
    /// Request body as received, unknown fields included. This is what the
    /// idempotency fingerprint covers.
    pub payload: Value,
}

/// Response produced by a protected operation, or replayed from the cache.
///
/// `body` is kept as the exact text the original executor produced so a
/// replay is byte-for-byte identical.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtectedResponse {
    /// Status code to return to the client.
    pub status_code: u16,
    /// JSON body text, if any.
    pub body: Option<String>,
    /// Whether the response was served from the idempotency cache.
    pub replayed: bool,
}

impl ProtectedResponse {
    /// Build a freshly produced response.
    pub fn fresh(status_code: u16, body: impl Into<String>) -> Self {
        Self {
            status_code,
            body: Some(body.into()),
            replayed: false,
        }
    }

    /// Build a response replayed from a completed record.
    pub fn replayed(status_code: u16, body: Option<String>) -> Self {
        Self {
            status_code,
            body,
            replayed: true,
        }
    }
}

/// Use-case port for goat registration.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GoatRegistration: Send + Sync {
    /// Register a goat, honouring the idempotency key when present.
    ///
    /// Returns `Err` for invalid drafts and for infrastructure faults; every
    /// other outcome, including payload mismatches and in-flight duplicates,
    /// is a [`ProtectedResponse`] with its own status code.
    async fn register(&self, request: RegisterGoatRequest) -> Result<ProtectedResponse, Error>;
}
