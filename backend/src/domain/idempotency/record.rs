//! Cache records stored under idempotency keys and their wire format.
//!
//! A record is serialised as a JSON object:
//!
//! ```text
//! { "hash": "<hex sha-256>", "inProgress": true }
//! { "hash": "<hex sha-256>", "inProgress": false, "statusCode": 201, "result": "..." }
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{PayloadHash, PayloadHashError};

/// Lifecycle state of a cache record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordState {
    /// The admitted executor is still running the protected operation.
    InProgress,
    /// The protected operation succeeded and its result may be replayed.
    Completed {
        /// Status code produced by the protected operation.
        status_code: u16,
        /// Response body produced by the protected operation.
        body: Option<String>,
    },
}

/// Value stored in the cache under an idempotency key.
///
/// `payload_hash` is written once when the record is claimed and carried
/// forward unchanged when the record completes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdempotencyRecord {
    /// Fingerprint of the payload that claimed the key.
    pub payload_hash: PayloadHash,
    /// Current lifecycle state.
    pub state: RecordState,
}

/// Errors raised while decoding a stored record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordDecodeError {
    /// The stored value was not a valid record document.
    #[error("idempotency record is not valid JSON: {message}")]
    Malformed {
        /// Parser diagnostic.
        message: String,
    },
    /// The stored payload hash could not be decoded.
    #[error("idempotency record hash is invalid: {0}")]
    Hash(PayloadHashError),
    /// A completed record did not carry a status code.
    #[error("completed idempotency record is missing its status code")]
    MissingStatusCode,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CacheRecordDto {
    hash: String,
    #[serde(default)]
    in_progress: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    result: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    status_code: Option<u16>,
}

impl IdempotencyRecord {
    /// Build a freshly claimed record.
    pub fn in_progress(payload_hash: PayloadHash) -> Self {
        Self {
            payload_hash,
            state: RecordState::InProgress,
        }
    }

    /// Build a completed record carrying the protected operation's result.
    pub fn completed(payload_hash: PayloadHash, status_code: u16, body: Option<String>) -> Self {
        Self {
            payload_hash,
            state: RecordState::Completed { status_code, body },
        }
    }

    /// Whether the record is still claimed by a running executor.
    pub fn is_in_progress(&self) -> bool {
        matches!(self.state, RecordState::InProgress)
    }

    /// Serialise the record into its cache wire form.
    ///
    /// # Example
    ///
    /// ```
    /// # use gatekeeper::domain::idempotency::{IdempotencyRecord, PayloadHash};
    /// let record = IdempotencyRecord::in_progress(PayloadHash::from_bytes([0u8; 32]));
    /// let wire = record.to_wire();
    /// assert!(wire.contains("\"inProgress\":true"));
    /// ```
    pub fn to_wire(&self) -> String {
        let dto = match &self.state {
            RecordState::InProgress => CacheRecordDto {
                hash: self.payload_hash.to_hex(),
                in_progress: true,
                result: None,
                status_code: None,
            },
            RecordState::Completed { status_code, body } => CacheRecordDto {
                hash: self.payload_hash.to_hex(),
                in_progress: false,
                result: body.clone(),
                status_code: Some(*status_code),
            },
        };
        serde_json::json!(dto).to_string()
    }

    /// Decode a record from its cache wire form.
    ///
    /// A missing `inProgress` flag reads as `false`; such a record must then
    /// carry a `statusCode`.
    ///
    /// # Errors
    ///
    /// Returns a [`RecordDecodeError`] when the value is not a valid record.
    pub fn from_wire(raw: &str) -> Result<Self, RecordDecodeError> {
        let dto: CacheRecordDto =
            serde_json::from_str(raw).map_err(|err| RecordDecodeError::Malformed {
                message: err.to_string(),
            })?;
        let payload_hash = PayloadHash::from_hex(&dto.hash).map_err(RecordDecodeError::Hash)?;

        if dto.in_progress {
            return Ok(Self::in_progress(payload_hash));
        }

        let status_code = dto
            .status_code
            .ok_or(RecordDecodeError::MissingStatusCode)?;
        Ok(Self::completed(payload_hash, status_code, dto.result))
    }
}
