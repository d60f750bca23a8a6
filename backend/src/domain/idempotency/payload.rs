//! Payload fingerprinting and canonicalization helpers.

use std::fmt;

use sha2::{Digest, Sha256};

/// Validation errors for [`PayloadHash`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayloadHashError {
    /// The decoded hash had an incorrect length.
    InvalidLength {
        /// Expected number of bytes.
        expected: usize,
        /// Actual number of bytes.
        actual: usize,
    },
    /// The hexadecimal encoding was malformed.
    InvalidHex {
        /// Description of the decoding failure.
        message: String,
    },
}

impl fmt::Display for PayloadHashError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidLength { expected, actual } => {
                write!(f, "payload hash must be {expected} bytes, got {actual}")
            }
            Self::InvalidHex { message } => {
                write!(f, "payload hash is not valid hexadecimal: {message}")
            }
        }
    }
}

impl std::error::Error for PayloadHashError {}

/// SHA-256 fingerprint of a request payload.
///
/// Used to detect whether two requests with the same idempotency key carry
/// identical or conflicting payloads. Every admission attempt recomputes the
/// fingerprint, so it must be stable across processes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PayloadHash([u8; 32]);

impl PayloadHash {
    /// Construct a [`PayloadHash`] from a 32-byte array.
    ///
    /// # Example
    ///
    /// ```
    /// # use gatekeeper::domain::idempotency::PayloadHash;
    /// let hash = PayloadHash::from_bytes([0u8; 32]);
    /// assert_eq!(hash.as_bytes(), &[0u8; 32]);
    /// ```
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Hash raw payload bytes without canonicalization.
    pub fn of_bytes(payload: &[u8]) -> Self {
        Self(Sha256::digest(payload).into())
    }

    /// Decode a hash from its lowercase hexadecimal wire form.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not hexadecimal or does not decode to
    /// exactly 32 bytes.
    pub fn from_hex(encoded: &str) -> Result<Self, PayloadHashError> {
        let bytes = hex::decode(encoded).map_err(|err| PayloadHashError::InvalidHex {
            message: err.to_string(),
        })?;
        let actual = bytes.len();
        let arr: [u8; 32] = bytes
            .try_into()
            .map_err(|_| PayloadHashError::InvalidLength {
                expected: 32,
                actual,
            })?;
        Ok(Self(arr))
    }

    /// Access the raw hash bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Encode the hash as a lowercase hexadecimal string.
    ///
    /// # Example
    ///
    /// ```
    /// # use gatekeeper::domain::idempotency::PayloadHash;
    /// let hash = PayloadHash::from_bytes([0u8; 32]);
    /// assert_eq!(hash.to_hex().len(), 64);
    /// ```
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for PayloadHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// Request payload as seen by the admission gate.
#[derive(Debug, Clone, Copy)]
pub enum Payload<'a> {
    /// Structured JSON payload; fingerprinted after canonicalization.
    Json(&'a serde_json::Value),
    /// Opaque payload bytes; fingerprinted verbatim.
    Bytes(&'a [u8]),
}

impl Payload<'_> {
    /// Compute the payload fingerprint.
    pub fn fingerprint(&self) -> PayloadHash {
        match self {
            Self::Json(value) => canonicalize_and_hash(value),
            Self::Bytes(bytes) => PayloadHash::of_bytes(bytes),
        }
    }
}

impl<'a> From<&'a serde_json::Value> for Payload<'a> {
    fn from(value: &'a serde_json::Value) -> Self {
        Self::Json(value)
    }
}

impl<'a> From<&'a [u8]> for Payload<'a> {
    fn from(value: &'a [u8]) -> Self {
        Self::Bytes(value)
    }
}

/// Canonicalize a JSON value and compute its SHA-256 hash.
///
/// Canonicalization ensures semantically equivalent payloads produce identical
/// hashes regardless of whitespace or key ordering:
///
/// 1. Object keys are sorted recursively (lexicographic).
/// 2. Arrays preserve element order.
/// 3. The result is serialized to compact JSON (no whitespace).
/// 4. SHA-256 is computed on the resulting UTF-8 bytes.
///
/// # Example
///
/// ```
/// # use gatekeeper::domain::idempotency::canonicalize_and_hash;
/// # use serde_json::json;
/// let a = json!({"b": 2, "a": 1});
/// let b = json!({"a": 1, "b": 2});
/// assert_eq!(canonicalize_and_hash(&a), canonicalize_and_hash(&b));
/// ```
pub fn canonicalize_and_hash(value: &serde_json::Value) -> PayloadHash {
    let canonical = canonicalize(value).to_string();
    PayloadHash::of_bytes(canonical.as_bytes())
}

/// Recursively sort object keys for canonical JSON representation.
fn canonicalize(value: &serde_json::Value) -> serde_json::Value {
    match value {
        serde_json::Value::Object(map) => {
            let mut sorted: Vec<_> = map.iter().collect();
            sorted.sort_by_key(|(k, _)| k.as_str());
            let canonical_map: serde_json::Map<String, serde_json::Value> = sorted
                .into_iter()
                .map(|(k, v)| (k.clone(), canonicalize(v)))
                .collect();
            serde_json::Value::Object(canonical_map)
        }
        serde_json::Value::Array(arr) => {
            serde_json::Value::Array(arr.iter().map(canonicalize).collect())
        }
        other => other.clone(),
    }
}
