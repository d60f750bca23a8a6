//! Idempotency key validation.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Validation errors for [`IdempotencyKey`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdempotencyKeyValidationError {
    /// The key string was empty.
    EmptyKey,
    /// The key carried leading or trailing whitespace.
    SurroundingWhitespace,
    /// The key exceeded the maximum supported length.
    TooLong {
        /// Maximum number of bytes accepted.
        max: usize,
        /// Actual number of bytes supplied.
        actual: usize,
    },
    /// The key contained an ASCII control character.
    ControlCharacter,
}

impl fmt::Display for IdempotencyKeyValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyKey => write!(f, "idempotency key must not be empty"),
            Self::SurroundingWhitespace => {
                write!(f, "idempotency key must not contain surrounding whitespace")
            }
            Self::TooLong { max, actual } => {
                write!(f, "idempotency key must be at most {max} bytes, got {actual}")
            }
            Self::ControlCharacter => {
                write!(f, "idempotency key must not contain control characters")
            }
        }
    }
}

impl std::error::Error for IdempotencyKeyValidationError {}

/// Client-provided idempotency key.
///
/// The key is opaque: callers choose one value per logical operation and
/// resend it unchanged on every retry. It doubles as the lookup key in the
/// backing cache, so only length and printable-character checks are applied.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct IdempotencyKey(String);

impl IdempotencyKey {
    /// Maximum key length in bytes.
    pub const MAX_LEN: usize = 255;

    /// Validate and construct an [`IdempotencyKey`] from a string.
    ///
    /// # Errors
    ///
    /// Returns an [`IdempotencyKeyValidationError`] when the input is empty,
    /// padded with whitespace, too long, or contains control characters.
    ///
    /// # Example
    ///
    /// ```
    /// # use gatekeeper::domain::idempotency::IdempotencyKey;
    /// let key = IdempotencyKey::new("order-2024-0042").expect("valid key");
    /// assert_eq!(key.as_ref(), "order-2024-0042");
    /// ```
    pub fn new(key: impl Into<String>) -> Result<Self, IdempotencyKeyValidationError> {
        Self::from_owned(key.into())
    }

    /// Generate a new random [`IdempotencyKey`].
    ///
    /// Primarily useful for testing.
    pub fn random() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    fn from_owned(key: String) -> Result<Self, IdempotencyKeyValidationError> {
        if key.is_empty() {
            return Err(IdempotencyKeyValidationError::EmptyKey);
        }
        if key.trim() != key {
            return Err(IdempotencyKeyValidationError::SurroundingWhitespace);
        }
        if key.len() > Self::MAX_LEN {
            return Err(IdempotencyKeyValidationError::TooLong {
                max: Self::MAX_LEN,
                actual: key.len(),
            });
        }
        if key.chars().any(char::is_control) {
            return Err(IdempotencyKeyValidationError::ControlCharacter);
        }
        Ok(Self(key))
    }

    /// Parse an optional raw value, treating an empty value as "no key".
    ///
    /// Callers that omit the key, or send it blank, opt out of deduplication.
    ///
    /// # Errors
    ///
    /// Returns an [`IdempotencyKeyValidationError`] when a non-empty value
    /// fails validation.
    pub fn parse_optional(
        raw: Option<&str>,
    ) -> Result<Option<Self>, IdempotencyKeyValidationError> {
        match raw {
            None | Some("") => Ok(None),
            Some(value) => Self::new(value).map(Some),
        }
    }
}

impl AsRef<str> for IdempotencyKey {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for IdempotencyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<IdempotencyKey> for String {
    fn from(value: IdempotencyKey) -> Self {
        value.0
    }
}

impl TryFrom<String> for IdempotencyKey {
    type Error = IdempotencyKeyValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}
