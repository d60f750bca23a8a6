//! Port for fetching the credential used to connect to the cache store.

use std::fmt;

use async_trait::async_trait;
use zeroize::Zeroizing;

/// Errors raised while fetching the cache credential.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CredentialError {
    /// The secret source could not be read.
    #[error("cache credential source unavailable: {message}")]
    Unavailable {
        /// Source diagnostic.
        message: String,
    },
    /// The secret was read but did not have the expected shape.
    #[error("cache credential is malformed: {message}")]
    Malformed {
        /// Parser diagnostic.
        message: String,
    },
}

impl CredentialError {
    /// Create an unavailable error with the given message.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// Create a malformed error with the given message.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed {
            message: message.into(),
        }
    }
}

/// Authentication token for the cache store.
///
/// The token is wiped from memory on drop and never printed.
#[derive(Clone)]
pub struct CacheCredential(Zeroizing<String>);

impl CacheCredential {
    /// Wrap a raw token.
    pub fn new(token: impl Into<String>) -> Self {
        Self(Zeroizing::new(token.into()))
    }

    /// Expose the token to the connection layer.
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for CacheCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CacheCredential(<redacted>)")
    }
}

/// Source of the cache credential.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CacheCredentialSource: Send + Sync {
    /// Fetch the current credential.
    async fn fetch(&self) -> Result<CacheCredential, CredentialError>;
}
