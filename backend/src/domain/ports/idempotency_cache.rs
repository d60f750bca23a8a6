//! Port abstraction for the TTL key-value store holding idempotency records.
//!
//! The [`IdempotencyCache`] trait is the only coordination point between
//! independent gate instances. Adapters must make
//! [`IdempotencyCache::set_if_not_exists`] atomic; a read-then-write emulation
//! lets two first attempts both claim a key.

use std::time::Duration;

use async_trait::async_trait;

/// Errors raised by idempotency cache adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdempotencyCacheError {
    /// The store could not be reached.
    #[error("idempotency cache connection failed: {message}")]
    Connection {
        /// Adapter diagnostic.
        message: String,
    },
    /// The store was reached but rejected or failed the command.
    #[error("idempotency cache command failed: {message}")]
    Command {
        /// Adapter diagnostic.
        message: String,
    },
}

impl IdempotencyCacheError {
    /// Create a connection error with the given message.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Create a command error with the given message.
    pub fn command(message: impl Into<String>) -> Self {
        Self::Command {
            message: message.into(),
        }
    }
}

/// Result of reading a key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheLookup {
    /// A value is stored under the key.
    Hit(String),
    /// Nothing is stored under the key (never written, deleted, or expired).
    Miss,
}

/// Result of a conditional create.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionalWrite {
    /// The value was written; the caller won the key.
    Stored,
    /// A value already existed; nothing was written.
    NotStored,
}

/// Port for the backing key-value store.
///
/// Every method addresses a key inside a named logical cache. Adapters that
/// share one physical namespace combine the two with [`namespaced_key`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdempotencyCache: Send + Sync {
    /// Read the value stored under `key`.
    async fn get(&self, cache_name: &str, key: &str)
    -> Result<CacheLookup, IdempotencyCacheError>;

    /// Atomically store `value` under `key` only if nothing is stored yet.
    async fn set_if_not_exists(
        &self,
        cache_name: &str,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> Result<ConditionalWrite, IdempotencyCacheError>;

    /// Store `value` under `key`, replacing any existing value.
    async fn set(
        &self,
        cache_name: &str,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> Result<(), IdempotencyCacheError>;

    /// Remove whatever is stored under `key`. Missing keys are not an error.
    async fn delete(&self, cache_name: &str, key: &str) -> Result<(), IdempotencyCacheError>;
}

/// Combine a logical cache name and a key into one physical key.
///
/// # Example
///
/// ```
/// # use gatekeeper::domain::ports::namespaced_key;
/// assert_eq!(namespaced_key("idempotency-cache", "abc"), "idempotency-cache:abc");
/// ```
pub fn namespaced_key(cache_name: &str, key: &str) -> String {
    format!("{cache_name}:{key}")
}
