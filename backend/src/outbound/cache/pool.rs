//! Connection pool for the Redis-backed idempotency cache.
//!
//! The pool is built once at startup and shared by every request. The
//! cache credential is injected as the connection password at build time and
//! is never logged.

use std::time::Duration;

use bb8_redis::RedisConnectionManager;
use bb8_redis::bb8::{Pool, PooledConnection};
use url::Url;

use crate::domain::ports::CacheCredential;

/// Errors that can occur during pool operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PoolError {
    /// The configured Redis URL could not be used.
    #[error("invalid redis url: {message}")]
    InvalidUrl { message: String },

    /// Failed to check out a connection from the pool.
    #[error("failed to get connection from pool: {message}")]
    Checkout { message: String },

    /// Failed to build the connection pool.
    #[error("failed to build connection pool: {message}")]
    Build { message: String },
}

impl PoolError {
    /// Create an invalid URL error with the given message.
    pub fn invalid_url(message: impl Into<String>) -> Self {
        Self::InvalidUrl {
            message: message.into(),
        }
    }

    /// Create a checkout error with the given message.
    pub fn checkout(message: impl Into<String>) -> Self {
        Self::Checkout {
            message: message.into(),
        }
    }

    /// Create a build error with the given message.
    pub fn build(message: impl Into<String>) -> Self {
        Self::Build {
            message: message.into(),
        }
    }
}

/// Configuration for the Redis connection pool.
///
/// # Example
///
/// ```
/// # use std::time::Duration;
/// # use gatekeeper::outbound::cache::RedisPoolConfig;
/// let config = RedisPoolConfig::new("redis://cache.internal:6379")
///     .with_max_size(32)
///     .with_connection_timeout(Duration::from_secs(2));
/// assert_eq!(config.redis_url(), "redis://cache.internal:6379");
/// ```
#[derive(Debug, Clone)]
pub struct RedisPoolConfig {
    redis_url: String,
    max_size: u32,
    min_idle: Option<u32>,
    connection_timeout: Duration,
}

impl RedisPoolConfig {
    /// Create a new configuration with the given Redis URL.
    ///
    /// Uses sensible defaults:
    /// - `max_size`: 16 connections
    /// - `min_idle`: none, so building the pool does not dial out
    /// - `connection_timeout`: 5 seconds
    pub fn new(redis_url: impl Into<String>) -> Self {
        Self {
            redis_url: redis_url.into(),
            max_size: 16,
            min_idle: None,
            connection_timeout: Duration::from_secs(5),
        }
    }

    /// Set the maximum number of connections in the pool.
    #[must_use]
    pub fn with_max_size(mut self, max_size: u32) -> Self {
        self.max_size = max_size;
        self
    }

    /// Set the minimum number of idle connections to maintain.
    #[must_use]
    pub fn with_min_idle(mut self, min_idle: Option<u32>) -> Self {
        self.min_idle = min_idle;
        self
    }

    /// Set the connection checkout timeout.
    #[must_use]
    pub fn with_connection_timeout(mut self, timeout: Duration) -> Self {
        self.connection_timeout = timeout;
        self
    }

    /// Get the Redis URL as configured, without any credential.
    pub fn redis_url(&self) -> &str {
        &self.redis_url
    }

    /// Build the connection URL, carrying the credential as the password.
    fn connection_url(&self, credential: Option<&CacheCredential>) -> Result<Url, PoolError> {
        let mut url =
            Url::parse(&self.redis_url).map_err(|err| PoolError::invalid_url(err.to_string()))?;
        if !matches!(url.scheme(), "redis" | "rediss") {
            return Err(PoolError::invalid_url(format!(
                "unsupported scheme `{}`",
                url.scheme()
            )));
        }
        if let Some(credential) = credential {
            url.set_password(Some(credential.expose()))
                .map_err(|()| PoolError::invalid_url("url cannot carry a password"))?;
        }
        Ok(url)
    }
}

/// Async connection pool for Redis.
#[derive(Clone)]
pub struct RedisPool {
    inner: Pool<RedisConnectionManager>,
}

impl RedisPool {
    /// Create a new connection pool with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns `PoolError::InvalidUrl` for unusable URLs and
    /// `PoolError::Build` if the pool cannot be constructed.
    pub async fn connect(
        config: RedisPoolConfig,
        credential: Option<&CacheCredential>,
    ) -> Result<Self, PoolError> {
        let url = config.connection_url(credential)?;
        let manager = RedisConnectionManager::new(url.as_str())
            .map_err(|err| PoolError::build(err.to_string()))?;

        let pool = Pool::builder()
            .max_size(config.max_size)
            .min_idle(config.min_idle)
            .connection_timeout(config.connection_timeout)
            .build(manager)
            .await
            .map_err(|err| PoolError::build(err.to_string()))?;

        Ok(Self { inner: pool })
    }

    /// Get a connection from the pool.
    ///
    /// # Errors
    ///
    /// Returns `PoolError::Checkout` if a connection cannot be obtained within
    /// the configured timeout.
    pub async fn get(&self) -> Result<PooledConnection<'_, RedisConnectionManager>, PoolError> {
        self.inner
            .get()
            .await
            .map_err(|err| PoolError::checkout(err.to_string()))
    }
}
