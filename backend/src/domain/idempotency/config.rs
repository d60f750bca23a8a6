//! Environment-driven configuration for the idempotency cache.

use std::time::Duration;

/// Environment variable name for the record TTL in seconds.
pub const IDEMPOTENCY_CACHE_TTL_SECONDS_ENV: &str = "IDEMPOTENCY_CACHE_TTL_SECONDS";

/// Environment variable name for the logical cache name.
pub const IDEMPOTENCY_CACHE_NAME_ENV: &str = "IDEMPOTENCY_CACHE_NAME";

/// Environment abstraction for idempotency configuration lookups.
///
/// This trait allows testing with mock environments without unsafe env var
/// mutations.
pub trait IdempotencyEnv {
    /// Fetch a string value by name.
    fn string(&self, name: &str) -> Option<String>;
}

/// Environment access backed by the real process environment.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultIdempotencyEnv;

impl DefaultIdempotencyEnv {
    /// Create a new environment reader.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl IdempotencyEnv for DefaultIdempotencyEnv {
    fn string(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

/// Configuration for the idempotency cache.
///
/// The TTL bounds how long a claimed key stays blocked if its executor
/// crashes, and how long a completed result remains replayable. It must be
/// longer than the slowest protected operation, otherwise a second executor
/// can be admitted while the first is still running.
///
/// # Example
///
/// ```
/// # use gatekeeper::domain::idempotency::IdempotencyConfig;
/// # use std::time::Duration;
/// let config = IdempotencyConfig::default();
/// assert_eq!(config.ttl(), Duration::from_secs(3600));
/// assert_eq!(config.cache_name(), "idempotency-cache");
///
/// let custom = IdempotencyConfig::with_ttl(Duration::from_secs(600));
/// assert_eq!(custom.ttl(), Duration::from_secs(600));
/// ```
#[derive(Debug, Clone)]
pub struct IdempotencyConfig {
    cache_name: String,
    ttl: Duration,
}

impl IdempotencyConfig {
    /// Default logical cache name.
    pub const DEFAULT_CACHE_NAME: &'static str = "idempotency-cache";

    /// Default TTL in seconds.
    const DEFAULT_TTL_SECONDS: u64 = 3600;

    /// Minimum allowed TTL in seconds.
    const MIN_TTL_SECONDS: u64 = 1;

    /// Maximum allowed TTL in seconds (7 days).
    const MAX_TTL_SECONDS: u64 = 7 * 24 * 3600;

    /// Load configuration from the real process environment.
    ///
    /// Reads `IDEMPOTENCY_CACHE_TTL_SECONDS` (default: 3600, clamped to
    /// [1, 604800]) and `IDEMPOTENCY_CACHE_NAME` (default:
    /// `idempotency-cache`).
    pub fn from_env() -> Self {
        Self::from_env_with(&DefaultIdempotencyEnv)
    }

    /// Load configuration from a custom environment source.
    ///
    /// Useful for testing without unsafe env var mutations.
    pub fn from_env_with(env: &impl IdempotencyEnv) -> Self {
        let seconds = env
            .string(IDEMPOTENCY_CACHE_TTL_SECONDS_ENV)
            .and_then(|s| s.trim().parse::<u64>().ok())
            .unwrap_or(Self::DEFAULT_TTL_SECONDS)
            .clamp(Self::MIN_TTL_SECONDS, Self::MAX_TTL_SECONDS);
        let cache_name = env
            .string(IDEMPOTENCY_CACHE_NAME_ENV)
            .map(|name| name.trim().to_owned())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| Self::DEFAULT_CACHE_NAME.to_owned());
        Self {
            cache_name,
            ttl: Duration::from_secs(seconds),
        }
    }

    /// Create with explicit TTL and the default cache name.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            cache_name: Self::DEFAULT_CACHE_NAME.to_owned(),
            ttl,
        }
    }

    /// Replace the logical cache name.
    #[must_use]
    pub fn with_cache_name(mut self, cache_name: impl Into<String>) -> Self {
        self.cache_name = cache_name.into();
        self
    }

    /// Returns the configured TTL.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns the logical cache name records are namespaced under.
    pub fn cache_name(&self) -> &str {
        &self.cache_name
    }
}

impl Default for IdempotencyConfig {
    fn default() -> Self {
        Self::with_ttl(Duration::from_secs(Self::DEFAULT_TTL_SECONDS))
    }
}
