//! Server settings loaded via OrthoConfig.
//!
//! Values come from CLI flags, `GATEKEEPER_*` environment variables, or a
//! configuration file. The gate's TTL and cache name are read separately
//! through [`crate::domain::IdempotencyConfig::from_env`].

use std::net::SocketAddr;
use std::path::PathBuf;

use ortho_config::OrthoConfig;
use serde::Deserialize;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_REDIS_POOL_SIZE: u32 = 16;

/// Errors raised while interpreting loaded settings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    /// The bind address did not parse as `host:port`.
    #[error("invalid bind address `{value}`")]
    InvalidBindAddr {
        /// Raw configured value.
        value: String,
    },
    /// Neither a Redis URL nor the in-memory cache was configured.
    #[error("redis_url is required unless in_memory_cache is enabled")]
    MissingRedisUrl,
}

/// Where the cache credential should be read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialSetting {
    /// JSON secret document at the given path.
    SecretFile(PathBuf),
    /// Named environment variable.
    Env(String),
    /// Connect without a password.
    None,
}

/// Which cache adapter backs the gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheSetting {
    /// Redis at the given URL.
    Redis {
        /// Connection URL without credentials.
        url: String,
        /// Maximum pooled connections.
        pool_size: u32,
    },
    /// Process-local cache; only safe for a single instance.
    InMemory,
}

/// Configuration values controlling the HTTP server and its cache.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "GATEKEEPER")]
pub struct GatekeeperSettings {
    /// Socket address the HTTP server binds to.
    pub bind_addr: Option<String>,
    /// Redis connection URL, without credentials.
    pub redis_url: Option<String>,
    /// Maximum number of pooled Redis connections.
    pub redis_pool_size: Option<u32>,
    /// Path to the JSON secret document carrying `auth_token`.
    pub cache_token_file: Option<PathBuf>,
    /// Environment variable carrying the cache token.
    pub cache_token_env: Option<String>,
    /// Use the process-local cache instead of Redis.
    #[ortho_config(default = false)]
    pub in_memory_cache: bool,
}

impl GatekeeperSettings {
    /// Return the socket address to bind, falling back to the default.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::InvalidBindAddr`] when the value does not
    /// parse.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let raw = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        raw.parse().map_err(|_| SettingsError::InvalidBindAddr {
            value: raw.to_owned(),
        })
    }

    /// Return the configured cache backend.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::MissingRedisUrl`] when Redis is selected but
    /// no URL is configured.
    pub fn cache(&self) -> Result<CacheSetting, SettingsError> {
        if self.in_memory_cache {
            return Ok(CacheSetting::InMemory);
        }
        let url = self
            .redis_url
            .clone()
            .filter(|url| !url.trim().is_empty())
            .ok_or(SettingsError::MissingRedisUrl)?;
        Ok(CacheSetting::Redis {
            url,
            pool_size: self.redis_pool_size.unwrap_or(DEFAULT_REDIS_POOL_SIZE),
        })
    }

    /// Return the credential source; a secret file wins over an env var.
    pub fn credential(&self) -> CredentialSetting {
        match (&self.cache_token_file, &self.cache_token_env) {
            (Some(path), _) => CredentialSetting::SecretFile(path.clone()),
            (None, Some(variable)) => CredentialSetting::Env(variable.clone()),
            (None, None) => CredentialSetting::None,
        }
    }
}
