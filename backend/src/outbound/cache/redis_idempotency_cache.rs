//! Redis-backed idempotency cache.
//!
//! Records live under `<cache_name>:<key>` and expire through Redis TTLs.
//! The conditional create is a single `SET ... NX EX`, so the claim and its
//! expiry are applied atomically by the server.

use std::time::Duration;

use async_trait::async_trait;
use bb8_redis::redis::{self, RedisError};
use tracing::debug;

use super::pool::{PoolError, RedisPool};
use crate::domain::ports::{
    CacheLookup, ConditionalWrite, IdempotencyCache, IdempotencyCacheError, namespaced_key,
};

/// [`IdempotencyCache`] adapter over a shared [`RedisPool`].
#[derive(Clone)]
pub struct RedisIdempotencyCache {
    pool: RedisPool,
}

impl RedisIdempotencyCache {
    /// Create a cache adapter over the given pool.
    pub fn new(pool: RedisPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(err: PoolError) -> IdempotencyCacheError {
    IdempotencyCacheError::connection(err.to_string())
}

fn map_redis_error(err: RedisError) -> IdempotencyCacheError {
    if err.is_connection_dropped() || err.is_connection_refusal() || err.is_timeout() {
        IdempotencyCacheError::connection(err.to_string())
    } else {
        IdempotencyCacheError::command(err.to_string())
    }
}

/// Redis expiries are whole seconds; sub-second TTLs round up to one.
fn ttl_seconds(ttl: Duration) -> u64 {
    let seconds = ttl.as_secs();
    if ttl.subsec_nanos() > 0 {
        seconds.saturating_add(1)
    } else {
        seconds.max(1)
    }
}

#[async_trait]
impl IdempotencyCache for RedisIdempotencyCache {
    async fn get(
        &self,
        cache_name: &str,
        key: &str,
    ) -> Result<CacheLookup, IdempotencyCacheError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let reply: Option<String> = redis::cmd("GET")
            .arg(namespaced_key(cache_name, key))
            .query_async(&mut *conn)
            .await
            .map_err(map_redis_error)?;
        Ok(reply.map_or(CacheLookup::Miss, CacheLookup::Hit))
    }

    async fn set_if_not_exists(
        &self,
        cache_name: &str,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> Result<ConditionalWrite, IdempotencyCacheError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        // Replies "OK" when written and nil when the key already exists.
        let reply: Option<String> = redis::cmd("SET")
            .arg(namespaced_key(cache_name, key))
            .arg(value)
            .arg("NX")
            .arg("EX")
            .arg(ttl_seconds(ttl))
            .query_async(&mut *conn)
            .await
            .map_err(map_redis_error)?;
        let write = if reply.is_some() {
            ConditionalWrite::Stored
        } else {
            ConditionalWrite::NotStored
        };
        debug!(cache_name, ?write, "redis conditional set");
        Ok(write)
    }

    async fn set(
        &self,
        cache_name: &str,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> Result<(), IdempotencyCacheError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let _: () = redis::cmd("SET")
            .arg(namespaced_key(cache_name, key))
            .arg(value)
            .arg("EX")
            .arg(ttl_seconds(ttl))
            .query_async(&mut *conn)
            .await
            .map_err(map_redis_error)?;
        Ok(())
    }

    async fn delete(&self, cache_name: &str, key: &str) -> Result<(), IdempotencyCacheError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let _: i64 = redis::cmd("DEL")
            .arg(namespaced_key(cache_name, key))
            .query_async(&mut *conn)
            .await
            .map_err(map_redis_error)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Duration::from_secs(3600), 3600)]
    #[case(Duration::from_millis(1500), 2)]
    #[case(Duration::from_millis(10), 1)]
    #[case(Duration::ZERO, 1)]
    fn ttl_rounds_up_to_whole_seconds(#[case] ttl: Duration, #[case] expected: u64) {
        assert_eq!(ttl_seconds(ttl), expected);
    }

    #[rstest]
    fn pool_faults_are_connection_errors() {
        let err = map_pool_error(PoolError::checkout("timed out"));
        assert!(matches!(err, IdempotencyCacheError::Connection { .. }));
    }

    #[rstest]
    fn server_replies_are_command_errors() {
        let err = map_redis_error(RedisError::from((
            redis::ErrorKind::UnexpectedReturnType,
            "WRONGTYPE",
        )));
        assert!(matches!(err, IdempotencyCacheError::Command { .. }));
    }

    #[rstest]
    fn io_failures_are_connection_errors() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let err = map_redis_error(RedisError::from(io));
        assert!(matches!(err, IdempotencyCacheError::Connection { .. }));
    }
}
