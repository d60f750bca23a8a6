//! Idempotency cache adapters.
//!
//! - [`RedisIdempotencyCache`]: shared store for multi-instance deployments,
//!   backed by a `bb8-redis` pool.
//! - [`InMemoryIdempotencyCache`]: process-local store for tests and
//!   single-instance local runs.

mod in_memory_idempotency_cache;
mod pool;
mod redis_idempotency_cache;

pub use in_memory_idempotency_cache::InMemoryIdempotencyCache;
pub use pool::{PoolError, RedisPool, RedisPoolConfig};
pub use redis_idempotency_cache::RedisIdempotencyCache;
