//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! This module follows the hexagonal architecture pattern, providing concrete
//! implementations of domain port traits:
//!
//! - **cache**: Redis-backed and in-memory idempotency caches
//! - **credentials**: cache credential sources (secret file, environment)
//! - **persistence**: goat repository
//! - **metrics**: Prometheus-backed admission metrics (feature-gated)
//!
//! Adapters are thin translators that convert between domain types and
//! infrastructure-specific representations. They contain no business logic.

pub mod cache;
pub mod credentials;
#[cfg(feature = "metrics")]
pub mod metrics;
pub mod persistence;
