//! Idempotent request admission backed by a TTL key-value cache.
//!
//! The [`domain::IdempotencyGate`] decides whether a keyed request may run,
//! must wait, conflicts with an earlier payload, or can be answered from a
//! stored result. Adapters for Redis, an in-memory cache, and actix-web live
//! under [`outbound`] and [`inbound`].

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod outbound;
pub mod settings;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
