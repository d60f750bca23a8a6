//! HTTP inbound adapter exposing REST endpoints.

pub mod error;
pub mod goats;
pub mod health;
pub mod idempotency;
pub mod orders;
pub mod schemas;
pub mod state;

pub use error::ApiResult;
