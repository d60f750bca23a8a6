//! Cache credential sources.
//!
//! The credential is fetched once at startup and injected into the Redis
//! pool; nothing in the request path reads secrets.

mod cached;
mod env;
mod secret_file;

pub use cached::CachedCredentialSource;
pub use env::EnvCredentialSource;
pub use secret_file::{AUTH_TOKEN_FIELD, SecretFileCredentialSource};
