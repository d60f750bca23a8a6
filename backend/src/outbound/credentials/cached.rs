//! Credential source that fetches once and reuses the result.

use async_trait::async_trait;
use tokio::sync::OnceCell;

use crate::domain::ports::{CacheCredential, CacheCredentialSource, CredentialError};

/// Wraps another source so the secret is fetched at most once per process.
///
/// A failed fetch is not cached; the next caller tries again.
pub struct CachedCredentialSource<S> {
    inner: S,
    credential: OnceCell<CacheCredential>,
}

impl<S> CachedCredentialSource<S> {
    /// Wrap `inner`.
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            credential: OnceCell::new(),
        }
    }
}

#[async_trait]
impl<S> CacheCredentialSource for CachedCredentialSource<S>
where
    S: CacheCredentialSource,
{
    async fn fetch(&self) -> Result<CacheCredential, CredentialError> {
        self.credential
            .get_or_try_init(|| self.inner.fetch())
            .await
            .cloned()
    }
}
