//! Credential source reading a mounted JSON secret document.
//!
//! The document carries the token under `auth_token`:
//!
//! ```text
//! { "auth_token": "..." }
//! ```

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use cap_std::{ambient_authority, fs::Dir};
use serde::Deserialize;
use tracing::debug;
use zeroize::Zeroizing;

use crate::domain::ports::{CacheCredential, CacheCredentialSource, CredentialError};

/// Field holding the token inside the secret document.
pub const AUTH_TOKEN_FIELD: &str = "auth_token";

#[derive(Deserialize)]
struct SecretDocument {
    auth_token: Option<String>,
}

/// Reads the cache token from a JSON secret file.
#[derive(Debug, Clone)]
pub struct SecretFileCredentialSource {
    path: PathBuf,
}

impl SecretFileCredentialSource {
    /// Create a source reading from `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the secret document.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_document(&self) -> Result<Zeroizing<String>, CredentialError> {
        let unavailable = |message: String| {
            CredentialError::unavailable(format!("{}: {message}", self.path.display()))
        };
        let parent = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let file_name = self
            .path
            .file_name()
            .ok_or_else(|| unavailable("path has no file name".to_owned()))?;

        let dir = Dir::open_ambient_dir(parent, ambient_authority())
            .map_err(|err| unavailable(err.to_string()))?;
        dir.read_to_string(Path::new(file_name))
            .map(Zeroizing::new)
            .map_err(|err| unavailable(err.to_string()))
    }
}

#[async_trait]
impl CacheCredentialSource for SecretFileCredentialSource {
    async fn fetch(&self) -> Result<CacheCredential, CredentialError> {
        let raw = self.read_document()?;
        let document: SecretDocument = serde_json::from_str(&raw)
            .map_err(|err| CredentialError::malformed(format!("secret is not JSON: {err}")))?;
        let token = document
            .auth_token
            .filter(|token| !token.trim().is_empty())
            .ok_or_else(|| {
                CredentialError::malformed(format!("secret has no `{AUTH_TOKEN_FIELD}` value"))
            })?;
        debug!(path = %self.path.display(), "loaded cache credential from secret file");
        Ok(CacheCredential::new(token))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use rstest::rstest;
    use tempfile::NamedTempFile;

    fn secret_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("temp file");
        file.write_all(contents.as_bytes()).expect("write secret");
        file
    }

    #[rstest]
    #[tokio::test]
    async fn reads_auth_token_from_document() {
        let file = secret_file(r#"{"auth_token": "tok-123", "other": 1}"#);
        let credential = SecretFileCredentialSource::new(file.path())
            .fetch()
            .await
            .expect("credential loads");
        assert_eq!(credential.expose(), "tok-123");
    }

    #[rstest]
    #[case::not_json("auth_token=tok")]
    #[case::missing_field(r#"{"token": "tok"}"#)]
    #[case::blank_field(r#"{"auth_token": "  "}"#)]
    #[tokio::test]
    async fn rejects_malformed_documents(#[case] contents: &str) {
        let file = secret_file(contents);
        let err = SecretFileCredentialSource::new(file.path())
            .fetch()
            .await
            .expect_err("document is malformed");
        assert!(matches!(err, CredentialError::Malformed { .. }));
    }

    #[rstest]
    #[tokio::test]
    async fn missing_file_is_unavailable() {
        let dir = tempfile::tempdir().expect("temp dir");
        let err = SecretFileCredentialSource::new(dir.path().join("absent.json"))
            .fetch()
            .await
            .expect_err("file is missing");
        assert!(matches!(err, CredentialError::Unavailable { .. }));
    }

    #[rstest]
    fn credential_debug_is_redacted() {
        assert_eq!(
            format!("{:?}", CacheCredential::new("tok-123")),
            "CacheCredential(<redacted>)"
        );
    }
}
