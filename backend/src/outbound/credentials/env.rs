//! Credential source reading the token from an environment variable.

use async_trait::async_trait;

use crate::domain::ports::{CacheCredential, CacheCredentialSource, CredentialError};

/// Reads the cache token from a named environment variable.
///
/// Intended for local runs where no secret file is mounted.
#[derive(Debug, Clone)]
pub struct EnvCredentialSource {
    variable: String,
}

impl EnvCredentialSource {
    /// Create a source reading `variable`.
    pub fn new(variable: impl Into<String>) -> Self {
        Self {
            variable: variable.into(),
        }
    }
}

#[async_trait]
impl CacheCredentialSource for EnvCredentialSource {
    async fn fetch(&self) -> Result<CacheCredential, CredentialError> {
        let token = std::env::var(&self.variable).map_err(|err| {
            CredentialError::unavailable(format!("{}: {err}", self.variable))
        })?;
        if token.trim().is_empty() {
            return Err(CredentialError::malformed(format!(
                "{} is empty",
                self.variable
            )));
        }
        Ok(CacheCredential::new(token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use env_lock::lock_env;
    use rstest::rstest;

    const VAR: &str = "GATEKEEPER_TEST_CACHE_TOKEN";

    #[rstest]
    #[tokio::test]
    async fn reads_token_from_variable() {
        let _guard = lock_env([(VAR, Some("tok-env".to_owned()))]);
        let credential = EnvCredentialSource::new(VAR)
            .fetch()
            .await
            .expect("credential loads");
        assert_eq!(credential.expose(), "tok-env");
    }

    #[rstest]
    #[tokio::test]
    async fn missing_variable_is_unavailable() {
        let _guard = lock_env([(VAR, None::<String>)]);
        let err = EnvCredentialSource::new(VAR)
            .fetch()
            .await
            .expect_err("variable is unset");
        assert!(matches!(err, CredentialError::Unavailable { .. }));
    }

    #[rstest]
    #[tokio::test]
    async fn blank_variable_is_malformed() {
        let _guard = lock_env([(VAR, Some(" ".to_owned()))]);
        let err = EnvCredentialSource::new(VAR)
            .fetch()
            .await
            .expect_err("variable is blank");
        assert!(matches!(err, CredentialError::Malformed { .. }));
    }
}
