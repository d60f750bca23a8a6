//! Process-local goat repository.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::domain::ports::{GoatRepository, GoatRepositoryError};
use crate::domain::{Goat, GoatId};

/// In-memory [`GoatRepository`] keyed by goat identifier.
#[derive(Debug, Default)]
pub struct InMemoryGoatRepository {
    goats: RwLock<HashMap<GoatId, Goat>>,
}

impl InMemoryGoatRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a stored goat.
    pub fn find(&self, id: &GoatId) -> Option<Goat> {
        self.goats.read().ok()?.get(id).cloned()
    }

    /// Number of stored goats.
    pub fn len(&self) -> usize {
        self.goats.read().map_or(0, |goats| goats.len())
    }

    /// Whether no goats are stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl GoatRepository for InMemoryGoatRepository {
    async fn persist(&self, goat: &Goat) -> Result<(), GoatRepositoryError> {
        let mut goats = self
            .goats
            .write()
            .map_err(|_| GoatRepositoryError::write("goat store lock poisoned"))?;
        if goats.contains_key(&goat.id) {
            return Err(GoatRepositoryError::write(format!(
                "goat {} already exists",
                goat.id
            )));
        }
        goats.insert(goat.id, goat.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::GoatDraft;
    use crate::test_support::fixture_timestamp;
    use rstest::rstest;

    fn goat(name: &str) -> Goat {
        Goat::from_draft(
            GoatDraft {
                name: name.to_owned(),
                breed: Some("Saanen".to_owned()),
                owner: None,
            },
            fixture_timestamp(),
        )
    }

    #[rstest]
    #[tokio::test]
    async fn persisted_goats_can_be_found() {
        let repository = InMemoryGoatRepository::new();
        let goat = goat("Clover");

        repository.persist(&goat).await.expect("persist succeeds");

        assert_eq!(repository.find(&goat.id), Some(goat));
        assert_eq!(repository.len(), 1);
    }

    #[rstest]
    #[tokio::test]
    async fn duplicate_identifiers_are_rejected() {
        let repository = InMemoryGoatRepository::new();
        let goat = goat("Clover");
        repository.persist(&goat).await.expect("first persist");

        let err = repository
            .persist(&goat)
            .await
            .expect_err("duplicate rejected");
        assert!(matches!(err, GoatRepositoryError::Write { .. }));
    }
}
