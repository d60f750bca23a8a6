//! Goat records created through the registration use-case.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Validation errors for goat drafts.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GoatValidationError {
    /// The name was missing or blank.
    #[error("goat name must not be empty")]
    EmptyName,
    /// The name exceeded the maximum length.
    #[error("goat name must be at most {max} characters")]
    NameTooLong {
        /// Maximum number of characters accepted.
        max: usize,
    },
}

/// Time-ordered goat identifier (UUID v7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GoatId(Uuid);

impl GoatId {
    /// Generate a new identifier; later identifiers sort after earlier ones.
    pub fn generate() -> Self {
        Self(Uuid::now_v7())
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for GoatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Client-supplied goat attributes.
///
/// This is also the payload fingerprinted for idempotency, so field names are
/// part of the wire contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoatDraft {
    /// Display name of the goat.
    pub name: String,
    /// Breed, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breed: Option<String>,
    /// Owner, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
}

impl GoatDraft {
    /// Maximum name length in characters.
    pub const MAX_NAME_LEN: usize = 128;

    /// Check the draft before it is persisted.
    ///
    /// # Errors
    ///
    /// Returns [`GoatValidationError`] when the name is blank or too long.
    pub fn validate(&self) -> Result<(), GoatValidationError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(GoatValidationError::EmptyName);
        }
        if name.chars().count() > Self::MAX_NAME_LEN {
            return Err(GoatValidationError::NameTooLong {
                max: Self::MAX_NAME_LEN,
            });
        }
        Ok(())
    }
}

/// Persisted goat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Goat {
    /// Identifier assigned at creation.
    pub id: GoatId,
    /// Display name, trimmed.
    pub name: String,
    /// Breed, if known.
    pub breed: Option<String>,
    /// Owner, if known.
    pub owner: Option<String>,
    /// Creation timestamp taken from the service clock.
    pub created_at: DateTime<Utc>,
}

impl Goat {
    /// Build a new goat from a validated draft.
    pub fn from_draft(draft: GoatDraft, created_at: DateTime<Utc>) -> Self {
        Self {
            id: GoatId::generate(),
            name: draft.name.trim().to_owned(),
            breed: draft.breed,
            owner: draft.owner,
            created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn draft(name: &str) -> GoatDraft {
        GoatDraft {
            name: name.to_owned(),
            breed: None,
            owner: None,
        }
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    fn blank_names_are_rejected(#[case] name: &str) {
        assert_eq!(draft(name).validate(), Err(GoatValidationError::EmptyName));
    }

    #[rstest]
    fn overlong_names_are_rejected() {
        let name = "g".repeat(GoatDraft::MAX_NAME_LEN + 1);
        assert!(matches!(
            draft(&name).validate(),
            Err(GoatValidationError::NameTooLong { .. })
        ));
    }

    #[rstest]
    fn goat_from_draft_trims_name() {
        let goat = Goat::from_draft(draft("  Billy "), Utc::now());
        assert_eq!(goat.name, "Billy");
    }

    #[rstest]
    fn identifiers_are_uuid_v7() {
        let id = GoatId::generate();
        assert_eq!(id.as_uuid().get_version_num(), 7);
    }

    #[rstest]
    fn draft_deserialises_camel_case_without_optional_fields() {
        let parsed: GoatDraft =
            serde_json::from_str(r#"{"name":"G1"}"#).expect("draft should parse");
        assert_eq!(parsed, draft("G1"));
    }
}
