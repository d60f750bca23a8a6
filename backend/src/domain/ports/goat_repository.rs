//! Port abstraction for persisting goats.
//!
//! The primary store is an external collaborator; the registration use-case
//! only needs to hand it a fully built [`Goat`].

use async_trait::async_trait;

use crate::domain::Goat;

/// Errors raised by goat repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GoatRepositoryError {
    /// Repository connection could not be established.
    #[error("goat repository connection failed: {message}")]
    Connection {
        /// Adapter diagnostic.
        message: String,
    },
    /// The write was rejected.
    #[error("goat repository write failed: {message}")]
    Write {
        /// Adapter diagnostic.
        message: String,
    },
}

impl GoatRepositoryError {
    /// Create a connection error with the given message.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Create a write error with the given message.
    pub fn write(message: impl Into<String>) -> Self {
        Self::Write {
            message: message.into(),
        }
    }
}

/// Port for goat persistence.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GoatRepository: Send + Sync {
    /// Persist a newly created goat.
    async fn persist(&self, goat: &Goat) -> Result<(), GoatRepositoryError>;
}
