//! Thread sequence source abstraction.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Metadata about the owner of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Display name.
    pub name: String,
}

/// Supplier of the precomputed pin sequence and user metadata for a session.
#[async_trait]
pub trait ThreadSource: Send + Sync {
    /// Fetch the ordered pin-index sequence for `link`.
    async fn fetch_sequence(&self, link: &str) -> Result<Vec<u32>, DomainError>;

    /// Fetch the user metadata for `link`.
    async fn fetch_user(&self, link: &str) -> Result<UserProfile, DomainError>;
}
