//! Resume-state persistence abstraction.

use async_trait::async_trait;

use crate::error::DomainError;

/// Key-value store holding per-session resume state.
///
/// Keys and values are opaque strings; the playback engine decides the key
/// format and the encoding of the stored position.
#[async_trait]
pub trait ProgressStore: Send + Sync {
    /// Load the value stored under `key`, or `None` if nothing was saved.
    async fn load(&self, key: &str) -> Result<Option<String>, DomainError>;

    /// Store `value` under `key`, replacing any previous value.
    async fn save(&self, key: &str, value: &str) -> Result<(), DomainError>;
}
