//! Key-value store abstraction.
//!
//! The session is persisted as a handful of string-keyed, string-valued
//! entries. Values are opaque to the store; the draw context encodes them.

use async_trait::async_trait;

use crate::error::DomainError;

/// Repository trait for loading and saving string values by key.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Load the value stored under `key`, or `None` if it was never saved.
    async fn load(&self, key: &str) -> Result<Option<String>, DomainError>;

    /// Save `value` under `key`, replacing any previous value.
    async fn save(&self, key: &str, value: &str) -> Result<(), DomainError>;

    /// Save several entries. The default saves them one at a time; stores
    /// that can write a batch in one step should override it.
    async fn save_all(&self, entries: &[(&str, String)]) -> Result<(), DomainError> {
        for (key, value) in entries {
            self.save(key, value).await?;
        }
        Ok(())
    }
}
