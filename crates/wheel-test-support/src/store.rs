//! Test stores: mock `KeyValueStore` implementations for tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use wheel_core::error::DomainError;
use wheel_core::store::KeyValueStore;

/// An in-memory store that records every `save` call in order, so tests can
/// assert both the final contents and that a save happened at all.
#[derive(Debug, Default)]
pub struct RecordingStore {
    entries: Mutex<HashMap<String, String>>,
    saves: Mutex<Vec<(String, String)>>,
}

impl RecordingStore {
    /// Create an empty recording store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with `entries`, as if a previous session
    /// had saved them. Seeding is not recorded as a save.
    #[must_use]
    pub fn with_entries(entries: &[(&str, &str)]) -> Self {
        let store = Self::new();
        {
            let mut map = store.entries.lock().unwrap();
            for (key, value) in entries {
                map.insert((*key).to_owned(), (*value).to_owned());
            }
        }
        store
    }

    /// Returns the current value under `key`.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().unwrap().get(key).cloned()
    }

    /// Returns a snapshot of all `(key, value)` pairs saved so far.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn saves(&self) -> Vec<(String, String)> {
        self.saves.lock().unwrap().clone()
    }

    /// Returns how many saves have been recorded.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn save_count(&self) -> usize {
        self.saves.lock().unwrap().len()
    }
}

#[async_trait]
impl KeyValueStore for RecordingStore {
    async fn load(&self, key: &str) -> Result<Option<String>, DomainError> {
        Ok(self.entries.lock().unwrap().get(key).cloned())
    }

    async fn save(&self, key: &str, value: &str) -> Result<(), DomainError> {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_owned(), value.to_owned());
        self.saves
            .lock()
            .unwrap()
            .push((key.to_owned(), value.to_owned()));
        Ok(())
    }
}

/// A store that always returns an infrastructure error. Useful for testing
/// error-handling paths.
#[derive(Debug)]
pub struct FailingStore;

#[async_trait]
impl KeyValueStore for FailingStore {
    async fn load(&self, _key: &str) -> Result<Option<String>, DomainError> {
        Err(DomainError::Infrastructure("disk unavailable".into()))
    }

    async fn save(&self, _key: &str, _value: &str) -> Result<(), DomainError> {
        Err(DomainError::Infrastructure("disk unavailable".into()))
    }
}
