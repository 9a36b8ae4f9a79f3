//! Test stores — mock `ProgressStore` implementations for tests.

use std::sync::Mutex;

use async_trait::async_trait;
use stringart_core::error::DomainError;
use stringart_core::progress::ProgressStore;

/// A progress store that records all `load` and `save` calls. Every `load`
/// returns the configured value, whatever the key; every `save` succeeds.
#[derive(Debug)]
pub struct RecordingProgressStore {
    load_result: Option<String>,
    loaded: Mutex<Vec<String>>,
    saved: Mutex<Vec<(String, String)>>,
}

impl RecordingProgressStore {
    /// Create a new recording store that will return `load_result` from
    /// every `load` call.
    #[must_use]
    pub fn new(load_result: Option<String>) -> Self {
        Self {
            load_result,
            loaded: Mutex::new(Vec::new()),
            saved: Mutex::new(Vec::new()),
        }
    }

    /// Returns the keys passed to `load`, in call order.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn loaded_keys(&self) -> Vec<String> {
        self.loaded.lock().unwrap().clone()
    }

    /// Returns a snapshot of all `(key, value)` pairs that were saved.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn saved_entries(&self) -> Vec<(String, String)> {
        self.saved.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProgressStore for RecordingProgressStore {
    async fn load(&self, key: &str) -> Result<Option<String>, DomainError> {
        self.loaded.lock().unwrap().push(key.to_owned());
        Ok(self.load_result.clone())
    }

    async fn save(&self, key: &str, value: &str) -> Result<(), DomainError> {
        self.saved
            .lock()
            .unwrap()
            .push((key.to_owned(), value.to_owned()));
        Ok(())
    }
}

/// A progress store that always returns an infrastructure error. Useful for
/// testing that persistence failures stay non-fatal.
#[derive(Debug)]
pub struct FailingProgressStore;

#[async_trait]
impl ProgressStore for FailingProgressStore {
    async fn load(&self, _key: &str) -> Result<Option<String>, DomainError> {
        Err(DomainError::Infrastructure("storage unavailable".into()))
    }

    async fn save(&self, _key: &str, _value: &str) -> Result<(), DomainError> {
        Err(DomainError::Infrastructure("storage unavailable".into()))
    }
}
