//! Test narrator — records speech calls instead of speaking.

use std::sync::{Arc, Mutex};

use stringart_core::speech::{Narrator, NarratorFactory};

use crate::progress::RecordingProgressStore;

/// A call made on [`RecordingNarrator`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NarratorCall {
    /// `speak` with the utterance text.
    Speak(String),
    /// `cancel`.
    Cancel,
}

/// A narrator that records every call.
///
/// When built with [`observing`](Self::observing), it also notes how many
/// saves the store had seen at the time of each `speak`, so tests can check
/// that a position is persisted before it is announced.
#[derive(Debug, Default)]
pub struct RecordingNarrator {
    calls: Mutex<Vec<NarratorCall>>,
    store: Option<Arc<RecordingProgressStore>>,
    saves_at_speech: Mutex<Vec<usize>>,
}

impl RecordingNarrator {
    /// A narrator that samples `store` on every `speak`.
    #[must_use]
    pub fn observing(store: Arc<RecordingProgressStore>) -> Self {
        Self {
            store: Some(store),
            ..Self::default()
        }
    }

    /// Returns all calls in order.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn calls(&self) -> Vec<NarratorCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Returns the texts passed to `speak`, in order.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn spoken(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                NarratorCall::Speak(text) => Some(text),
                NarratorCall::Cancel => None,
            })
            .collect()
    }

    /// Number of saves the observed store had recorded at each `speak`.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn saves_seen_at_speech(&self) -> Vec<usize> {
        self.saves_at_speech.lock().unwrap().clone()
    }
}

impl Narrator for RecordingNarrator {
    fn speak(&self, utterance: &str) {
        if let Some(store) = &self.store {
            self.saves_at_speech
                .lock()
                .unwrap()
                .push(store.saved_entries().len());
        }
        self.calls
            .lock()
            .unwrap()
            .push(NarratorCall::Speak(utterance.to_owned()));
    }

    fn cancel(&self) {
        self.calls.lock().unwrap().push(NarratorCall::Cancel);
    }
}

/// A narrator factory that hands out a fresh [`RecordingNarrator`] per call
/// and keeps them, in creation order, for inspection.
#[derive(Debug, Default)]
pub struct RecordingNarrators {
    created: Mutex<Vec<Arc<RecordingNarrator>>>,
}

impl RecordingNarrators {
    /// Returns every narrator handed out so far.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn created(&self) -> Vec<Arc<RecordingNarrator>> {
        self.created.lock().unwrap().clone()
    }
}

impl NarratorFactory for RecordingNarrators {
    fn create(&self) -> Arc<dyn Narrator> {
        let narrator = Arc::new(RecordingNarrator::default());
        self.created.lock().unwrap().push(Arc::clone(&narrator));
        narrator
    }
}
