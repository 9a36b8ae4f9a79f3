//! Shared test fakes and utilities for the string art viewer.

mod clock;
mod narrator;
mod progress;
mod source;

pub use clock::FixedClock;
pub use narrator::{NarratorCall, RecordingNarrator, RecordingNarrators};
pub use progress::{FailingProgressStore, RecordingProgressStore};
pub use source::{FailingThreadSource, StaticThreadSource};
