//! Domain events for the Sequence Playback context.

use serde::{Deserialize, Serialize};
use stringart_core::event::{DomainEvent, EventMetadata};

/// Emitted when the current step changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepChanged {
    /// Step index before the change.
    pub from_index: usize,
    /// Step index after the change.
    pub to_index: usize,
    /// Pin value at the new step.
    pub pin: u32,
    /// Whether autoplay was active when the step happened.
    pub during_autoplay: bool,
}

/// Emitted when autoplay starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoplayStarted {
    /// Step index playback starts from.
    pub at_index: usize,
}

/// Why autoplay left the playing state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// Explicit pause.
    Paused,
    /// The user stepped or jumped by hand.
    ManualNavigation,
    /// The timer reached the final step.
    Completed,
    /// The engine was torn down.
    Disposed,
}

/// Emitted when autoplay stops.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoplayStopped {
    /// Step index playback stopped at.
    pub at_index: usize,
    /// Why playback stopped.
    pub reason: StopReason,
}

/// Event type identifier for [`StepChanged`].
pub const STEP_CHANGED_EVENT_TYPE: &str = "playback.step_changed";

/// Event type identifier for [`AutoplayStarted`].
pub const AUTOPLAY_STARTED_EVENT_TYPE: &str = "playback.autoplay_started";

/// Event type identifier for [`AutoplayStopped`].
pub const AUTOPLAY_STOPPED_EVENT_TYPE: &str = "playback.autoplay_stopped";

/// Event payload variants for the Sequence Playback context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackEventKind {
    /// The current step changed.
    StepChanged(StepChanged),
    /// Autoplay started.
    AutoplayStarted(AutoplayStarted),
    /// Autoplay stopped.
    AutoplayStopped(AutoplayStopped),
}

impl PlaybackEventKind {
    /// Event type name for this payload.
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::StepChanged(_) => STEP_CHANGED_EVENT_TYPE,
            Self::AutoplayStarted(_) => AUTOPLAY_STARTED_EVENT_TYPE,
            Self::AutoplayStopped(_) => AUTOPLAY_STOPPED_EVENT_TYPE,
        }
    }
}

/// Domain event envelope for the Sequence Playback context.
#[derive(Debug, Clone)]
pub struct PlaybackEvent {
    /// Event metadata.
    pub metadata: EventMetadata,
    /// Event-specific payload.
    pub kind: PlaybackEventKind,
}

impl DomainEvent for PlaybackEvent {
    fn event_type(&self) -> &'static str {
        self.kind.event_type()
    }

    fn metadata(&self) -> &EventMetadata {
        &self.metadata
    }
}
