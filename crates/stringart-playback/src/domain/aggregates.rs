//! Aggregate root for the Sequence Playback context.

use stringart_core::clock::Clock;
use stringart_core::event::EventMetadata;
use uuid::Uuid;

use super::commands::StepOrigin;
use super::events::{
    AutoplayStarted, AutoplayStopped, PlaybackEvent, PlaybackEventKind, StepChanged, StopReason,
};
use super::layout::{BoardLayout, QuadrantCoordinate};
use super::sequence::ThreadSequence;

/// Autoplay state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoplayState {
    /// No timer running.
    Idle,
    /// A timer advances the session at a fixed interval.
    Playing,
}

/// Playback position and autoplay state for one session.
///
/// `current_index` is always a valid step of `sequence`. State only changes
/// by applying events; every recorded event is kept until the engine drains
/// it with [`take_uncommitted_events`](Self::take_uncommitted_events).
#[derive(Debug)]
pub struct PlaybackSession {
    /// Session link (`uniqueLink`).
    link: String,
    sequence: ThreadSequence,
    layout: BoardLayout,
    current_index: usize,
    autoplay: AutoplayState,
    /// Number of events applied.
    version: i64,
    /// Events not yet handled by the engine.
    uncommitted_events: Vec<PlaybackEvent>,
}

impl PlaybackSession {
    /// Opens a session at `saved_index`, or at step 0 when nothing was saved
    /// or the saved index does not fit the sequence.
    #[must_use]
    pub fn resume(
        link: impl Into<String>,
        sequence: ThreadSequence,
        layout: BoardLayout,
        saved_index: Option<usize>,
    ) -> Self {
        let current_index = saved_index
            .filter(|index| *index < sequence.len())
            .unwrap_or(0);
        Self {
            link: link.into(),
            sequence,
            layout,
            current_index,
            autoplay: AutoplayState::Idle,
            version: 0,
            uncommitted_events: Vec::new(),
        }
    }

    #[must_use]
    pub fn link(&self) -> &str {
        &self.link
    }

    #[must_use]
    pub fn sequence(&self) -> &ThreadSequence {
        &self.sequence
    }

    #[must_use]
    pub fn layout(&self) -> &BoardLayout {
        &self.layout
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// Pin value at the current step.
    #[must_use]
    pub fn current_pin(&self) -> u32 {
        self.sequence.pin(self.current_index).unwrap_or_default()
    }

    /// Quadrant coordinate of the current pin.
    #[must_use]
    pub fn coordinate(&self) -> QuadrantCoordinate {
        self.layout.locate(self.current_pin())
    }

    #[must_use]
    pub fn autoplay(&self) -> AutoplayState {
        self.autoplay
    }

    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.autoplay == AutoplayState::Playing
    }

    #[must_use]
    pub fn version(&self) -> i64 {
        self.version
    }

    /// Events recorded since the last drain.
    #[must_use]
    pub fn uncommitted_events(&self) -> &[PlaybackEvent] {
        &self.uncommitted_events
    }

    /// Removes and returns the events recorded since the last drain.
    pub fn take_uncommitted_events(&mut self) -> Vec<PlaybackEvent> {
        std::mem::take(&mut self.uncommitted_events)
    }

    /// Advances one step. Returns `true` if the position changed.
    ///
    /// A manual step stops autoplay before moving. A timer step at the final
    /// index completes autoplay instead of moving; a timer step while idle is
    /// ignored.
    pub fn step_forward(
        &mut self,
        origin: StepOrigin,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> bool {
        match origin {
            StepOrigin::Manual => {
                self.stop_autoplay(StopReason::ManualNavigation, correlation_id, clock);
            }
            StepOrigin::Autoplay if !self.is_playing() => return false,
            StepOrigin::Autoplay => {}
        }

        if self.current_index >= self.sequence.last_index() {
            self.stop_autoplay(StopReason::Completed, correlation_id, clock);
            return false;
        }
        self.move_to(self.current_index + 1, correlation_id, clock);
        true
    }

    /// Goes back one step, stopping autoplay first. Returns `true` if the
    /// position changed.
    pub fn step_back(&mut self, correlation_id: Uuid, clock: &dyn Clock) -> bool {
        self.stop_autoplay(StopReason::ManualNavigation, correlation_id, clock);

        if self.current_index == 0 {
            return false;
        }
        self.move_to(self.current_index - 1, correlation_id, clock);
        true
    }

    /// Moves to `index`, stopping autoplay first. An index past the end
    /// moves to step 0. Returns `true` if the position changed.
    pub fn jump_to(&mut self, index: usize, correlation_id: Uuid, clock: &dyn Clock) -> bool {
        self.stop_autoplay(StopReason::ManualNavigation, correlation_id, clock);

        let target = if index < self.sequence.len() { index } else { 0 };
        if target == self.current_index {
            return false;
        }
        self.move_to(target, correlation_id, clock);
        true
    }

    /// Enters `Playing`. Returns `false` if autoplay was already active.
    pub fn start_autoplay(&mut self, correlation_id: Uuid, clock: &dyn Clock) -> bool {
        if self.is_playing() {
            return false;
        }
        self.record(
            PlaybackEventKind::AutoplayStarted(AutoplayStarted {
                at_index: self.current_index,
            }),
            correlation_id,
            clock,
        );
        true
    }

    /// Enters `Idle`. Returns `false` if autoplay was not active.
    pub fn stop_autoplay(
        &mut self,
        reason: StopReason,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> bool {
        if !self.is_playing() {
            return false;
        }
        self.record(
            PlaybackEventKind::AutoplayStopped(AutoplayStopped {
                at_index: self.current_index,
                reason,
            }),
            correlation_id,
            clock,
        );
        true
    }

    fn move_to(&mut self, to_index: usize, correlation_id: Uuid, clock: &dyn Clock) {
        let pin = self.sequence.pin(to_index).unwrap_or_default();
        self.record(
            PlaybackEventKind::StepChanged(StepChanged {
                from_index: self.current_index,
                to_index,
                pin,
                during_autoplay: self.is_playing(),
            }),
            correlation_id,
            clock,
        );
    }

    fn record(&mut self, kind: PlaybackEventKind, correlation_id: Uuid, clock: &dyn Clock) {
        let event = PlaybackEvent {
            metadata: EventMetadata {
                event_id: Uuid::new_v4(),
                event_type: kind.event_type().to_owned(),
                session_link: self.link.clone(),
                sequence_number: self.version + 1,
                correlation_id,
                occurred_at: clock.now(),
            },
            kind,
        };
        self.apply(&event);
        self.uncommitted_events.push(event);
    }

    fn apply(&mut self, event: &PlaybackEvent) {
        match &event.kind {
            PlaybackEventKind::StepChanged(payload) => {
                self.current_index = payload.to_index;
            }
            PlaybackEventKind::AutoplayStarted(_) => {
                self.autoplay = AutoplayState::Playing;
            }
            PlaybackEventKind::AutoplayStopped(_) => {
                self.autoplay = AutoplayState::Idle;
            }
        }
        self.version += 1;
    }
}
