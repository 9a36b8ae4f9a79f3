//! The playback engine: one session, its autoplay timer and side effects.
//!
//! The engine wraps a [`PlaybackSession`] with everything the domain model
//! does not do by itself: loading the sequence, reading and writing resume
//! state, running the autoplay timer, narrating steps and publishing render
//! descriptors. All state sits behind one async mutex, so commands from the
//! UI and timer ticks are applied one at a time.
//!
//! Side effects follow the events the session records, in order: a step is
//! persisted, then published, then narrated; a stop cancels the timer and
//! any utterance in flight.

use std::fmt;
use std::sync::{Arc, Weak};
use std::time::Duration;

use stringart_core::clock::Clock;
use stringart_core::command::Command;
use stringart_core::error::DomainError;
use stringart_core::progress::ProgressStore;
use stringart_core::source::{ThreadSource, UserProfile};
use stringart_core::speech::{Narrator, NarratorFactory};
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::application::query_handlers::{PlaybackView, RenderDescriptor, render_descriptor};
use crate::domain::aggregates::PlaybackSession;
use crate::domain::commands::{
    JumpToStep, StartAutoplay, StepBack, StepForward, StepOrigin, StopAutoplay,
};
use crate::domain::controls::Control;
use crate::domain::events::{PlaybackEventKind, StopReason};
use crate::domain::layout::BoardLayout;
use crate::domain::narration::step_announcement;
use crate::domain::sequence::ThreadSequence;

/// Key under which the resume position of `link` is stored.
#[must_use]
pub fn progress_key(link: &str) -> String {
    format!("threadProgress_{link}")
}

/// Collaborators the engine calls out to.
#[derive(Clone)]
pub struct EnginePorts {
    /// Supplier of the pin sequence and user metadata.
    pub source: Arc<dyn ThreadSource>,
    /// Resume-state store.
    pub store: Arc<dyn ProgressStore>,
    /// Speech capability; `None` when the platform has none. Each engine
    /// takes its own narrator from the factory.
    pub narrators: Option<Arc<dyn NarratorFactory>>,
    /// Timestamps for playback events.
    pub clock: Arc<dyn Clock>,
}

impl fmt::Debug for EnginePorts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnginePorts")
            .field("narration", &self.narrators.is_some())
            .finish_non_exhaustive()
    }
}

/// Static engine settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Board geometry every loaded sequence is validated against.
    pub layout: BoardLayout,
    /// Period of the autoplay timer.
    pub autoplay_interval: Duration,
}

impl EngineConfig {
    /// Autoplay period used unless configured otherwise.
    pub const DEFAULT_AUTOPLAY_INTERVAL: Duration = Duration::from_millis(8_000);

    /// Settings for `layout` with the default autoplay period.
    #[must_use]
    pub fn new(layout: BoardLayout) -> Self {
        Self {
            layout,
            autoplay_interval: Self::DEFAULT_AUTOPLAY_INTERVAL,
        }
    }

    /// Replaces the autoplay period.
    #[must_use]
    pub fn with_autoplay_interval(mut self, interval: Duration) -> Self {
        self.autoplay_interval = interval;
        self
    }
}

/// Playback engine for a single viewing session.
///
/// Navigation calls return the new [`RenderDescriptor`], or `None` while no
/// sequence is loaded; such calls are ignored.
pub struct PlaybackEngine {
    state: Arc<Mutex<EngineState>>,
    renders: watch::Receiver<Option<RenderDescriptor>>,
}

impl fmt::Debug for PlaybackEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlaybackEngine").finish_non_exhaustive()
    }
}

impl PlaybackEngine {
    /// Creates an engine with nothing loaded.
    #[must_use]
    pub fn new(ports: EnginePorts, config: EngineConfig) -> Self {
        let (renders_tx, renders) = watch::channel(None);
        let narrator = ports.narrators.as_ref().map(|factory| factory.create());
        let state = EngineState {
            ports,
            narrator,
            config,
            link: None,
            user: None,
            load_error: None,
            session: None,
            autoplay_task: None,
            renders: renders_tx,
        };
        Self {
            state: Arc::new(Mutex::new(state)),
            renders,
        }
    }

    /// Creates an engine and loads `link` into it.
    ///
    /// A failed load is kept as [`PlaybackView::load_error`]; the engine is
    /// still returned and ignores navigation.
    pub async fn init(link: &str, ports: EnginePorts, config: EngineConfig) -> Self {
        let engine = Self::new(ports, config);
        // Failure is recorded on the engine.
        let _ = engine.load(link).await;
        engine
    }

    /// Fetches the sequence and user metadata for `link` and positions the
    /// session at its saved step. Any previous session is disposed first.
    ///
    /// # Errors
    ///
    /// Returns `DomainError` if either fetch fails or the sequence does not
    /// fit the configured board. The engine is left unloaded.
    #[instrument(skip(self))]
    pub async fn load(&self, link: &str) -> Result<RenderDescriptor, DomainError> {
        let mut state = self.state.lock().await;
        state.load(link).await
    }

    /// Advances one step, stopping autoplay first.
    pub async fn next(&self) -> Option<RenderDescriptor> {
        let command = StepForward {
            correlation_id: Uuid::new_v4(),
            origin: StepOrigin::Manual,
        };
        let mut state = self.state.lock().await;
        state
            .execute(&command, |session, correlation_id, clock| {
                session.step_forward(command.origin, correlation_id, clock)
            })
            .await
    }

    /// Goes back one step, stopping autoplay first.
    pub async fn previous(&self) -> Option<RenderDescriptor> {
        let command = StepBack {
            correlation_id: Uuid::new_v4(),
        };
        let mut state = self.state.lock().await;
        state
            .execute(&command, |session, correlation_id, clock| {
                session.step_back(correlation_id, clock)
            })
            .await
    }

    /// Moves to step `index`; an index past the end moves to step 0.
    pub async fn jump_to(&self, index: usize) -> Option<RenderDescriptor> {
        let command = JumpToStep {
            correlation_id: Uuid::new_v4(),
            index,
        };
        let mut state = self.state.lock().await;
        state
            .execute(&command, |session, correlation_id, clock| {
                session.jump_to(command.index, correlation_id, clock)
            })
            .await
    }

    /// Starts autoplay. Does nothing if autoplay is already running.
    pub async fn play(&self) -> Option<RenderDescriptor> {
        let command = StartAutoplay {
            correlation_id: Uuid::new_v4(),
        };
        let mut state = self.state.lock().await;
        let render = state
            .execute(&command, |session, correlation_id, clock| {
                session.start_autoplay(correlation_id, clock)
            })
            .await?;

        if state.autoplay_task.is_none() && state.is_playing() {
            let period = state.config.autoplay_interval;
            state.autoplay_task = Some(spawn_autoplay(Arc::downgrade(&self.state), period));
        }
        Some(render)
    }

    /// Stops autoplay and any utterance in flight.
    pub async fn pause(&self) -> Option<RenderDescriptor> {
        let command = StopAutoplay {
            correlation_id: Uuid::new_v4(),
        };
        let mut state = self.state.lock().await;
        state
            .execute(&command, |session, correlation_id, clock| {
                session.stop_autoplay(StopReason::Paused, correlation_id, clock)
            })
            .await
    }

    /// Runs a control from the UI.
    pub async fn apply(&self, control: Control) -> Option<RenderDescriptor> {
        match control {
            Control::Next => self.next().await,
            Control::Previous => self.previous().await,
            Control::Play => self.play().await,
            Control::Pause => self.pause().await,
        }
    }

    /// Runs the control bound to keyboard `key`; unbound keys are ignored.
    pub async fn handle_key(&self, key: &str) -> Option<RenderDescriptor> {
        match Control::from_key(key) {
            Some(control) => self.apply(control).await,
            None => {
                debug!(key, "ignoring unbound key");
                None
            }
        }
    }

    /// Whether autoplay is running.
    pub async fn is_playing(&self) -> bool {
        self.state.lock().await.is_playing()
    }

    /// Snapshot of the engine for status queries.
    pub async fn view(&self) -> PlaybackView {
        let state = self.state.lock().await;
        PlaybackView {
            link: state.link.clone(),
            user_name: state.user.as_ref().map(|user| user.name.clone()),
            loaded: state.session.is_some(),
            load_error: state.load_error.clone(),
            is_playing: state.is_playing(),
            render: state.current_render(),
        }
    }

    /// Receiver that sees every published render, including timer steps.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<RenderDescriptor>> {
        self.renders.clone()
    }

    /// Stops the timer, silences narration and unloads the session.
    pub async fn dispose(&self) {
        let mut state = self.state.lock().await;
        state.teardown().await;
        state.link = None;
        state.load_error = None;
    }
}

struct EngineState {
    ports: EnginePorts,
    narrator: Option<Arc<dyn Narrator>>,
    config: EngineConfig,
    link: Option<String>,
    user: Option<UserProfile>,
    load_error: Option<String>,
    session: Option<PlaybackSession>,
    autoplay_task: Option<JoinHandle<()>>,
    renders: watch::Sender<Option<RenderDescriptor>>,
}

impl EngineState {
    fn is_playing(&self) -> bool {
        self.session
            .as_ref()
            .is_some_and(PlaybackSession::is_playing)
    }

    fn current_render(&self) -> Option<RenderDescriptor> {
        self.session.as_ref().map(render_descriptor)
    }

    async fn load(&mut self, link: &str) -> Result<RenderDescriptor, DomainError> {
        self.teardown().await;
        self.link = Some(link.to_owned());

        match self.fetch(link).await {
            Ok((session, user)) => {
                info!(
                    link,
                    user = %user.name,
                    steps = session.sequence().len(),
                    index = session.current_index(),
                    "sequence loaded"
                );
                let render = render_descriptor(&session);
                self.session = Some(session);
                self.user = Some(user);
                self.load_error = None;
                self.renders.send_replace(Some(render.clone()));
                Ok(render)
            }
            Err(e) => {
                warn!(link, error = %e, "failed to load sequence");
                self.load_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    async fn fetch(&self, link: &str) -> Result<(PlaybackSession, UserProfile), DomainError> {
        let source = &self.ports.source;
        let (pins, user) =
            tokio::try_join!(source.fetch_sequence(link), source.fetch_user(link))?;
        let sequence = ThreadSequence::new(pins, &self.config.layout)?;
        let saved_index = self.saved_index(link).await;
        let session = PlaybackSession::resume(link, sequence, self.config.layout, saved_index);
        Ok((session, user))
    }

    async fn saved_index(&self, link: &str) -> Option<usize> {
        match self.ports.store.load(&progress_key(link)).await {
            Ok(Some(value)) => match value.trim().parse() {
                Ok(index) => Some(index),
                Err(_) => {
                    warn!(link, value = %value, "ignoring unreadable saved position");
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                warn!(link, error = %e, "failed to read saved position");
                None
            }
        }
    }

    /// Applies `action` to the loaded session and carries out the resulting
    /// side effects.
    async fn execute<C, F>(&mut self, command: &C, action: F) -> Option<RenderDescriptor>
    where
        C: Command,
        F: FnOnce(&mut PlaybackSession, Uuid, &dyn Clock) -> bool,
    {
        let clock = Arc::clone(&self.ports.clock);
        let Some(session) = self.session.as_mut() else {
            debug!(
                command = command.command_type(),
                "ignoring command while no sequence is loaded"
            );
            return None;
        };
        let changed = action(session, command.correlation_id(), clock.as_ref());
        debug!(
            command = command.command_type(),
            correlation_id = %command.correlation_id(),
            changed,
            "handled command"
        );
        self.dispatch().await;
        self.current_render()
    }

    async fn dispatch(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let link = session.link().to_owned();
        let layout = *session.layout();
        let total_steps = session.sequence().len();

        for event in session.take_uncommitted_events() {
            match event.kind {
                PlaybackEventKind::StepChanged(step) => {
                    self.persist(&link, step.to_index).await;
                    self.renders.send_replace(self.current_render());
                    debug!(
                        link = %link,
                        index = step.to_index,
                        pin = step.pin,
                        total_steps,
                        "step changed"
                    );
                    if step.during_autoplay {
                        let announcement =
                            step_announcement(step.to_index + 1, layout.locate(step.pin));
                        self.narrate(&announcement);
                    }
                }
                PlaybackEventKind::AutoplayStarted(started) => {
                    info!(link = %link, index = started.at_index, "autoplay started");
                }
                PlaybackEventKind::AutoplayStopped(stopped) => {
                    self.stop_timer(stopped.reason);
                    self.cancel_narration();
                    info!(
                        link = %link,
                        index = stopped.at_index,
                        reason = ?stopped.reason,
                        "autoplay stopped"
                    );
                }
            }
        }
    }

    async fn persist(&self, link: &str, index: usize) {
        if let Err(e) = self
            .ports
            .store
            .save(&progress_key(link), &index.to_string())
            .await
        {
            warn!(link, index, error = %e, "failed to persist position");
        }
    }

    fn narrate(&self, announcement: &str) {
        if let Some(narrator) = &self.narrator {
            narrator.cancel();
            narrator.speak(announcement);
        }
    }

    fn cancel_narration(&self) {
        if let Some(narrator) = &self.narrator {
            narrator.cancel();
        }
    }

    fn stop_timer(&mut self, reason: StopReason) {
        let Some(task) = self.autoplay_task.take() else {
            return;
        };
        // A completed run is stopped from inside the timer task, which
        // exits on its own once the tick returns.
        if reason != StopReason::Completed {
            task.abort();
        }
    }

    async fn teardown(&mut self) {
        let clock = Arc::clone(&self.ports.clock);
        if let Some(session) = self.session.as_mut() {
            session.stop_autoplay(StopReason::Disposed, Uuid::new_v4(), clock.as_ref());
        }
        self.dispatch().await;
        if let Some(task) = self.autoplay_task.take() {
            task.abort();
        }
        self.session = None;
        self.user = None;
        self.renders.send_replace(None);
    }

    /// One timer tick. Returns `false` once autoplay is over.
    async fn autoplay_tick(&mut self) -> bool {
        let command = StepForward {
            correlation_id: Uuid::new_v4(),
            origin: StepOrigin::Autoplay,
        };
        self.execute(&command, |session, correlation_id, clock| {
            session.step_forward(command.origin, correlation_id, clock)
        })
        .await;
        self.is_playing()
    }
}

fn spawn_autoplay(state: Weak<Mutex<EngineState>>, period: Duration) -> JoinHandle<()> {
    let period = period.max(Duration::from_millis(1));
    tokio::spawn(async move {
        let mut ticker = time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let Some(state) = state.upgrade() else {
                break;
            };
            let mut state = state.lock().await;
            if !state.autoplay_tick().await {
                break;
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{TimeZone, Utc};
    use stringart_test_support::{
        FailingProgressStore, FailingThreadSource, FixedClock, NarratorCall, RecordingNarrator,
        RecordingNarrators, RecordingProgressStore, StaticThreadSource,
    };

    use super::*;

    const TICK: Duration = Duration::from_millis(8_000);

    fn clock() -> Arc<dyn Clock> {
        Arc::new(FixedClock(
            Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap(),
        ))
    }

    fn config() -> EngineConfig {
        EngineConfig::new(BoardLayout::quartered(180).unwrap())
    }

    /// Ports whose every engine speaks through `narrator`.
    fn ports(
        source: Arc<dyn ThreadSource>,
        store: Arc<dyn ProgressStore>,
        narrator: Option<Arc<RecordingNarrator>>,
    ) -> EnginePorts {
        let narrators = narrator.map(|narrator| {
            Arc::new(move || Arc::clone(&narrator) as Arc<dyn Narrator>)
                as Arc<dyn NarratorFactory>
        });
        EnginePorts {
            source,
            store,
            narrators,
            clock: clock(),
        }
    }

    async fn loaded_engine(
        pins: Vec<u32>,
        store: Arc<RecordingProgressStore>,
        narrator: Arc<RecordingNarrator>,
    ) -> PlaybackEngine {
        let engine = PlaybackEngine::new(
            ports(
                Arc::new(StaticThreadSource::new(pins)),
                store,
                Some(narrator),
            ),
            config(),
        );
        engine.load("abc").await.unwrap();
        engine
    }

    async fn wait_ticks(ticks: u32) {
        time::sleep(TICK * ticks + Duration::from_millis(1)).await;
    }

    #[tokio::test]
    async fn test_load_starts_at_zero_without_saved_position() {
        // Arrange
        let store = Arc::new(RecordingProgressStore::new(None));
        let narrator = Arc::new(RecordingNarrator::default());

        // Act
        let engine = loaded_engine(vec![44, 45, 0], Arc::clone(&store), narrator).await;

        // Assert
        let view = engine.view().await;
        assert!(view.loaded);
        assert_eq!(view.link.as_deref(), Some("abc"));
        assert_eq!(view.user_name.as_deref(), Some("Ada"));
        let render = view.render.unwrap();
        assert_eq!(render.step_index, 0);
        assert_eq!(render.quarter, 1);
        assert_eq!(render.local_index, 45);
        assert_eq!(render.step_label, "step 1 of 3");
        assert_eq!(store.loaded_keys(), vec!["threadProgress_abc".to_owned()]);
        assert!(store.saved_entries().is_empty());
    }

    #[tokio::test]
    async fn test_load_resumes_from_saved_position() {
        let store = Arc::new(RecordingProgressStore::new(Some("5".to_owned())));
        let narrator = Arc::new(RecordingNarrator::default());

        let engine = loaded_engine((0..10).collect(), store, narrator).await;

        assert_eq!(engine.view().await.render.unwrap().step_index, 5);
    }

    #[tokio::test]
    async fn test_load_ignores_saved_position_past_end() {
        let store = Arc::new(RecordingProgressStore::new(Some("5".to_owned())));
        let narrator = Arc::new(RecordingNarrator::default());

        let engine = loaded_engine(vec![1, 2, 3], store, narrator).await;

        assert_eq!(engine.view().await.render.unwrap().step_index, 0);
    }

    #[tokio::test]
    async fn test_load_ignores_unparseable_saved_position() {
        let store = Arc::new(RecordingProgressStore::new(Some("two".to_owned())));
        let narrator = Arc::new(RecordingNarrator::default());

        let engine = loaded_engine(vec![1, 2, 3], store, narrator).await;

        assert_eq!(engine.view().await.render.unwrap().step_index, 0);
    }

    #[tokio::test]
    async fn test_load_with_failing_store_starts_at_zero() {
        let engine = PlaybackEngine::new(
            ports(
                Arc::new(StaticThreadSource::new(vec![1, 2, 3])),
                Arc::new(FailingProgressStore),
                None,
            ),
            config(),
        );

        let render = engine.load("abc").await.unwrap();

        assert_eq!(render.step_index, 0);
    }

    #[tokio::test]
    async fn test_init_with_failing_source_records_error_and_ignores_navigation() {
        // Arrange
        let store = Arc::new(RecordingProgressStore::new(None));

        // Act
        let engine = PlaybackEngine::init(
            "abc",
            ports(Arc::new(FailingThreadSource), Arc::clone(&store) as _, None),
            config(),
        )
        .await;

        // Assert
        let view = engine.view().await;
        assert!(!view.loaded);
        assert_eq!(
            view.load_error.as_deref(),
            Some("infrastructure error: connection refused")
        );
        assert!(engine.next().await.is_none());
        assert!(engine.play().await.is_none());
        assert!(!engine.is_playing().await);
        assert!(store.saved_entries().is_empty());
    }

    #[tokio::test]
    async fn test_load_rejects_pin_outside_board() {
        let engine = PlaybackEngine::new(
            ports(
                Arc::new(StaticThreadSource::new(vec![3, 180])),
                Arc::new(RecordingProgressStore::new(None)),
                None,
            ),
            config(),
        );

        let result = engine.load("abc").await;

        match result.unwrap_err() {
            DomainError::Validation(msg) => assert!(msg.contains("180")),
            other => panic!("expected Validation, got {other:?}"),
        }
        assert!(!engine.view().await.loaded);
    }

    #[tokio::test]
    async fn test_navigation_before_load_is_ignored() {
        let store = Arc::new(RecordingProgressStore::new(None));
        let engine = PlaybackEngine::new(
            ports(
                Arc::new(StaticThreadSource::new(vec![1, 2, 3])),
                Arc::clone(&store) as _,
                None,
            ),
            config(),
        );

        assert!(engine.next().await.is_none());
        assert!(engine.previous().await.is_none());
        assert!(engine.pause().await.is_none());
        assert!(engine.jump_to(1).await.is_none());
        assert_eq!(engine.view().await, PlaybackView::default());
        assert!(store.saved_entries().is_empty());
    }

    #[tokio::test]
    async fn test_next_persists_new_position() {
        let store = Arc::new(RecordingProgressStore::new(None));
        let narrator = Arc::new(RecordingNarrator::default());
        let engine =
            loaded_engine(vec![1, 2, 3], Arc::clone(&store), Arc::clone(&narrator)).await;

        let render = engine.next().await.unwrap();

        assert_eq!(render.step_index, 1);
        assert_eq!(render.step_label, "step 2 of 3");
        assert_eq!(
            store.saved_entries(),
            vec![("threadProgress_abc".to_owned(), "1".to_owned())]
        );
        assert!(narrator.calls().is_empty());
    }

    #[tokio::test]
    async fn test_boundary_navigation_is_noop_without_write() {
        let store = Arc::new(RecordingProgressStore::new(None));
        let narrator = Arc::new(RecordingNarrator::default());
        let engine = loaded_engine(vec![1, 2], Arc::clone(&store), narrator).await;

        let at_start = engine.previous().await.unwrap();
        assert_eq!(at_start.step_index, 0);

        engine.next().await;
        let at_end = engine.next().await.unwrap();
        assert_eq!(at_end.step_index, 1);

        assert_eq!(
            store.saved_entries(),
            vec![("threadProgress_abc".to_owned(), "1".to_owned())]
        );
    }

    #[tokio::test]
    async fn test_persistence_failure_does_not_block_navigation() {
        let engine = PlaybackEngine::new(
            ports(
                Arc::new(StaticThreadSource::new(vec![1, 2, 3])),
                Arc::new(FailingProgressStore),
                None,
            ),
            config(),
        );
        engine.load("abc").await.unwrap();

        let render = engine.next().await.unwrap();

        assert_eq!(render.step_index, 1);
    }

    #[tokio::test]
    async fn test_jump_to_out_of_range_moves_to_start() {
        let store = Arc::new(RecordingProgressStore::new(Some("2".to_owned())));
        let narrator = Arc::new(RecordingNarrator::default());
        let engine = loaded_engine(vec![1, 2, 3], Arc::clone(&store), narrator).await;

        let render = engine.jump_to(42).await.unwrap();

        assert_eq!(render.step_index, 0);
        assert_eq!(
            store.saved_entries(),
            vec![("threadProgress_abc".to_owned(), "0".to_owned())]
        );
    }

    #[tokio::test]
    async fn test_handle_key_maps_arrows() {
        let store = Arc::new(RecordingProgressStore::new(None));
        let narrator = Arc::new(RecordingNarrator::default());
        let engine = loaded_engine(vec![1, 2, 3], store, narrator).await;

        assert_eq!(engine.handle_key("ArrowRight").await.unwrap().step_index, 1);
        assert_eq!(engine.handle_key("ArrowRight").await.unwrap().step_index, 2);
        assert_eq!(engine.handle_key("ArrowLeft").await.unwrap().step_index, 1);
        assert!(engine.handle_key("Enter").await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_autoplay_advances_once_per_interval() {
        let store = Arc::new(RecordingProgressStore::new(None));
        let narrator = Arc::new(RecordingNarrator::default());
        let engine = loaded_engine((0..10).collect(), store, narrator).await;

        engine.play().await.unwrap();
        assert!(engine.is_playing().await);

        time::sleep(TICK - Duration::from_millis(1)).await;
        assert_eq!(engine.view().await.render.unwrap().step_index, 0);

        time::sleep(Duration::from_millis(2)).await;
        assert_eq!(engine.view().await.render.unwrap().step_index, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_play_twice_runs_a_single_timer() {
        let store = Arc::new(RecordingProgressStore::new(None));
        let narrator = Arc::new(RecordingNarrator::default());
        let engine = loaded_engine((0..10).collect(), store, narrator).await;

        engine.play().await;
        engine.play().await;
        wait_ticks(1).await;
        assert_eq!(engine.view().await.render.unwrap().step_index, 1);

        wait_ticks(1).await;
        assert_eq!(engine.view().await.render.unwrap().step_index, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_autoplay_narrates_each_step_after_persisting() {
        // Arrange
        let store = Arc::new(RecordingProgressStore::new(None));
        let narrator = Arc::new(RecordingNarrator::observing(Arc::clone(&store)));
        let engine =
            loaded_engine(vec![0, 44, 45], Arc::clone(&store), Arc::clone(&narrator)).await;

        // Act
        engine.play().await;
        wait_ticks(2).await;

        // Assert
        assert_eq!(
            narrator.spoken(),
            vec![
                "Paso 2. Cuadrante amarillo, pin 45.".to_owned(),
                "Paso 3. Cuadrante verde, pin 1.".to_owned(),
            ]
        );
        assert_eq!(narrator.saves_seen_at_speech(), vec![1, 2]);
        assert!(matches!(narrator.calls()[0], NarratorCall::Cancel));
    }

    #[tokio::test(start_paused = true)]
    async fn test_autoplay_stops_after_reaching_last_step() {
        let store = Arc::new(RecordingProgressStore::new(None));
        let narrator = Arc::new(RecordingNarrator::default());
        let engine =
            loaded_engine(vec![1, 2, 3], Arc::clone(&store), Arc::clone(&narrator)).await;

        engine.play().await;
        wait_ticks(3).await;

        assert!(!engine.is_playing().await);
        assert_eq!(engine.view().await.render.unwrap().step_index, 2);
        assert_eq!(store.saved_entries().len(), 2);
        assert!(matches!(narrator.calls().last(), Some(NarratorCall::Cancel)));

        wait_ticks(2).await;
        assert_eq!(store.saved_entries().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_autoplay_can_restart_after_completion() {
        let store = Arc::new(RecordingProgressStore::new(None));
        let narrator = Arc::new(RecordingNarrator::default());
        let engine = loaded_engine(vec![1, 2], store, narrator).await;

        engine.play().await;
        wait_ticks(2).await;
        assert!(!engine.is_playing().await);

        engine.previous().await;
        engine.play().await;
        assert!(engine.is_playing().await);
        wait_ticks(1).await;
        assert_eq!(engine.view().await.render.unwrap().step_index, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_manual_next_while_playing_stops_autoplay_first() {
        // Arrange
        let store = Arc::new(RecordingProgressStore::new(None));
        let narrator = Arc::new(RecordingNarrator::default());
        let engine =
            loaded_engine((0..10).collect(), Arc::clone(&store), Arc::clone(&narrator)).await;
        engine.play().await;

        // Act
        let render = engine.next().await.unwrap();

        // Assert
        assert_eq!(render.step_index, 1);
        assert!(!engine.is_playing().await);
        assert_eq!(narrator.calls(), vec![NarratorCall::Cancel]);

        wait_ticks(3).await;
        assert_eq!(engine.view().await.render.unwrap().step_index, 1);
        assert_eq!(store.saved_entries().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pause_stops_timer_and_cancels_narration() {
        let store = Arc::new(RecordingProgressStore::new(None));
        let narrator = Arc::new(RecordingNarrator::default());
        let engine = loaded_engine((0..10).collect(), store, Arc::clone(&narrator)).await;
        engine.play().await;
        wait_ticks(1).await;

        engine.pause().await;
        wait_ticks(3).await;

        assert!(!engine.is_playing().await);
        assert_eq!(engine.view().await.render.unwrap().step_index, 1);
        assert!(matches!(narrator.calls().last(), Some(NarratorCall::Cancel)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_subscribe_sees_timer_steps() {
        let store = Arc::new(RecordingProgressStore::new(None));
        let narrator = Arc::new(RecordingNarrator::default());
        let engine = loaded_engine((0..10).collect(), store, narrator).await;
        let mut renders = engine.subscribe();
        renders.borrow_and_update();

        engine.play().await;
        renders.changed().await.unwrap();

        let render = renders.borrow_and_update().clone().unwrap();
        assert_eq!(render.step_index, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_autoplay_without_narrator_still_advances_and_persists() {
        // Arrange
        let store = Arc::new(RecordingProgressStore::new(None));
        let engine = PlaybackEngine::new(
            ports(
                Arc::new(StaticThreadSource::new((0..10).collect())),
                Arc::clone(&store) as _,
                None,
            ),
            config(),
        );
        engine.load("abc").await.unwrap();

        // Act
        engine.play().await.unwrap();
        wait_ticks(2).await;

        // Assert
        assert!(engine.is_playing().await);
        assert_eq!(engine.view().await.render.unwrap().step_index, 2);
        assert_eq!(
            store.saved_entries(),
            vec![
                ("threadProgress_abc".to_owned(), "1".to_owned()),
                ("threadProgress_abc".to_owned(), "2".to_owned()),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_pausing_one_engine_leaves_another_engines_narration_alone() {
        // Arrange: two sessions built from the same ports.
        let narrators = Arc::new(RecordingNarrators::default());
        let ports = EnginePorts {
            source: Arc::new(StaticThreadSource::new((0..10).collect())),
            store: Arc::new(RecordingProgressStore::new(None)),
            narrators: Some(Arc::clone(&narrators) as Arc<dyn NarratorFactory>),
            clock: clock(),
        };
        let first = PlaybackEngine::init("aaa", ports.clone(), config()).await;
        let second = PlaybackEngine::init("bbb", ports, config()).await;
        first.play().await;
        wait_ticks(1).await;

        // Act
        second.play().await;
        second.pause().await;

        // Assert
        let created = narrators.created();
        assert_eq!(created.len(), 2);
        assert!(first.is_playing().await);
        assert_eq!(
            created[0].calls(),
            vec![
                NarratorCall::Cancel,
                NarratorCall::Speak("Paso 2. Cuadrante amarillo, pin 2.".to_owned()),
            ]
        );
        assert_eq!(created[1].calls(), vec![NarratorCall::Cancel]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dispose_stops_timer_and_unloads() {
        let store = Arc::new(RecordingProgressStore::new(None));
        let narrator = Arc::new(RecordingNarrator::default());
        let engine =
            loaded_engine((0..10).collect(), Arc::clone(&store), Arc::clone(&narrator)).await;
        engine.play().await;

        engine.dispose().await;
        wait_ticks(2).await;

        assert!(store.saved_entries().is_empty());
        assert_eq!(narrator.calls(), vec![NarratorCall::Cancel]);
        assert_eq!(engine.view().await, PlaybackView::default());
        assert!(engine.subscribe().borrow().is_none());
        assert!(engine.next().await.is_none());
    }
}
