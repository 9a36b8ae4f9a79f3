//! Commands for the Sequence Playback context.

use stringart_core::command::Command;
use uuid::Uuid;

/// Who asked for a forward step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOrigin {
    /// A button press or key press.
    Manual,
    /// An autoplay timer tick.
    Autoplay,
}

/// Command to advance one step.
#[derive(Debug, Clone)]
pub struct StepForward {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// Source of the request.
    pub origin: StepOrigin,
}

impl Command for StepForward {
    fn command_type(&self) -> &'static str {
        match self.origin {
            StepOrigin::Manual => "playback.step_forward",
            StepOrigin::Autoplay => "playback.autoplay_tick",
        }
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to go back one step.
#[derive(Debug, Clone)]
pub struct StepBack {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
}

impl Command for StepBack {
    fn command_type(&self) -> &'static str {
        "playback.step_back"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to move directly to a step.
#[derive(Debug, Clone)]
pub struct JumpToStep {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// Requested zero-based step index.
    pub index: usize,
}

impl Command for JumpToStep {
    fn command_type(&self) -> &'static str {
        "playback.jump_to_step"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to start timed playback.
#[derive(Debug, Clone)]
pub struct StartAutoplay {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
}

impl Command for StartAutoplay {
    fn command_type(&self) -> &'static str {
        "playback.start_autoplay"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to stop timed playback.
#[derive(Debug, Clone)]
pub struct StopAutoplay {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
}

impl Command for StopAutoplay {
    fn command_type(&self) -> &'static str {
        "playback.stop_autoplay"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}
