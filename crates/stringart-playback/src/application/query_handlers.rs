//! Read-only views handed to the UI layer.

use serde::Serialize;

use crate::domain::aggregates::PlaybackSession;
use crate::domain::narration::QuarterColor;

/// What the UI draws for the current step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderDescriptor {
    /// Quadrant to highlight, `0` for none.
    pub quarter: u32,
    /// Pin number to show inside the quadrant.
    pub local_index: u32,
    /// Progress counter text, `"step {n} of {len}"`.
    pub step_label: String,
    /// Zero-based index of the current step.
    pub step_index: usize,
    /// Number of steps in the sequence.
    pub total_steps: usize,
    /// Raw pin value at the current step.
    pub pin: u32,
    /// Colour of the highlighted quadrant.
    pub color: Option<QuarterColor>,
}

/// Snapshot of an engine for status queries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PlaybackView {
    /// Session link, once a load has been attempted.
    pub link: Option<String>,
    /// Name of the user the sequence belongs to.
    pub user_name: Option<String>,
    /// Whether a sequence is loaded and navigation is live.
    pub loaded: bool,
    /// Message describing the last failed load.
    pub load_error: Option<String>,
    /// Whether autoplay is running.
    pub is_playing: bool,
    /// Current render, absent until loaded.
    pub render: Option<RenderDescriptor>,
}

/// Formats the progress counter for a zero-based step index.
#[must_use]
pub fn step_label(step_index: usize, total_steps: usize) -> String {
    format!("step {} of {total_steps}", step_index + 1)
}

/// Builds the render descriptor for the session's current step.
#[must_use]
pub fn render_descriptor(session: &PlaybackSession) -> RenderDescriptor {
    let coordinate = session.coordinate();
    let step_index = session.current_index();
    let total_steps = session.sequence().len();
    RenderDescriptor {
        quarter: coordinate.quarter,
        local_index: coordinate.local_index,
        step_label: step_label(step_index, total_steps),
        step_index,
        total_steps,
        pin: session.current_pin(),
        color: QuarterColor::for_quarter(coordinate.quarter),
    }
}
