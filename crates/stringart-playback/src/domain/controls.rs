//! Control surface offered to the UI layer.

use serde::{Deserialize, Serialize};

/// A user-facing playback control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Control {
    Next,
    Previous,
    Play,
    Pause,
}

impl Control {
    /// Keyboard binding: `ArrowRight` steps forward, `ArrowLeft` steps back.
    ///
    /// Key names follow the DOM `KeyboardEvent.key` values.
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "ArrowRight" => Some(Self::Next),
            "ArrowLeft" => Some(Self::Previous),
            _ => None,
        }
    }
}
