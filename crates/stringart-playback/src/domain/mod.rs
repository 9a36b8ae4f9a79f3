//! Domain model for the Sequence Playback context.

pub mod aggregates;
pub mod commands;
pub mod controls;
pub mod events;
pub mod layout;
pub mod narration;
pub mod sequence;
