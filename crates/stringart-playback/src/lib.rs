//! String art viewer — Sequence Playback context.
//!
//! Maps each step of a precomputed pin sequence onto the four quadrants of
//! a circular board, and drives manual and timed navigation through the
//! sequence with resume persistence and optional narration.

pub mod application;
pub mod domain;
