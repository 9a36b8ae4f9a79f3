//! String art viewer core — shared ports and domain abstractions.
//!
//! This crate defines the traits the playback engine talks to (sequence
//! source, progress store, narrator, clock) and the types shared across
//! crates. It contains no infrastructure code.

pub mod clock;
pub mod command;
pub mod error;
pub mod event;
pub mod progress;
pub mod source;
pub mod speech;
