//! Application layer: the engine that owns a session and its side effects.

pub mod engine;
pub mod query_handlers;
