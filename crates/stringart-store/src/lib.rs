//! Resume-state stores for the string art viewer.
//!
//! Both stores implement [`ProgressStore`](stringart_core::progress::ProgressStore)
//! as a plain string key-value map.

pub mod memory_progress_store;
pub mod schema;
pub mod sqlite_progress_store;

pub use memory_progress_store::MemoryProgressStore;
pub use sqlite_progress_store::SqliteProgressStore;
