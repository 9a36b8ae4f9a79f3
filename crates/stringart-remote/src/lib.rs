//! HTTP thread-data source for the string art viewer.

pub mod http_thread_source;

pub use http_thread_source::{HttpThreadSource, thread_image_url};
