//! String art playback API — library half of the `stringart-api` binary.
//!
//! Exposes one playback engine per session link over HTTP.

use axum::Router;

pub mod config;
pub mod error;
pub mod narration;
pub mod routes;
pub mod state;

/// Builds the application router. Middleware layers are added by the caller.
pub fn build_router(state: state::AppState) -> Router {
    Router::new()
        .merge(routes::health::router())
        .nest("/api/v1/playback", routes::playback::router())
        .with_state(state)
}
