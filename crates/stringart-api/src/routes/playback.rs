//! HTTP routes for the Sequence Playback context.
//!
//! Every route is keyed by the session link. A session must be opened with
//! `POST /{link}/open` before it can be driven; the other routes answer
//! `404` for links that are not open.

use std::convert::Infallible;
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use stringart_core::error::DomainError;
use stringart_playback::application::query_handlers::PlaybackView;
use stringart_playback::domain::controls::Control;
use tokio_stream::wrappers::WatchStream;
use tokio_stream::{Stream, StreamExt};
use tracing::{instrument, warn};

use crate::error::ApiError;
use crate::state::AppState;

const MAX_LINK_LEN: usize = 128;
const KEEP_ALIVE_INTERVAL: Duration = Duration::from_secs(15);

/// Playback status plus a link to the thread preview image.
#[derive(Debug, Serialize)]
pub struct PlaybackResponse {
    /// Engine snapshot.
    #[serde(flatten)]
    pub view: PlaybackView,
    /// URL of the rendered preview image.
    pub preview_image_url: String,
}

/// Request body for `POST /{link}/jump`.
#[derive(Debug, Deserialize)]
pub struct JumpRequest {
    /// Zero-based step index.
    pub index: usize,
}

/// Request body for `POST /{link}/keys`.
#[derive(Debug, Deserialize)]
pub struct KeyRequest {
    /// Key name as reported by the browser, e.g. `ArrowRight`.
    pub key: String,
}

/// Rejects links that could not have come from the thread service.
///
/// # Errors
///
/// Returns `DomainError::Validation` unless `link` is 1 to 128 ASCII
/// letters, digits, `-` or `_`.
pub fn validate_link(link: &str) -> Result<(), DomainError> {
    let well_formed = !link.is_empty()
        && link.len() <= MAX_LINK_LEN
        && link
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');
    if well_formed {
        Ok(())
    } else {
        Err(DomainError::Validation(format!("invalid session link: {link:?}")))
    }
}

fn respond(state: &AppState, link: &str, view: PlaybackView) -> Json<PlaybackResponse> {
    Json(PlaybackResponse {
        view,
        preview_image_url: stringart_remote::thread_image_url(&state.thread_api_base_url, link),
    })
}

async fn run_control(
    state: &AppState,
    link: &str,
    control: Control,
) -> Result<Json<PlaybackResponse>, ApiError> {
    validate_link(link)?;
    let engine = state.sessions.get(link).await?;
    engine.apply(control).await;
    Ok(respond(state, link, engine.view().await))
}

/// POST /api/v1/playback/{link}/open
///
/// A sequence that fails to load is reported in `load_error`, not as an
/// HTTP error.
#[instrument(skip(state))]
async fn open_session(
    State(state): State<AppState>,
    Path(link): Path<String>,
) -> Result<Json<PlaybackResponse>, ApiError> {
    validate_link(&link)?;
    let engine = state
        .sessions
        .open(&link, &state.ports, state.engine_config)
        .await;
    let view = engine.view().await;
    if let Some(error) = &view.load_error {
        warn!(%error, "sequence failed to load");
    }
    Ok(respond(&state, &link, view))
}

/// GET /api/v1/playback/{link}
async fn get_session(
    State(state): State<AppState>,
    Path(link): Path<String>,
) -> Result<Json<PlaybackResponse>, ApiError> {
    validate_link(&link)?;
    let engine = state.sessions.get(&link).await?;
    Ok(respond(&state, &link, engine.view().await))
}

/// POST /api/v1/playback/{link}/next
async fn next_step(
    State(state): State<AppState>,
    Path(link): Path<String>,
) -> Result<Json<PlaybackResponse>, ApiError> {
    run_control(&state, &link, Control::Next).await
}

/// POST /api/v1/playback/{link}/previous
async fn previous_step(
    State(state): State<AppState>,
    Path(link): Path<String>,
) -> Result<Json<PlaybackResponse>, ApiError> {
    run_control(&state, &link, Control::Previous).await
}

/// POST /api/v1/playback/{link}/play
async fn play(
    State(state): State<AppState>,
    Path(link): Path<String>,
) -> Result<Json<PlaybackResponse>, ApiError> {
    run_control(&state, &link, Control::Play).await
}

/// POST /api/v1/playback/{link}/pause
async fn pause(
    State(state): State<AppState>,
    Path(link): Path<String>,
) -> Result<Json<PlaybackResponse>, ApiError> {
    run_control(&state, &link, Control::Pause).await
}

/// POST /api/v1/playback/{link}/jump
async fn jump(
    State(state): State<AppState>,
    Path(link): Path<String>,
    Json(body): Json<JumpRequest>,
) -> Result<Json<PlaybackResponse>, ApiError> {
    validate_link(&link)?;
    let engine = state.sessions.get(&link).await?;
    engine.jump_to(body.index).await;
    Ok(respond(&state, &link, engine.view().await))
}

/// POST /api/v1/playback/{link}/keys
async fn press_key(
    State(state): State<AppState>,
    Path(link): Path<String>,
    Json(body): Json<KeyRequest>,
) -> Result<Json<PlaybackResponse>, ApiError> {
    let control = Control::from_key(&body.key)
        .ok_or_else(|| DomainError::Validation(format!("unbound key: {}", body.key)))?;
    run_control(&state, &link, control).await
}

/// GET /api/v1/playback/{link}/events
///
/// Server-sent `step` events carrying the render descriptor, starting with
/// the current one. Timer steps are included.
async fn events(
    State(state): State<AppState>,
    Path(link): Path<String>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    validate_link(&link)?;
    let engine = state.sessions.get(&link).await?;
    let stream = WatchStream::new(engine.subscribe()).filter_map(|render| {
        let json = serde_json::to_string(&render?).ok()?;
        Some(Ok::<_, Infallible>(Event::default().event("step").data(json)))
    });
    Ok(Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(KEEP_ALIVE_INTERVAL)
            .text("keep-alive"),
    ))
}

/// DELETE /api/v1/playback/{link}
#[instrument(skip(state))]
async fn close_session(
    State(state): State<AppState>,
    Path(link): Path<String>,
) -> Result<StatusCode, ApiError> {
    validate_link(&link)?;
    state.sessions.close(&link).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Returns the playback router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{link}", get(get_session).delete(close_session))
        .route("/{link}/open", post(open_session))
        .route("/{link}/next", post(next_step))
        .route("/{link}/previous", post(previous_step))
        .route("/{link}/play", post(play))
        .route("/{link}/pause", post(pause))
        .route("/{link}/jump", post(jump))
        .route("/{link}/keys", post(press_key))
        .route("/{link}/events", get(events))
}
