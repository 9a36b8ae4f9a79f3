//! String art playback API server entry point.

use std::error::Error;
use std::str::FromStr;
use std::sync::Arc;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use stringart_api::config::AppConfig;
use stringart_api::error::AppError;
use stringart_api::narration::SpeechCommand;
use stringart_api::state::AppState;
use stringart_core::clock::SystemClock;
use stringart_core::progress::ProgressStore;
use stringart_core::speech::NarratorFactory;
use stringart_playback::application::engine::EnginePorts;
use stringart_remote::HttpThreadSource;
use stringart_store::{MemoryProgressStore, SqliteProgressStore};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

/// SQLite store when `DATABASE_URL` is set, in-memory otherwise.
async fn build_progress_store(config: &AppConfig) -> Result<Arc<dyn ProgressStore>, AppError> {
    let Some(url) = &config.database_url else {
        tracing::warn!("DATABASE_URL not set; resume positions will not survive a restart");
        return Ok(Arc::new(MemoryProgressStore::new()));
    };

    let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;
    let store = SqliteProgressStore::new(pool);
    store.migrate().await?;
    tracing::info!("Resume positions stored in SQLite");
    Ok(Arc::new(store))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Initialize tracing subscriber.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    tracing::info!("Starting string art playback API server");

    let config = AppConfig::from_env()?;

    let store = build_progress_store(&config).await?;

    let narrators = config
        .narration_command
        .as_deref()
        .and_then(SpeechCommand::parse)
        .map(|command| Arc::new(command) as Arc<dyn NarratorFactory>);

    let ports = EnginePorts {
        source: Arc::new(HttpThreadSource::new(&config.thread_api_base_url)?),
        store,
        narrators,
        clock: Arc::new(SystemClock),
    };
    let app_state = AppState::new(
        ports,
        config.engine_config(),
        config.thread_api_base_url.clone(),
    );

    // TODO: Replace CorsLayer::permissive() with the viewer's origin once it is served separately.
    let app = stringart_api::build_router(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = config.bind_addr()?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app).await?;

    Ok(())
}
