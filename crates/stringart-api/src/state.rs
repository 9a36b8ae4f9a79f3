//! Shared application state.

use std::collections::HashMap;
use std::sync::Arc;

use stringart_core::error::DomainError;
use stringart_playback::application::engine::{EngineConfig, EnginePorts, PlaybackEngine};
use tokio::sync::RwLock;
use tracing::info;

/// Open playback engines, keyed by session link.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    engines: RwLock<HashMap<String, Arc<PlaybackEngine>>>,
}

impl SessionRegistry {
    /// Returns the engine for `link`, creating and loading it if needed.
    ///
    /// An engine whose load fails is returned so its error can be reported,
    /// but it is not registered; the next open tries again.
    pub async fn open(
        &self,
        link: &str,
        ports: &EnginePorts,
        config: EngineConfig,
    ) -> Arc<PlaybackEngine> {
        let existing = self.engines.read().await.get(link).cloned();
        if let Some(engine) = existing {
            return engine;
        }

        let engine = Arc::new(PlaybackEngine::init(link, ports.clone(), config).await);
        if !engine.view().await.loaded {
            return engine;
        }

        let mut engines = self.engines.write().await;
        let engine = Arc::clone(engines.entry(link.to_owned()).or_insert(engine));
        info!(link, open_sessions = engines.len(), "playback session opened");
        engine
    }

    /// Number of open sessions.
    pub async fn len(&self) -> usize {
        self.engines.read().await.len()
    }

    /// Whether no session is open.
    pub async fn is_empty(&self) -> bool {
        self.engines.read().await.is_empty()
    }

    /// Returns the engine for `link`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::SessionNotFound` if `link` was never opened.
    pub async fn get(&self, link: &str) -> Result<Arc<PlaybackEngine>, DomainError> {
        self.engines
            .read()
            .await
            .get(link)
            .cloned()
            .ok_or_else(|| DomainError::SessionNotFound(link.to_owned()))
    }

    /// Disposes of the engine for `link` and forgets it.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::SessionNotFound` if `link` was never opened.
    pub async fn close(&self, link: &str) -> Result<(), DomainError> {
        let engine = self
            .engines
            .write()
            .await
            .remove(link)
            .ok_or_else(|| DomainError::SessionNotFound(link.to_owned()))?;
        engine.dispose().await;
        info!(link, "playback session closed");
        Ok(())
    }
}

/// Application state shared across all request handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Collaborators handed to every new engine.
    pub ports: EnginePorts,
    /// Settings handed to every new engine.
    pub engine_config: EngineConfig,
    /// Root of the thread-data API, used for preview image links.
    pub thread_api_base_url: String,
    /// Open sessions.
    pub sessions: Arc<SessionRegistry>,
}

impl AppState {
    /// Create new application state with no open sessions.
    #[must_use]
    pub fn new(
        ports: EnginePorts,
        engine_config: EngineConfig,
        thread_api_base_url: impl Into<String>,
    ) -> Self {
        Self {
            ports,
            engine_config,
            thread_api_base_url: thread_api_base_url.into(),
            sessions: Arc::new(SessionRegistry::default()),
        }
    }
}
