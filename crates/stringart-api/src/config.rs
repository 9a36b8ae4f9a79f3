//! Server configuration read from the environment.

use std::net::SocketAddr;
use std::time::Duration;

use stringart_playback::application::engine::EngineConfig;
use stringart_playback::domain::layout::BoardLayout;

use crate::error::AppError;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_THREAD_API_BASE_URL: &str = "http://127.0.0.1:8000";
const DEFAULT_TOTAL_PINS: u32 = 180;

/// Settings for the API server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Interface to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
    /// Root of the thread-data API.
    pub thread_api_base_url: String,
    /// SQLite URL for resume state; in-memory storage when unset.
    pub database_url: Option<String>,
    /// Board geometry sequences are validated against.
    pub layout: BoardLayout,
    /// Period of the autoplay timer.
    pub autoplay_interval: Duration,
    /// Speech command line; narration is off when unset.
    pub narration_command: Option<String>,
}

impl AppConfig {
    /// Reads the configuration from process environment variables.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a variable is present but invalid.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through `lookup`. Empty values count as unset.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a variable is present but invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let port = match var("PORT") {
            Some(raw) => raw
                .parse()
                .map_err(|e| AppError::Config(format!("PORT must be a valid u16: {e}")))?,
            None => DEFAULT_PORT,
        };

        let total_pins = match var("TOTAL_PINS") {
            Some(raw) => raw
                .parse()
                .map_err(|e| AppError::Config(format!("TOTAL_PINS must be a number: {e}")))?,
            None => DEFAULT_TOTAL_PINS,
        };
        let layout = BoardLayout::quartered(total_pins)
            .map_err(|e| AppError::Config(format!("TOTAL_PINS: {e}")))?;

        let autoplay_interval = match var("AUTOPLAY_INTERVAL_MS") {
            Some(raw) => {
                let millis: u64 = raw.parse().map_err(|e| {
                    AppError::Config(format!("AUTOPLAY_INTERVAL_MS must be a number: {e}"))
                })?;
                if millis == 0 {
                    return Err(AppError::Config(
                        "AUTOPLAY_INTERVAL_MS must be greater than zero".to_owned(),
                    ));
                }
                Duration::from_millis(millis)
            }
            None => EngineConfig::DEFAULT_AUTOPLAY_INTERVAL,
        };

        Ok(Self {
            host: var("HOST").unwrap_or_else(|| DEFAULT_HOST.to_owned()),
            port,
            thread_api_base_url: var("THREAD_API_BASE_URL")
                .unwrap_or_else(|| DEFAULT_THREAD_API_BASE_URL.to_owned()),
            database_url: var("DATABASE_URL"),
            layout,
            autoplay_interval,
            narration_command: var("NARRATION_COMMAND"),
        })
    }

    /// Engine settings derived from this configuration.
    #[must_use]
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig::new(self.layout).with_autoplay_interval(self.autoplay_interval)
    }

    /// Socket address to listen on.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if `host:port` does not parse.
    pub fn bind_addr(&self) -> Result<SocketAddr, AppError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| AppError::Config(format!("invalid HOST:PORT combination: {e}")))
    }
}
