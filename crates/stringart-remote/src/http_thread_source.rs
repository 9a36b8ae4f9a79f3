//! HTTP implementation of the `ThreadSource` trait.
//!
//! Talks to the service that sells and stores generated thread paths:
//!
//! - `GET {base}/api/thread-data/{link}` returns the pin sequence as a JSON
//!   array of non-negative integers;
//! - `GET {base}/api/user-data/{link}` returns `{"name": ...}`;
//! - `GET {base}/api/thread-image/{link}` serves the rendered preview image,
//!   which is only ever linked to, never fetched here.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use stringart_core::error::DomainError;
use stringart_core::source::{ThreadSource, UserProfile};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// URL of the rendered preview image for `link` on the API at `base_url`.
#[must_use]
pub fn thread_image_url(base_url: &str, link: &str) -> String {
    format!("{}/api/thread-image/{link}", base_url.trim_end_matches('/'))
}

/// Thread source backed by the remote REST API.
#[derive(Debug, Clone)]
pub struct HttpThreadSource {
    client: Client,
    base_url: String,
}

impl HttpThreadSource {
    /// Creates a source for the API rooted at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the HTTP client cannot be
    /// built.
    pub fn new(base_url: &str) -> Result<Self, DomainError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| DomainError::Infrastructure(format!("http client: {e}")))?;
        Ok(Self::with_client(client, base_url))
    }

    /// Creates a source that sends requests through `client`.
    #[must_use]
    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
        }
    }

    #[must_use]
    pub fn thread_data_url(&self, link: &str) -> String {
        format!("{}/api/thread-data/{link}", self.base_url)
    }

    #[must_use]
    pub fn user_data_url(&self, link: &str) -> String {
        format!("{}/api/user-data/{link}", self.base_url)
    }

    /// URL of the rendered preview image for `link`.
    #[must_use]
    pub fn thread_image_url(&self, link: &str) -> String {
        thread_image_url(&self.base_url, link)
    }

    async fn get_json<T: DeserializeOwned>(&self, link: &str, url: &str) -> Result<T, DomainError> {
        debug!(url, "fetching");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| DomainError::Infrastructure(format!("request to {url} failed: {e}")))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(DomainError::SessionNotFound(link.to_owned()));
        }
        if !status.is_success() {
            warn!(url, %status, "unexpected status");
            return Err(DomainError::Infrastructure(format!(
                "{url} returned status {status}"
            )));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| DomainError::Infrastructure(format!("reading {url} failed: {e}")))?;
        serde_json::from_slice(&body)
            .map_err(|e| DomainError::Validation(format!("malformed response from {url}: {e}")))
    }
}

#[async_trait]
impl ThreadSource for HttpThreadSource {
    async fn fetch_sequence(&self, link: &str) -> Result<Vec<u32>, DomainError> {
        self.get_json(link, &self.thread_data_url(link)).await
    }

    async fn fetch_user(&self, link: &str) -> Result<UserProfile, DomainError> {
        self.get_json(link, &self.user_data_url(link)).await
    }
}
