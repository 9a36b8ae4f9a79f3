//! Test sources — mock `ThreadSource` implementations for tests.

use async_trait::async_trait;
use stringart_core::error::DomainError;
use stringart_core::source::{ThreadSource, UserProfile};

/// A source that serves the same pin sequence and user for every link.
#[derive(Debug, Clone)]
pub struct StaticThreadSource {
    pins: Vec<u32>,
    user_name: String,
}

impl StaticThreadSource {
    /// Serve `pins` for a user named "Ada".
    #[must_use]
    pub fn new(pins: Vec<u32>) -> Self {
        Self {
            pins,
            user_name: "Ada".to_owned(),
        }
    }

    /// Replace the user name served by `fetch_user`.
    #[must_use]
    pub fn with_user(mut self, name: &str) -> Self {
        name.clone_into(&mut self.user_name);
        self
    }
}

#[async_trait]
impl ThreadSource for StaticThreadSource {
    async fn fetch_sequence(&self, _link: &str) -> Result<Vec<u32>, DomainError> {
        Ok(self.pins.clone())
    }

    async fn fetch_user(&self, _link: &str) -> Result<UserProfile, DomainError> {
        Ok(UserProfile {
            name: self.user_name.clone(),
        })
    }
}

/// A source whose fetches always fail with an infrastructure error.
#[derive(Debug)]
pub struct FailingThreadSource;

#[async_trait]
impl ThreadSource for FailingThreadSource {
    async fn fetch_sequence(&self, _link: &str) -> Result<Vec<u32>, DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }

    async fn fetch_user(&self, _link: &str) -> Result<UserProfile, DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }
}
