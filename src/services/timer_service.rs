//! The external timer service as seen by the client

use async_trait::async_trait;
use thiserror::Error;

use crate::state::Timer;

/// Failure talking to the timer service
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    /// The request never produced a response
    #[error("request failed: {0}")]
    Transport(String),
    /// Non-2xx response; `message` comes from the error payload or is `HTTP {status}`
    #[error("{message}")]
    Status { status: u16, message: String },
    /// 2xx response whose body is not what we expected
    #[error("malformed response: {0}")]
    Malformed(String),
    #[error("timer {0} not found")]
    NotFound(String),
}

impl ServiceError {
    /// Build a status error, falling back to `HTTP {status}` when the
    /// service did not supply a message
    pub fn status(status: u16, message: Option<String>) -> Self {
        let message = message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| format!("HTTP {}", status));
        ServiceError::Status { status, message }
    }

    /// The service's own message, if the failure carried one
    pub fn service_message(&self) -> Option<&str> {
        match self {
            ServiceError::Status { message, .. } => Some(message),
            _ => None,
        }
    }
}

/// Semantic operations the session needs from the timer service.
///
/// Every method returns the whole, updated timer; callers replace their copy
/// wholesale.
#[async_trait]
pub trait TimerService: Send + Sync {
    async fn create(&self, duration: i64) -> Result<Timer, ServiceError>;

    async fn start(&self, id: &str) -> Result<Timer, ServiceError>;

    async fn stop(&self, id: &str) -> Result<Timer, ServiceError>;

    async fn reset(&self, id: &str) -> Result<Timer, ServiceError>;

    async fn set_duration(&self, id: &str, duration: i64) -> Result<Timer, ServiceError>;

    async fn list(&self) -> Result<Vec<Timer>, ServiceError>;

    /// Fetch one timer. Defaults to listing and filtering by id.
    async fn get(&self, id: &str) -> Result<Timer, ServiceError> {
        self.list()
            .await?
            .into_iter()
            .find(|timer| timer.id == id)
            .ok_or_else(|| ServiceError::NotFound(id.to_string()))
    }

    async fn health(&self) -> Result<(), ServiceError> {
        Ok(())
    }
}
