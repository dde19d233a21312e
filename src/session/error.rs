//! Errors surfaced by a timer session

use std::fmt;

use thiserror::Error;

use crate::services::ServiceError;

/// Operations a session performs against the timer service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    Start,
    Stop,
    Reset,
    Poll,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Create => "create",
            Operation::Start => "start",
            Operation::Stop => "stop",
            Operation::Reset => "reset",
            Operation::Poll => "refresh",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("Invalid duration: {0}")]
    InvalidDuration(String),
    #[error("{0}")]
    CreateFailed(String),
    #[error("{0}")]
    StartFailed(String),
    #[error("{0}")]
    StopFailed(String),
    #[error("{0}")]
    ResetFailed(String),
    #[error("{0}")]
    PollFailed(String),
    #[error("No active timer")]
    NoActiveTimer,
    #[error("A timer command is already in progress")]
    Busy,
    #[error("Timer session is shut down")]
    Closed,
}

impl SessionError {
    /// Map a service failure onto the operation that hit it. The service's
    /// own message wins; otherwise the message names the operation.
    pub fn failed(operation: Operation, error: ServiceError) -> Self {
        let message = match error.service_message() {
            Some(message) => message.to_string(),
            None => format!("Failed to {} timer: {}", operation, error),
        };

        match operation {
            Operation::Create => SessionError::CreateFailed(message),
            Operation::Start => SessionError::StartFailed(message),
            Operation::Stop => SessionError::StopFailed(message),
            Operation::Reset => SessionError::ResetFailed(message),
            Operation::Poll => SessionError::PollFailed(message),
        }
    }

    /// Poll errors heal on the next successful fetch
    pub fn is_transient(&self) -> bool {
        matches!(self, SessionError::PollFailed(_))
    }
}
