//! External timer service module
//!
//! This module defines the operations the client needs from the timer service
//! and the HTTP implementation used against a real server.

pub mod timer_service;
pub mod http;

// Re-export main types
pub use timer_service::{ServiceError, TimerService};
pub use http::HttpTimerService;
