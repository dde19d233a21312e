//! Countdown Face - a countdown timer client whose character escalates its
//! expression as the deadline approaches
//!
//! This library provides the timer domain model, a client for the external
//! timer service and the session controller that keeps a local view of a
//! timer synchronized with that service.

pub mod config;
pub mod state;
pub mod services;
pub mod session;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use config::{Config, SessionConfig};
pub use state::{Timer, TimerStatus, UrgencyLevel};
pub use services::{HttpTimerService, ServiceError, TimerService};
pub use session::{SessionError, SessionSnapshot, TimerSession};
pub use utils::signals::shutdown_signal;
