//! Timer session module
//!
//! A session owns the client-side copy of one timer, issues lifecycle
//! commands against the timer service and polls while the timer runs.

pub mod controller;
pub mod error;
pub mod snapshot;
pub(crate) mod store;

// Re-export main types
pub use controller::TimerSession;
pub use error::{Operation, SessionError};
pub use snapshot::{Controls, SessionSnapshot};
