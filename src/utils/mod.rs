//! Utility functions module
//!
//! Helpers used by the command-line front-end.

pub mod signals;

// Re-export main functions
pub use signals::shutdown_signal;
