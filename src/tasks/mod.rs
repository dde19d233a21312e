//! Background tasks module
//!
//! This module contains the tasks a session runs alongside its commands.

pub mod poller;

// Re-export main functions
pub(crate) use poller::poll_timer_task;
