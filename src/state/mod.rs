//! Timer domain model
//!
//! Pure types and functions over a timer value; nothing in here performs I/O.

pub mod timer;
pub mod urgency;
pub mod display;

// Re-export main types
pub use timer::{Timer, TimerStatus};
pub use urgency::{classify, should_flash, UrgencyLevel};
pub use display::{format_mmss, parse_duration, DurationInputError, Expression};
