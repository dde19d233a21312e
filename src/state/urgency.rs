//! Urgency classification and the flash cue

use super::timer::{Timer, TimerStatus};

/// Remaining seconds above which a timer is calm
pub const CALM_ABOVE_SECONDS: i64 = 30;
/// Remaining seconds at or below which a timer is critical
pub const CRITICAL_AT_OR_BELOW_SECONDS: i64 = 10;

/// Discrete 0-3 urgency tier driving the visual escalation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum UrgencyLevel {
    Calm = 0,
    /// Display-only tier; `classify` never returns it
    Steady = 1,
    Urgent = 2,
    Critical = 3,
}

impl UrgencyLevel {
    pub fn as_u8(&self) -> u8 {
        *self as u8
    }

    /// Map a wire level to a tier. Anything outside 0-3 displays as calm.
    pub fn from_u8(level: u8) -> Self {
        match level {
            1 => UrgencyLevel::Steady,
            2 => UrgencyLevel::Urgent,
            3 => UrgencyLevel::Critical,
            _ => UrgencyLevel::Calm,
        }
    }
}

/// Classify progress by remaining time:
/// more than 30s is calm, 11-30s urgent, 10s or less (including overshoot)
/// critical.
pub fn classify(elapsed_time: i64, duration: i64) -> UrgencyLevel {
    let remaining = duration.saturating_sub(elapsed_time);

    if remaining > CALM_ABOVE_SECONDS {
        UrgencyLevel::Calm
    } else if remaining > CRITICAL_AT_OR_BELOW_SECONDS {
        UrgencyLevel::Urgent
    } else {
        UrgencyLevel::Critical
    }
}

/// True only for a critical timer that is actively counting down
pub fn should_flash(timer: &Timer) -> bool {
    timer.urgency_level == UrgencyLevel::Critical.as_u8() && timer.status == TimerStatus::Running
}
