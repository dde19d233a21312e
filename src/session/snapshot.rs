//! Client-visible state of a session

use super::error::SessionError;
use crate::state::{format_mmss, should_flash, Expression, Timer, TimerStatus, UrgencyLevel};

/// Everything a renderer needs to draw the current session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub timer: Option<Timer>,
    /// A command is in flight; controls must be disabled
    pub loading: bool,
    pub error: Option<SessionError>,
}

/// Which controls are enabled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Controls {
    pub can_start: bool,
    pub can_stop: bool,
    pub can_reset: bool,
}

impl SessionSnapshot {
    pub fn status(&self) -> Option<TimerStatus> {
        self.timer.as_ref().map(|t| t.status)
    }

    /// Urgency as reported on the adopted timer; calm when there is none
    pub fn urgency(&self) -> UrgencyLevel {
        self.timer
            .as_ref()
            .map(|t| UrgencyLevel::from_u8(t.urgency_level))
            .unwrap_or(UrgencyLevel::Calm)
    }

    pub fn should_flash(&self) -> bool {
        self.timer.as_ref().is_some_and(should_flash)
    }

    pub fn expression(&self) -> Expression {
        Expression::for_state(self.urgency(), self.status().unwrap_or_default())
    }

    /// Remaining time as `MM:SS`
    pub fn clock(&self) -> String {
        format_mmss(self.timer.as_ref().map(Timer::remaining_seconds).unwrap_or(0))
    }

    pub fn controls(&self) -> Controls {
        let has_timer = self.timer.is_some();
        let running = self.status() == Some(TimerStatus::Running);
        let complete = self.status() == Some(TimerStatus::Complete);

        Controls {
            can_start: has_timer && !running && !complete && !self.loading,
            can_stop: running && !self.loading,
            can_reset: has_timer && !self.loading,
        }
    }
}
