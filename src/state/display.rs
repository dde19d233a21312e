//! Pure helpers the renderer uses: clock formatting, the character's
//! expression and duration input parsing

use std::fmt;

use thiserror::Error;

use super::{timer::TimerStatus, urgency::UrgencyLevel};

/// Longest duration the input form accepts, in seconds
pub const MAX_INPUT_SECONDS: i64 = 3600;

/// Quick-pick durations offered next to the input, in seconds
pub const QUICK_PICKS: [i64; 4] = [30, 60, 120, 300];

/// Format whole seconds as `MM:SS`. Minutes are not wrapped at 60 and
/// negative input shows as `00:00`.
pub fn format_mmss(total_seconds: i64) -> String {
    let clamped = total_seconds.max(0);
    format!("{:02}:{:02}", clamped / 60, clamped % 60)
}

/// Short label for a quick-pick button, e.g. `30s` or `2m`
pub fn quick_pick_label(seconds: i64) -> String {
    if seconds >= 60 && seconds % 60 == 0 {
        format!("{}m", seconds / 60)
    } else {
        format!("{}s", seconds)
    }
}

/// Expression of the character face
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expression {
    Happy,
    Neutral,
    Anxious,
    Upset,
}

impl Expression {
    /// Idle timers are always happy and finished ones always upset; in
    /// between the face follows the urgency tier.
    pub fn for_state(urgency: UrgencyLevel, status: TimerStatus) -> Self {
        match status {
            TimerStatus::Idle => Expression::Happy,
            TimerStatus::Complete => Expression::Upset,
            TimerStatus::Running | TimerStatus::Paused => match urgency {
                UrgencyLevel::Calm => Expression::Happy,
                UrgencyLevel::Steady => Expression::Neutral,
                UrgencyLevel::Urgent => Expression::Anxious,
                UrgencyLevel::Critical => Expression::Upset,
            },
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Expression::Happy => "happy",
            Expression::Neutral => "neutral",
            Expression::Anxious => "anxious",
            Expression::Upset => "upset",
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DurationInputError {
    #[error("duration is empty")]
    Empty,
    #[error("'{0}' is not a number of seconds or MM:SS")]
    Unparseable(String),
    #[error("duration must be between 1 and 3600 seconds, got {0}")]
    OutOfRange(i64),
}

/// Parse user input as either whole seconds (`"90"`) or `MM:SS` (`"01:30"`)
pub fn parse_duration(input: &str) -> Result<i64, DurationInputError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(DurationInputError::Empty);
    }

    let unparseable = || DurationInputError::Unparseable(trimmed.to_string());

    let seconds = match trimmed.split_once(':') {
        Some((minutes, seconds)) => {
            let minutes: i64 = minutes.parse().map_err(|_| unparseable())?;
            let seconds: i64 = seconds.parse().map_err(|_| unparseable())?;
            if minutes < 0 || !(0..60).contains(&seconds) {
                return Err(unparseable());
            }
            minutes.saturating_mul(60).saturating_add(seconds)
        }
        None => trimmed.parse().map_err(|_| unparseable())?,
    };

    if !(1..=MAX_INPUT_SECONDS).contains(&seconds) {
        return Err(DurationInputError::OutOfRange(seconds));
    }
    Ok(seconds)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_mmss() {
        assert_eq!(format_mmss(0), "00:00");
        assert_eq!(format_mmss(5), "00:05");
        assert_eq!(format_mmss(59), "00:59");
        assert_eq!(format_mmss(65), "01:05");
        assert_eq!(format_mmss(600), "10:00");
        assert_eq!(format_mmss(3661), "61:01");
        assert_eq!(format_mmss(-5), "00:00");
    }

    #[test]
    fn quick_pick_labels() {
        let labels: Vec<String> = QUICK_PICKS.iter().map(|s| quick_pick_label(*s)).collect();
        assert_eq!(labels, ["30s", "1m", "2m", "5m"]);
        assert_eq!(quick_pick_label(90), "90s");
    }

    #[test]
    fn expression_follows_status_then_urgency() {
        assert_eq!(
            Expression::for_state(UrgencyLevel::Critical, TimerStatus::Idle),
            Expression::Happy
        );
        assert_eq!(
            Expression::for_state(UrgencyLevel::Calm, TimerStatus::Complete),
            Expression::Upset
        );
        assert_eq!(
            Expression::for_state(UrgencyLevel::Steady, TimerStatus::Running),
            Expression::Neutral
        );
        assert_eq!(
            Expression::for_state(UrgencyLevel::Urgent, TimerStatus::Paused),
            Expression::Anxious
        );
        assert_eq!(
            Expression::for_state(UrgencyLevel::Critical, TimerStatus::Running).to_string(),
            "upset"
        );
    }

    #[test]
    fn parses_seconds_and_mmss() {
        assert_eq!(parse_duration("60"), Ok(60));
        assert_eq!(parse_duration("  90 "), Ok(90));
        assert_eq!(parse_duration("01:30"), Ok(90));
        assert_eq!(parse_duration("60:00"), Ok(3600));
    }

    #[test]
    fn rejects_bad_duration_input() {
        assert_eq!(parse_duration(""), Err(DurationInputError::Empty));
        assert_eq!(parse_duration("0"), Err(DurationInputError::OutOfRange(0)));
        assert_eq!(parse_duration("-5"), Err(DurationInputError::OutOfRange(-5)));
        assert_eq!(parse_duration("3601"), Err(DurationInputError::OutOfRange(3601)));
        assert!(matches!(parse_duration("1:75"), Err(DurationInputError::Unparseable(_))));
        assert!(matches!(parse_duration("soon"), Err(DurationInputError::Unparseable(_))));
    }
}
