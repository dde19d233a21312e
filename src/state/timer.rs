//! Timer entity as exchanged with the timer service

use std::fmt;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::urgency::{classify, UrgencyLevel};

/// Lifecycle status of a timer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerStatus {
    #[default]
    Idle,
    Running,
    Paused,
    Complete,
}

impl TimerStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimerStatus::Idle => "idle",
            TimerStatus::Running => "running",
            TimerStatus::Paused => "paused",
            TimerStatus::Complete => "complete",
        }
    }

    /// Only `reset` leaves this status
    pub fn is_terminal(&self) -> bool {
        matches!(self, TimerStatus::Complete)
    }
}

impl fmt::Display for TimerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single countdown timer.
///
/// Durations and elapsed time are whole seconds. They are signed so that a
/// misbehaving service reporting negative values still deserializes; every
/// helper here clamps instead of failing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Timer {
    pub id: String,
    pub duration: i64,
    #[serde(default, alias = "elapsed_time")]
    pub elapsed_time: i64,
    #[serde(default)]
    pub status: TimerStatus,
    #[serde(default, alias = "urgency_level", deserialize_with = "lenient_level")]
    pub urgency_level: u8,
    #[serde(
        default,
        alias = "created_at",
        deserialize_with = "lenient_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(
        default,
        alias = "updated_at",
        deserialize_with = "lenient_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Timer {
    /// Seconds left before the deadline, never negative
    pub fn remaining_seconds(&self) -> i64 {
        self.duration.saturating_sub(self.elapsed_time).max(0)
    }

    /// Urgency derived from elapsed time and duration
    pub fn urgency(&self) -> UrgencyLevel {
        classify(self.elapsed_time, self.duration)
    }

    /// Return the timer with `urgency_level` recomputed from its own
    /// elapsed time and duration
    pub fn classified(mut self) -> Self {
        self.urgency_level = self.urgency().as_u8();
        self
    }

    pub fn is_running(&self) -> bool {
        self.status == TimerStatus::Running
    }
}

/// Wire levels outside 0-3, negative ones included, read as calm
fn lenient_level<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<i64> = Option::deserialize(deserializer)?;
    Ok(raw
        .and_then(|level| u8::try_from(level).ok())
        .filter(|level| *level <= UrgencyLevel::Critical.as_u8())
        .unwrap_or(0))
}

/// Accepts RFC 3339 timestamps as well as offset-less ISO 8601 values,
/// which are taken to be UTC.
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    let Some(raw) = raw else {
        return Ok(None);
    };

    if let Ok(parsed) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(Some(parsed.with_timezone(&Utc)));
    }

    NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| Some(naive.and_utc()))
        .map_err(|e| serde::de::Error::custom(format!("invalid timestamp {raw:?}: {e}")))
}
