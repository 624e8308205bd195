use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

/// Identifier of a task, derived from its creation time in epoch milliseconds.
pub type TaskId = u64;

/// How long before the due moment a reminder should fire.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Reminder {
    #[default]
    #[serde(rename = "none")]
    None,
    #[serde(rename = "5min")]
    FiveMinutes,
    #[serde(rename = "15min")]
    FifteenMinutes,
    #[serde(rename = "30min")]
    ThirtyMinutes,
    #[serde(rename = "at-time")]
    AtTime,
}

impl Reminder {
    pub const ALL: [Reminder; 5] = [
        Reminder::None,
        Reminder::FiveMinutes,
        Reminder::FifteenMinutes,
        Reminder::ThirtyMinutes,
        Reminder::AtTime,
    ];

    /// Duration subtracted from the due moment to get the notify time.
    ///
    /// Returns `None` when no reminder is set.
    pub fn offset(self) -> Option<chrono::Duration> {
        match self {
            Reminder::None => None,
            Reminder::FiveMinutes => Some(chrono::Duration::minutes(5)),
            Reminder::FifteenMinutes => Some(chrono::Duration::minutes(15)),
            Reminder::ThirtyMinutes => Some(chrono::Duration::minutes(30)),
            Reminder::AtTime => Some(chrono::Duration::zero()),
        }
    }

    pub fn tag(self) -> &'static str {
        match self {
            Reminder::None => "none",
            Reminder::FiveMinutes => "5min",
            Reminder::FifteenMinutes => "15min",
            Reminder::ThirtyMinutes => "30min",
            Reminder::AtTime => "at-time",
        }
    }
}

impl fmt::Display for Reminder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for Reminder {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        Reminder::ALL
            .into_iter()
            .find(|r| r.tag() == normalized)
            .ok_or_else(|| ValidationError::UnknownReminder(s.to_string()))
    }
}

/// Represents a single task in the list.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Task {
    /// Unique identifier for the task.
    pub id: TaskId,
    /// What needs to be done. Never empty once stored.
    pub text: String,
    /// Whether the task has been completed.
    #[serde(default)]
    pub completed: bool,
    /// Local wall-clock time the task was created at.
    pub created_at: NaiveDateTime,
    /// Calendar day the task is due on.
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    /// Time of day the task is due at. Only meaningful with a `due_date`.
    #[serde(default)]
    pub due_time: Option<NaiveTime>,
    /// Reminder offset relative to the due moment.
    #[serde(default)]
    pub reminder: Reminder,
    /// Set once a reminder fired for this task. Never reset.
    #[serde(default)]
    pub notified: bool,
}

/// Parses a `YYYY-MM-DD` date as typed by the user.
pub fn parse_due_date(input: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")
        .map_err(|_| ValidationError::InvalidDate(input.to_string()))
}

/// Parses a `HH:MM` time as typed by the user.
pub fn parse_due_time(input: &str) -> Result<NaiveTime, ValidationError> {
    NaiveTime::parse_from_str(input.trim(), "%H:%M")
        .map_err(|_| ValidationError::InvalidTime(input.to_string()))
}
