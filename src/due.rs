use chrono::{Duration, NaiveDateTime, NaiveTime};
use std::fmt;
use crate::models::Task;

/// Time of day used when a task has a due date but no due time.
pub fn end_of_day() -> NaiveTime {
    NaiveTime::from_hms_opt(23, 59, 0).unwrap_or_default()
}

/// Combined due moment: `due_date` at `due_time`, or at 23:59.
///
/// Returns `None` if the task has no due date.
pub fn due_datetime(task: &Task) -> Option<NaiveDateTime> {
    task.due_date
        .map(|d| d.and_time(task.due_time.unwrap_or_else(end_of_day)))
}

/// Whether an incomplete task is past its due moment.
pub fn is_overdue(task: &Task, now: NaiveDateTime) -> bool {
    if task.completed {
        return false;
    }
    due_datetime(task).is_some_and(|due| now > due)
}

/// Coarse bucket a remaining duration falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DueCategory {
    Overdue,
    /// Less than an hour left.
    Urgent,
    /// Less than a day left.
    Today,
    Soon,
}

/// Time left until a task is due, floored to the bucket's unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeRemaining {
    Overdue,
    Minutes(i64),
    Hours(i64),
    Days(i64),
}

impl TimeRemaining {
    pub fn category(self) -> DueCategory {
        match self {
            TimeRemaining::Overdue => DueCategory::Overdue,
            TimeRemaining::Minutes(_) => DueCategory::Urgent,
            TimeRemaining::Hours(_) => DueCategory::Today,
            TimeRemaining::Days(_) => DueCategory::Soon,
        }
    }
}

impl fmt::Display for TimeRemaining {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeRemaining::Overdue => write!(f, "Overdue"),
            TimeRemaining::Minutes(m) => write!(f, "{}m left", m),
            TimeRemaining::Hours(h) => write!(f, "{}h left", h),
            TimeRemaining::Days(d) => write!(f, "{}d left", d),
        }
    }
}

/// Computes how long until the task is due.
///
/// Completion is not considered: a finished task past its due moment still
/// reports `Overdue` here; callers decide whether to show it.
pub fn time_remaining(task: &Task, now: NaiveDateTime) -> Option<TimeRemaining> {
    let diff = due_datetime(task)? - now;
    let remaining = if diff < Duration::zero() {
        TimeRemaining::Overdue
    } else if diff < Duration::hours(1) {
        TimeRemaining::Minutes(diff.num_minutes())
    } else if diff < Duration::hours(24) {
        TimeRemaining::Hours(diff.num_hours())
    } else {
        TimeRemaining::Days(diff.num_days())
    };
    Some(remaining)
}

/// Human label for the due moment: "Today", "Tomorrow" or "Mar 5",
/// followed by the time when one was given.
pub fn format_due_label(task: &Task, now: NaiveDateTime) -> Option<String> {
    let due = task.due_date?;
    let today = now.date();
    let day = if due == today {
        "Today".to_string()
    } else if today.succ_opt() == Some(due) {
        "Tomorrow".to_string()
    } else {
        due.format("%b %-d").to_string()
    };
    Some(match task.due_time {
        Some(time) => format!("{} {}", day, time.format("%H:%M")),
        None => day,
    })
}
