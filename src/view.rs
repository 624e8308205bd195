use chrono::{Duration, NaiveDateTime};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use crate::due::{due_datetime, is_overdue};
use crate::error::ValidationError;
use crate::models::Task;

/// Criterion used to narrow the visible task list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Filter {
    #[default]
    All,
    Active,
    Completed,
    Overdue,
    Today,
    Week,
}

impl Filter {
    pub const ALL: [Filter; 6] = [
        Filter::All,
        Filter::Active,
        Filter::Completed,
        Filter::Overdue,
        Filter::Today,
        Filter::Week,
    ];

    pub fn tag(self) -> &'static str {
        match self {
            Filter::All => "all",
            Filter::Active => "active",
            Filter::Completed => "completed",
            Filter::Overdue => "overdue",
            Filter::Today => "today",
            Filter::Week => "week",
        }
    }

    /// Next criterion in display order, wrapping around.
    pub fn next(self) -> Filter {
        let i = Filter::ALL.iter().position(|f| *f == self).unwrap_or(0);
        Filter::ALL[(i + 1) % Filter::ALL.len()]
    }

    pub fn matches(self, task: &Task, now: NaiveDateTime) -> bool {
        let today = now.date();
        match self {
            Filter::All => true,
            Filter::Active => !task.completed,
            Filter::Completed => task.completed,
            Filter::Overdue => !task.completed && is_overdue(task, now),
            Filter::Today => !task.completed && task.due_date == Some(today),
            Filter::Week => {
                let week_end = today + Duration::days(7);
                !task.completed
                    && task.due_date.is_some_and(|d| d >= today && d < week_end)
            }
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for Filter {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        Filter::ALL
            .into_iter()
            .find(|f| f.tag() == normalized)
            .ok_or_else(|| ValidationError::UnknownFilter(s.to_string()))
    }
}

/// Returns the tasks matching `filter`, in collection order.
pub fn filter(tasks: &[Task], filter: Filter, now: NaiveDateTime) -> Vec<&Task> {
    tasks.iter().filter(|t| filter.matches(t, now)).collect()
}

fn compare_due(a: &Task, b: &Task) -> Ordering {
    a.completed.cmp(&b.completed).then_with(|| {
        match (due_datetime(a), due_datetime(b)) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    })
}

/// Orders incomplete before completed, dated before undated, then by
/// combined due moment. Stable: ties keep their prior relative order.
pub fn sort_by_due_date(tasks: &mut [Task]) {
    tasks.sort_by(compare_due);
}

/// Counters shown next to the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Stats {
    pub total: usize,
    pub active: usize,
    pub completed: usize,
    pub overdue: usize,
}

pub fn stats(tasks: &[Task], now: NaiveDateTime) -> Stats {
    let completed = tasks.iter().filter(|t| t.completed).count();
    Stats {
        total: tasks.len(),
        active: tasks.len() - completed,
        completed,
        overdue: tasks.iter().filter(|t| is_overdue(t, now)).count(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Reminder;
    use chrono::{NaiveDate, NaiveTime};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn task(id: u64, due: Option<NaiveDate>, completed: bool) -> Task {
        Task {
            id,
            text: format!("task {}", id),
            completed,
            created_at: date(2024, 1, 1).and_hms_opt(0, 0, 0).unwrap(),
            due_date: due,
            due_time: None,
            reminder: Reminder::None,
            notified: false,
        }
    }

    fn ids(tasks: &[Task]) -> Vec<u64> {
        tasks.iter().map(|t| t.id).collect()
    }

    #[test]
    fn dated_tasks_sort_before_undated() {
        let mut tasks = vec![task(1, None, false), task(2, Some(date(2024, 5, 1)), false)];
        sort_by_due_date(&mut tasks);
        assert_eq!(ids(&tasks), vec![2, 1]);
    }

    #[test]
    fn completed_tasks_sort_last_then_by_due() {
        let mut tasks = vec![
            task(1, Some(date(2024, 1, 1)), true),
            task(2, None, false),
            task(3, Some(date(2024, 6, 1)), false),
            task(4, Some(date(2024, 2, 1)), false),
            task(5, None, true),
        ];
        tasks[2].due_time = NaiveTime::from_hms_opt(8, 0, 0);
        sort_by_due_date(&mut tasks);
        assert_eq!(ids(&tasks), vec![4, 3, 2, 1, 5]);
    }

    #[test]
    fn due_time_breaks_same_day_ties() {
        let mut late = task(1, Some(date(2024, 5, 1)), false);
        late.due_time = None;
        let mut early = task(2, Some(date(2024, 5, 1)), false);
        early.due_time = NaiveTime::from_hms_opt(9, 0, 0);
        let mut tasks = vec![late, early];
        sort_by_due_date(&mut tasks);
        assert_eq!(ids(&tasks), vec![2, 1]);
    }

    #[test]
    fn sort_is_stable_across_calls() {
        let mut tasks = vec![
            task(1, None, false),
            task(2, Some(date(2024, 5, 1)), false),
            task(3, None, false),
            task(4, Some(date(2024, 5, 1)), false),
        ];
        sort_by_due_date(&mut tasks);
        assert_eq!(ids(&tasks), vec![2, 4, 1, 3]);
        sort_by_due_date(&mut tasks);
        assert_eq!(ids(&tasks), vec![2, 4, 1, 3]);
    }

    #[test]
    fn today_filter_matches_calendar_day() {
        let now = date(2024, 3, 1).and_hms_opt(10, 0, 0).unwrap();
        let tasks = vec![task(1, Some(date(2024, 3, 1)), false), task(2, Some(date(2024, 3, 2)), false)];
        let view = filter(&tasks, Filter::Today, now);
        assert_eq!(view.len(), 1);
        assert_eq!(view[0].id, 1);
    }

    #[test]
    fn week_filter_covers_seven_days_from_today() {
        let now = date(2024, 3, 1).and_hms_opt(10, 0, 0).unwrap();
        let tasks = vec![
            task(1, Some(date(2024, 2, 29)), false),
            task(2, Some(date(2024, 3, 1)), false),
            task(3, Some(date(2024, 3, 7)), false),
            task(4, Some(date(2024, 3, 8)), false),
            task(5, Some(date(2024, 3, 3)), true),
            task(6, None, false),
        ];
        let view: Vec<u64> = filter(&tasks, Filter::Week, now).iter().map(|t| t.id).collect();
        assert_eq!(view, vec![2, 3]);
    }

    #[test]
    fn overdue_and_status_filters() {
        let now = date(2024, 3, 1).and_hms_opt(10, 0, 0).unwrap();
        let tasks = vec![
            task(1, Some(date(2024, 2, 1)), false),
            task(2, Some(date(2024, 2, 1)), true),
            task(3, None, false),
        ];
        let ids_for = |f| -> Vec<u64> { filter(&tasks, f, now).iter().map(|t| t.id).collect() };
        assert_eq!(ids_for(Filter::Overdue), vec![1]);
        assert_eq!(ids_for(Filter::Completed), vec![2]);
        assert_eq!(ids_for(Filter::Active), vec![1, 3]);
        assert_eq!(ids_for(Filter::All), vec![1, 2, 3]);
    }

    #[test]
    fn stats_count_overdue_and_completed() {
        let now = date(2024, 3, 1).and_hms_opt(10, 0, 0).unwrap();
        let tasks = vec![
            task(1, Some(date(2024, 2, 1)), false),
            task(2, Some(date(2024, 2, 1)), true),
            task(3, None, false),
        ];
        assert_eq!(
            stats(&tasks, now),
            Stats { total: 3, active: 2, completed: 1, overdue: 1 }
        );
    }

    #[test]
    fn filter_tags_parse_and_cycle() {
        assert_eq!("Week".parse::<Filter>().unwrap(), Filter::Week);
        assert!("someday".parse::<Filter>().is_err());
        assert_eq!(Filter::Week.next(), Filter::All);
        assert_eq!(Filter::All.next(), Filter::Active);
    }
}
