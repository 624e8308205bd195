use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use crate::error::ValidationError;
use crate::models::{Reminder, Task, TaskId};
use crate::view;

/// In-memory ordered collection of tasks.
///
/// Newest tasks are kept at the front. The order only changes when
/// [`TaskStore::sort_by_due_date`] is called.
#[derive(Debug, Default, Clone)]
pub struct TaskStore {
    tasks: Vec<Task>,
}

impl TaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store from previously persisted tasks, keeping their order.
    pub fn from_tasks(tasks: Vec<Task>) -> Self {
        Self { tasks }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Adds a new task at the front of the collection.
    ///
    /// The id is the creation time in epoch milliseconds, bumped past the
    /// largest existing id when two tasks are created within the same
    /// millisecond. A `due_time` or `reminder` without a `due_date` is
    /// dropped, since neither has a moment to attach to.
    pub fn add(
        &mut self,
        text: &str,
        due_date: Option<NaiveDate>,
        due_time: Option<NaiveTime>,
        reminder: Reminder,
        created_at: NaiveDateTime,
    ) -> Result<TaskId, ValidationError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ValidationError::EmptyText);
        }

        let stamp = u64::try_from(created_at.and_utc().timestamp_millis()).unwrap_or(0);
        let id = match self.tasks.iter().map(|t| t.id).max() {
            Some(max) if stamp <= max => max + 1,
            _ => stamp,
        };

        self.tasks.insert(
            0,
            Task {
                id,
                text: text.to_string(),
                completed: false,
                created_at,
                due_date,
                due_time: due_date.and(due_time),
                reminder: if due_date.is_some() { reminder } else { Reminder::None },
                notified: false,
            },
        );
        Ok(id)
    }

    /// Flips the completion flag. Returns `false` if no task has this id.
    pub fn toggle_complete(&mut self, id: TaskId) -> bool {
        match self.tasks.iter_mut().find(|t| t.id == id) {
            Some(t) => {
                t.completed = !t.completed;
                true
            }
            None => false,
        }
    }

    /// Records that a reminder fired. The flag is one-way.
    pub fn mark_notified(&mut self, id: TaskId) -> bool {
        match self.tasks.iter_mut().find(|t| t.id == id) {
            Some(t) => {
                t.notified = true;
                true
            }
            None => false,
        }
    }

    /// Removes a task. Returns `false` if no task has this id.
    pub fn delete(&mut self, id: TaskId) -> bool {
        let len_before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        self.tasks.len() != len_before
    }

    /// Removes every task matching `predicate` and returns how many went.
    pub fn delete_where<F>(&mut self, mut predicate: F) -> usize
    where
        F: FnMut(&Task) -> bool,
    {
        let len_before = self.tasks.len();
        self.tasks.retain(|t| !predicate(t));
        len_before - self.tasks.len()
    }

    /// Reorders the collection in place, see [`view::sort_by_due_date`].
    pub fn sort_by_due_date(&mut self) {
        view::sort_by_due_date(&mut self.tasks);
    }
}
