use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use log::{debug, error, info};
use crate::error::{StorageError, ValidationError};
use crate::models::{Reminder, Task, TaskId};
use crate::scheduler::{Clock, ReminderScheduler, ReminderSink};
use crate::storage::TaskRepository;
use crate::store::TaskStore;
use crate::view::{self, Filter, Stats};

/// Entry point used by the presentation layer.
///
/// Owns the task store, writes every mutation through the repository and
/// keeps the in-memory state authoritative when storage fails. The most
/// recent storage failure is kept until [`TaskManager::take_storage_error`]
/// is called so the caller can report it.
pub struct TaskManager<R: TaskRepository, C: Clock> {
    store: TaskStore,
    repo: R,
    clock: C,
    storage_error: Option<StorageError>,
}

impl<R: TaskRepository, C: Clock> TaskManager<R, C> {
    /// Loads the stored tasks. A failed load starts from an empty list.
    pub fn open(repo: R, clock: C) -> Self {
        let (store, storage_error) = match repo.load() {
            Ok(tasks) => {
                info!("event=tasks_loaded status=ok count={}", tasks.len());
                (TaskStore::from_tasks(tasks), None)
            }
            Err(e) => {
                error!("event=tasks_loaded status=error error={}", e);
                (TaskStore::new(), Some(e))
            }
        };
        Self { store, repo, clock, storage_error }
    }

    pub fn tasks(&self) -> &[Task] {
        self.store.tasks()
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.store.get(id)
    }

    pub fn now(&self) -> NaiveDateTime {
        self.clock.now()
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Adds a task. Empty text is rejected without touching the store.
    pub fn add(
        &mut self,
        text: &str,
        due_date: Option<NaiveDate>,
        due_time: Option<NaiveTime>,
        reminder: Reminder,
    ) -> Result<TaskId, ValidationError> {
        let id = self
            .store
            .add(text, due_date, due_time, reminder, self.clock.now())
            .inspect_err(|e| debug!("event=task_add status=rejected reason={}", e))?;
        info!("event=task_add status=ok task_id={}", id);
        self.persist();
        Ok(id)
    }

    /// Flips completion. Unknown ids are ignored and return `false`.
    pub fn toggle_complete(&mut self, id: TaskId) -> bool {
        let found = self.store.toggle_complete(id);
        if found {
            info!("event=task_toggle status=ok task_id={}", id);
            self.persist();
        }
        found
    }

    pub fn delete(&mut self, id: TaskId) -> bool {
        let found = self.store.delete(id);
        if found {
            info!("event=task_delete status=ok task_id={}", id);
            self.persist();
        }
        found
    }

    /// Removes every completed task and returns how many were removed.
    pub fn clear_completed(&mut self) -> usize {
        let removed = self.store.delete_where(|t| t.completed);
        if removed > 0 {
            info!("event=clear_completed status=ok removed={}", removed);
            self.persist();
        }
        removed
    }

    /// Reorders the stored collection by due date.
    pub fn sort_by_due_date(&mut self) {
        self.store.sort_by_due_date();
        self.persist();
    }

    /// Tasks matching `filter`, in collection order.
    pub fn view(&self, filter: Filter, now: NaiveDateTime) -> Vec<&Task> {
        view::filter(self.store.tasks(), filter, now)
    }

    pub fn stats(&self, now: NaiveDateTime) -> Stats {
        view::stats(self.store.tasks(), now)
    }

    /// Lets `scheduler` tick against the store at the clock's current time
    /// and persists any reminder that fired.
    pub fn poll_reminders(
        &mut self,
        scheduler: &mut ReminderScheduler,
        sink: &mut dyn ReminderSink,
    ) -> Vec<TaskId> {
        let now = self.clock.now();
        let fired = scheduler.poll(&mut self.store, now, sink);
        if !fired.is_empty() {
            self.persist();
        }
        fired
    }

    /// Returns and clears the last storage failure.
    pub fn take_storage_error(&mut self) -> Option<StorageError> {
        self.storage_error.take()
    }

    fn persist(&mut self) {
        if let Err(e) = self.repo.save(self.store.tasks()) {
            error!("event=tasks_saved status=error error={}", e);
            self.storage_error = Some(e);
        }
    }
}
