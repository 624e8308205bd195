use ratatui::widgets::TableState;
use chrono::{NaiveDate, NaiveTime};
use crate::error::DeliveryError;
use crate::manager::TaskManager;
use crate::models::{parse_due_date, parse_due_time, Reminder, Task, TaskId};
use crate::notify::reminder_message;
use crate::scheduler::{Clock, ReminderScheduler};
use crate::storage::TaskRepository;
use crate::view::Filter;

#[derive(PartialEq, Debug, Clone, Copy)]
pub enum InputMode {
    Normal,
    Adding,
}

/// Kind of message shown in the status bar.
#[derive(PartialEq, Debug, Clone, Copy)]
pub enum StatusKind {
    Info,
    Reminder,
    Error,
}

/// State for the multi-step "Add Task" wizard.
#[derive(Default)]
pub struct AddState {
    pub text: String,
    pub due: Option<NaiveDate>,
    pub at: Option<NaiveTime>,
    pub step: usize, // 0: Text, 1: Due date, 2: Due time, 3: Reminder
}

pub struct App<R: TaskRepository, C: Clock> {
    pub manager: TaskManager<R, C>,
    pub scheduler: ReminderScheduler,
    pub notifications_enabled: bool,
    /// Ids of the rows currently shown, in display order.
    pub visible: Vec<TaskId>,
    pub state: TableState,
    pub filter: Filter,
    pub input_mode: InputMode,
    pub input_buffer: String,
    pub add_state: AddState,
    pub status: Option<(StatusKind, String)>,
}

impl<R: TaskRepository, C: Clock> App<R, C> {
    /// Creates the app and starts the reminder scheduler.
    pub fn new(manager: TaskManager<R, C>, mut scheduler: ReminderScheduler, notifications_enabled: bool) -> Self {
        scheduler.start(manager.now());
        let mut app = App {
            manager,
            scheduler,
            notifications_enabled,
            visible: Vec::new(),
            state: TableState::default(),
            filter: Filter::All,
            input_mode: InputMode::Normal,
            input_buffer: String::new(),
            add_state: AddState::default(),
            status: None,
        };
        app.check_storage();
        app.reload();
        app
    }

    /// Tasks currently shown, in display order.
    pub fn visible_tasks(&self) -> Vec<&Task> {
        self.visible.iter().filter_map(|id| self.manager.get(*id)).collect()
    }

    pub fn selected_id(&self) -> Option<TaskId> {
        self.state.selected().and_then(|i| self.visible.get(i).copied())
    }

    /// Selects the next row.
    pub fn next(&mut self) {
        if self.visible.is_empty() { return; }
        let i = match self.state.selected() {
            Some(i) if i + 1 < self.visible.len() => i + 1,
            _ => 0,
        };
        self.state.select(Some(i));
    }

    /// Selects the previous row.
    pub fn previous(&mut self) {
        if self.visible.is_empty() { return; }
        let i = match self.state.selected() {
            Some(0) | None => self.visible.len() - 1,
            Some(i) => i - 1,
        };
        self.state.select(Some(i));
    }

    pub fn toggle_selected(&mut self) {
        if let Some(id) = self.selected_id() {
            self.manager.toggle_complete(id);
            self.after_mutation();
        }
    }

    pub fn delete_selected(&mut self) {
        if let Some(id) = self.selected_id() {
            self.manager.delete(id);
            self.after_mutation();
        }
    }

    pub fn clear_completed(&mut self) {
        let removed = self.manager.clear_completed();
        self.set_status(StatusKind::Info, format!("Cleared {} completed task(s)", removed));
        self.after_mutation();
    }

    pub fn sort_by_due_date(&mut self) {
        self.manager.sort_by_due_date();
        self.set_status(StatusKind::Info, "Sorted by due date".to_string());
        self.after_mutation();
    }

    pub fn cycle_filter(&mut self) {
        self.filter = self.filter.next();
        self.reload();
    }

    pub fn dismiss_status(&mut self) {
        self.status = None;
    }

    pub fn start_add(&mut self) {
        self.input_mode = InputMode::Adding;
        self.add_state = AddState::default();
        self.input_buffer.clear();
        self.status = None;
    }

    pub fn cancel_input(&mut self) {
        self.input_mode = InputMode::Normal;
        self.input_buffer.clear();
    }

    /// Consumes the input buffer for the current wizard step.
    ///
    /// Empty due date skips the remaining steps; an invalid value keeps the
    /// wizard on the same step.
    pub fn handle_input(&mut self) {
        let input = std::mem::take(&mut self.input_buffer);
        let value = input.trim();
        match self.add_state.step {
            0 => {
                if value.is_empty() {
                    self.set_status(StatusKind::Error, "Task text cannot be empty".to_string());
                    return;
                }
                self.add_state.text = value.to_string();
                self.add_state.step = 1;
            }
            1 if value.is_empty() => self.finish_add(Reminder::None),
            1 => match parse_due_date(value) {
                Ok(d) => {
                    self.add_state.due = Some(d);
                    self.add_state.step = 2;
                }
                Err(e) => self.set_status(StatusKind::Error, e.to_string()),
            },
            2 if value.is_empty() => self.add_state.step = 3,
            2 => match parse_due_time(value) {
                Ok(t) => {
                    self.add_state.at = Some(t);
                    self.add_state.step = 3;
                }
                Err(e) => self.set_status(StatusKind::Error, e.to_string()),
            },
            _ => {
                let reminder = if value.is_empty() { Ok(Reminder::None) } else { value.parse() };
                match reminder {
                    Ok(r) => self.finish_add(r),
                    Err(e) => self.set_status(StatusKind::Error, e.to_string()),
                }
            }
        }
    }

    fn finish_add(&mut self, reminder: Reminder) {
        let add = std::mem::take(&mut self.add_state);
        self.input_mode = InputMode::Normal;
        match self.manager.add(&add.text, add.due, add.at, reminder) {
            Ok(id) => self.set_status(StatusKind::Info, format!("Task added (id = {})", id)),
            Err(e) => self.set_status(StatusKind::Error, e.to_string()),
        }
        self.after_mutation();
    }

    /// Polls the reminder scheduler and shows fired reminders.
    pub fn on_tick(&mut self) {
        let enabled = self.notifications_enabled;
        let mut delivered: Vec<Task> = Vec::new();
        let fired = {
            let mut sink = |task: &Task| -> Result<(), DeliveryError> {
                if !enabled {
                    return Err(DeliveryError::PermissionDenied);
                }
                delivered.push(task.clone());
                Ok(())
            };
            self.manager.poll_reminders(&mut self.scheduler, &mut sink)
        };
        if !delivered.is_empty() {
            let message = delivered
                .iter()
                .map(|t| reminder_message(t, self.manager.clock()))
                .collect::<Vec<_>>()
                .join(" | ");
            self.set_status(StatusKind::Reminder, message);
        }
        if !fired.is_empty() {
            self.check_storage();
            self.reload();
        }
    }

    pub fn time_until_next_tick(&self) -> Option<std::time::Duration> {
        self.scheduler.time_until_next_tick(self.manager.now())
    }

    /// Stops the reminder scheduler.
    pub fn shutdown(&mut self) {
        self.scheduler.stop();
    }

    fn set_status(&mut self, kind: StatusKind, message: String) {
        self.status = Some((kind, message));
    }

    fn after_mutation(&mut self) {
        self.check_storage();
        self.reload();
    }

    fn check_storage(&mut self) {
        if let Some(e) = self.manager.take_storage_error() {
            self.set_status(StatusKind::Error, e.to_string());
        }
    }

    /// Recomputes the visible rows for the active filter.
    pub fn reload(&mut self) {
        let now = self.manager.now();
        self.visible = self.manager.view(self.filter, now).iter().map(|t| t.id).collect();

        if self.visible.is_empty() {
            self.state.select(None);
        } else if let Some(i) = self.state.selected() {
            if i >= self.visible.len() {
                self.state.select(Some(self.visible.len() - 1));
            }
        } else {
            self.state.select(Some(0));
        }
    }
}
