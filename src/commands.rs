use std::thread;
use chrono::{NaiveDate, NaiveTime};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};
use crate::due::{format_due_label, is_overdue, time_remaining, DueCategory};
use crate::manager::TaskManager;
use crate::models::{Reminder, TaskId};
use crate::scheduler::{Clock, ReminderScheduler, ReminderSink};
use crate::storage::TaskRepository;
use crate::view::Filter;

/// Prints and clears a pending storage failure.
fn report_storage_error<R: TaskRepository, C: Clock>(manager: &mut TaskManager<R, C>, silent: bool) {
    if let Some(e) = manager.take_storage_error() {
        if !silent { eprintln!("Warning: {}", e); }
    }
}

/// Adds a new task and returns its id.
pub fn cmd_add<R: TaskRepository, C: Clock>(
    manager: &mut TaskManager<R, C>,
    text: &str,
    due: Option<NaiveDate>,
    at: Option<NaiveTime>,
    remind: Reminder,
    silent: bool,
) -> Option<TaskId> {
    if due.is_none() && !silent {
        if at.is_some() { eprintln!("Ignoring --at without --due."); }
        if remind != Reminder::None { eprintln!("Ignoring --remind without --due."); }
    }
    let result = manager.add(text, due, at, remind);
    report_storage_error(manager, silent);
    match result {
        Ok(id) => {
            if !silent { println!("Task added (id = {})", id); }
            Some(id)
        }
        Err(e) => {
            if !silent { eprintln!("Task not added: {}", e); }
            None
        }
    }
}

/// Toggles a task between done and pending.
pub fn cmd_toggle<R: TaskRepository, C: Clock>(manager: &mut TaskManager<R, C>, id: TaskId, silent: bool) {
    if manager.toggle_complete(id) {
        let done = manager.get(id).is_some_and(|t| t.completed);
        if !silent { println!("Task {} marked as {}.", id, if done { "done" } else { "pending" }); }
    } else if !silent {
        eprintln!("Task {} not found.", id);
    }
    report_storage_error(manager, silent);
}

/// Removes a task by id.
pub fn cmd_remove<R: TaskRepository, C: Clock>(manager: &mut TaskManager<R, C>, id: TaskId, silent: bool) {
    if manager.delete(id) {
        if !silent { println!("Task {} removed.", id); }
    } else if !silent {
        eprintln!("Task {} not found.", id);
    }
    report_storage_error(manager, silent);
}

/// Removes every completed task.
pub fn cmd_clear_completed<R: TaskRepository, C: Clock>(manager: &mut TaskManager<R, C>, silent: bool) {
    let removed = manager.clear_completed();
    if !silent {
        if removed == 0 {
            println!("No completed tasks to clear.");
        } else {
            println!("Cleared {} completed task(s).", removed);
        }
    }
    report_storage_error(manager, silent);
}

/// Reorders the stored list by due date.
pub fn cmd_sort<R: TaskRepository, C: Clock>(manager: &mut TaskManager<R, C>, silent: bool) {
    manager.sort_by_due_date();
    if !silent { println!("Tasks sorted by due date."); }
    report_storage_error(manager, silent);
}

/// Lists the tasks matching `filter` in a table.
pub fn cmd_list<R: TaskRepository, C: Clock>(manager: &mut TaskManager<R, C>, filter: Filter) {
    report_storage_error(manager, false);
    let now = manager.now();
    let tasks = manager.view(filter, now);
    if tasks.is_empty() {
        println!("No tasks found.");
        return;
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("ID").add_attribute(Attribute::Bold),
            Cell::new("Task").add_attribute(Attribute::Bold),
            Cell::new("Due").add_attribute(Attribute::Bold),
            Cell::new("Time Left").add_attribute(Attribute::Bold),
            Cell::new("Reminder").add_attribute(Attribute::Bold),
            Cell::new("Status").add_attribute(Attribute::Bold),
        ]);

    for t in tasks {
        let remaining = if t.completed { None } else { time_remaining(t, now) };
        let remaining_color = match remaining.map(|r| r.category()) {
            Some(DueCategory::Overdue) => Color::Red,
            Some(DueCategory::Urgent) => Color::Yellow,
            Some(DueCategory::Today) => Color::Cyan,
            _ => Color::Reset,
        };
        let reminder = match (t.reminder, t.notified) {
            (Reminder::None, _) => String::new(),
            (r, true) => format!("{} (sent)", r),
            (r, false) => r.to_string(),
        };
        let (status, status_color) = if t.completed {
            ("Done", Color::Green)
        } else if is_overdue(t, now) {
            ("Overdue", Color::Red)
        } else {
            ("Pending", Color::Yellow)
        };

        table.add_row(vec![
            Cell::new(t.id),
            Cell::new(&t.text),
            Cell::new(format_due_label(t, now).unwrap_or_default()),
            Cell::new(remaining.map(|r| r.to_string()).unwrap_or_default()).fg(remaining_color),
            Cell::new(reminder),
            Cell::new(status).fg(status_color),
        ]);
    }

    println!("{table}");
}

/// Prints task counters.
pub fn cmd_stats<R: TaskRepository, C: Clock>(manager: &mut TaskManager<R, C>) {
    report_storage_error(manager, false);
    let stats = manager.stats(manager.now());
    let mut table = Table::new();
    table.load_preset(UTF8_FULL)
        .set_header(vec!["Total", "Active", "Completed", "Overdue"]);
    table.add_row(vec![
        stats.total.to_string(),
        stats.active.to_string(),
        stats.completed.to_string(),
        stats.overdue.to_string(),
    ]);
    println!("{table}");
}

/// Runs the reminder scheduler in the foreground.
///
/// Ticks once immediately, then once per interval. Stops after `max_ticks`
/// ticks when given, otherwise runs until the process is interrupted.
pub fn cmd_watch<R: TaskRepository, C: Clock>(
    manager: &mut TaskManager<R, C>,
    scheduler: &mut ReminderScheduler,
    sink: &mut dyn ReminderSink,
    max_ticks: Option<u64>,
    silent: bool,
) -> u64 {
    if !silent {
        println!(
            "Watching {} task(s) for reminders every {}s.",
            manager.tasks().len(),
            scheduler.interval().num_seconds()
        );
    }
    report_storage_error(manager, silent);
    scheduler.start(manager.now());

    let mut ticks = 0;
    while scheduler.is_running() {
        let before = scheduler.next_tick();
        manager.poll_reminders(scheduler, sink);
        report_storage_error(manager, silent);
        if scheduler.next_tick() != before {
            ticks += 1;
            if max_ticks.is_some_and(|max| ticks >= max) {
                scheduler.stop();
                break;
            }
        }
        if let Some(wait) = scheduler.time_until_next_tick(manager.now()) {
            thread::sleep(wait);
        }
    }
    ticks
}
