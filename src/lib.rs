//! # Taskbell
//!
//! A terminal task list with due dates and reminders. Tasks can carry a due
//! date, an optional due time and a reminder offset; a reminder scheduler
//! polls the list and raises a local alert when a reminder comes due.
//!
//! ## Usage
//!
//! ```bash
//! # Interactive mode
//! taskbell
//!
//! # Add a task due tomorrow morning, reminded 15 minutes before
//! taskbell add "Standup" --due 2025-12-01 --at 09:00 --remind 15min
//!
//! # List tasks due this week
//! taskbell list --filter week
//!
//! # Run reminders in the foreground
//! taskbell watch
//! ```
//!
//! ## Data Storage
//!
//! Tasks are saved as JSON in your local data directory
//! (`~/.local/share/taskbell/tasks.json` on Linux). Override the path with
//! `TASKS_DB`. Logs are written next to it under `logs/`.
//!
//! ## Reminders
//!
//! The scheduler ticks once at startup and then once per interval (60s by
//! default, `TASKS_REMINDER_INTERVAL_SECS`). A reminder fires when a tick
//! lands within one interval after its notify time, and never fires twice.
//! Reminders whose window passes while the program is not running are not
//! replayed.

pub mod commands;
pub mod config;
pub mod due;
pub mod error;
pub mod logging;
pub mod manager;
pub mod models;
pub mod notify;
pub mod scheduler;
pub mod storage;
pub mod store;
pub mod tui;
pub mod view;
