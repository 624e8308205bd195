use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use log::warn;
use chrono::{NaiveDate, NaiveTime};
use std::io;
use taskbell::commands::*;
use taskbell::config::Config;
use taskbell::logging::init_logging;
use taskbell::manager::TaskManager;
use taskbell::models::{parse_due_date, parse_due_time, Reminder, TaskId};
use taskbell::notify::TerminalNotifier;
use taskbell::scheduler::{ReminderScheduler, SystemClock};
use taskbell::storage::JsonFileRepository;
use taskbell::tui::run_tui;
use taskbell::view::Filter;

#[derive(Parser)]
#[command(name = "taskbell")]
#[command(about = "Terminal task list with due dates and reminders", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a new task
    Add {
        /// Task text (quoted if it has spaces)
        text: String,
        /// Due date in YYYY-MM-DD
        #[arg(short, long, value_parser = parse_due_date)]
        due: Option<NaiveDate>,
        /// Due time in HH:MM (defaults to 23:59 when only --due is given)
        #[arg(short, long, value_parser = parse_due_time)]
        at: Option<NaiveTime>,
        /// Reminder (none, 5min, 15min, 30min, at-time)
        #[arg(short, long, default_value = "none")]
        remind: Reminder,
    },
    /// List tasks
    List {
        /// Filter (all, active, completed, overdue, today, week)
        #[arg(short, long, default_value = "all")]
        filter: Filter,
    },
    /// Toggle a task between done and pending
    Toggle {
        id: TaskId,
    },
    /// Remove a task
    Remove {
        id: TaskId,
    },
    /// Remove all completed tasks
    ClearCompleted,
    /// Reorder the stored list by due date
    Sort,
    /// Show task counters
    Stats,
    /// Run the reminder scheduler in the foreground
    Watch {
        /// Stop after this many ticks
        #[arg(short, long)]
        ticks: Option<u64>,
    },
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for (bash, zsh, fish, powershell, elvish)
        shell: String,
    },
    /// Open interactive TUI
    Ui,
}

fn main() {
    let cli = Cli::parse();
    let config = Config::from_env();
    match init_logging(&config.log_level, &config.log_dir) {
        Ok(()) => {
            for w in &config.warnings {
                warn!("{}", w);
            }
        }
        Err(e) => {
            eprintln!("Logging disabled: {}", e);
            for w in &config.warnings {
                eprintln!("Warning: {}", w);
            }
        }
    }

    let open = || TaskManager::open(JsonFileRepository::new(&config.db_path), SystemClock);

    match cli.command {
        Some(Commands::Add { text, due, at, remind }) => {
            cmd_add(&mut open(), &text, due, at, remind, false);
        }
        Some(Commands::List { filter }) => cmd_list(&mut open(), filter),
        Some(Commands::Toggle { id }) => cmd_toggle(&mut open(), id, false),
        Some(Commands::Remove { id }) => cmd_remove(&mut open(), id, false),
        Some(Commands::ClearCompleted) => cmd_clear_completed(&mut open(), false),
        Some(Commands::Sort) => cmd_sort(&mut open(), false),
        Some(Commands::Stats) => cmd_stats(&mut open()),
        Some(Commands::Watch { ticks }) => {
            let mut scheduler = ReminderScheduler::new(config.reminder_interval);
            let mut notifier = TerminalNotifier::stdout(config.notifications_enabled);
            cmd_watch(&mut open(), &mut scheduler, &mut notifier, ticks, false);
        }
        Some(Commands::Completions { shell }) => {
            let shell_enum = match shell.as_str() {
                "bash" => Shell::Bash,
                "zsh" => Shell::Zsh,
                "fish" => Shell::Fish,
                "powershell" => Shell::PowerShell,
                "elvish" => Shell::Elvish,
                _ => {
                    eprintln!("Unsupported shell: {}", shell);
                    return;
                }
            };
            let mut cmd = Cli::command();
            generate(shell_enum, &mut cmd, "taskbell", &mut io::stdout());
        }
        Some(Commands::Ui) | None => {
            if let Err(e) = run_tui(&config) {
                eprintln!("Error running TUI: {}", e);
            }
        }
    }
}
