pub mod app;
pub mod ui;

use std::{error::Error, io, time::Duration};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use app::{App, InputMode};
use ui::ui;
use crate::config::Config;
use crate::manager::TaskManager;
use crate::scheduler::{Clock, ReminderScheduler, SystemClock};
use crate::storage::{JsonFileRepository, TaskRepository};

/// Longest the loop waits for input, so remaining times stay fresh.
const REDRAW_EVERY: Duration = Duration::from_secs(1);

pub fn run_tui(config: &Config) -> Result<(), Box<dyn Error>> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create app state
    let manager = TaskManager::open(JsonFileRepository::new(&config.db_path), SystemClock);
    let scheduler = ReminderScheduler::new(config.reminder_interval);
    let mut app = App::new(manager, scheduler, config.notifications_enabled);

    // Run loop
    let res = run_app(&mut terminal, &mut app);
    app.shutdown();

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    res?;
    Ok(())
}

fn run_app<B: Backend, R: TaskRepository, C: Clock>(
    terminal: &mut Terminal<B>,
    app: &mut App<R, C>,
) -> io::Result<()> {
    loop {
        app.on_tick();
        terminal.draw(|f| ui(f, app))?;

        let timeout = app
            .time_until_next_tick()
            .map_or(REDRAW_EVERY, |d| d.min(REDRAW_EVERY));
        if !event::poll(timeout)? {
            continue;
        }

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            match app.input_mode {
                InputMode::Normal => match key.code {
                    KeyCode::Char('q') => return Ok(()),
                    KeyCode::Down | KeyCode::Char('j') => app.next(),
                    KeyCode::Up | KeyCode::Char('k') => app.previous(),
                    KeyCode::Char(' ') => app.toggle_selected(),
                    KeyCode::Char('d') | KeyCode::Delete => app.delete_selected(),
                    KeyCode::Char('a') => app.start_add(),
                    KeyCode::Char('f') => app.cycle_filter(),
                    KeyCode::Char('s') => app.sort_by_due_date(),
                    KeyCode::Char('C') => app.clear_completed(),
                    KeyCode::Esc => app.dismiss_status(),
                    _ => {}
                },
                InputMode::Adding => match key.code {
                    KeyCode::Enter => app.handle_input(),
                    KeyCode::Esc => app.cancel_input(),
                    KeyCode::Char(c) => {
                        app.input_buffer.push(c);
                    }
                    KeyCode::Backspace => {
                        app.input_buffer.pop();
                    }
                    _ => {}
                }
            }
        }
    }
}
