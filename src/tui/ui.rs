use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table},
    Frame,
};
use crate::due::{format_due_label, is_overdue, time_remaining, DueCategory};
use crate::models::Reminder;
use crate::scheduler::Clock;
use crate::storage::TaskRepository;
use super::app::{App, InputMode, StatusKind};

pub fn ui<R: TaskRepository, C: Clock>(f: &mut Frame, app: &mut App<R, C>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Stats
            Constraint::Min(0),    // Table
            Constraint::Length(3)  // Status / Help
        ].as_ref())
        .split(f.area());

    let now = app.manager.now();
    let stats = app.manager.stats(now);
    let header = Paragraph::new(format!(
        "Total: {}  Active: {}  Completed: {}  Overdue: {}    Filter: {}",
        stats.total, stats.active, stats.completed, stats.overdue, app.filter
    ))
    .block(Block::default().borders(Borders::ALL).title("Taskbell"));
    f.render_widget(header, chunks[0]);

    let rows: Vec<Row> = app
        .visible_tasks()
        .into_iter()
        .map(|t| {
            let remaining = if t.completed { None } else { time_remaining(t, now) };
            let style = if t.completed {
                Style::default().fg(Color::DarkGray)
            } else {
                match remaining.map(|r| r.category()) {
                    Some(DueCategory::Overdue) => Style::default().fg(Color::Red),
                    Some(DueCategory::Urgent) => Style::default().fg(Color::Yellow),
                    Some(DueCategory::Today) => Style::default().fg(Color::Cyan),
                    _ => Style::default().fg(Color::Green),
                }
            };
            let reminder = match (t.reminder, t.notified) {
                (Reminder::None, _) => String::new(),
                (r, true) => format!("{} (sent)", r),
                (r, false) => r.to_string(),
            };
            let status = if t.completed {
                "Done"
            } else if is_overdue(t, now) {
                "Overdue"
            } else {
                "Pending"
            };

            Row::new(vec![
                Cell::from(t.id.to_string()),
                Cell::from(t.text.clone()),
                Cell::from(format_due_label(t, now).unwrap_or_default()),
                Cell::from(remaining.map(|r| r.to_string()).unwrap_or_default()),
                Cell::from(reminder),
                Cell::from(status),
            ]).style(style)
        })
        .collect();

    let widths = [
        Constraint::Length(14),
        Constraint::Min(20),
        Constraint::Length(16),
        Constraint::Length(10),
        Constraint::Length(15),
        Constraint::Length(8),
    ];

    let table = Table::new(rows, widths)
        .header(Row::new(vec!["ID", "Task", "Due", "Time Left", "Reminder", "Status"])
            .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
            .bottom_margin(1))
        .block(Block::default().borders(Borders::ALL).title(format!("Tasks - {}", app.filter)))
        .row_highlight_style(Style::default().add_modifier(Modifier::BOLD).bg(Color::DarkGray))
        .highlight_symbol(">> ");

    f.render_stateful_widget(table, chunks[1], &mut app.state);

    let (footer_text, footer_style) = match (&app.status, app.input_mode) {
        (Some((kind, message)), _) => {
            let color = match kind {
                StatusKind::Info => Color::Green,
                StatusKind::Reminder => Color::Magenta,
                StatusKind::Error => Color::Red,
            };
            (message.clone(), Style::default().fg(color).add_modifier(Modifier::BOLD))
        }
        (None, InputMode::Normal) => (
            "q: Quit | a: Add | Space: Toggle Done | d: Del | f: Filter | s: Sort by Due | C: Clear Done | Esc: Dismiss".to_string(),
            Style::default().fg(Color::Gray),
        ),
        (None, InputMode::Adding) => (
            "Enter: Next Step | Esc: Cancel".to_string(),
            Style::default().fg(Color::Gray),
        ),
    };

    let footer = Paragraph::new(footer_text)
        .style(footer_style)
        .block(Block::default().borders(Borders::ALL));

    f.render_widget(footer, chunks[2]);

    // Render Input Box if needed
    if app.input_mode == InputMode::Adding {
        let area = centered_rect(60, 3, f.area()); // Fixed height of 3 (border + 1 line)
        f.render_widget(Clear, area); // Clear the area first

        let title = match app.add_state.step {
            0 => "Add Task: Enter Text",
            1 => "Add Task: Enter Due Date (YYYY-MM-DD, Optional)",
            2 => "Add Task: Enter Due Time (HH:MM, Optional)",
            _ => "Add Task: Reminder (none, 5min, 15min, 30min, at-time)",
        };

        let input = Paragraph::new(app.input_buffer.as_str())
            .style(Style::default().fg(Color::Yellow))
            .block(Block::default().borders(Borders::ALL).title(title));

        f.render_widget(input, area);
    }
}

fn centered_rect(percent_x: u16, height: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(r.height.saturating_sub(height) / 2),
            Constraint::Length(height),
            Constraint::Length(r.height.saturating_sub(height) / 2),
        ].as_ref())
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ].as_ref())
        .split(popup_layout[1])[1]
}
