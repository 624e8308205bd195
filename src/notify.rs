use std::io::{self, Write};
use crate::due::format_due_label;
use crate::error::DeliveryError;
use crate::models::Task;
use crate::scheduler::{Clock, ReminderSink, SystemClock};

/// Alert text shown when a reminder fires.
pub fn reminder_message(task: &Task, clock: &dyn Clock) -> String {
    match format_due_label(task, clock.now()) {
        Some(label) => format!("Reminder: {} (due {})", task.text, label),
        None => format!("Reminder: {}", task.text),
    }
}

/// Rings the terminal bell and prints the alert on stdout.
pub struct TerminalNotifier<W: Write = io::Stdout> {
    out: W,
    enabled: bool,
    clock: Box<dyn Clock>,
}

impl TerminalNotifier {
    pub fn stdout(enabled: bool) -> Self {
        Self::new(io::stdout(), enabled, Box::new(SystemClock))
    }
}

impl<W: Write> TerminalNotifier<W> {
    pub fn new(out: W, enabled: bool, clock: Box<dyn Clock>) -> Self {
        Self { out, enabled, clock }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ReminderSink for TerminalNotifier<W> {
    fn on_reminder_fire(&mut self, task: &Task) -> Result<(), DeliveryError> {
        if !self.enabled {
            return Err(DeliveryError::PermissionDenied);
        }
        let message = reminder_message(task, self.clock.as_ref());
        writeln!(self.out, "\x07{}", message)
            .and_then(|_| self.out.flush())
            .map_err(|e| DeliveryError::Failed(e.to_string()))
    }
}
