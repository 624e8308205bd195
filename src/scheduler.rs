//! Reminder scheduler.
//!
//! Every tick walks the store once and fires reminders whose notify time
//! was crossed within the last polling window. A task moves from pending to
//! notified at most once.
//!
//! Known limitation: a reminder is only detected when a tick lands within
//! one window after its notify time. If the process is suspended across that
//! window the reminder is missed; there is no catch-up pass.

use chrono::{Duration, Local, NaiveDateTime};
use log::{debug, info, warn};
use std::cell::Cell;
use crate::due::due_datetime;
use crate::error::DeliveryError;
use crate::models::{Reminder, Task, TaskId};
use crate::store::TaskStore;

/// Default polling period, which is also the notify window.
pub const DEFAULT_INTERVAL_SECS: i64 = 60;

/// Source of the current local wall-clock time.
pub trait Clock {
    fn now(&self) -> NaiveDateTime;
}

/// Reads the host's local time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Clock frozen at a settable instant.
#[derive(Debug, Clone)]
pub struct FixedClock {
    now: Cell<NaiveDateTime>,
}

impl FixedClock {
    pub fn new(now: NaiveDateTime) -> Self {
        Self { now: Cell::new(now) }
    }

    pub fn set(&self, now: NaiveDateTime) {
        self.now.set(now);
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.now.get()
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> NaiveDateTime {
        (**self).now()
    }
}

/// Receives reminders as they fire. Delivery is the caller's concern.
pub trait ReminderSink {
    fn on_reminder_fire(&mut self, task: &Task) -> Result<(), DeliveryError>;
}

impl<F> ReminderSink for F
where
    F: FnMut(&Task) -> Result<(), DeliveryError>,
{
    fn on_reminder_fire(&mut self, task: &Task) -> Result<(), DeliveryError> {
        self(task)
    }
}

/// Moment the reminder for `task` should fire, if it has one.
pub fn notify_time(task: &Task) -> Option<NaiveDateTime> {
    let offset = task.reminder.offset()?;
    Some(due_datetime(task)? - offset)
}

/// Whether `task` still waits for its reminder and the notify time was
/// crossed less than `window` ago.
pub fn is_due_for_reminder(task: &Task, now: NaiveDateTime, window: Duration) -> bool {
    if task.completed || task.notified || task.reminder == Reminder::None {
        return false;
    }
    match notify_time(task) {
        Some(at) => {
            let delta = now - at;
            delta >= Duration::zero() && delta < window
        }
        None => false,
    }
}

/// Cancellable periodic evaluator, driven by the host loop calling
/// [`ReminderScheduler::poll`].
#[derive(Debug, Clone)]
pub struct ReminderScheduler {
    interval: Duration,
    next_tick: Option<NaiveDateTime>,
}

impl Default for ReminderScheduler {
    fn default() -> Self {
        Self::new(Duration::seconds(DEFAULT_INTERVAL_SECS))
    }
}

impl ReminderScheduler {
    /// Creates a stopped scheduler. Intervals below one second are raised.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval: interval.max(Duration::seconds(1)),
            next_tick: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Starts ticking. The first tick is due immediately.
    pub fn start(&mut self, now: NaiveDateTime) {
        info!("event=scheduler_start interval_secs={}", self.interval.num_seconds());
        self.next_tick = Some(now);
    }

    /// Cancels all future ticks.
    pub fn stop(&mut self) {
        if self.next_tick.take().is_some() {
            info!("event=scheduler_stop");
        }
    }

    pub fn is_running(&self) -> bool {
        self.next_tick.is_some()
    }

    pub fn next_tick(&self) -> Option<NaiveDateTime> {
        self.next_tick
    }

    /// How long the host loop may sleep before the next poll.
    ///
    /// `None` when stopped, zero when a tick is already due.
    pub fn time_until_next_tick(&self, now: NaiveDateTime) -> Option<std::time::Duration> {
        let next = self.next_tick?;
        Some((next - now).to_std().unwrap_or(std::time::Duration::ZERO))
    }

    /// Runs a tick when one is due and schedules the following one.
    ///
    /// Returns the ids of tasks whose reminder fired.
    pub fn poll(
        &mut self,
        store: &mut TaskStore,
        now: NaiveDateTime,
        sink: &mut dyn ReminderSink,
    ) -> Vec<TaskId> {
        let Some(next) = self.next_tick else {
            return Vec::new();
        };
        if now < next {
            return Vec::new();
        }
        let mut following = next + self.interval;
        if following <= now {
            // Slept through several periods: realign instead of replaying them.
            following = now + self.interval;
        }
        self.next_tick = Some(following);
        self.tick(store, now, sink)
    }

    /// Evaluates every task once and fires the reminders that are due.
    ///
    /// The task is marked notified even when delivery fails, so a reminder
    /// is never attempted twice.
    pub fn tick(
        &self,
        store: &mut TaskStore,
        now: NaiveDateTime,
        sink: &mut dyn ReminderSink,
    ) -> Vec<TaskId> {
        let fired: Vec<TaskId> = store
            .tasks()
            .iter()
            .filter(|t| is_due_for_reminder(t, now, self.interval))
            .map(|t| t.id)
            .collect();
        for &id in &fired {
            if let Some(task) = store.get(id) {
                match sink.on_reminder_fire(task) {
                    Ok(()) => info!("event=reminder_fired task_id={}", id),
                    Err(DeliveryError::PermissionDenied) => {
                        debug!("event=reminder_fired task_id={} alert=skipped reason=permission", id)
                    }
                    Err(e) => warn!("event=reminder_fired task_id={} status=error error={}", id, e),
                }
            }
            store.mark_notified(id);
        }
        fired
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};

    fn dt(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 10).unwrap().and_hms_opt(h, m, s).unwrap()
    }

    fn store_with(reminder: Reminder) -> (TaskStore, TaskId) {
        let mut store = TaskStore::new();
        let id = store
            .add(
                "standup",
                NaiveDate::from_ymd_opt(2024, 1, 10),
                NaiveTime::from_hms_opt(9, 0, 0),
                reminder,
                dt(7, 0, 0),
            )
            .unwrap();
        (store, id)
    }

    fn collect(fired: &mut Vec<TaskId>) -> impl FnMut(&Task) -> Result<(), DeliveryError> + '_ {
        move |t: &Task| {
            fired.push(t.id);
            Ok(())
        }
    }

    #[test]
    fn fires_inside_window() {
        let (mut store, id) = store_with(Reminder::FifteenMinutes);
        let scheduler = ReminderScheduler::default();
        let mut seen = Vec::new();
        let fired = scheduler.tick(&mut store, dt(8, 45, 30), &mut collect(&mut seen));
        assert_eq!(fired, vec![id]);
        assert_eq!(seen, vec![id]);
        assert!(store.get(id).unwrap().notified);
    }

    #[test]
    fn window_is_half_open() {
        let (mut store, _) = store_with(Reminder::AtTime);
        let scheduler = ReminderScheduler::default();
        let mut noop = |_: &Task| -> Result<(), DeliveryError> { Ok(()) };
        assert!(scheduler.tick(&mut store, dt(8, 59, 59), &mut noop).is_empty());
        assert!(scheduler.tick(&mut store, dt(9, 1, 0), &mut noop).is_empty());
        assert_eq!(scheduler.tick(&mut store, dt(9, 0, 0), &mut noop).len(), 1);
    }

    #[test]
    fn notified_is_never_reset_or_refired() {
        let (mut store, id) = store_with(Reminder::FiveMinutes);
        let scheduler = ReminderScheduler::default();
        let mut count = 0;
        let mut sink = |_: &Task| -> Result<(), DeliveryError> {
            count += 1;
            Ok(())
        };
        scheduler.tick(&mut store, dt(8, 55, 0), &mut sink);
        scheduler.tick(&mut store, dt(8, 55, 30), &mut sink);
        scheduler.tick(&mut store, dt(12, 0, 0), &mut sink);
        assert_eq!(count, 1);
        assert!(store.get(id).unwrap().notified);
    }

    #[test]
    fn alert_is_delivered_before_the_task_is_marked() {
        let (mut store, id) = store_with(Reminder::AtTime);
        let scheduler = ReminderScheduler::default();
        let mut seen = Vec::new();
        let mut sink = |t: &Task| -> Result<(), DeliveryError> {
            seen.push(t.notified);
            Ok(())
        };
        assert_eq!(scheduler.tick(&mut store, dt(9, 0, 0), &mut sink), vec![id]);
        assert_eq!(seen, vec![false]);
        assert!(store.get(id).unwrap().notified);
    }

    #[test]
    fn skips_completed_and_reminderless_tasks() {
        let (mut store, _) = store_with(Reminder::None);
        let scheduler = ReminderScheduler::default();
        let mut noop = |_: &Task| -> Result<(), DeliveryError> { Ok(()) };
        assert!(scheduler.tick(&mut store, dt(9, 0, 0), &mut noop).is_empty());

        let (mut store, id2) = store_with(Reminder::AtTime);
        store.toggle_complete(id2);
        assert!(scheduler.tick(&mut store, dt(9, 0, 0), &mut noop).is_empty());
        assert!(!store.get(id2).unwrap().notified);
    }

    #[test]
    fn denied_or_failed_delivery_still_marks_notified() {
        let (mut store, id) = store_with(Reminder::AtTime);
        let scheduler = ReminderScheduler::default();
        let mut denied = |_: &Task| -> Result<(), DeliveryError> { Err(DeliveryError::PermissionDenied) };
        assert_eq!(scheduler.tick(&mut store, dt(9, 0, 10), &mut denied), vec![id]);
        assert!(store.get(id).unwrap().notified);

        let (mut store, id) = store_with(Reminder::AtTime);
        let mut broken =
            |_: &Task| -> Result<(), DeliveryError> { Err(DeliveryError::Failed("no display".into())) };
        assert_eq!(scheduler.tick(&mut store, dt(9, 0, 10), &mut broken), vec![id]);
        assert!(store.get(id).unwrap().notified);
    }

    #[test]
    fn poll_ticks_immediately_then_every_interval() {
        let (mut store, _) = store_with(Reminder::AtTime);
        let mut scheduler = ReminderScheduler::default();
        let mut sink = |_: &Task| -> Result<(), DeliveryError> { Ok(()) };

        assert!(!scheduler.is_running());
        assert!(scheduler.poll(&mut store, dt(9, 0, 5), &mut sink).is_empty());
        assert!(!store.tasks()[0].notified);

        scheduler.start(dt(8, 58, 30));
        assert_eq!(scheduler.time_until_next_tick(dt(8, 58, 30)), Some(std::time::Duration::ZERO));
        assert!(scheduler.poll(&mut store, dt(8, 58, 30), &mut sink).is_empty());
        assert_eq!(scheduler.next_tick(), Some(dt(8, 59, 30)));
        assert!(scheduler.poll(&mut store, dt(8, 59, 0), &mut sink).is_empty());
        assert_eq!(scheduler.poll(&mut store, dt(9, 0, 0), &mut sink).len(), 1);
        assert_eq!(scheduler.next_tick(), Some(dt(9, 0, 30)));
    }

    #[test]
    fn stop_cancels_future_ticks() {
        let (mut store, id) = store_with(Reminder::AtTime);
        let mut scheduler = ReminderScheduler::default();
        let mut noop = |_: &Task| -> Result<(), DeliveryError> { Ok(()) };
        scheduler.start(dt(8, 0, 0));
        scheduler.poll(&mut store, dt(8, 0, 0), &mut noop);
        scheduler.stop();
        assert!(!scheduler.is_running());
        assert_eq!(scheduler.time_until_next_tick(dt(9, 0, 0)), None);
        assert!(scheduler.poll(&mut store, dt(9, 0, 0), &mut noop).is_empty());
        assert!(!store.get(id).unwrap().notified);
    }

    #[test]
    fn late_poll_realigns_next_tick() {
        let (mut store, _) = store_with(Reminder::None);
        let mut scheduler = ReminderScheduler::default();
        let mut noop = |_: &Task| -> Result<(), DeliveryError> { Ok(()) };
        scheduler.start(dt(8, 0, 0));
        scheduler.poll(&mut store, dt(8, 10, 0), &mut noop);
        assert_eq!(scheduler.next_tick(), Some(dt(8, 11, 0)));
    }

    #[test]
    fn fixed_clock_advances() {
        let clock = FixedClock::new(dt(8, 0, 0));
        clock.advance(Duration::minutes(90));
        assert_eq!(clock.now(), dt(9, 30, 0));
    }
}
