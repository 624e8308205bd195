use taskbell::commands::*;
use taskbell::manager::TaskManager;
use taskbell::models::Reminder;
use taskbell::scheduler::{FixedClock, ReminderScheduler};
use taskbell::storage::{JsonFileRepository, TaskRepository};
use taskbell::error::DeliveryError;
use taskbell::models::Task;
use taskbell::view::Filter;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use std::path::PathBuf;

fn at(y: i32, m: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(h, mi, s).unwrap()
}

fn with_test_db<F>(f: F)
where
    F: FnOnce(PathBuf),
{
    let dir = tempfile::tempdir().unwrap();
    f(dir.path().join("tasks.json"));
}

fn open(path: &PathBuf, now: NaiveDateTime) -> TaskManager<JsonFileRepository, FixedClock> {
    TaskManager::open(JsonFileRepository::new(path), FixedClock::new(now))
}

#[test]
fn test_add_and_reload() {
    with_test_db(|path| {
        let mut manager = open(&path, at(2024, 1, 10, 8, 0, 0));
        let id = cmd_add(
            &mut manager,
            "Write report",
            NaiveDate::from_ymd_opt(2024, 1, 12),
            NaiveTime::from_hms_opt(17, 0, 0),
            Reminder::ThirtyMinutes,
            true,
        )
        .unwrap();

        let tasks = JsonFileRepository::new(&path).load().unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].id, id);
        assert_eq!(tasks[0].text, "Write report");
        assert_eq!(tasks[0].reminder, Reminder::ThirtyMinutes);
    });
}

#[test]
fn test_add_without_due_ignores_at_and_remind() {
    with_test_db(|path| {
        let mut manager = open(&path, at(2024, 1, 10, 8, 0, 0));
        cmd_add(
            &mut manager,
            "Call back",
            None,
            NaiveTime::from_hms_opt(9, 0, 0),
            Reminder::FiveMinutes,
            true,
        )
        .unwrap();

        let tasks = JsonFileRepository::new(&path).load().unwrap();
        assert_eq!(tasks[0].due_time, None);
        assert_eq!(tasks[0].reminder, Reminder::None);
    });
}

#[test]
fn test_add_empty_text_is_rejected() {
    with_test_db(|path| {
        let mut manager = open(&path, at(2024, 1, 10, 8, 0, 0));
        cmd_add(&mut manager, "keep", None, None, Reminder::None, true).unwrap();
        assert!(cmd_add(&mut manager, "  ", None, None, Reminder::None, true).is_none());
        assert_eq!(manager.tasks().len(), 1);
        assert_eq!(JsonFileRepository::new(&path).load().unwrap().len(), 1);
    });
}

#[test]
fn test_toggle_remove_and_clear() {
    with_test_db(|path| {
        let mut manager = open(&path, at(2024, 1, 10, 8, 0, 0));
        let a = cmd_add(&mut manager, "a", None, None, Reminder::None, true).unwrap();
        let b = cmd_add(&mut manager, "b", None, None, Reminder::None, true).unwrap();
        let c = cmd_add(&mut manager, "c", None, None, Reminder::None, true).unwrap();

        cmd_toggle(&mut manager, a, true);
        cmd_toggle(&mut manager, b, true);
        cmd_remove(&mut manager, c, true);
        cmd_toggle(&mut manager, 42, true);

        let reopened = open(&path, at(2024, 1, 10, 8, 0, 0));
        assert_eq!(reopened.tasks().len(), 2);
        assert!(reopened.tasks().iter().all(|t| t.completed));

        let mut manager = reopened;
        cmd_clear_completed(&mut manager, true);
        assert!(manager.tasks().is_empty());
        assert!(JsonFileRepository::new(&path).load().unwrap().is_empty());
    });
}

#[test]
fn test_sort_persists_new_order() {
    with_test_db(|path| {
        let mut manager = open(&path, at(2024, 1, 10, 8, 0, 0));
        let undated = cmd_add(&mut manager, "someday", None, None, Reminder::None, true).unwrap();
        let dated = cmd_add(&mut manager, "dated", NaiveDate::from_ymd_opt(2024, 5, 1), None, Reminder::None, true).unwrap();
        // Newest first before sorting.
        assert_eq!(manager.tasks()[0].id, dated);
        cmd_toggle(&mut manager, dated, true);
        cmd_sort(&mut manager, true);

        let reopened = open(&path, at(2024, 1, 10, 8, 0, 0));
        let ids: Vec<u64> = reopened.tasks().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![undated, dated]);
    });
}

#[test]
fn test_list_and_stats_do_not_mutate() {
    with_test_db(|path| {
        let mut manager = open(&path, at(2024, 3, 1, 10, 0, 0));
        cmd_add(&mut manager, "today", NaiveDate::from_ymd_opt(2024, 3, 1), None, Reminder::None, true);
        cmd_add(&mut manager, "late", NaiveDate::from_ymd_opt(2024, 2, 1), None, Reminder::None, true);
        let before = manager.tasks().to_vec();
        cmd_list(&mut manager, Filter::Overdue);
        cmd_stats(&mut manager);
        assert_eq!(manager.tasks(), before.as_slice());
    });
}

#[test]
fn test_watch_fires_and_persists_notified() {
    with_test_db(|path| {
        let mut manager = open(&path, at(2024, 1, 10, 8, 0, 0));
        let id = cmd_add(
            &mut manager,
            "Standup",
            NaiveDate::from_ymd_opt(2024, 1, 10),
            NaiveTime::from_hms_opt(9, 0, 0),
            Reminder::FifteenMinutes,
            true,
        )
        .unwrap();

        let mut manager = open(&path, at(2024, 1, 10, 8, 45, 30));
        let mut scheduler = ReminderScheduler::default();
        let mut seen = Vec::new();
        let mut sink = |t: &Task| -> Result<(), DeliveryError> {
            seen.push(t.id);
            Ok(())
        };
        let ticks = cmd_watch(&mut manager, &mut scheduler, &mut sink, Some(1), true);
        assert_eq!(ticks, 1);
        assert!(!scheduler.is_running());
        assert_eq!(seen, vec![id]);

        let stored = JsonFileRepository::new(&path).load().unwrap();
        assert!(stored[0].notified);
    });
}
