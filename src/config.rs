use std::path::PathBuf;
use chrono::Duration;
use crate::scheduler::DEFAULT_INTERVAL_SECS;

const APP_DIR: &str = "taskbell";
const DB_FILE: &str = "tasks.json";

/// Runtime settings resolved from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Task file (`TASKS_DB`).
    pub db_path: PathBuf,
    /// Directory for rolling log files (`TASKS_LOG_DIR`).
    pub log_dir: PathBuf,
    /// Log level (`TASKS_LOG_LEVEL`).
    pub log_level: String,
    /// Reminder polling period (`TASKS_REMINDER_INTERVAL_SECS`).
    pub reminder_interval: Duration,
    /// Whether terminal alerts may be shown (`TASKS_NOTIFY`).
    pub notifications_enabled: bool,
    /// Values that were rejected and replaced by defaults. Logging is not
    /// running yet while the config is read, so these are reported later.
    pub warnings: Vec<String>,
}

impl Config {
    /// Reads the process environment.
    pub fn from_env() -> Config {
        Config::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolves settings through `lookup`, falling back to defaults for
    /// anything missing or malformed.
    pub fn from_lookup<F>(lookup: F) -> Config
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut warnings = Vec::new();
        let db_path = lookup("TASKS_DB")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(default_db_path);

        let log_dir = lookup("TASKS_LOG_DIR")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| {
                let mut p = db_path.clone();
                p.pop();
                p.push("logs");
                p
            });

        let log_level = lookup("TASKS_LOG_LEVEL")
            .unwrap_or_else(|| crate::logging::default_log_level().to_string());

        let reminder_interval = match lookup("TASKS_REMINDER_INTERVAL_SECS") {
            Some(raw) => match raw.trim().parse::<i64>() {
                Ok(secs) if secs >= 1 => Duration::seconds(secs),
                _ => {
                    warnings.push(format!(
                        "event=config_invalid key=TASKS_REMINDER_INTERVAL_SECS value={} fallback={}",
                        raw, DEFAULT_INTERVAL_SECS
                    ));
                    Duration::seconds(DEFAULT_INTERVAL_SECS)
                }
            },
            None => Duration::seconds(DEFAULT_INTERVAL_SECS),
        };

        let notifications_enabled = !matches!(
            lookup("TASKS_NOTIFY").map(|v| v.trim().to_ascii_lowercase()).as_deref(),
            Some("off" | "0" | "false" | "no")
        );

        Config {
            db_path,
            log_dir,
            log_level,
            reminder_interval,
            notifications_enabled,
            warnings,
        }
    }
}

/// `<data_local_dir>/taskbell/tasks.json`, or `./tasks.json` when the
/// platform has no data directory.
fn default_db_path() -> PathBuf {
    let mut p = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    p.push(APP_DIR);
    p.push(DB_FILE);
    p
}
