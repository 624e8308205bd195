use std::cell::RefCell;
use std::fs::{self, OpenOptions};
use std::io::{Read, Write};
use std::path::PathBuf;
use crate::error::StorageError;
use crate::models::Task;

/// Durable home of the task collection.
pub trait TaskRepository {
    /// Loads every stored task. A repository that was never written loads
    /// as empty.
    fn load(&self) -> Result<Vec<Task>, StorageError>;

    /// Replaces the stored collection with `tasks`.
    fn save(&self, tasks: &[Task]) -> Result<(), StorageError>;
}

/// Stores tasks as a pretty-printed JSON array in a single file.
#[derive(Debug, Clone)]
pub struct JsonFileRepository {
    path: PathBuf,
}

impl JsonFileRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn io_error(&self, source: std::io::Error) -> StorageError {
        StorageError::Io { path: self.path.clone(), source }
    }
}

impl TaskRepository for JsonFileRepository {
    fn load(&self) -> Result<Vec<Task>, StorageError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let mut f = OpenOptions::new()
            .read(true)
            .open(&self.path)
            .map_err(|e| self.io_error(e))?;
        let mut s = String::new();
        f.read_to_string(&mut s).map_err(|e| self.io_error(e))?;
        if s.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&s).map_err(|source| StorageError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    fn save(&self, tasks: &[Task]) -> Result<(), StorageError> {
        let s = serde_json::to_string_pretty(tasks)?;
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|e| self.io_error(e))?;
        }
        let mut f = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&self.path)
            .map_err(|e| self.io_error(e))?;
        f.write_all(s.as_bytes()).map_err(|e| self.io_error(e))?;
        Ok(())
    }
}

/// Keeps the saved collection in memory. Used by tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    saved: RefCell<Option<Vec<Task>>>,
    fail_load: bool,
    fail_save: bool,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every `load` call fails.
    pub fn failing_load(mut self) -> Self {
        self.fail_load = true;
        self
    }

    /// Every `save` call fails.
    pub fn failing_save(mut self) -> Self {
        self.fail_save = true;
        self
    }

    /// Last collection handed to `save`, if any.
    pub fn saved(&self) -> Option<Vec<Task>> {
        self.saved.borrow().clone()
    }
}

impl TaskRepository for MemoryRepository {
    fn load(&self) -> Result<Vec<Task>, StorageError> {
        if self.fail_load {
            return Err(StorageError::Unavailable("load disabled".into()));
        }
        Ok(self.saved.borrow().clone().unwrap_or_default())
    }

    fn save(&self, tasks: &[Task]) -> Result<(), StorageError> {
        if self.fail_save {
            return Err(StorageError::Unavailable("save disabled".into()));
        }
        *self.saved.borrow_mut() = Some(tasks.to_vec());
        Ok(())
    }
}

impl<R: TaskRepository + ?Sized> TaskRepository for &R {
    fn load(&self) -> Result<Vec<Task>, StorageError> {
        (**self).load()
    }

    fn save(&self, tasks: &[Task]) -> Result<(), StorageError> {
        (**self).save(tasks)
    }
}
