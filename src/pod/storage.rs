//! Snapshot persistence for the registry.
//!
//! The registry persists its full contents on every mutation. Stores only need
//! to load and replace a whole snapshot.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fs::{self, TryLockError};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::pod::error::StorageError;
use crate::pod::types::Student;

/// A place the registry snapshot can be loaded from and saved to.
pub trait SnapshotStore: Send + Sync {
    /// Loads the last saved snapshot, or an empty one if nothing was saved yet.
    fn load(&self) -> Result<Vec<Student>, StorageError>;

    /// Replaces the saved snapshot. Must leave the previous snapshot intact on failure.
    fn save(&self, students: &[Student]) -> Result<(), StorageError>;
}

#[derive(Serialize)]
struct SnapshotRef<'a> {
    students: &'a [Student],
}

#[derive(Deserialize)]
struct Snapshot {
    students: Vec<Student>,
}

/// Stores the snapshot as a JSON document on disk.
///
/// The store holds an exclusive lock on a sibling `.lock` file for as long as
/// it lives, so two registries can never overwrite each other's snapshots.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    /// Released when the store is dropped
    _lock: fs::File,
}

impl JsonFileStore {
    /// Opens the store at `path`, locking it against other openers.
    ///
    /// # Errors
    ///
    /// * [`StorageError::Locked`] if another store already holds `path`
    /// * [`StorageError::Io`] if the lock file cannot be created
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let lock_path = sibling(&path, ".lock");
        let lock = fs::OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&lock_path)?;

        match lock.try_lock() {
            Ok(()) => {}
            Err(TryLockError::WouldBlock) => return Err(StorageError::Locked(path)),
            Err(TryLockError::Error(e)) => return Err(e.into()),
        }
        debug!("Locked {}", lock_path.display());

        Ok(JsonFileStore { path, _lock: lock })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        sibling(&self.path, ".tmp")
    }

    fn write_snapshot(&self, temp: &Path, json: &[u8]) -> Result<(), StorageError> {
        let mut file = fs::File::create(temp)?;
        file.write_all(json)?;
        file.sync_all()?;
        drop(file);
        fs::rename(temp, &self.path)?;
        Ok(())
    }
}

fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(suffix);
    path.with_file_name(name)
}

impl SnapshotStore for JsonFileStore {
    fn load(&self) -> Result<Vec<Student>, StorageError> {
        let data = match fs::read(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No snapshot at {}, starting empty", self.path.display());
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };
        let snapshot: Snapshot = serde_json::from_slice(&data)?;
        Ok(snapshot.students)
    }

    fn save(&self, students: &[Student]) -> Result<(), StorageError> {
        let json = serde_json::to_vec_pretty(&SnapshotRef { students })?;

        // Write next to the target and rename so a crash never leaves a torn file.
        let temp = self.temp_path();
        if let Err(e) = self.write_snapshot(&temp, &json) {
            let _ = fs::remove_file(&temp);
            return Err(e);
        }

        debug!(
            "Saved {} students to {}",
            students.len(),
            self.path.display()
        );
        Ok(())
    }
}

/// Keeps the snapshot in memory only.
#[derive(Debug, Default)]
pub struct MemoryStore {
    students: Mutex<Vec<Student>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts with an existing snapshot, as if it had been saved before.
    pub fn with_students(students: Vec<Student>) -> Self {
        MemoryStore {
            students: Mutex::new(students),
        }
    }
}

impl SnapshotStore for MemoryStore {
    fn load(&self) -> Result<Vec<Student>, StorageError> {
        Ok(self.students.lock().clone())
    }

    fn save(&self, students: &[Student]) -> Result<(), StorageError> {
        *self.students.lock() = students.to_vec();
        Ok(())
    }
}
