//! Error types for the pod registry.

use std::path::PathBuf;
use thiserror::Error;

use crate::pod::types::PodNumber;

/// Failures from the snapshot store.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("snapshot I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("snapshot is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("snapshot {} is in use by another registry", .0.display())]
    Locked(PathBuf),
}

/// Every way a registry operation can fail.
#[derive(Debug, Error)]
pub enum PodError {
    #[error("no pods remain (all {max} are assigned)")]
    Exhausted { max: u32 },
    #[error("pod {0} not found")]
    NotFound(PodNumber),
    #[error("student {0} not found")]
    StudentNotFound(u64),
    #[error("pod {0} is already assigned")]
    PodTaken(PodNumber),
    #[error("pod number {0} is out of range")]
    InvalidPod(u32),
    #[error("username must not be empty")]
    InvalidUsername,
    #[error("snapshot is inconsistent: {0}")]
    CorruptSnapshot(String),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
