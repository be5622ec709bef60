//! Pod assignment: the allocator, the registry and its storage.
//!
//! This module contains everything that knows about students and pod numbers
//! without knowing about HTTP.

pub mod allocator;
pub mod error;
pub mod registry;
pub mod seed;
pub mod storage;
pub mod types;

// Re-export the main public API
pub use allocator::next_free;
pub use error::{PodError, StorageError};
pub use registry::Registry;
pub use storage::{JsonFileStore, MemoryStore, SnapshotStore};
pub use types::{MAX_PODS, PodAddress, PodNumber, Student, StudentId, StudentJson, StudentUpdate};
