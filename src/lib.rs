//! # pod-registry
//!
//! Hands out lab "pod" numbers to students and serves them over HTTP.
//!
//! Each student gets the lowest free pod number in `[1, MAX]`, and every pod
//! number `N` determines two addresses:
//!
//! - `lo0`: `10.255.255.N/32`
//! - `st0`: `10.255.N.2/30`
//!
//! ## Example
//!
//! ```rust
//! use pod_registry::{MemoryStore, Registry};
//!
//! let registry = Registry::open(MemoryStore::new(), 255).unwrap();
//! let student = registry.register("Kurt", None).unwrap();
//! assert_eq!(student.pod_number.get(), 1);
//! assert_eq!(student.addr_lo0().to_string(), "10.255.255.1/32");
//! ```

pub mod config;
pub mod pod;
pub mod server;

// Re-export the main public API from the pod module
pub use config::{AdminCredentials, Config};
pub use pod::{JsonFileStore, MemoryStore, SnapshotStore};
pub use pod::{MAX_PODS, PodAddress, PodError, PodNumber, Registry, Student, StudentUpdate, next_free};
