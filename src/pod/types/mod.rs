//! Type definitions for the pod registry.
//!
//! The pod number, the addresses derived from it and the student entity each
//! live in their own submodule.

pub mod address;
pub mod pod_number;
pub mod student;

pub use address::PodAddress;
pub use pod_number::{MAX_PODS, PodNumber};
pub use student::{Student, StudentId, StudentJson, StudentUpdate};
