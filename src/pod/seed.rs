//! Demo data for trying the service out.

use tracing::warn;

use crate::pod::error::PodError;
use crate::pod::registry::Registry;
use crate::pod::types::{PodNumber, Student};

/// Deliberately out of order and gapped, so the allocator has holes to fill.
pub const DEMO_STUDENTS: &[(&str, u32)] = &[("Kurt", 9), ("Rob", 10), ("John", 5), ("Erin", 21)];

pub const SOLO_STUDENT: (&str, u32) = ("initial_user", 1);

/// Inserts the demo students at their fixed pods.
///
/// Pods that are taken or above the registry's limit are skipped with a
/// warning. Returns the students actually inserted.
pub fn seed(registry: &Registry, solo: bool) -> Result<Vec<Student>, PodError> {
    let entries: &[(&str, u32)] = if solo {
        std::slice::from_ref(&SOLO_STUDENT)
    } else {
        DEMO_STUDENTS
    };

    let mut inserted = Vec::new();
    for &(username, pod) in entries {
        match registry.insert_with_pod(username, PodNumber::new(pod)?, None) {
            Ok(student) => inserted.push(student),
            Err(err @ (PodError::PodTaken(_) | PodError::InvalidPod(_))) => {
                warn!("Skipping demo student '{}': {}", username, err);
            }
            Err(err) => return Err(err),
        }
    }
    Ok(inserted)
}
