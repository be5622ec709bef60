//! The student registry.
//!
//! Students are indexed by pod number in a concurrent `SkipMap`, so reads and
//! the ascending scan the allocator needs never block. Mutations are serialized
//! by a single lock and persist the complete would-be snapshot before the index
//! is touched: when the store fails, the registry is left exactly as it was.

use chrono::Utc;
use crossbeam_skiplist::SkipMap;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::io::{self, Write};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info, warn};

use crate::pod::allocator::next_free;
use crate::pod::error::PodError;
use crate::pod::storage::SnapshotStore;
use crate::pod::types::{MAX_PODS, PodNumber, Student, StudentId, StudentUpdate};

/// Pod assignments for every registered student.
pub struct Registry {
    /// Upper bound for pod numbers, at most [`MAX_PODS`]
    max_pods: u32,
    /// Next row id to hand out
    next_id: AtomicU64,
    /// Students keyed by pod number, iterated in ascending order
    index: SkipMap<PodNumber, Student>,
    store: Box<dyn SnapshotStore>,
    /// Held across read-allocate-persist-insert
    write_lock: Mutex<()>,
}

impl Registry {
    /// Opens a registry over `store`, loading whatever it last saved.
    ///
    /// # Errors
    ///
    /// * [`PodError::InvalidPod`] if `max_pods` is 0 or above [`MAX_PODS`]
    /// * [`PodError::CorruptSnapshot`] if the snapshot repeats a pod or row id,
    ///   or holds a pod above `max_pods`
    /// * [`PodError::Storage`] if the snapshot cannot be read
    pub fn open(store: impl SnapshotStore + 'static, max_pods: u32) -> Result<Self, PodError> {
        if max_pods == 0 || max_pods > MAX_PODS {
            return Err(PodError::InvalidPod(max_pods));
        }

        let students = store.load()?;
        let index = SkipMap::new();
        let mut ids = HashSet::with_capacity(students.len());
        let mut max_id = 0;

        for student in students {
            if student.pod_number.get() > max_pods {
                return Err(PodError::CorruptSnapshot(format!(
                    "pod {} exceeds the limit of {}",
                    student.pod_number, max_pods
                )));
            }
            if index.contains_key(&student.pod_number) {
                return Err(PodError::CorruptSnapshot(format!(
                    "pod {} is assigned twice",
                    student.pod_number
                )));
            }
            if !ids.insert(student.id) {
                return Err(PodError::CorruptSnapshot(format!(
                    "student id {} is used twice",
                    student.id
                )));
            }
            max_id = max_id.max(student.id);
            index.insert(student.pod_number, student);
        }

        info!("Registry opened with {} students (max {} pods)", index.len(), max_pods);

        Ok(Registry {
            max_pods,
            next_id: AtomicU64::new(max_id + 1),
            index,
            store: Box::new(store),
            write_lock: Mutex::new(()),
        })
    }

    pub fn max_pods(&self) -> u32 {
        self.max_pods
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Pod numbers currently assigned, ascending.
    pub fn assigned_pods(&self) -> Vec<PodNumber> {
        self.index.iter().map(|entry| *entry.key()).collect()
    }

    /// The pod the next registration would receive.
    pub fn next_pod(&self) -> Result<PodNumber, PodError> {
        let assigned = self.index.iter().map(|entry| entry.key().get());
        PodNumber::new(next_free(assigned, self.max_pods)?)
    }

    /// All students ordered by pod number.
    pub fn list(&self) -> Vec<Student> {
        self.index
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }

    /// Writes every assignment to `out` as one JSON object per line, in pod order.
    pub fn write_json_lines<W: Write>(&self, mut out: W) -> io::Result<()> {
        for entry in self.index.iter() {
            serde_json::to_writer(&mut out, &entry.value().to_json())?;
            out.write_all(b"\n")?;
        }
        out.flush()
    }

    pub fn get(&self, pod: PodNumber) -> Result<Student, PodError> {
        self.index
            .get(&pod)
            .map(|entry| entry.value().clone())
            .ok_or(PodError::NotFound(pod))
    }

    pub fn find_by_id(&self, id: StudentId) -> Option<Student> {
        self.index.iter().find_map(|entry| {
            let student = entry.value();
            (student.id == id).then(|| student.clone())
        })
    }

    /// Lowest-numbered student whose reported WAN address is `addr`.
    pub fn find_by_addr(&self, addr: &str) -> Option<Student> {
        self.index.iter().find_map(|entry| {
            let student = entry.value();
            (student.addr_wan.as_deref() == Some(addr)).then(|| student.clone())
        })
    }

    /// Registers a student on the next free pod.
    ///
    /// # Errors
    ///
    /// * [`PodError::InvalidUsername`] for a blank name
    /// * [`PodError::Exhausted`] when every pod is taken
    /// * [`PodError::Storage`] if the snapshot cannot be saved
    pub fn register(&self, username: &str, addr_wan: Option<String>) -> Result<Student, PodError> {
        let username = validate_username(username)?;

        let _guard = self.write_lock.lock();
        let pod = self.next_pod()?;
        self.insert_locked(username, pod, addr_wan)
    }

    /// Creates a student on a specific pod instead of the next free one.
    ///
    /// # Errors
    ///
    /// * [`PodError::InvalidPod`] if `pod` is above the configured limit
    /// * [`PodError::PodTaken`] if `pod` is already assigned
    /// * [`PodError::InvalidUsername`] and [`PodError::Storage`] as for [`Registry::register`]
    pub fn insert_with_pod(
        &self,
        username: &str,
        pod: PodNumber,
        addr_wan: Option<String>,
    ) -> Result<Student, PodError> {
        let username = validate_username(username)?;
        self.check_limit(pod)?;

        let _guard = self.write_lock.lock();
        if self.index.contains_key(&pod) {
            return Err(PodError::PodTaken(pod));
        }
        self.insert_locked(username, pod, addr_wan)
    }

    fn insert_locked(
        &self,
        username: String,
        pod: PodNumber,
        addr_wan: Option<String>,
    ) -> Result<Student, PodError> {
        let student = Student {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            pod_number: pod,
            username,
            addr_wan,
            registered_at: Utc::now(),
        };

        let mut snapshot = self.list();
        snapshot.push(student.clone());
        snapshot.sort_by_key(|s| s.pod_number);
        self.store.save(&snapshot)?;

        self.index.insert(pod, student.clone());
        info!(
            "Assigned pod {} to '{}' (student {})",
            pod, student.username, student.id
        );
        Ok(student)
    }

    /// Replaces the name, pod and WAN address of student `id`.
    ///
    /// Moving a student to another pod frees the old one.
    ///
    /// # Errors
    ///
    /// * [`PodError::StudentNotFound`] if no student has row id `id`
    /// * [`PodError::InvalidPod`] if the new pod is above the configured limit
    /// * [`PodError::PodTaken`] if the new pod belongs to someone else
    /// * [`PodError::InvalidUsername`] and [`PodError::Storage`] as for [`Registry::register`]
    pub fn update(&self, id: StudentId, update: StudentUpdate) -> Result<Student, PodError> {
        let username = validate_username(&update.username)?;
        self.check_limit(update.pod_number)?;

        let _guard = self.write_lock.lock();
        let current = self.find_by_id(id).ok_or(PodError::StudentNotFound(id))?;
        let moved = current.pod_number != update.pod_number;
        if moved && self.index.contains_key(&update.pod_number) {
            return Err(PodError::PodTaken(update.pod_number));
        }

        let updated = Student {
            pod_number: update.pod_number,
            username,
            addr_wan: update.addr_wan,
            ..current.clone()
        };

        let mut snapshot: Vec<Student> = self
            .list()
            .into_iter()
            .filter(|s| s.id != id)
            .collect();
        snapshot.push(updated.clone());
        snapshot.sort_by_key(|s| s.pod_number);
        self.store.save(&snapshot)?;

        // Insert before removing so lock-free readers always find the student.
        self.index.insert(updated.pod_number, updated.clone());
        if moved {
            self.index.remove(&current.pod_number);
            info!(
                "Moved student {} from pod {} to pod {}",
                id, current.pod_number, updated.pod_number
            );
        } else {
            debug!("Updated student {} on pod {}", id, updated.pod_number);
        }
        Ok(updated)
    }

    /// Frees `pod`, returning the student that held it.
    ///
    /// Deleting an unassigned pod is not an error and returns `None`.
    pub fn delete(&self, pod: PodNumber) -> Result<Option<Student>, PodError> {
        let _guard = self.write_lock.lock();
        let Some(current) = self.index.get(&pod).map(|entry| entry.value().clone()) else {
            warn!("Delete of unassigned pod {}", pod);
            return Ok(None);
        };

        let snapshot: Vec<Student> = self
            .list()
            .into_iter()
            .filter(|s| s.pod_number != pod)
            .collect();
        self.store.save(&snapshot)?;

        self.index.remove(&pod);
        info!("Released pod {} from '{}'", pod, current.username);
        Ok(Some(current))
    }

    fn check_limit(&self, pod: PodNumber) -> Result<(), PodError> {
        if pod.get() > self.max_pods {
            return Err(PodError::InvalidPod(pod.get()));
        }
        Ok(())
    }
}

fn validate_username(username: &str) -> Result<String, PodError> {
    let trimmed = username.trim();
    if trimmed.is_empty() {
        return Err(PodError::InvalidUsername);
    }
    Ok(trimmed.to_string())
}
