//! The student entity: one claimed pod plus its metadata.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::pod::types::address::PodAddress;
use crate::pod::types::pod_number::PodNumber;

/// Row identifier of a student, independent of the pod it holds.
pub type StudentId = u64;

/// A student and the pod assigned to them.
///
/// This is also the persisted record; the derived addresses are computed on
/// demand and never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub id: StudentId,
    pub pod_number: PodNumber,
    pub username: String,
    pub addr_wan: Option<String>,
    pub registered_at: DateTime<Utc>,
}

/// New values for an existing student. All three fields are replaced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentUpdate {
    pub username: String,
    pub pod_number: PodNumber,
    pub addr_wan: Option<String>,
}

/// JSON view of a student as served by the API.
#[derive(Debug, Clone, Serialize)]
pub struct StudentJson {
    pub url: String,
    pub id: StudentId,
    pub username: String,
    pub pod_number: PodNumber,
    pub addr_wan: Option<String>,
    pub addr_lo0: PodAddress,
    pub addr_st0: PodAddress,
    pub registered_at: DateTime<Utc>,
}

impl Student {
    pub fn addr_lo0(&self) -> PodAddress {
        self.pod_number.addr_lo0()
    }

    pub fn addr_st0(&self) -> PodAddress {
        self.pod_number.addr_st0()
    }

    /// Path of this student's page.
    pub fn url(&self) -> String {
        format!("/student/{}", self.pod_number)
    }

    pub fn to_json(&self) -> StudentJson {
        StudentJson {
            url: self.url(),
            id: self.id,
            username: self.username.clone(),
            pod_number: self.pod_number,
            addr_wan: self.addr_wan.clone(),
            addr_lo0: self.addr_lo0(),
            addr_st0: self.addr_st0(),
            registered_at: self.registered_at,
        }
    }
}
