//! The pod number newtype and the addresses derived from it.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::net::Ipv4Addr;

use crate::pod::error::PodError;
use crate::pod::types::address::PodAddress;

/// Highest pod number the address plan can express: `N` has to fit in one octet.
pub const MAX_PODS: u32 = 255;

/// A pod number in `[1, 255]`.
///
/// The lower bound of the configured range is always 1; the configured upper
/// bound may be lower than [`MAX_PODS`] and is enforced by the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct PodNumber(u8);

impl PodNumber {
    /// Validates `value` and wraps it.
    pub fn new(value: u32) -> Result<Self, PodError> {
        match u8::try_from(value) {
            Ok(n) if n > 0 => Ok(PodNumber(n)),
            _ => Err(PodError::InvalidPod(value)),
        }
    }

    pub fn get(self) -> u32 {
        u32::from(self.0)
    }

    /// Loopback address of the pod: `10.255.255.N/32`.
    pub fn addr_lo0(self) -> PodAddress {
        PodAddress::new(Ipv4Addr::new(10, 255, 255, self.0), 32)
    }

    /// Tunnel address of the pod: `10.255.N.2/30`.
    pub fn addr_st0(self) -> PodAddress {
        PodAddress::new(Ipv4Addr::new(10, 255, self.0, 2), 30)
    }
}

impl fmt::Display for PodNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u32> for PodNumber {
    type Error = PodError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        PodNumber::new(value)
    }
}

impl From<PodNumber> for u32 {
    fn from(pod: PodNumber) -> Self {
        pod.get()
    }
}

impl<'de> Deserialize<'de> for PodNumber {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = u32::deserialize(deserializer)?;
        PodNumber::new(value).map_err(serde::de::Error::custom)
    }
}
