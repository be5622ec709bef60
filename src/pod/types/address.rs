//! IPv4 prefix type used for the derived pod addresses.

use serde::{Serialize, Serializer};
use std::fmt;
use std::net::Ipv4Addr;

/// An IPv4 address with a prefix length, rendered as `a.b.c.d/len`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PodAddress {
    pub addr: Ipv4Addr,
    pub prefix_len: u8,
}

impl PodAddress {
    pub fn new(addr: Ipv4Addr, prefix_len: u8) -> Self {
        PodAddress { addr, prefix_len }
    }
}

impl fmt::Display for PodAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.addr, self.prefix_len)
    }
}

impl Serialize for PodAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
