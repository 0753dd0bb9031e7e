//! Response fingerprints and the observed-hosts set.

use std::collections::HashMap;
use std::fmt;

/// CRC-32 (IEEE) of a response body.
///
/// Two distinct bodies may share a fingerprint; they are then counted as
/// one host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint(u32);

impl Fingerprint {
    pub fn of(body: &[u8]) -> Self {
        Self(crc32fast::hash(body))
    }

    pub fn as_u32(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08x}", self.0)
    }
}

/// Distinct responses seen so far, keyed by fingerprint, in first-seen order.
#[derive(Debug, Default)]
pub struct ObservedHosts {
    index: HashMap<Fingerprint, usize>,
    bodies: Vec<String>,
}

impl ObservedHosts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a body. Returns `true` if its fingerprint was new.
    ///
    /// Only the first body per fingerprint is kept.
    pub fn record(&mut self, body: &[u8]) -> bool {
        let fingerprint = Fingerprint::of(body);
        if self.index.contains_key(&fingerprint) {
            return false;
        }

        self.index.insert(fingerprint, self.bodies.len());
        self.bodies.push(String::from_utf8_lossy(body).into_owned());
        true
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    pub fn contains(&self, fingerprint: Fingerprint) -> bool {
        self.index.contains_key(&fingerprint)
    }

    pub fn bodies(&self) -> &[String] {
        &self.bodies
    }

    pub fn into_bodies(self) -> Vec<String> {
        self.bodies
    }
}
