//! Host identity.
//!
//! The responder never caches the hostname: every request asks the
//! provider again, so a renamed host is reported immediately. The provider
//! is injected into the handler, which lets tests substitute a fixed or
//! failing identity.

use std::io;

/// Source of the host identity reported in responses.
pub trait HostnameProvider: Send + Sync + 'static {
    /// Resolve the current hostname.
    fn hostname(&self) -> io::Result<String>;
}

/// Hostname as reported by the operating system.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemHostname;

impl HostnameProvider for SystemHostname {
    fn hostname(&self) -> io::Result<String> {
        whoami::fallible::hostname()
    }
}

/// A hostname that never changes. Useful for tests and local demos.
#[derive(Debug, Clone)]
pub struct FixedHostname(String);

impl FixedHostname {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}

impl HostnameProvider for FixedHostname {
    fn hostname(&self) -> io::Result<String> {
        Ok(self.0.clone())
    }
}
