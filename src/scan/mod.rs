//! Scan probe: count the distinct backends answering behind one address.
//!
//! # Data Flow
//! ```text
//! GET target (bounded) → body → fingerprint.rs (CRC-32)
//!     → ObservedHosts (first body per fingerprint)
//!     → probe.rs decides: keep probing, complete, or time out
//! ```

pub mod fingerprint;
pub mod probe;

pub use fingerprint::{Fingerprint, ObservedHosts};
pub use probe::{ScanError, ScanProbe, ScanReport, ScanSettings, ScanState};
