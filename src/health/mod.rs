//! Health checking subsystem.
//!
//! # Data Flow
//! ```text
//! process args
//!     → self_check.rs: "--ping" present?
//!         no  → return, server startup continues
//!         yes → GET http://<bind_address> (bounded)
//!               → any response   → exit 0
//!               → any failure    → print detail, exit 1
//! ```
//!
//! # Design Decisions
//! - The exit function is injected so the check is testable in-process
//! - Status codes are not inspected: reaching the server is the signal

pub mod self_check;

pub use self_check::{
    ping_requested, Exit, PingError, ProcessExit, SelfCheck, EXIT_HEALTHY, EXIT_UNHEALTHY,
    PING_FLAG,
};
