//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → tracing events with structured fields
//!     → request spans from tower-http's TraceLayer, tagged with x-request-id
//!
//! Consumers:
//!     → logging.rs subscriber (stderr, filtered by RUST_LOG or config)
//! ```

pub mod logging;
