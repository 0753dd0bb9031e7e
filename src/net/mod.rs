//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming TCP connection
//!     → listener.rs (accept loop, connection limits)
//!     → Hand off to HTTP layer (one task per connection)
//! ```

pub mod listener;

pub use listener::{ConnectionPermit, Listener, ListenerError};
