//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Parse CLI → Load config → [--ping: self-check, exit] → Bind → Serve
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Stop accepting → Drain connections → Exit 0
//!
//! Fatal (supervisor.rs):
//!     Handler reports Unrecoverable → Stop accepting → Drain → Exit 1
//! ```

pub mod shutdown;
pub mod signals;
pub mod supervisor;

pub use shutdown::Shutdown;
pub use supervisor::{fatal_channel, FatalReceiver, FatalReporter};
