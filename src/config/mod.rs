//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → CLI overrides applied by the binary, then validated again
//!     → ResponderConfig / ScanConfig (immutable for the process lifetime)
//! ```
//!
//! # Design Decisions
//! - All fields have defaults so the programs run with no file at all
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_responder_config, load_scan_config, ConfigError};
pub use schema::{ListenerConfig, ObservabilityConfig, ResponderConfig, ScanConfig, TimeoutConfig};
pub use validation::ValidationError;
