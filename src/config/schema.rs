//! Configuration schema definitions.
//!
//! Both programs read an optional TOML file. Every field has a default, so
//! an empty file (or no file at all) yields the reference deployment.

use serde::{Deserialize, Serialize};

/// Root configuration for the responder.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ResponderConfig {
    /// Listener configuration (bind address, connection limit).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl ResponderConfig {
    /// Address the self-check dials: the server's own bind address.
    pub fn advertised_url(&self) -> String {
        format!("http://{}", self.listener.bind_address)
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:80").
    pub bind_address: String,

    /// Maximum concurrent connections (backpressure).
    pub max_connections: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:80".to_string(),
            max_connections: 10_000,
        }
    }
}

/// Timeout configuration for the responder.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Time allowed for a client to send the request headers, in seconds.
    pub read_header_secs: u64,

    /// Request timeout in seconds. Also bounds the `--ping` self-check.
    pub request_secs: u64,

    /// How long in-flight connections may drain after shutdown, in seconds.
    pub shutdown_grace_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            read_header_secs: 20,
            request_secs: 20,
            shutdown_grace_secs: 5,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins when set.
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Configuration for the scan probe.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ScanConfig {
    /// URL polled on every iteration.
    pub target_url: String,

    /// Number of distinct responses to observe before succeeding.
    pub expected_hosts: usize,

    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,

    /// Budget for the whole run in seconds.
    pub run_timeout_secs: u64,

    /// Delay between requests in milliseconds (0 = back to back).
    pub interval_ms: u64,

    /// Log level for the probe's own diagnostics.
    pub log_level: String,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            target_url: "http://127.0.0.1:8080".to_string(),
            expected_hosts: 3,
            request_timeout_secs: 20,
            run_timeout_secs: 30,
            interval_ms: 0,
            log_level: "warn".to_string(),
        }
    }
}
