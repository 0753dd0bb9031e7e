//! Configuration validation.
//!
//! Serde handles syntax; this module checks values. Every problem is
//! collected so one run reports the whole list.

use std::net::SocketAddr;

use crate::config::schema::{ResponderConfig, ScanConfig};

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field}: invalid socket address {value:?}")]
    InvalidAddress { field: &'static str, value: String },

    #[error("{field}: invalid URL {value:?} ({reason})")]
    InvalidUrl {
        field: &'static str,
        value: String,
        reason: String,
    },

    #[error("{field}: must be greater than zero")]
    Zero { field: &'static str },
}

/// Validate a responder configuration.
pub fn validate_responder(config: &ResponderConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "listener.bind_address",
            value: config.listener.bind_address.clone(),
        });
    }
    check_nonzero(&mut errors, "listener.max_connections", config.listener.max_connections as u64);
    check_nonzero(&mut errors, "timeouts.read_header_secs", config.timeouts.read_header_secs);
    check_nonzero(&mut errors, "timeouts.request_secs", config.timeouts.request_secs);

    finish(errors)
}

/// Validate a scan probe configuration.
pub fn validate_scan(config: &ScanConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if let Err(e) = url::Url::parse(&config.target_url) {
        errors.push(ValidationError::InvalidUrl {
            field: "target_url",
            value: config.target_url.clone(),
            reason: e.to_string(),
        });
    }
    check_nonzero(&mut errors, "expected_hosts", config.expected_hosts as u64);
    check_nonzero(&mut errors, "request_timeout_secs", config.request_timeout_secs);
    check_nonzero(&mut errors, "run_timeout_secs", config.run_timeout_secs);

    finish(errors)
}

fn check_nonzero(errors: &mut Vec<ValidationError>, field: &'static str, value: u64) {
    if value == 0 {
        errors.push(ValidationError::Zero { field });
    }
}

fn finish(errors: Vec<ValidationError>) -> Result<(), Vec<ValidationError>> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
