//! Configuration loading from disk.

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;

use crate::config::schema::{ResponderConfig, ScanConfig};
use crate::config::validation::{validate_responder, validate_scan, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate a responder configuration from a TOML file.
pub fn load_responder_config(path: &Path) -> Result<ResponderConfig, ConfigError> {
    let config: ResponderConfig = read_toml(path)?;
    validate_responder(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Load and validate a scan probe configuration from a TOML file.
pub fn load_scan_config(path: &Path) -> Result<ScanConfig, ConfigError> {
    let config: ScanConfig = read_toml(path)?;
    validate_scan(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

fn read_toml<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
