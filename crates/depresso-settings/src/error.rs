//! Error types for the settings crate.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failure to read, write or parse a config file.
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Failed to read {}: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("Failed to write {}: {source}", .path.display())]
    Write { path: PathBuf, source: io::Error },

    /// The platform reports no config directory (e.g. no home directory).
    #[error("No platform config directory")]
    NoConfigDirectory,

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid JSON config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid TOML config: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Could not encode TOML config: {0}")]
    TomlEncode(#[from] toml::ser::Error),

    /// The file parsed but its values are unusable.
    #[error(transparent)]
    Invalid(#[from] ConfigError),
}

/// A config value that fails validation.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// Only `.json` and `.toml` files are understood.
    #[error("Unsupported config format: {0:?}")]
    UnsupportedFormat(String),

    #[error("Value out of range for '{key}': {value}")]
    ValueOutOfRange { key: String, value: String },

    /// Endpoint URL with a scheme that does not fit its use.
    #[error("Invalid URL for '{key}': {value}")]
    InvalidUrl { key: String, value: String },
}

pub type SettingsResult<T> = Result<T, SettingsError>;

pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_offending_value() {
        let err = ConfigError::UnsupportedFormat("yaml".to_string());
        assert_eq!(err.to_string(), "Unsupported config format: \"yaml\"");

        let err = ConfigError::ValueOutOfRange {
            key: "upload.chunk_size".to_string(),
            value: "0".to_string(),
        };
        assert_eq!(err.to_string(), "Value out of range for 'upload.chunk_size': 0");

        let err = SettingsError::Read {
            path: PathBuf::from("/tmp/depresso.toml"),
            source: io::Error::new(io::ErrorKind::NotFound, "gone"),
        };
        assert_eq!(err.to_string(), "Failed to read /tmp/depresso.toml: gone");
    }

    #[test]
    fn test_validation_errors_pass_through() {
        let settings_err: SettingsError = ConfigError::InvalidUrl {
            key: "backend.development.api_base_url".to_string(),
            value: "ftp://x".to_string(),
        }
        .into();
        assert_eq!(
            settings_err.to_string(),
            "Invalid URL for 'backend.development.api_base_url': ftp://x"
        );
    }
}
