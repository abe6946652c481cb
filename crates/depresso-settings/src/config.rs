//! Configuration management for depressoAssist
//!
//! Provides configuration file handling and validation. Supports JSON and
//! TOML files, by extension.
//!
//! Configuration is organized into logical sections:
//! - Environment selection (development or production endpoint profile)
//! - Backend endpoint profiles (API, WebSocket and media upload base URLs)
//! - Upload limits (size, accepted media types, chunk size)
//! - Chat socket timing (connect timeout, reconnect delay)
//! - Peer-support platform endpoint and key

use crate::error::{ConfigError, SettingsError, SettingsResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default config file name inside the platform config directory.
pub const CONFIG_FILE_NAME: &str = "config.toml";

const MIB: u64 = 1024 * 1024;

/// Which backend profile is active
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Local backend
    #[default]
    Development,
    /// Deployed backend
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
        }
    }
}

/// Base URLs for one backend deployment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendProfile {
    /// REST API base URL
    pub api_base_url: String,
    /// WebSocket base URL
    pub websocket_url: String,
    /// Media upload base URL
    pub media_upload_url: String,
}

impl BackendProfile {
    fn development() -> Self {
        Self {
            api_base_url: "http://localhost:8000/api".to_string(),
            websocket_url: "ws://localhost:8000/ws".to_string(),
            media_upload_url: "http://localhost:8000/api/upload".to_string(),
        }
    }

    fn production() -> Self {
        Self {
            api_base_url: "https://your-domain.com/api".to_string(),
            websocket_url: "wss://your-domain.com/ws".to_string(),
            media_upload_url: "https://your-domain.com/api/upload".to_string(),
        }
    }

    fn validate(&self, section: &str) -> Result<(), ConfigError> {
        let check = |key: &str, value: &str, schemes: &[&str]| {
            if schemes.iter().any(|scheme| value.starts_with(scheme)) {
                Ok(())
            } else {
                Err(ConfigError::InvalidUrl {
                    key: format!("{}.{}", section, key),
                    value: value.to_string(),
                })
            }
        };
        check("api_base_url", &self.api_base_url, &["http://", "https://"])?;
        check("websocket_url", &self.websocket_url, &["ws://", "wss://"])?;
        check(
            "media_upload_url",
            &self.media_upload_url,
            &["http://", "https://"],
        )
    }
}

/// Endpoint profiles per environment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendSettings {
    /// Profile used in development
    pub development: BackendProfile,
    /// Profile used in production
    pub production: BackendProfile,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            development: BackendProfile::development(),
            production: BackendProfile::production(),
        }
    }
}

/// Upload limits
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadSettings {
    /// Largest accepted file, in bytes
    pub max_file_size: u64,
    /// Accepted image mime types
    pub allowed_image_types: Vec<String>,
    /// Accepted video mime types
    pub allowed_video_types: Vec<String>,
    /// Chunk size for chunked uploads, in bytes
    pub chunk_size: u64,
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            max_file_size: 50 * MIB,
            allowed_image_types: vec![
                "image/jpeg".to_string(),
                "image/png".to_string(),
                "image/webp".to_string(),
            ],
            allowed_video_types: vec![
                "video/mp4".to_string(),
                "video/webm".to_string(),
                "video/quicktime".to_string(),
            ],
            chunk_size: MIB,
        }
    }
}

impl UploadSettings {
    /// Maximum file size in whole megabytes, for messages
    pub fn max_file_size_mb(&self) -> u64 {
        self.max_file_size / MIB
    }

    /// Whether the image mime type is accepted
    pub fn accepts_image(&self, mime_type: &str) -> bool {
        self.allowed_image_types.iter().any(|t| t == mime_type)
    }

    /// Whether the video mime type is accepted
    pub fn accepts_video(&self, mime_type: &str) -> bool {
        self.allowed_video_types.iter().any(|t| t == mime_type)
    }
}

/// Chat socket timing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatSettings {
    /// Connect timeout in milliseconds
    pub connect_timeout_ms: u64,
    /// Delay before reconnecting after an unexpected close, in milliseconds
    pub reconnect_delay_ms: u64,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            connect_timeout_ms: 3000,
            reconnect_delay_ms: 5000,
        }
    }
}

/// Peer-support platform connection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialSettings {
    /// Base URL of the platform's server function
    pub base_url: String,
    /// Public key sent as the bearer token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anon_key: Option<String>,
}

impl Default for SocialSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:54321/functions/v1/make-server-8532b137".to_string(),
            anon_key: None,
        }
    }
}

/// Complete application configuration
///
/// Aggregates all settings sections and provides file I/O operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Active endpoint profile
    pub environment: Environment,
    /// Bearer token sent with analysis requests
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Endpoint profiles
    pub backend: BackendSettings,
    /// Upload limits
    pub upload: UploadSettings,
    /// Chat socket timing
    pub chat: ChatSettings,
    /// Peer-support platform
    pub social: SocialSettings,
}

impl Config {
    /// Create new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Default config file location in the platform config directory
    pub fn default_path() -> SettingsResult<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join("depresso-assist").join(CONFIG_FILE_NAME))
            .ok_or(SettingsError::NoConfigDirectory)
    }

    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let config: Self = match extension(path) {
            Some("json") => serde_json::from_str(&content)?,
            Some("toml") => toml::from_str(&content)?,
            other => {
                return Err(ConfigError::UnsupportedFormat(other.unwrap_or("").to_string()).into())
            }
        };

        config.validate()?;
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Load from `path` if given, else the default location if a file exists
    /// there, else defaults.
    pub fn load_or_default(path: Option<&Path>) -> SettingsResult<Self> {
        if let Some(path) = path {
            return Self::load_from_file(path);
        }
        match Self::default_path() {
            Ok(path) if path.exists() => Self::load_from_file(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Save config to file (JSON or TOML)
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;

        let content = match extension(path) {
            Some("json") => serde_json::to_string_pretty(self)?,
            Some("toml") => toml::to_string_pretty(self)?,
            other => {
                return Err(ConfigError::UnsupportedFormat(other.unwrap_or("").to_string()).into())
            }
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)
            .map_err(|source| SettingsError::Write {
                path: path.to_path_buf(),
                source,
            })?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.backend.development.validate("backend.development")?;
        self.backend.production.validate("backend.production")?;
        if !["http://", "https://"]
            .iter()
            .any(|scheme| self.social.base_url.starts_with(scheme))
        {
            return Err(ConfigError::InvalidUrl {
                key: "social.base_url".to_string(),
                value: self.social.base_url.clone(),
            });
        }

        let positive = [
            ("upload.max_file_size", self.upload.max_file_size),
            ("upload.chunk_size", self.upload.chunk_size),
            ("chat.connect_timeout_ms", self.chat.connect_timeout_ms),
        ];
        for (key, value) in positive {
            if value == 0 {
                return Err(ConfigError::ValueOutOfRange {
                    key: key.to_string(),
                    value: value.to_string(),
                });
            }
        }

        if self.upload.chunk_size > self.upload.max_file_size {
            return Err(ConfigError::ValueOutOfRange {
                key: "upload.chunk_size".to_string(),
                value: self.upload.chunk_size.to_string(),
            });
        }

        Ok(())
    }

    /// Endpoint profile for the active environment
    pub fn active_profile(&self) -> &BackendProfile {
        match self.environment {
            Environment::Development => &self.backend.development,
            Environment::Production => &self.backend.production,
        }
    }

    /// Full REST URL for an endpoint path
    pub fn build_api_url(&self, endpoint: &str) -> String {
        format!("{}{}", self.active_profile().api_base_url, endpoint)
    }

    /// Full WebSocket URL for an endpoint path
    pub fn build_websocket_url(&self, endpoint: &str) -> String {
        format!("{}{}", self.active_profile().websocket_url, endpoint)
    }

    /// Full peer-support platform URL for an endpoint path
    pub fn build_social_url(&self, endpoint: &str) -> String {
        format!("{}{}", self.social.base_url.trim_end_matches('/'), endpoint)
    }
}

fn extension(path: &Path) -> Option<&str> {
    path.extension().and_then(|ext| ext.to_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoints;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::new();
        assert!(config.validate().is_ok());
        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.upload.max_file_size_mb(), 50);
        assert_eq!(config.chat.connect_timeout_ms, 3000);
        assert_eq!(config.chat.reconnect_delay_ms, 5000);
    }

    #[test]
    fn test_build_urls_follow_environment() {
        let mut config = Config::new();
        assert_eq!(
            config.build_api_url(endpoints::analysis::UPLOAD_IMAGE),
            "http://localhost:8000/api/analysis/image/"
        );
        assert_eq!(
            config.build_websocket_url(endpoints::chat::WEBSOCKET),
            "ws://localhost:8000/ws/chat"
        );

        config.environment = Environment::Production;
        assert_eq!(
            config.build_api_url(endpoints::chat::GENERATE),
            "https://your-domain.com/api/chat/generate/"
        );
    }

    #[test]
    fn test_social_url_ignores_environment() {
        let mut config = Config::new();
        config.social.base_url = "https://abc.supabase.co/functions/v1/server/".to_string();
        config.environment = Environment::Production;
        assert_eq!(
            config.build_social_url(endpoints::social::FEED),
            "https://abc.supabase.co/functions/v1/server/feed"
        );

        config.social.base_url = "abc.supabase.co".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidUrl { key, .. }) if key == "social.base_url"
        ));
    }

    #[test]
    fn test_accepted_types() {
        let upload = UploadSettings::default();
        assert!(upload.accepts_image("image/png"));
        assert!(!upload.accepts_image("image/gif"));
        assert!(upload.accepts_video("video/quicktime"));
        assert!(!upload.accepts_video("video/x-msvideo"));
    }

    #[test]
    fn test_validate_rejects_zero_chunk() {
        let mut config = Config::new();
        config.upload.chunk_size = 0;
        assert_eq!(
            config.validate(),
            Err(ConfigError::ValueOutOfRange {
                key: "upload.chunk_size".to_string(),
                value: "0".to_string()
            })
        );
    }

    #[test]
    fn test_validate_rejects_bad_websocket_scheme() {
        let mut config = Config::new();
        config.backend.production.websocket_url = "https://your-domain.com/ws".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidUrl { key, .. }) if key == "backend.production.websocket_url"
        ));
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            environment = "production"
            api_key = "secret"

            [chat]
            connect_timeout_ms = 1500
            reconnect_delay_ms = 0
            "#,
        )
        .unwrap();
        assert_eq!(config.environment, Environment::Production);
        assert_eq!(config.api_key.as_deref(), Some("secret"));
        assert_eq!(config.chat.connect_timeout_ms, 1500);
        assert_eq!(config.upload, UploadSettings::default());
    }
}
