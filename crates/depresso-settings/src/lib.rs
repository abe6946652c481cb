//! depressoAssist Settings Crate
//!
//! Handles backend endpoint profiles, upload limits, chat socket timing and
//! configuration file persistence.

pub mod config;
pub mod endpoints;
pub mod error;

pub use config::{
    BackendProfile, BackendSettings, ChatSettings, Config, Environment, SocialSettings,
    UploadSettings,
};
pub use error::{ConfigError, ConfigResult, SettingsError, SettingsResult};
