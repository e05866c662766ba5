//! Layered configuration
//!
//! Priority, lowest first: built-in defaults, optional TOML file,
//! environment variables (`DMS_CLASSIFIER__EAR_THRESHOLD=0.2`).

use config::{Config, Environment, File};
use dms::{DmsConfig, DmsError};
use episode_screen::{ScreenConfig, ScreenError};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Default environment variable prefix
pub const ENV_PREFIX: &str = "DMS";

/// Settings errors
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error(transparent)]
    Classifier(#[from] DmsError),

    #[error(transparent)]
    Screen(#[from] ScreenError),
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// Default filter when `RUST_LOG` is unset
    pub level: String,
    /// Emit JSON log lines
    pub json: bool,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// All runtime settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub classifier: DmsConfig,
    pub screen: ScreenConfig,
    pub logging: LogSettings,
}

impl Settings {
    /// Load with the default environment prefix
    pub fn load(path: Option<&Path>) -> Result<Self, SettingsError> {
        Self::load_with_prefix(path, ENV_PREFIX)
    }

    /// Load from defaults, an optional file, then `<prefix>_`-prefixed environment variables
    pub fn load_with_prefix(path: Option<&Path>, prefix: &str) -> Result<Self, SettingsError> {
        let mut builder = Config::builder();

        if let Some(path) = path {
            debug!("Loading configuration from {}", path.display());
            builder = builder.add_source(File::from(path).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix(prefix)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        self.classifier.validate()?;
        self.screen.validate()?;
        Ok(())
    }
}
