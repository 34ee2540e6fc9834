//! Tool configuration.
//!
//! [`ExportConfig::load`] reads `config/auditddl.toml` when present and lets
//! `AUDITDDL__*` environment variables override it.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;

const CONFIG_FILE: &str = "config/auditddl.toml";

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct ExportConfig {
    /// Persistence descriptor listing the units and their mappings
    #[serde(default = "default_persistence_file")]
    pub persistence_file: PathBuf,
}

fn default_persistence_file() -> PathBuf {
    PathBuf::from("persistence.toml")
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            persistence_file: default_persistence_file(),
        }
    }
}

impl ExportConfig {
    /// Load the configuration from `config/auditddl.toml`, falling back to env vars.
    pub fn load() -> Result<Self, ConfigError> {
        let builder = Config::builder()
            .add_source(File::with_name(CONFIG_FILE).required(false))
            .add_source(Environment::with_prefix("AUDITDDL").separator("__"));

        let settings = match builder.build() {
            Ok(cfg) => cfg,
            Err(err) => {
                // An unreadable file should not hide the env configuration
                if std::path::Path::new(CONFIG_FILE).exists() {
                    log::warn!("Failed to load {}, falling back to env: {}", CONFIG_FILE, err);
                }
                Config::builder()
                    .add_source(Environment::with_prefix("AUDITDDL").separator("__"))
                    .build()
                    .map_err(|env_err| {
                        ConfigError::Message(format!(
                            "Failed to load configuration from file and env: {}, then env-only error: {}",
                            err, env_err
                        ))
                    })?
            }
        };

        settings.try_deserialize::<ExportConfig>()
    }
}
