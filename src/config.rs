//! Configuration management for the compatibility gate
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (compat-gate.toml)
//! - Environment variables (COMPAT_GATE__*)
//!
//! ## Example config file (compat-gate.toml):
//! ```toml
//! [registry]
//! url = "http://schema-registry:8081"
//! subject = "orders-value"
//! timeout_secs = 10
//! # Only set this if a registry outage must not block deployments
//! # fallback_mode = "BACKWARD"
//!
//! [report]
//! output_format = "text"
//! ```

use config_crate::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

use crate::mode::CompatibilityMode;

/// Main configuration for the gate
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GateConfig {
    /// Registry settings
    #[serde(default)]
    pub registry: RegistryConfig,

    /// Report settings
    #[serde(default)]
    pub report: ReportConfig,
}

/// Registry client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Base URL of the schema registry
    #[serde(default = "default_registry_url")]
    pub url: String,

    /// Subject whose compatibility mode gates the change
    #[serde(default = "default_subject")]
    pub subject: String,

    /// Per-request timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Mode to assume when the registry cannot be reached. Unset means
    /// an unreachable registry fails the run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_mode: Option<CompatibilityMode>,
}

/// Report configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportConfig {
    #[serde(default)]
    pub output_format: OutputFormat,
}

/// Output format for reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

// Default value functions
fn default_registry_url() -> String {
    "http://schema-registry:8081".to_string()
}

fn default_subject() -> String {
    "orders-value".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            url: default_registry_url(),
            subject: default_subject(),
            timeout_secs: default_timeout_secs(),
            fallback_mode: None,
        }
    }
}

impl GateConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Load configuration, adding a specific file on top of the defaults
    pub fn load_from(config_path: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        let config_locations = [
            "compat-gate.toml",
            ".compat-gate.toml",
            "config/compat-gate.toml",
        ];

        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        // XDG config directory
        if let Some(config_dir) = directories::ProjectDirs::from("dev", "familiar", "compat-gate") {
            let xdg_config = config_dir.config_dir().join("compat-gate.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // COMPAT_GATE__REGISTRY__URL, COMPAT_GATE__REPORT__OUTPUT_FORMAT, ...
        builder = builder.add_source(
            Environment::with_prefix("COMPAT_GATE")
                .separator("__")
                .try_parsing(true),
        );

        let config: Self = builder.build()?.try_deserialize()?;
        tracing::debug!(
            registry = %config.registry.url,
            subject = %config.registry.subject,
            fallback = ?config.registry.fallback_mode,
            "loaded configuration"
        );
        Ok(config)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &str) -> std::io::Result<()> {
        std::fs::write(path, self.to_toml()?)
    }

    /// Render as TOML
    pub fn to_toml(&self) -> std::io::Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }
}
