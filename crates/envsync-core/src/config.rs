use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context};
use serde::{Deserialize, Serialize};

use crate::manifest::EnvironmentManifest;

pub const CONFIG_FILE_NAME: &str = "envsync.toml";
pub const CONFIG_PATH_ENV: &str = "ENVSYNC_CONFIG";
pub const EXECUTABLE_ENV: &str = "ENVSYNC_EXECUTABLE";

/// Tool settings read from `envsync.toml`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct SyncConfig {
    /// Package manager binary invoked for every environment change.
    pub executable: String,
    /// Packages that are kept regardless of the manifest.
    pub protected: Vec<String>,
    pub default_prefix: String,
    pub default_channels: Vec<String>,
    pub default_dependencies: Vec<String>,
    pub spec_file: String,
    pub strict_channel_priority: bool,
    pub assume_yes: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            executable: "mamba".to_string(),
            protected: vec!["conda".to_string()],
            default_prefix: "./.conda".to_string(),
            default_channels: vec!["conda-forge".to_string(), "nodefaults".to_string()],
            default_dependencies: vec!["python".to_string()],
            spec_file: "spec-file.txt".to_string(),
            strict_channel_priority: true,
            assume_yes: false,
        }
    }
}

impl SyncConfig {
    pub fn from_toml_str(input: &str) -> anyhow::Result<Self> {
        let config: Self = toml::from_str(input).context("failed to parse envsync config")?;
        if config.executable.trim().is_empty() {
            return Err(anyhow!("config 'executable' must not be empty"));
        }
        if config.spec_file.trim().is_empty() {
            return Err(anyhow!("config 'spec_file' must not be empty"));
        }
        Ok(config)
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read config: {}", path.display()))?;
        Self::from_toml_str(&raw)
            .with_context(|| format!("failed to load config: {}", path.display()))
    }

    /// Applies `ENVSYNC_EXECUTABLE` when set to a non-empty value.
    pub fn apply_env_overrides(&mut self, executable_env: Option<&str>) {
        if let Some(executable) = executable_env.map(str::trim).filter(|v| !v.is_empty()) {
            self.executable = executable.to_string();
        }
    }

    /// Manifest written when the requested environment file does not exist.
    pub fn default_manifest(&self, prefix_override: Option<&str>) -> EnvironmentManifest {
        EnvironmentManifest {
            prefix: Some(
                prefix_override
                    .unwrap_or(self.default_prefix.as_str())
                    .to_string(),
            ),
            channels: self.default_channels.clone(),
            dependencies: self.default_dependencies.clone(),
        }
    }
}
