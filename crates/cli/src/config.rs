use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fs, path::PathBuf};

use kick_core::RoleSet;

#[cfg(windows)]
pub fn config_dir() -> PathBuf {
    std::env::var("APPDATA")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
        .join("kickstand")
}

#[cfg(not(windows))]
pub fn config_dir() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(".config")
        .join("kickstand")
}

fn config_file_path() -> PathBuf {
    config_dir().join("config.toml")
}

fn default_enabled() -> bool {
    true
}

#[derive(Serialize, Deserialize)]
pub struct KickConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

impl Default for KickConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
        }
    }
}

/// Host configuration: bundle sources, the actor's default roles, the theme
/// handed to kicks, and per-kick toggles.
#[derive(Serialize, Deserialize, Default)]
pub struct HostConfig {
    #[serde(default)]
    pub sources: Vec<String>,
    #[serde(default)]
    pub roles: RoleSet,
    #[serde(default)]
    pub theme: Option<String>,
    #[serde(default)]
    pub kicks: HashMap<String, KickConfig>,
}

impl HostConfig {
    /// Whether the kick is enabled; unknown kicks default to enabled.
    pub fn enabled(&self, id: &str) -> bool {
        self.kicks.get(id).map(|kick| kick.enabled).unwrap_or(true)
    }
}

/// Loads the host configuration; a missing file yields the defaults.
pub fn load_config() -> Result<HostConfig> {
    let path = config_file_path();
    if !path.exists() {
        return Ok(HostConfig::default());
    }
    let data = fs::read_to_string(&path)
        .with_context(|| format!("failed to read config: {}", path.display()))?;
    toml::from_str(&data).with_context(|| format!("failed to parse config: {}", path.display()))
}
