use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use timetracker::{Credentials, Hours, TimeTrackerError};

const CREDENTIALS: &str = "credentials";
const OPTIONS: &str = "options";
const REQUIRED_CREDENTIALS: [&str; 2] = ["username", "password"];
const REQUIRED_LOAD_OPTIONS: [&str; 4] = ["project", "task-category", "task-description", "focal"];

#[derive(Clone, Deserialize)]
pub struct CredentialsConfig {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for CredentialsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialsConfig")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

impl From<CredentialsConfig> for Credentials {
    fn from(config: CredentialsConfig) -> Self {
        Credentials::new(config.username, config.password)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct LoadOptions {
    pub project: String,
    pub task_category: String,
    pub task_description: String,
    pub focal: String,
    pub hours: Option<HoursSetting>,
}

/// `hours` may be written as a number or as a string.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum HoursSetting {
    Number(f64),
    Text(String),
}

impl HoursSetting {
    pub fn to_hours(&self) -> Result<Hours, TimeTrackerError> {
        match self {
            HoursSetting::Number(hours) => Hours::new(*hours),
            HoursSetting::Text(text) => text.parse(),
        }
    }
}

/// What `load` and `batch` need.
#[derive(Debug, Clone, Deserialize)]
pub struct LoadConfig {
    pub credentials: CredentialsConfig,
    pub options: LoadOptions,
}

/// What `show` needs.
#[derive(Debug, Clone, Deserialize)]
pub struct ShowConfig {
    pub credentials: CredentialsConfig,
}

impl LoadConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = read(path)?;
        Self::from_toml(&raw).with_context(|| format!("Failed to load config at {}", path.display()))
    }

    pub fn from_toml(raw: &str) -> Result<Self> {
        let table: toml::Table = raw.parse()?;
        check_required(&table, CREDENTIALS, &REQUIRED_CREDENTIALS)?;
        check_required(&table, OPTIONS, &REQUIRED_LOAD_OPTIONS)?;
        Ok(toml::from_str(raw)?)
    }
}

impl ShowConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = read(path)?;
        Self::from_toml(&raw).with_context(|| format!("Failed to load config at {}", path.display()))
    }

    pub fn from_toml(raw: &str) -> Result<Self> {
        let table: toml::Table = raw.parse()?;
        check_required(&table, CREDENTIALS, &REQUIRED_CREDENTIALS)?;
        Ok(toml::from_str(raw)?)
    }
}

/// `--config`, then `TT_CONFIG` (both handled by clap), then `~/.timetracker/config.toml`.
pub fn resolve_path(explicit: Option<PathBuf>) -> Result<PathBuf> {
    match explicit {
        Some(path) => Ok(path),
        None => Ok(dirs::home_dir()
            .context("Cannot determine home directory")?
            .join(".timetracker")
            .join("config.toml")),
    }
}

fn read(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read config at {}", path.display()))
}

/// Flat key presence check, run before anything is deserialized so the first missing
/// key can be named.
pub fn check_required(table: &toml::Table, name: &str, keys: &[&str]) -> Result<(), TimeTrackerError> {
    let section = table.get(name).and_then(|value| value.as_table());
    match keys
        .iter()
        .find(|key| section.map_or(true, |section| !section.contains_key(**key)))
    {
        Some(missing) => Err(TimeTrackerError::config(format!(
            "'{}' missing in '{}' config option",
            missing, name
        ))),
        None => Ok(()),
    }
}
