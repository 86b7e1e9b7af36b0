//! Application configuration.
//!
//! Values come from three layers, later ones winning:
//!
//! 1. built-in defaults
//! 2. an optional YAML file named by `FAMILY_HUB_CONFIG`
//! 3. `FAMILY_HUB_*` environment variables
//!
//! An environment value that does not parse is logged and ignored.

use anyhow::{Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::domain::FirstSamplePolicy;

pub const CONFIG_PATH_VAR: &str = "FAMILY_HUB_CONFIG";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub geofence: GeofenceConfig,
    pub assist: AssistConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: String,
    /// Allowed browser origin; any origin when unset
    pub cors_origin: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:3000".to_string(),
            cors_origin: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://family_hub.db".to_string(),
            max_connections: 5,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeofenceConfig {
    pub first_sample_policy: FirstSamplePolicy,
}

/// OpenAI-compatible chat completions endpoint used by text assist
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub timeout_secs: u64,
}

impl Default for AssistConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: None,
            model: "gpt-4o-mini".to_string(),
            timeout_secs: 30,
        }
    }
}

impl AssistConfig {
    /// Text assist only runs when an API key is configured
    pub fn is_enabled(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }
}

fn parse_or_keep<T>(lookup: &impl Fn(&str) -> Option<String>, var: &str, current: T) -> T
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(var) {
        Some(val) => match val.trim().parse() {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!("Invalid value '{}' for {}: {}. Ignoring.", val, var, e);
                current
            }
        },
        None => current,
    }
}

fn non_empty(lookup: &impl Fn(&str) -> Option<String>, var: &str) -> Option<String> {
    lookup(var).map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

impl AppConfig {
    /// Load configuration from the process environment
    pub fn load() -> Result<Self> {
        let lookup = |var: &str| std::env::var(var).ok();
        let file = lookup(CONFIG_PATH_VAR);
        Self::from_sources(file.as_deref().map(Path::new), lookup)
    }

    pub fn from_sources(file: Option<&Path>, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = match file {
            Some(path) => Self::from_yaml_file(path)?,
            None => Self::default(),
        };
        config.apply_env_overrides(lookup);
        Ok(config)
    }

    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        serde_yaml::from_str(&text)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(addr) = non_empty(&lookup, "FAMILY_HUB_BIND_ADDR") {
            self.server.bind_addr = addr;
        }
        if let Some(origin) = non_empty(&lookup, "FAMILY_HUB_CORS_ORIGIN") {
            self.server.cors_origin = Some(origin);
        }
        if let Some(url) = non_empty(&lookup, "FAMILY_HUB_DATABASE_URL") {
            self.database.url = url;
        }
        self.geofence.first_sample_policy = parse_or_keep(
            &lookup,
            "FAMILY_HUB_FIRST_SAMPLE_POLICY",
            self.geofence.first_sample_policy,
        );
        if let Some(base_url) = non_empty(&lookup, "FAMILY_HUB_ASSIST_BASE_URL") {
            self.assist.base_url = base_url;
        }
        if let Some(api_key) = non_empty(&lookup, "FAMILY_HUB_ASSIST_API_KEY") {
            self.assist.api_key = Some(api_key);
        }
        if let Some(model) = non_empty(&lookup, "FAMILY_HUB_ASSIST_MODEL") {
            self.assist.model = model;
        }
        self.assist.timeout_secs =
            parse_or_keep(&lookup, "FAMILY_HUB_ASSIST_TIMEOUT_SECS", self.assist.timeout_secs);
    }
}
