//! Configuration loading from TOML files

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Global configuration for nobeline
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub output: OutputConfig,
    pub api: ApiConfig,
    pub http: HttpSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    #[serde(deserialize_with = "env_default_dir")]
    pub default_dir: PathBuf,
    /// `csv` or `parquet`
    #[serde(deserialize_with = "env_format")]
    pub format: String,
    pub compression_level: i32,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            default_dir: PathBuf::from("./output"),
            format: "csv".to_string(),
            compression_level: 3,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    #[serde(deserialize_with = "env_base_url")]
    pub base_url: String,
    pub page_size: usize,
    #[serde(deserialize_with = "env_language")]
    pub language: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: nobeline_laureates::DEFAULT_BASE_URL.to_string(),
            page_size: nobeline_laureates::DEFAULT_PAGE_SIZE,
            language: "en".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    /// Seconds before a request is abandoned
    pub read_timeout: u64,
    pub max_retries: u32,
    pub page_delay_ms: u64,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            read_timeout: 30,
            max_retries: 3,
            page_delay_ms: 200,
        }
    }
}

/// Deserialize a string that may be an environment variable reference like ${VAR}.
/// An unset variable falls back to `default`.
fn deserialize_env_var<'de, D>(
    deserializer: D,
    default: impl FnOnce() -> String,
) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    Ok(expand_env_var(&s).unwrap_or_else(default))
}

fn env_base_url<'de, D: serde::Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    deserialize_env_var(d, || ApiConfig::default().base_url)
}

fn env_language<'de, D: serde::Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    deserialize_env_var(d, || ApiConfig::default().language)
}

fn env_format<'de, D: serde::Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    deserialize_env_var(d, || OutputConfig::default().format)
}

fn env_default_dir<'de, D: serde::Deserializer<'de>>(d: D) -> Result<PathBuf, D::Error> {
    deserialize_env_var(d, || OutputConfig::default().default_dir.display().to_string())
        .map(PathBuf::from)
}

/// Expand ${VAR} to environment variable value
fn expand_env_var(s: &str) -> Option<String> {
    if let Some(var_name) = s.strip_prefix("${").and_then(|s| s.strip_suffix('}')) {
        std::env::var(var_name).ok()
    } else {
        Some(s.to_string())
    }
}

impl Config {
    /// Load configuration from default locations
    ///
    /// Search order:
    /// 1. ./nobeline.toml (current directory)
    /// 2. ~/.config/nobeline/config.toml
    ///
    /// If no config file found, returns default config.
    pub fn load() -> Result<Self> {
        let local_config = PathBuf::from("nobeline.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = directories::ProjectDirs::from("", "", "nobeline") {
            let user_config = config_dir.config_dir().join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        log::debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Load configuration from a specific file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }
}
