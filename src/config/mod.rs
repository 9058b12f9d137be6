//! Configuration management
//!
//! This module handles loading and parsing configuration for the application.
//! Configuration can be loaded from:
//! - config.yml file
//! - Environment variables (override file settings)
//!
//! Missing optional values are filled with sensible defaults. The AI
//! credential is never read from the file; it comes from the `API_KEY`
//! environment variable, read once at startup.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Environment variable holding the generative AI credential
pub const API_KEY_ENV: &str = "API_KEY";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Local persistence
    #[serde(default)]
    pub storage: StorageConfig,
    /// Translation resources
    #[serde(default)]
    pub locales: LocalesConfig,
    /// Generative AI service
    #[serde(default)]
    pub ai: AiConfig,
    /// Toast behaviour
    #[serde(default)]
    pub toast: ToastConfig,
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Storage driver (memory or file)
    #[serde(default)]
    pub driver: StorageDriver,
    /// Path of the state file when using the file driver
    #[serde(default = "default_storage_path")]
    pub path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            driver: StorageDriver::default(),
            path: default_storage_path(),
        }
    }
}

fn default_storage_path() -> PathBuf {
    PathBuf::from("data/state.json")
}

/// Storage driver type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageDriver {
    /// Process-local map
    Memory,
    /// JSON file on disk (default)
    #[default]
    File,
}

/// Where translation resources come from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalesConfig {
    #[serde(default)]
    pub source: LocaleSourceKind,
    /// Directory holding `<code>.json` files (directory source)
    #[serde(default = "default_locales_path")]
    pub path: PathBuf,
    /// Base URL serving `<code>.json` files (http source)
    #[serde(default)]
    pub base_url: Option<String>,
}

impl Default for LocalesConfig {
    fn default() -> Self {
        Self {
            source: LocaleSourceKind::default(),
            path: default_locales_path(),
            base_url: None,
        }
    }
}

fn default_locales_path() -> PathBuf {
    PathBuf::from("locales")
}

/// Translation resource source type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LocaleSourceKind {
    /// Files compiled into the binary (default)
    #[default]
    Embedded,
    /// Files read from `locales.path`
    Directory,
    /// Files fetched from `locales.base_url`
    Http,
}

/// Generative AI configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiConfig {
    /// Model name
    #[serde(default = "default_ai_model")]
    pub model: String,
    /// API root, without the `/models/...` suffix
    #[serde(default = "default_ai_endpoint")]
    pub endpoint: String,
    /// Request timeout in seconds
    #[serde(default = "default_ai_timeout")]
    pub timeout_seconds: u64,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            model: default_ai_model(),
            endpoint: default_ai_endpoint(),
            timeout_seconds: default_ai_timeout(),
        }
    }
}

fn default_ai_model() -> String {
    "gemini-2.5-flash-preview-04-17".to_string()
}

fn default_ai_endpoint() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_ai_timeout() -> u64 {
    30
}

impl AiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Read the credential from the environment
    pub fn credential_from_env() -> Option<String> {
        std::env::var(API_KEY_ENV).ok()
    }
}

/// Toast configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToastConfig {
    /// Seconds before a toast expires on its own
    #[serde(default = "default_toast_ttl")]
    pub ttl_seconds: u64,
}

impl Default for ToastConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: default_toast_ttl(),
        }
    }
}

fn default_toast_ttl() -> u64 {
    5
}

impl ToastConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds)
    }
}

/// Mask a credential for display: first and last four characters for long
/// keys, asterisks otherwise.
pub fn mask_api_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() > 8 {
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{}...{}", head, tail)
    } else {
        "********".to_string()
    }
}

/// Error type for configuration parsing
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    FileRead {
        path: String,
        source: std::io::Error,
    },
    #[error("Failed to parse config file '{path}': {message}")]
    ParseError { path: String, message: String },
}

impl Config {
    /// Load configuration from file
    ///
    /// If the file doesn't exist or is empty, returns default configuration.
    /// If the file exists but is invalid YAML, returns an error with details.
    pub fn load(path: &std::path::Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.display().to_string(),
            source: e,
        })?;

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Config =
            serde_yaml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.display().to_string(),
                message: format_yaml_error(&e),
            })?;

        Ok(config)
    }

    /// Load configuration from file with environment variable overrides
    ///
    /// Environment variables follow the pattern:
    /// - INFLUENCER_HUB_STORAGE_DRIVER
    /// - INFLUENCER_HUB_STORAGE_PATH
    /// - INFLUENCER_HUB_LOCALES_SOURCE
    /// - INFLUENCER_HUB_LOCALES_PATH
    /// - INFLUENCER_HUB_LOCALES_BASE_URL
    /// - INFLUENCER_HUB_AI_MODEL
    /// - INFLUENCER_HUB_AI_ENDPOINT
    /// - INFLUENCER_HUB_AI_TIMEOUT_SECONDS
    /// - INFLUENCER_HUB_TOAST_TTL_SECONDS
    pub fn load_with_env(path: &std::path::Path) -> anyhow::Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides to the configuration
    fn apply_env_overrides(&mut self) {
        // Storage configuration
        if let Ok(driver) = std::env::var("INFLUENCER_HUB_STORAGE_DRIVER") {
            match driver.to_lowercase().as_str() {
                "memory" => self.storage.driver = StorageDriver::Memory,
                "file" => self.storage.driver = StorageDriver::File,
                _ => {} // Ignore invalid values
            }
        }
        if let Ok(path) = std::env::var("INFLUENCER_HUB_STORAGE_PATH") {
            self.storage.path = PathBuf::from(path);
        }

        // Locale configuration
        if let Ok(source) = std::env::var("INFLUENCER_HUB_LOCALES_SOURCE") {
            match source.to_lowercase().as_str() {
                "embedded" => self.locales.source = LocaleSourceKind::Embedded,
                "directory" => self.locales.source = LocaleSourceKind::Directory,
                "http" => self.locales.source = LocaleSourceKind::Http,
                _ => {}
            }
        }
        if let Ok(path) = std::env::var("INFLUENCER_HUB_LOCALES_PATH") {
            self.locales.path = PathBuf::from(path);
        }
        if let Ok(base_url) = std::env::var("INFLUENCER_HUB_LOCALES_BASE_URL") {
            self.locales.base_url = Some(base_url);
        }

        // AI configuration
        if let Ok(model) = std::env::var("INFLUENCER_HUB_AI_MODEL") {
            self.ai.model = model;
        }
        if let Ok(endpoint) = std::env::var("INFLUENCER_HUB_AI_ENDPOINT") {
            self.ai.endpoint = endpoint;
        }
        if let Ok(timeout) = std::env::var("INFLUENCER_HUB_AI_TIMEOUT_SECONDS") {
            if let Ok(timeout) = timeout.parse::<u64>() {
                self.ai.timeout_seconds = timeout;
            }
        }

        // Toast configuration
        if let Ok(ttl) = std::env::var("INFLUENCER_HUB_TOAST_TTL_SECONDS") {
            if let Ok(ttl) = ttl.parse::<u64>() {
                self.toast.ttl_seconds = ttl;
            }
        }
    }
}

/// Format YAML parsing error with location and context
fn format_yaml_error(e: &serde_yaml::Error) -> String {
    if let Some(location) = e.location() {
        format!(
            "at line {}, column {}: {}",
            location.line(),
            location.column(),
            e
        )
    } else {
        e.to_string()
    }
}

// Shared mutex for all config tests that modify environment variables.
#[cfg(test)]
static CONFIG_ENV_MUTEX: std::sync::Mutex<()> = std::sync::Mutex::new(());

#[cfg(test)]
const ENV_VARS: [&str; 9] = [
    "INFLUENCER_HUB_STORAGE_DRIVER",
    "INFLUENCER_HUB_STORAGE_PATH",
    "INFLUENCER_HUB_LOCALES_SOURCE",
    "INFLUENCER_HUB_LOCALES_PATH",
    "INFLUENCER_HUB_LOCALES_BASE_URL",
    "INFLUENCER_HUB_AI_MODEL",
    "INFLUENCER_HUB_AI_ENDPOINT",
    "INFLUENCER_HUB_AI_TIMEOUT_SECONDS",
    "INFLUENCER_HUB_TOAST_TTL_SECONDS",
];
