//! Application configuration for SermonDeck.
//!
//! User config lives at `~/.sermondeck/sermondeck.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SermonDeckError};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "sermondeck.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".sermondeck";

// ---------------------------------------------------------------------------
// Config structs (matching sermondeck.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Pipeline defaults.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// OpenRouter settings.
    #[serde(default)]
    pub openrouter: OpenRouterConfig,
}

/// `[defaults]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Maximum number of documents enriched per run.
    #[serde(default = "default_insight_limit")]
    pub insight_limit: usize,

    /// Maximum concurrent model-service requests.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Per-call timeout in milliseconds. A timed-out call counts as a
    /// service failure and the item falls back.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            insight_limit: default_insight_limit(),
            concurrency: default_concurrency(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

fn default_insight_limit() -> usize {
    5
}
fn default_concurrency() -> usize {
    4
}
fn default_request_timeout_ms() -> u64 {
    20_000
}

/// `[openrouter]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenRouterConfig {
    /// Name of the env var holding the API key (never store the key itself).
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Default model to use for insight generation.
    #[serde(default = "default_model")]
    pub default_model: String,

    /// API base URL.
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for OpenRouterConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_api_key_env(),
            default_model: default_model(),
            base_url: default_base_url(),
        }
    }
}

fn default_api_key_env() -> String {
    "OPENROUTER_API_KEY".into()
}
fn default_model() -> String {
    "moonshotai/kimi-k2.5".into()
}
fn default_base_url() -> String {
    "https://openrouter.ai/api/v1".into()
}

// ---------------------------------------------------------------------------
// Insight config (runtime, merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime pipeline configuration — merged from config file + CLI flags.
#[derive(Debug, Clone)]
pub struct InsightConfig {
    /// Maximum concurrent model-service requests.
    pub concurrency: usize,
    /// Per-call timeout for each model-service request.
    pub request_timeout: Duration,
}

impl Default for InsightConfig {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

impl From<&AppConfig> for InsightConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            concurrency: config.defaults.concurrency.max(1),
            request_timeout: Duration::from_millis(config.defaults.request_timeout_ms),
        }
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.sermondeck/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| SermonDeckError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.sermondeck/sermondeck.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| SermonDeckError::io(path, e))?;

    toml::from_str(&content).map_err(|e| {
        SermonDeckError::config(format!("failed to parse {}: {e}", path.display()))
    })
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| SermonDeckError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| SermonDeckError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| SermonDeckError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Check that the OpenRouter API key env var is set and non-empty.
pub fn validate_api_key(config: &AppConfig) -> Result<()> {
    let var_name = &config.openrouter.api_key_env;
    match std::env::var(var_name) {
        Ok(val) if !val.is_empty() => Ok(()),
        _ => Err(SermonDeckError::config(format!(
            "OpenRouter API key not found. Set the {var_name} environment variable.\n\
             Get a key at https://openrouter.ai/keys"
        ))),
    }
}
