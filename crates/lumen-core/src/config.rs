//! Configuration file support.
//!
//! Configuration is layered: built-in defaults, then the global file
//! (`~/.lumen/config.toml`), then the local file (`./.lumenrc`). Later layers
//! override earlier ones key by key, so a local file only needs the keys it
//! changes. The API token may also come from the `HF_API_TOKEN` environment
//! variable when no layer sets one.

use lumen_models::{HuggingFaceConfig, ModelsConfig, TOKEN_ENV_VAR};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LumenConfig {
    /// Log level (`error`, `warn`, `info`, `debug`, `trace`).
    #[serde(default)]
    pub log_level: Option<String>,

    /// Inference API connection.
    #[serde(default)]
    pub huggingface: HuggingFaceConfig,

    /// Which backends to register and how to parameterize them.
    #[serde(default)]
    pub models: ModelsConfig,

    /// Where rendered results go.
    #[serde(default)]
    pub output: OutputConfig,
}

/// Output settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OutputConfig {
    /// Directory generated images are written to.
    #[serde(default = "default_image_dir")]
    pub image_dir: PathBuf,
}

fn default_image_dir() -> PathBuf {
    PathBuf::from("lumen-output")
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { image_dir: default_image_dir() }
    }
}

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file not found.
    #[error("Configuration file not found: {0}")]
    NotFound(String),

    /// Failed to read configuration file.
    #[error("Failed to read configuration file: {0}")]
    ReadError(String),

    /// Failed to parse configuration file.
    #[error("Failed to parse configuration file: {0}")]
    ParseError(String),

    /// Invalid configuration value.
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

/// Result type for configuration operations.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

impl LumenConfig {
    /// Load configuration from a single TOML file.
    pub fn load_from_file(path: &Path) -> ConfigResult<Self> {
        Self::from_value(read_value(path)?, path)
    }

    /// Default global configuration file path, if a home directory is known.
    pub fn default_global_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".lumen").join("config.toml"))
    }

    /// Default local configuration file path.
    pub fn default_local_path() -> PathBuf {
        PathBuf::from(".lumenrc")
    }

    /// Discover and load configuration files.
    ///
    /// Loads configuration from:
    /// 1. Global config (~/.lumen/config.toml)
    /// 2. Local config (./.lumenrc)
    ///
    /// Local config overrides global config. Missing files are skipped;
    /// unreadable or malformed ones are errors.
    pub fn discover_and_load() -> ConfigResult<Self> {
        let mut layers = Vec::with_capacity(2);
        if let Some(global) = Self::default_global_path() {
            layers.push(global);
        }
        layers.push(Self::default_local_path());
        Self::load_layers(&layers)
    }

    /// Loads and merges the given files in order, skipping missing ones.
    pub fn load_layers(paths: &[PathBuf]) -> ConfigResult<Self> {
        let mut merged = toml::Value::Table(toml::Table::new());
        let mut source = Path::new("<defaults>");

        for path in paths {
            match read_value(path) {
                Ok(layer) => {
                    debug!(path = %path.display(), "Applying configuration layer");
                    merge_values(&mut merged, layer);
                    source = path.as_path();
                }
                Err(ConfigError::NotFound(_)) => {
                    debug!(path = %path.display(), "No configuration file");
                }
                Err(e) => return Err(e),
            }
        }

        Self::from_value(merged, source)
    }

    fn from_value(value: toml::Value, source: &Path) -> ConfigResult<Self> {
        value
            .try_into()
            .map_err(|e| ConfigError::ParseError(format!("{}: {}", source.display(), e)))
    }

    /// Fills the API token from the environment when no file supplied one.
    pub fn apply_env(&mut self) {
        self.apply_env_overrides(|key| std::env::var(key).ok());
    }

    /// Same as [`apply_env`](Self::apply_env) with an injectable variable lookup.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let has_token = self
            .huggingface
            .api_token
            .as_deref()
            .is_some_and(|token| !token.trim().is_empty());

        if !has_token
            && let Some(token) = lookup(TOKEN_ENV_VAR).filter(|token| !token.trim().is_empty())
        {
            debug!("Using API token from {}", TOKEN_ENV_VAR);
            self.huggingface.api_token = Some(token);
        }
    }

    /// Checks values serde cannot check on its own.
    pub fn validate(&self) -> ConfigResult<()> {
        let mut seen = HashSet::new();
        for kind in &self.models.enabled {
            if !seen.insert(kind) {
                return Err(ConfigError::InvalidValue(format!(
                    "models.enabled lists '{kind}' more than once"
                )));
            }
        }

        if self.huggingface.timeout_secs == Some(0) {
            return Err(ConfigError::InvalidValue(
                "huggingface.timeout_secs must be greater than zero".to_string(),
            ));
        }

        let base_url = &self.huggingface.base_url;
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ConfigError::InvalidValue(format!(
                "huggingface.base_url must be an http(s) URL, got '{base_url}'"
            )));
        }

        Ok(())
    }
}

fn read_value(path: &Path) -> ConfigResult<toml::Value> {
    if !path.exists() {
        return Err(ConfigError::NotFound(path.display().to_string()));
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::ReadError(format!("{}: {}", path.display(), e)))?;

    toml::from_str(&content).map_err(|e| ConfigError::ParseError(format!("{}: {}", path.display(), e)))
}

/// Deep-merges `overlay` into `base`. Tables merge key by key; anything else
/// in the overlay replaces the base value.
fn merge_values(base: &mut toml::Value, overlay: toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(base), toml::Value::Table(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(existing) => merge_values(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}
