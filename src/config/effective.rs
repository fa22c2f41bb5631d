//! The configuration a run actually uses.
//!
//! Besides the merged values, [`EffectiveConfig`] records which sources
//! contributed and which layer last set each key, so `artres config` can
//! explain where a setting came from.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use super::defaults::{BuiltinDefaults, MAX_WORKERS};
use super::merge::{leaf_paths, merge_layers};

/// Schema version for effective config
pub const SCHEMA_VERSION: u32 = 1;

/// Schema identifier
pub const SCHEMA_ID: &str = "artres/effective_config@1";

/// Overrides the root caches directory.
pub const ENV_CACHE_DIR: &str = "ARTRES_CACHE_DIR";

/// Overrides the local Maven repository location.
pub const ENV_MAVEN_REPO_LOCAL: &str = "ARTRES_MAVEN_REPO_LOCAL";

/// Origin of a configuration source
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ConfigOrigin {
    Builtin,
    User,
    Env,
    Cli,
}

/// One layer that contributed to the merged configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigSource {
    /// Origin of this source
    pub origin: ConfigOrigin,

    /// File path (None unless the source is a file)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// SHA-256 digest of raw file bytes (None unless the source is a file)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
}

impl ConfigSource {
    fn inline(origin: ConfigOrigin) -> Self {
        Self {
            origin,
            path: None,
            digest: None,
        }
    }
}

/// Layers collected so far, with their sources and key origins.
#[derive(Default)]
struct LayerStack {
    layers: Vec<Value>,
    sources: Vec<ConfigSource>,
    origins: BTreeMap<String, ConfigOrigin>,
}

impl LayerStack {
    fn push(&mut self, layer: Value, source: ConfigSource) {
        for key in leaf_paths(&layer) {
            self.origins.insert(key, source.origin);
        }
        self.layers.push(layer);
        self.sources.push(source);
    }
}

/// Merged configuration plus where its values came from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectiveConfig {
    /// Schema version
    pub schema_version: u32,

    /// Schema identifier
    pub schema_id: String,

    pub config: Value,

    /// Lowest precedence first
    pub sources: Vec<ConfigSource>,

    /// Layer that last set each key (dot-separated)
    pub origins: BTreeMap<String, ConfigOrigin>,
}

/// Local Maven repository settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MavenLocalSettings {
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,

    /// Explicit repository location, bypassing discovery.
    #[serde(default)]
    pub repo_local: Option<String>,
}

fn enabled_by_default() -> bool {
    true
}

impl Default for MavenLocalSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            repo_local: None,
        }
    }
}

/// Typed view of the merged configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub caches_dir: PathBuf,
    pub file_store: String,
    pub workers: usize,
    #[serde(default)]
    pub maven_local: MavenLocalSettings,
}

impl Settings {
    /// Directory of the current file store.
    pub fn file_store_dir(&self) -> PathBuf {
        self.caches_dir.join(&self.file_store)
    }
}

impl EffectiveConfig {
    /// Merge built-in defaults, the user file (if it exists), environment
    /// overrides and CLI overrides, in increasing precedence.
    pub fn build(
        user_config_path: Option<&Path>,
        env_overrides: Option<Value>,
        cli_overrides: Option<Value>,
    ) -> Result<Self, ConfigError> {
        let mut stack = LayerStack::default();
        stack.push(
            BuiltinDefaults::default().to_value(),
            ConfigSource::inline(ConfigOrigin::Builtin),
        );

        if let Some(path) = user_config_path.filter(|p| p.exists()) {
            let (value, digest) = Self::load_toml_file(path)?;
            stack.push(
                value,
                ConfigSource {
                    origin: ConfigOrigin::User,
                    path: Some(path.to_string_lossy().to_string()),
                    digest: Some(digest),
                },
            );
        }

        for (origin, layer) in [
            (ConfigOrigin::Env, env_overrides),
            (ConfigOrigin::Cli, cli_overrides),
        ] {
            if let Some(layer) = layer {
                stack.push(layer, ConfigSource::inline(origin));
            }
        }

        let LayerStack {
            layers,
            sources,
            origins,
        } = stack;
        let config = merge_layers(layers);
        Self::validate_config(&config)?;

        Ok(Self {
            schema_version: SCHEMA_VERSION,
            schema_id: SCHEMA_ID.to_string(),
            config,
            sources,
            origins,
        })
    }

    /// Default user config location: `~/.config/artres/config.toml`
    pub fn default_user_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".config").join("artres").join("config.toml"))
    }

    /// Environment layer from a variable lookup; `None` when no variable is set.
    pub fn env_layer(lookup: impl Fn(&str) -> Option<String>) -> Option<Value> {
        let mut layer = serde_json::Map::new();
        if let Some(dir) = lookup(ENV_CACHE_DIR).filter(|v| !v.is_empty()) {
            layer.insert("caches_dir".to_string(), Value::String(dir));
        }
        if let Some(repo) = lookup(ENV_MAVEN_REPO_LOCAL).filter(|v| !v.is_empty()) {
            layer.insert(
                "maven_local".to_string(),
                serde_json::json!({ "repo_local": repo }),
            );
        }
        if layer.is_empty() {
            None
        } else {
            Some(Value::Object(layer))
        }
    }

    /// Environment layer read from the process environment.
    pub fn process_env_layer() -> Option<Value> {
        Self::env_layer(|name| std::env::var(name).ok())
    }

    /// Parsed TOML file as JSON, with the SHA-256 of its raw bytes.
    fn load_toml_file(path: &Path) -> Result<(Value, String), ConfigError> {
        let bytes = fs::read(path)
            .map_err(|e| ConfigError::IoError(format!("{}: {}", path.display(), e)))?;
        let digest = hex::encode(Sha256::digest(&bytes));

        let contents = std::str::from_utf8(&bytes).map_err(|e| {
            ConfigError::ParseError(format!("{}: not UTF-8: {}", path.display(), e))
        })?;
        let table: toml::Value = toml::from_str(contents)
            .map_err(|e| ConfigError::ParseError(format!("{}: {}", path.display(), e)))?;

        Ok((Self::toml_to_json(table), digest))
    }

    fn toml_to_json(toml: toml::Value) -> Value {
        match toml {
            toml::Value::String(s) => Value::String(s),
            toml::Value::Integer(i) => Value::Number(i.into()),
            toml::Value::Float(f) => serde_json::Number::from_f64(f)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            toml::Value::Boolean(b) => Value::Bool(b),
            toml::Value::Datetime(dt) => Value::String(dt.to_string()),
            toml::Value::Array(arr) => {
                Value::Array(arr.into_iter().map(Self::toml_to_json).collect())
            }
            toml::Value::Table(table) => {
                let map: serde_json::Map<String, Value> = table
                    .into_iter()
                    .map(|(k, v)| (k, Self::toml_to_json(v)))
                    .collect();
                Value::Object(map)
            }
        }
    }

    fn validate_config(config: &Value) -> Result<(), ConfigError> {
        match config.get("workers").map(|v| v.as_u64()) {
            Some(Some(workers)) if (1..=MAX_WORKERS).contains(&workers) => {}
            Some(_) => {
                return Err(ConfigError::ValidationError(format!(
                    "workers must be an integer in [1, {}]",
                    MAX_WORKERS
                )));
            }
            None => {}
        }

        if let Some(file_store) = config.get("file_store") {
            let relative = file_store
                .as_str()
                .map(|s| !s.is_empty() && !Path::new(s).is_absolute())
                .unwrap_or(false);
            if !relative {
                return Err(ConfigError::ValidationError(
                    "file_store must be a non-empty relative path".to_string(),
                ));
            }
        }

        if let Some(caches_dir) = config.get("caches_dir") {
            if caches_dir.as_str().map(str::is_empty).unwrap_or(true) {
                return Err(ConfigError::ValidationError(
                    "caches_dir must be a non-empty path".to_string(),
                ));
            }
        }

        Ok(())
    }

    /// Typed settings, with `~/` expanded to the home directory.
    pub fn settings(&self) -> Result<Settings, ConfigError> {
        let mut settings: Settings = serde_json::from_value(self.config.clone())
            .map_err(|e| ConfigError::ValidationError(e.to_string()))?;
        settings.caches_dir = expand_home(&settings.caches_dir)?;
        if let Some(repo) = &settings.maven_local.repo_local {
            let expanded = expand_home(Path::new(repo))?;
            settings.maven_local.repo_local = Some(expanded.to_string_lossy().to_string());
        }
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Value at a dot-separated path, e.g. `maven_local.enabled`.
    pub fn get(&self, path: &str) -> Option<&Value> {
        let mut current = &self.config;
        for part in path.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    pub fn get_u64(&self, path: &str) -> Option<u64> {
        self.get(path).and_then(|v| v.as_u64())
    }

    pub fn get_str(&self, path: &str) -> Option<&str> {
        self.get(path).and_then(|v| v.as_str())
    }

    pub fn get_bool(&self, path: &str) -> Option<bool> {
        self.get(path).and_then(|v| v.as_bool())
    }

    /// Layer that set a key, if any
    pub fn origin(&self, path: &str) -> Option<ConfigOrigin> {
        self.origins.get(path).copied()
    }
}

fn expand_home(path: &Path) -> Result<PathBuf, ConfigError> {
    match path.strip_prefix("~") {
        Ok(rest) => dirs::home_dir().map(|home| home.join(rest)).ok_or_else(|| {
            ConfigError::ValidationError(format!(
                "cannot expand {}: no home directory",
                path.display()
            ))
        }),
        Err(_) => Ok(path.to_path_buf()),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}
