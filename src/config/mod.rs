//! Configuration merge system
//!
//! Implements the 4-layer configuration merge:
//! 1. Built-in defaults
//! 2. User config (~/.config/artres/config.toml, or --config)
//! 3. Environment (ARTRES_CACHE_DIR, ARTRES_MAVEN_REPO_LOCAL)
//! 4. CLI flags

mod defaults;
mod effective;
mod merge;

pub use defaults::{BuiltinDefaults, MAX_WORKERS};
pub use effective::{
    ConfigError, ConfigOrigin, ConfigSource, EffectiveConfig, MavenLocalSettings, Settings,
    ENV_CACHE_DIR, ENV_MAVEN_REPO_LOCAL,
};
pub use merge::{deep_merge, leaf_paths, merge_layers};
