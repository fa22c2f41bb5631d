//! Built-in defaults (layer 1)
//!
//! Hardcoded defaults for all configuration values.

use serde::{Deserialize, Serialize};

/// Upper bound on the worker pool size.
pub const MAX_WORKERS: u64 = 256;

/// Built-in default configuration values
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuiltinDefaults {
    /// Root caches directory (default: "~/.artres/caches")
    pub caches_dir: String,

    /// File store location relative to the caches directory
    /// (default: "modules-2/files-2.1")
    pub file_store: String,

    /// Worker threads used to visit artifacts (default: available parallelism)
    pub workers: u64,

    /// Search the local Maven repository (default: true)
    pub maven_local_enabled: bool,
}

impl Default for BuiltinDefaults {
    fn default() -> Self {
        let workers = std::thread::available_parallelism()
            .map(|n| n.get() as u64)
            .unwrap_or(4)
            .min(MAX_WORKERS);
        Self {
            caches_dir: "~/.artres/caches".to_string(),
            file_store: "modules-2/files-2.1".to_string(),
            workers,
            maven_local_enabled: true,
        }
    }
}

impl BuiltinDefaults {
    /// Convert to JSON Value for merging
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::json!({
            "caches_dir": self.caches_dir,
            "file_store": self.file_store,
            "workers": self.workers,
            "maven_local": {
                "enabled": self.maven_local_enabled
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let defaults = BuiltinDefaults::default();
        assert_eq!(defaults.caches_dir, "~/.artres/caches");
        assert_eq!(defaults.file_store, "modules-2/files-2.1");
        assert!(defaults.workers >= 1 && defaults.workers <= MAX_WORKERS);
        assert!(defaults.maven_local_enabled);
    }

    #[test]
    fn test_to_value() {
        let defaults = BuiltinDefaults::default();
        let value = defaults.to_value();

        assert_eq!(value["file_store"], "modules-2/files-2.1");
        assert_eq!(value["maven_local"]["enabled"], true);
        assert!(value["maven_local"].get("repo_local").is_none());
    }
}
