//! Locating the developer's local Maven repository.
//!
//! Resolution order:
//! 1. The `maven.repo.local` property, when set
//! 2. `<localRepository>` in the user settings (`~/.m2/settings.xml`)
//! 3. `<localRepository>` in the global settings (`$M2_HOME/conf/settings.xml`)
//! 4. `~/.m2/repository`
//!
//! `${name}` placeholders in a configured location are resolved from
//! properties, or from environment variables when written `${env.NAME}`.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex_lite::Regex;
use thiserror::Error;

/// Property overriding the repository location.
pub const REPO_LOCAL_PROPERTY: &str = "maven.repo.local";

/// The local repository location could not be determined.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CannotLocateLocalRepository {
    #[error("Unable to parse local Maven settings {}: {reason}", .path.display())]
    UnreadableSettings { path: PathBuf, reason: String },

    #[error("Cannot resolve placeholder '{placeholder}' in value '{value}'")]
    UnresolvedPlaceholder { placeholder: String, value: String },

    #[error("Cannot determine the user home directory")]
    NoUserHome,
}

/// Environment discovery for the local repository.
pub trait LocalRepositoryLocator: Send + Sync {
    fn local_repository(&self) -> Result<PathBuf, CannotLocateLocalRepository>;
}

/// Locates the local repository the way Maven itself does.
#[derive(Debug, Clone, Default)]
pub struct MavenLocalRepositoryLocator {
    user_home: Option<PathBuf>,
    maven_home: Option<PathBuf>,
    properties: BTreeMap<String, String>,
    environment: BTreeMap<String, String>,
}

impl MavenLocalRepositoryLocator {
    /// A locator reading the process environment.
    ///
    /// `M2_HOME` selects the global settings; every environment variable is
    /// available to `${env.NAME}` placeholders.
    pub fn from_process_env() -> Self {
        let environment: BTreeMap<String, String> = std::env::vars().collect();
        let maven_home = environment.get("M2_HOME").map(PathBuf::from);
        Self {
            user_home: dirs::home_dir(),
            maven_home,
            properties: BTreeMap::new(),
            environment,
        }
    }

    pub fn with_user_home(mut self, user_home: impl Into<PathBuf>) -> Self {
        self.user_home = Some(user_home.into());
        self
    }

    pub fn with_maven_home(mut self, maven_home: impl Into<PathBuf>) -> Self {
        self.maven_home = Some(maven_home.into());
        self
    }

    pub fn with_property(mut self, name: &str, value: &str) -> Self {
        self.properties.insert(name.to_string(), value.to_string());
        self
    }

    pub fn with_env(mut self, name: &str, value: &str) -> Self {
        self.environment.insert(name.to_string(), value.to_string());
        self
    }

    fn user_home(&self) -> Result<&Path, CannotLocateLocalRepository> {
        self.user_home
            .as_deref()
            .ok_or(CannotLocateLocalRepository::NoUserHome)
    }

    fn user_settings(&self) -> Option<PathBuf> {
        self.user_home
            .as_ref()
            .map(|home| home.join(".m2").join("settings.xml"))
    }

    fn global_settings(&self) -> Option<PathBuf> {
        self.maven_home
            .as_ref()
            .map(|home| home.join("conf").join("settings.xml"))
    }

    /// The configured `<localRepository>`, user settings taking precedence.
    fn configured_location(&self) -> Result<Option<String>, CannotLocateLocalRepository> {
        for settings in [self.user_settings(), self.global_settings()]
            .into_iter()
            .flatten()
        {
            if let Some(location) = read_local_repository(&settings)? {
                tracing::debug!(settings = %settings.display(), "using localRepository from settings");
                return Ok(Some(location));
            }
        }
        Ok(None)
    }

    fn lookup(&self, name: &str) -> Option<String> {
        if let Some(var) = name.strip_prefix("env.") {
            return self.environment.get(var).cloned();
        }
        if let Some(value) = self.properties.get(name) {
            return Some(value.clone());
        }
        if name == "user.home" {
            return self
                .user_home
                .as_ref()
                .map(|home| home.to_string_lossy().to_string());
        }
        None
    }

    fn resolve_placeholders(&self, value: &str) -> Result<String, CannotLocateLocalRepository> {
        let placeholder = placeholder_regex();
        let mut resolved = String::with_capacity(value.len());
        let mut last = 0;

        for captures in placeholder.captures_iter(value) {
            let (Some(whole), Some(name)) = (captures.get(0), captures.get(1)) else {
                continue;
            };
            let replacement = self.lookup(name.as_str()).ok_or_else(|| {
                CannotLocateLocalRepository::UnresolvedPlaceholder {
                    placeholder: whole.as_str().to_string(),
                    value: value.to_string(),
                }
            })?;
            resolved.push_str(&value[last..whole.start()]);
            resolved.push_str(&replacement);
            last = whole.end();
        }
        resolved.push_str(&value[last..]);

        Ok(resolved)
    }
}

impl LocalRepositoryLocator for MavenLocalRepositoryLocator {
    fn local_repository(&self) -> Result<PathBuf, CannotLocateLocalRepository> {
        if let Some(location) = self.properties.get(REPO_LOCAL_PROPERTY) {
            return Ok(PathBuf::from(location));
        }

        match self.configured_location()? {
            Some(location) => Ok(PathBuf::from(self.resolve_placeholders(location.trim())?)),
            None => Ok(self.user_home()?.join(".m2").join("repository")),
        }
    }
}

fn placeholder_regex() -> &'static Regex {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER.get_or_init(|| Regex::new(r"\$\{([^}]*)\}").expect("placeholder pattern"))
}

fn xml_comment_regex() -> &'static Regex {
    static COMMENT: OnceLock<Regex> = OnceLock::new();
    COMMENT.get_or_init(|| Regex::new(r"(?s)<!--.*?-->").expect("comment pattern"))
}

fn local_repository_regex() -> &'static Regex {
    static ELEMENT: OnceLock<Regex> = OnceLock::new();
    ELEMENT.get_or_init(|| {
        Regex::new(r"<localRepository>\s*([^<]*?)\s*</localRepository>")
            .expect("localRepository pattern")
    })
}

/// Read `<localRepository>` from a settings file.
///
/// A missing file or a missing/empty element yields `None`, as does an
/// element inside an XML comment. An unreadable file is an error.
fn read_local_repository(settings: &Path) -> Result<Option<String>, CannotLocateLocalRepository> {
    if !settings.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(settings).map_err(|e| {
        CannotLocateLocalRepository::UnreadableSettings {
            path: settings.to_path_buf(),
            reason: e.to_string(),
        }
    })?;

    // Commented-out elements, as in the stock global settings, do not count
    let content = xml_comment_regex().replace_all(&content, "");
    Ok(local_repository_regex()
        .captures(&content)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .filter(|s| !s.is_empty()))
}
