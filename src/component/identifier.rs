//! Identifiers for resolved components and their artifacts.

use std::fmt;
use std::str::FromStr;

use artres_pattern::Coordinates;
use artres_store::StoreKey;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors parsing identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentifierError {
    #[error("invalid module coordinates '{0}': expected group:module:version")]
    InvalidCoordinates(String),
}

/// A module published to a repository, identified by group, name and version.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ModuleComponentIdentifier {
    pub group: String,
    pub module: String,
    pub version: String,
}

impl ModuleComponentIdentifier {
    pub fn new(group: &str, module: &str, version: &str) -> Self {
        Self {
            group: group.to_string(),
            module: module.to_string(),
            version: version.to_string(),
        }
    }
}

impl FromStr for ModuleComponentIdentifier {
    type Err = IdentifierError;

    /// Parse `group:module:version`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(':').collect();
        match parts.as_slice() {
            [group, module, version]
                if !group.is_empty() && !module.is_empty() && !version.is_empty() =>
            {
                Ok(Self::new(group, module, version))
            }
            _ => Err(IdentifierError::InvalidCoordinates(s.to_string())),
        }
    }
}

impl fmt::Display for ModuleComponentIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group, self.module, self.version)
    }
}

/// Identity of a resolved component.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ComponentIdentifier {
    /// A module resolved from a repository.
    Module(ModuleComponentIdentifier),
    /// A component produced by a project of the current build.
    Project { path: String },
}

impl ComponentIdentifier {
    pub fn module(group: &str, module: &str, version: &str) -> Self {
        Self::Module(ModuleComponentIdentifier::new(group, module, version))
    }

    pub fn project(path: &str) -> Self {
        Self::Project {
            path: path.to_string(),
        }
    }

    pub fn as_module(&self) -> Option<&ModuleComponentIdentifier> {
        match self {
            Self::Module(id) => Some(id),
            Self::Project { .. } => None,
        }
    }
}

impl fmt::Display for ComponentIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Module(id) => id.fmt(f),
            Self::Project { path } => write!(f, "project {}", path),
        }
    }
}

/// Identity of one artifact of any component.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArtifactIdentifier {
    pub component: ComponentIdentifier,
    pub file_name: String,
}

impl ArtifactIdentifier {
    pub fn new(component: ComponentIdentifier, file_name: &str) -> Self {
        Self {
            component,
            file_name: file_name.to_string(),
        }
    }
}

impl fmt::Display for ArtifactIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.file_name, self.component)
    }
}

/// Identity of one artifact of a module component.
///
/// This is the criterion used to search local caches.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModuleComponentArtifactIdentifier {
    pub component: ModuleComponentIdentifier,
    pub name: String,
    #[serde(rename = "type")]
    pub artifact_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extension: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classifier: Option<String>,
}

impl ModuleComponentArtifactIdentifier {
    /// The main artifact of a module: named after the module, typed and
    /// suffixed `jar`.
    pub fn main_jar(component: ModuleComponentIdentifier) -> Self {
        let name = component.module.clone();
        Self {
            component,
            name,
            artifact_type: "jar".to_string(),
            extension: Some("jar".to_string()),
            classifier: None,
        }
    }

    pub fn new(component: ModuleComponentIdentifier, name: &str, artifact_type: &str) -> Self {
        Self {
            component,
            name: name.to_string(),
            artifact_type: artifact_type.to_string(),
            extension: None,
            classifier: None,
        }
    }

    pub fn with_extension(mut self, extension: &str) -> Self {
        self.extension = Some(extension.to_string());
        self
    }

    pub fn with_classifier(mut self, classifier: &str) -> Self {
        self.classifier = Some(classifier.to_string());
        self
    }

    /// File name in repository convention:
    /// `<name>-<version>[-<classifier>][.<extension>]`.
    pub fn file_name(&self) -> String {
        let mut name = format!("{}-{}", self.name, self.component.version);
        if let Some(classifier) = self.classifier.as_deref().filter(|c| !c.is_empty()) {
            name.push('-');
            name.push_str(classifier);
        }
        if let Some(extension) = self.extension.as_deref().filter(|e| !e.is_empty()) {
            name.push('.');
            name.push_str(extension);
        }
        name
    }

    /// Pattern coordinates for this artifact.
    pub fn coordinates(&self) -> Coordinates {
        Coordinates {
            organisation: self.component.group.clone(),
            module: self.component.module.clone(),
            branch: None,
            revision: self.component.version.clone(),
            artifact: self.name.clone(),
            artifact_type: self.artifact_type.clone(),
            classifier: self.classifier.clone(),
            extension: self.extension.clone(),
        }
    }

    /// Key of this artifact in the current file store.
    pub fn store_key(&self) -> StoreKey {
        StoreKey::new(
            &self.component.group,
            &self.component.module,
            &self.component.version,
            &self.file_name(),
        )
    }

    pub fn to_artifact_id(&self) -> ArtifactIdentifier {
        ArtifactIdentifier::new(
            ComponentIdentifier::Module(self.component.clone()),
            &self.file_name(),
        )
    }
}

impl fmt::Display for ModuleComponentArtifactIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.file_name(), self.component)
    }
}
