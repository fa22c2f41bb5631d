//! Component Graph Files
//!
//! Parses the JSON description of a resolved dependency graph used by
//! `artres resolve`. Each component lists its variants and each variant its
//! artifacts: either module artifacts, known by coordinates and SHA-256 and
//! looked up in local caches, or files produced by the build.
//!
//! ```json
//! {
//!   "components": [
//!     {
//!       "id": {"kind": "module", "group": "org.example", "module": "lib", "version": "1.0"},
//!       "variants": [
//!         {
//!           "name": "runtime",
//!           "attributes": {"usage": "java-runtime"},
//!           "artifacts": [{"name": "lib", "type": "jar", "extension": "jar", "sha256": "..."}]
//!         }
//!       ]
//!     },
//!     {
//!       "id": {"kind": "project", "path": ":app"},
//!       "variants": [
//!         {"name": "runtime", "artifacts": [{"file": "build/app.jar", "built_by": [":app:jar"]}]}
//!       ]
//!     }
//!   ]
//! }
//! ```

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::artifact::{
    ArtifactSet, AttributeContainer, BuildDependency, CachedModuleArtifact, ComponentArtifactSet,
    CompositeArtifactSet, DeferredArtifactSet, LocalFileArtifact, ResolvableArtifact, Variant,
};
use crate::component::{ArtifactIdentifier, ComponentIdentifier, ModuleComponentArtifactIdentifier};
use crate::resource::{HashValue, LocallyAvailableResourceFinder};

/// A resolved dependency graph
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentGraph {
    #[serde(default)]
    pub components: Vec<ComponentNode>,
}

/// One component of the graph
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentNode {
    pub id: ComponentIdentifier,

    /// Load variants only when first needed (default: false)
    #[serde(default)]
    pub deferred: bool,

    #[serde(default)]
    pub variants: Vec<VariantNode>,
}

/// One variant of a component
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariantNode {
    pub name: String,

    #[serde(default)]
    pub attributes: AttributeContainer,

    #[serde(default)]
    pub artifacts: Vec<ArtifactNode>,
}

/// An artifact of a variant
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ArtifactNode {
    /// A published module artifact
    Module {
        name: String,
        #[serde(rename = "type")]
        artifact_type: String,
        #[serde(default)]
        extension: Option<String>,
        #[serde(default)]
        classifier: Option<String>,
        sha256: String,
    },

    /// A file produced by the build, relative to the graph file
    File {
        file: PathBuf,
        #[serde(default)]
        built_by: Vec<BuildDependency>,
    },
}

/// Errors that can occur when loading or validating a component graph
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("Failed to read graph file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse graph JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Duplicate component: '{0}'")]
    DuplicateComponent(String),

    #[error("Component '{component}': module artifact '{artifact}' on a non-module component")]
    NotAModule { component: String, artifact: String },

    #[error("Component '{component}': invalid sha256 for '{artifact}': {reason}")]
    InvalidHash {
        component: String,
        artifact: String,
        reason: String,
    },
}

impl ComponentGraph {
    /// Load a graph from a file
    pub fn load(path: &Path) -> Result<Self, GraphError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse a graph from a JSON string
    pub fn parse(content: &str) -> Result<Self, GraphError> {
        let graph: ComponentGraph = serde_json::from_str(content)?;
        graph.validate()?;
        Ok(graph)
    }

    fn validate(&self) -> Result<(), GraphError> {
        let mut seen = HashSet::new();
        for component in &self.components {
            if !seen.insert(&component.id) {
                return Err(GraphError::DuplicateComponent(component.id.to_string()));
            }
            for variant in &component.variants {
                for artifact in &variant.artifacts {
                    artifact.validate(&component.id)?;
                }
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Build the artifact set of the whole graph.
    ///
    /// Relative artifact files are resolved against `base_dir`; module
    /// artifacts are looked up through `finder`.
    pub fn to_artifact_set(
        &self,
        base_dir: &Path,
        finder: Arc<dyn LocallyAvailableResourceFinder>,
    ) -> Result<CompositeArtifactSet, GraphError> {
        let mut set = CompositeArtifactSet::default();
        for component in &self.components {
            let prepared = PreparedComponent::prepare(component, base_dir, &finder)?;
            let id = component.id.clone();
            let component_set: Arc<dyn ArtifactSet> = if component.deferred {
                Arc::new(DeferredArtifactSet::new(id, move || prepared.variants()))
            } else {
                Arc::new(ComponentArtifactSet::new(id, prepared.variants()))
            };
            set.push(component_set);
        }
        Ok(set)
    }
}

impl ArtifactNode {
    fn label(&self) -> String {
        match self {
            ArtifactNode::Module { name, .. } => name.clone(),
            ArtifactNode::File { file, .. } => file.display().to_string(),
        }
    }

    fn validate(&self, component: &ComponentIdentifier) -> Result<(), GraphError> {
        if let ArtifactNode::Module { sha256, .. } = self {
            if component.as_module().is_none() {
                return Err(GraphError::NotAModule {
                    component: component.to_string(),
                    artifact: self.label(),
                });
            }
            HashValue::parse(sha256).map_err(|e| GraphError::InvalidHash {
                component: component.to_string(),
                artifact: self.label(),
                reason: e.to_string(),
            })?;
        }
        Ok(())
    }
}

/// A component whose artifacts have been checked and bound to their
/// lookup strategy; building its variants cannot fail.
struct PreparedComponent {
    variants: Vec<(String, AttributeContainer, Vec<Arc<dyn ResolvableArtifact>>)>,
}

impl PreparedComponent {
    fn prepare(
        component: &ComponentNode,
        base_dir: &Path,
        finder: &Arc<dyn LocallyAvailableResourceFinder>,
    ) -> Result<Self, GraphError> {
        let mut variants = Vec::with_capacity(component.variants.len());
        for variant in &component.variants {
            let mut artifacts: Vec<Arc<dyn ResolvableArtifact>> = Vec::new();
            for artifact in &variant.artifacts {
                artifacts.push(Self::artifact(&component.id, artifact, base_dir, finder)?);
            }
            variants.push((variant.name.clone(), variant.attributes.clone(), artifacts));
        }
        Ok(Self { variants })
    }

    fn artifact(
        component: &ComponentIdentifier,
        artifact: &ArtifactNode,
        base_dir: &Path,
        finder: &Arc<dyn LocallyAvailableResourceFinder>,
    ) -> Result<Arc<dyn ResolvableArtifact>, GraphError> {
        artifact.validate(component)?;
        match artifact {
            ArtifactNode::Module {
                name,
                artifact_type,
                extension,
                classifier,
                sha256,
            } => {
                let module = component.as_module().ok_or_else(|| GraphError::NotAModule {
                    component: component.to_string(),
                    artifact: name.clone(),
                })?;
                let mut criterion =
                    ModuleComponentArtifactIdentifier::new(module.clone(), name, artifact_type);
                if let Some(extension) = extension {
                    criterion = criterion.with_extension(extension);
                }
                if let Some(classifier) = classifier {
                    criterion = criterion.with_classifier(classifier);
                }
                let sha256 = HashValue::parse(sha256).map_err(|e| GraphError::InvalidHash {
                    component: component.to_string(),
                    artifact: name.clone(),
                    reason: e.to_string(),
                })?;
                Ok(Arc::new(CachedModuleArtifact::new(
                    criterion,
                    sha256,
                    Arc::clone(finder),
                )))
            }
            ArtifactNode::File { file, built_by } => {
                let path = if file.is_absolute() {
                    file.clone()
                } else {
                    base_dir.join(file)
                };
                let file_name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_else(|| file.display().to_string());
                let mut local =
                    LocalFileArtifact::new(ArtifactIdentifier::new(component.clone(), &file_name), path);
                for dependency in built_by {
                    local = local.built_by(dependency.clone());
                }
                Ok(Arc::new(local))
            }
        }
    }

    fn variants(&self) -> Vec<Variant> {
        self.variants
            .iter()
            .map(|(name, attributes, artifacts)| {
                artifacts
                    .iter()
                    .fold(Variant::new(name, attributes.clone()), |variant, artifact| {
                        variant.with_artifact(Arc::clone(artifact))
                    })
            })
            .collect()
    }
}
