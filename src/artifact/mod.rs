//! Artifact sets.
//!
//! An [`ArtifactSet`] holds the variants of resolved components. Selecting
//! it with a [`ComponentFilter`](crate::component::ComponentFilter) and a
//! [`VariantSelector`] produces a [`ResolvedArtifactSet`], which can either
//! be visited (materializing each artifact's file on a
//! [`BuildOperationQueue`]) or asked for the build dependencies needed to
//! produce those files.

mod completion;
mod local;
mod queue;
mod resolved;
mod selector;
mod set;
mod variant;

use std::fmt;
use std::io;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::component::ArtifactIdentifier;
use crate::resource::HashValue;

pub use completion::{ArtifactFailure, Completion, VisitFailure};
pub use local::{CachedModuleArtifact, LocalFileArtifact};
pub use queue::{BuildOperation, BuildOperationQueue, InlineQueue, WorkerPoolQueue};
pub use resolved::{
    empty as empty_resolved, is_empty as is_empty_resolved, ArtifactListener, BrokenArtifacts, BuildDependenciesVisitor, BuildDependencyCollector,
    CollectingListener, CompositeResolvedArtifacts, LazyResolvedArtifacts,
    ResolvedArtifactResult, ResolvedArtifactSet, SelectedVariantArtifacts,
};
pub use selector::{AttributeMatchingSelector, SelectionError, VariantSelector};
pub use set::{
    ArtifactSet, ComponentArtifactSet, CompositeArtifactSet, DeferredArtifactSet, NoArtifacts,
    NO_ARTIFACTS,
};
pub use variant::{AttributeContainer, Variant};

/// A unit of build work that must run before an artifact's file exists,
/// named by task path (for example `:lib:jar`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BuildDependency(String);

impl BuildDependency {
    pub fn new(task: impl Into<String>) -> Self {
        Self(task.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BuildDependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Why an artifact's file could not be produced.
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("file {} does not exist", .0.display())]
    MissingFile(PathBuf),

    #[error("no local copy with sha256 {sha256}")]
    NotAvailableLocally { sha256: HashValue },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("visit ended before the artifact was resolved")]
    Interrupted,
}

/// An artifact whose file can be produced on demand.
pub trait ResolvableArtifact: Send + Sync {
    fn id(&self) -> &ArtifactIdentifier;

    /// Work that must be scheduled before [`resolve_file`](Self::resolve_file)
    /// can succeed.
    fn build_dependencies(&self) -> &[BuildDependency];

    /// Produce the artifact's file. May block on I/O.
    fn resolve_file(&self) -> Result<PathBuf, ArtifactError>;
}
