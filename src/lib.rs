//! artres - artifact resolution core
//!
//! This crate selects variants of resolved components and materializes the
//! selected artifacts, reusing copies already present on the local machine:
//! the current file store, cache layouts left by earlier releases, and the
//! local Maven repository.

pub mod artifact;
pub mod component;
pub mod config;
pub mod graph;
pub mod logging;
pub mod resource;

pub use artifact::{
    ArtifactSet, AttributeMatchingSelector, BuildOperationQueue, Completion, ResolvedArtifactSet,
    VariantSelector, NO_ARTIFACTS,
};
pub use component::{ComponentFilter, ComponentIdentifier, ModuleComponentArtifactIdentifier};
pub use config::{EffectiveConfig, Settings};
pub use resource::{
    CompositeFinder, FinderChainBuilder, LocallyAvailableResourceCandidates,
    LocallyAvailableResourceFinder,
};
