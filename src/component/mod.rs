//! Component and artifact identities.

mod filter;
mod identifier;

pub use filter::{AcceptAll, ComponentFilter, ExcludeModules};
pub use identifier::{
    ArtifactIdentifier, ComponentIdentifier, IdentifierError, ModuleComponentArtifactIdentifier,
    ModuleComponentIdentifier,
};
