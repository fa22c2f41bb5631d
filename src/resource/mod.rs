//! Finding local copies of artifacts before downloading them.
//!
//! A [`CompositeFinder`] searches, in priority order, the current file
//! store, cache layouts left behind by earlier releases, and the local Maven
//! repository. Candidates are only trusted when their content hash matches
//! the expected one.

mod candidates;
mod factory;
mod finder;
mod hash;
mod local;
mod maven_local;

pub use candidates::{
    CompositeCandidates, FileCandidates, LocallyAvailableResourceCandidates, NoCandidates,
};
pub use factory::{FinderChainBuilder, FinderChainError, HISTORICAL_LAYOUTS, MAVEN_LOCAL_PATTERN};
pub use finder::{
    CompositeFinder, FileStoreFinder, FileStoreSearcher, LocallyAvailableResourceFinder,
    NoLocalRepositoryFinder, PatternBasedFinder,
};
pub use hash::{HashError, HashValue};
pub use local::LocallyAvailableResource;
pub use maven_local::{
    CannotLocateLocalRepository, LocalRepositoryLocator, MavenLocalRepositoryLocator,
    REPO_LOCAL_PROPERTY,
};
