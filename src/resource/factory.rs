//! Assembly of the local resource finder chain.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use artres_pattern::{prepare_pattern, PatternError, ResourcePattern};
use thiserror::Error;

use super::finder::{
    CompositeFinder, FileStoreFinder, FileStoreSearcher, LocallyAvailableResourceFinder,
    NoLocalRepositoryFinder, PatternBasedFinder,
};
use super::maven_local::LocalRepositoryLocator;

/// Cache layouts written by earlier releases, relative to the root caches
/// directory, in search order. Each entry pairs the releases that wrote the
/// layout with its pattern.
pub const HISTORICAL_LAYOUTS: &[(&str, &str)] = &[
    (
        "1.8",
        "artifacts-26/filestore/[organisation]/[module](/[branch])/[revision]/[type]/*/[artifact]-[revision](-[classifier])(.[ext])",
    ),
    (
        "1.5",
        "artifacts-24/filestore/[organisation]/[module](/[branch])/[revision]/[type]/*/[artifact]-[revision](-[classifier])(.[ext])",
    ),
    (
        "1.4",
        "artifacts-23/filestore/[organisation]/[module](/[branch])/[revision]/[type]/*/[artifact]-[revision](-[classifier])(.[ext])",
    ),
    (
        "1.3",
        "artifacts-15/filestore/[organisation]/[module](/[branch])/[revision]/[type]/*/[artifact]-[revision](-[classifier])(.[ext])",
    ),
    (
        "1.1, 1.2",
        "artifacts-14/filestore/[organisation]/[module](/[branch])/[revision]/[type]/*/[artifact]-[revision](-[classifier])(.[ext])",
    ),
    (
        "rc-1, 1.0",
        "artifacts-13/filestore/[organisation]/[module](/[branch])/[revision]/[type]/*/[artifact]-[revision](-[classifier])(.[ext])",
    ),
    (
        "Milestone 8 and 9",
        "artifacts-8/filestore/[organisation]/[module](/[branch])/[revision]/[type]/*/[artifact]-[revision](-[classifier])(.[ext])",
    ),
    (
        "Milestone 7",
        "artifacts-7/artifacts/*/[organisation]/[module](/[branch])/[revision]/[type]/[artifact]-[revision](-[classifier])(.[ext])",
    ),
    (
        "Milestone 6",
        "artifacts-4/[organisation]/[module](/[branch])/*/[type]s/[artifact]-[revision](-[classifier])(.[ext])",
    ),
    (
        "Milestone 6",
        "artifacts-4/[organisation]/[module](/[branch])/*/pom.originals/[artifact]-[revision](-[classifier])(.[ext])",
    ),
    (
        "Milestone 3",
        "../cache/[organisation]/[module](/[branch])/[type]s/[artifact]-[revision](-[classifier])(.[ext])",
    ),
];

/// Layout of a local Maven repository, in M2 convention.
pub const MAVEN_LOCAL_PATTERN: &str =
    "[organisation]/[module]/[revision]/[artifact]-[revision](-[classifier])(.[ext])";

/// Errors assembling the finder chain.
#[derive(Debug, Error)]
pub enum FinderChainError {
    #[error("invalid cache layout for {release}: {source}")]
    InvalidLayout {
        release: String,
        #[source]
        source: PatternError,
    },

    #[error("invalid local repository layout: {0}")]
    InvalidRepositoryLayout(#[source] PatternError),
}

/// Builds the priority-ordered finder chain.
///
/// Layout directories are probed once, at build time; a layout whose base
/// directory appears later is not searched.
pub struct FinderChainBuilder {
    root_caches_dir: PathBuf,
    file_store: Arc<dyn FileStoreSearcher>,
    file_store_description: String,
    local_repository: Option<Arc<dyn LocalRepositoryLocator>>,
}

impl FinderChainBuilder {
    pub fn new(root_caches_dir: impl Into<PathBuf>, file_store: Arc<dyn FileStoreSearcher>) -> Self {
        let root_caches_dir = root_caches_dir.into();
        let file_store_description = root_caches_dir.display().to_string();
        Self {
            root_caches_dir,
            file_store,
            file_store_description,
            local_repository: None,
        }
    }

    /// Description of the file store shown in listings.
    pub fn with_file_store_description(mut self, description: impl Into<String>) -> Self {
        self.file_store_description = description.into();
        self
    }

    /// Also search the local Maven repository found by `locator`.
    pub fn with_local_repository(mut self, locator: Arc<dyn LocalRepositoryLocator>) -> Self {
        self.local_repository = Some(locator);
        self
    }

    pub fn build(self) -> Result<CompositeFinder, FinderChainError> {
        let mut finders: Vec<Arc<dyn LocallyAvailableResourceFinder>> = vec![Arc::new(
            FileStoreFinder::new(self.file_store.clone(), self.file_store_description.clone()),
        )];

        for (release, raw) in HISTORICAL_LAYOUTS {
            let (base, pattern) =
                prepare_pattern(raw).map_err(|source| FinderChainError::InvalidLayout {
                    release: release.to_string(),
                    source,
                })?;
            let base_dir = join_relative(&self.root_caches_dir, &base);
            if base_dir.exists() {
                tracing::debug!(release, dir = %base_dir.display(), "adding historical cache layout");
                finders.push(Arc::new(PatternBasedFinder::new(base_dir, pattern)));
            }
        }

        if let Some(locator) = &self.local_repository {
            match locator.local_repository() {
                Ok(repository) if repository.exists() => {
                    let pattern = ResourcePattern::m2(MAVEN_LOCAL_PATTERN)
                        .map_err(FinderChainError::InvalidRepositoryLayout)?;
                    tracing::debug!(dir = %repository.display(), "adding local Maven repository");
                    finders.push(Arc::new(PatternBasedFinder::new(repository, pattern)));
                }
                Ok(repository) => {
                    tracing::debug!(dir = %repository.display(), "local Maven repository does not exist");
                }
                Err(error) => {
                    finders.push(Arc::new(NoLocalRepositoryFinder::new(error)));
                }
            }
        }

        Ok(CompositeFinder::new(finders))
    }
}

/// Join a layout base onto the caches directory, resolving leading `..`
/// lexically so listings show a clean path.
fn join_relative(root: &Path, base: &str) -> PathBuf {
    let mut dir = root.to_path_buf();
    for segment in base.split('/').filter(|s| !s.is_empty() && *s != ".") {
        if segment == ".." {
            if !dir.pop() {
                dir.push("..");
            }
        } else {
            dir.push(segment);
        }
    }
    dir
}
