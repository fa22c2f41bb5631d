//! Finders: strategies for locating local copies of an artifact.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use artres_pattern::ResourcePattern;
use artres_store::FileStore;

use super::candidates::{
    CompositeCandidates, FileCandidates, LocallyAvailableResourceCandidates, NoCandidates,
};
use super::maven_local::CannotLocateLocalRepository;
use crate::component::ModuleComponentArtifactIdentifier;

/// Locates local files that might hold an artifact.
pub trait LocallyAvailableResourceFinder: Send + Sync {
    fn find_candidates(
        &self,
        criterion: &ModuleComponentArtifactIdentifier,
    ) -> Box<dyn LocallyAvailableResourceCandidates>;

    /// Human-readable description, used in logs and listings.
    fn display_name(&self) -> String;
}

/// Searches a content-addressed store by artifact identity.
pub trait FileStoreSearcher: Send + Sync {
    fn search(&self, id: &ModuleComponentArtifactIdentifier) -> Vec<PathBuf>;
}

impl FileStoreSearcher for FileStore {
    fn search(&self, id: &ModuleComponentArtifactIdentifier) -> Vec<PathBuf> {
        match FileStore::search(self, &id.store_key()) {
            Ok(files) => files.into_iter().map(|f| f.path).collect(),
            Err(e) => {
                tracing::debug!(artifact = %id, error = %e, "file store search failed");
                Vec::new()
            }
        }
    }
}

/// Priority-ordered chain of finders.
#[derive(Clone)]
pub struct CompositeFinder {
    delegates: Arc<[Arc<dyn LocallyAvailableResourceFinder>]>,
}

impl CompositeFinder {
    pub fn new(delegates: Vec<Arc<dyn LocallyAvailableResourceFinder>>) -> Self {
        Self {
            delegates: delegates.into(),
        }
    }

    /// Delegates in search order.
    pub fn delegates(&self) -> &[Arc<dyn LocallyAvailableResourceFinder>] {
        &self.delegates
    }
}

impl LocallyAvailableResourceFinder for CompositeFinder {
    fn find_candidates(
        &self,
        criterion: &ModuleComponentArtifactIdentifier,
    ) -> Box<dyn LocallyAvailableResourceCandidates> {
        Box::new(CompositeCandidates::new(
            self.delegates.clone(),
            criterion.clone(),
        ))
    }

    fn display_name(&self) -> String {
        format!("composite of {} finders", self.delegates.len())
    }
}

/// Looks artifacts up in the current file store.
pub struct FileStoreFinder {
    searcher: Arc<dyn FileStoreSearcher>,
    description: String,
}

impl FileStoreFinder {
    pub fn new(searcher: Arc<dyn FileStoreSearcher>, description: impl Into<String>) -> Self {
        Self {
            searcher,
            description: description.into(),
        }
    }
}

impl LocallyAvailableResourceFinder for FileStoreFinder {
    fn find_candidates(
        &self,
        criterion: &ModuleComponentArtifactIdentifier,
    ) -> Box<dyn LocallyAvailableResourceCandidates> {
        let searcher = self.searcher.clone();
        let criterion = criterion.clone();
        Box::new(FileCandidates::new(move || searcher.search(&criterion)))
    }

    fn display_name(&self) -> String {
        format!("file store {}", self.description)
    }
}

/// Looks artifacts up in a directory laid out according to a pattern.
pub struct PatternBasedFinder {
    base_dir: PathBuf,
    pattern: Arc<ResourcePattern>,
}

impl PatternBasedFinder {
    pub fn new(base_dir: impl Into<PathBuf>, pattern: ResourcePattern) -> Self {
        Self {
            base_dir: base_dir.into(),
            pattern: Arc::new(pattern),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn pattern(&self) -> &ResourcePattern {
        &self.pattern
    }
}

impl LocallyAvailableResourceFinder for PatternBasedFinder {
    fn find_candidates(
        &self,
        criterion: &ModuleComponentArtifactIdentifier,
    ) -> Box<dyn LocallyAvailableResourceCandidates> {
        let base_dir = self.base_dir.clone();
        let pattern = self.pattern.clone();
        let coordinates = criterion.coordinates();
        Box::new(FileCandidates::new(move || {
            pattern.find_files(&base_dir, &coordinates)
        }))
    }

    fn display_name(&self) -> String {
        format!(
            "{} with pattern {}",
            self.base_dir.display(),
            self.pattern.pattern()
        )
    }
}

/// Stands in for a local Maven repository that could not be located.
///
/// The first query logs a warning; every query yields no candidates.
pub struct NoLocalRepositoryFinder {
    error: CannotLocateLocalRepository,
    warned: AtomicBool,
}

impl NoLocalRepositoryFinder {
    pub fn new(error: CannotLocateLocalRepository) -> Self {
        Self {
            error,
            warned: AtomicBool::new(false),
        }
    }

    pub fn error(&self) -> &CannotLocateLocalRepository {
        &self.error
    }

    /// Whether the warning has been emitted.
    pub fn has_warned(&self) -> bool {
        self.warned.load(Ordering::Acquire)
    }
}

impl LocallyAvailableResourceFinder for NoLocalRepositoryFinder {
    fn find_candidates(
        &self,
        _criterion: &ModuleComponentArtifactIdentifier,
    ) -> Box<dyn LocallyAvailableResourceCandidates> {
        if self
            .warned
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
        {
            tracing::warn!("Unable to locate local Maven repository.");
            tracing::debug!(error = %self.error, "Problems while locating local Maven repository.");
        }
        Box::new(NoCandidates)
    }

    fn display_name(&self) -> String {
        format!("unavailable local Maven repository ({})", self.error)
    }
}
