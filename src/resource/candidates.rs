//! Lazy views over local files that might match an artifact.

use std::path::PathBuf;
use std::sync::{Arc, OnceLock};

use super::finder::LocallyAvailableResourceFinder;
use super::hash::HashValue;
use super::local::LocallyAvailableResource;
use crate::component::ModuleComponentArtifactIdentifier;

/// Candidates for one artifact, queried without enumerating more than
/// needed.
pub trait LocallyAvailableResourceCandidates: Send + Sync {
    /// True when there are definitely no candidates.
    fn is_none(&self) -> bool;

    /// The candidate whose content hashes to `hash`, if any.
    ///
    /// A file at the expected location with different content is not a
    /// match.
    fn find_by_hash_value(&self, hash: &HashValue) -> Option<LocallyAvailableResource>;
}

/// The empty candidate set.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCandidates;

impl LocallyAvailableResourceCandidates for NoCandidates {
    fn is_none(&self) -> bool {
        true
    }

    fn find_by_hash_value(&self, _hash: &HashValue) -> Option<LocallyAvailableResource> {
        None
    }
}

type Search = Box<dyn Fn() -> Vec<PathBuf> + Send + Sync>;

/// Candidates backed by a file listing that runs on first query.
///
/// The listing runs at most once; hashes are computed one candidate at a
/// time while searching.
pub struct FileCandidates {
    search: Search,
    files: OnceLock<Vec<LocallyAvailableResource>>,
}

impl FileCandidates {
    pub fn new(search: impl Fn() -> Vec<PathBuf> + Send + Sync + 'static) -> Self {
        Self {
            search: Box::new(search),
            files: OnceLock::new(),
        }
    }

    /// Candidates from an already known list of files.
    pub fn of(paths: Vec<PathBuf>) -> Self {
        let files: Vec<LocallyAvailableResource> =
            paths.into_iter().map(LocallyAvailableResource::new).collect();
        Self {
            search: Box::new(Vec::<PathBuf>::new),
            files: OnceLock::from(files),
        }
    }

    fn files(&self) -> &[LocallyAvailableResource] {
        self.files.get_or_init(|| {
            (self.search)()
                .into_iter()
                .map(LocallyAvailableResource::new)
                .collect()
        })
    }
}

impl LocallyAvailableResourceCandidates for FileCandidates {
    fn is_none(&self) -> bool {
        self.files().is_empty()
    }

    fn find_by_hash_value(&self, hash: &HashValue) -> Option<LocallyAvailableResource> {
        self.files()
            .iter()
            .find(|resource| resource.sha256() == Some(hash))
            .cloned()
    }
}

/// Candidates spanning an ordered list of finders.
///
/// Each finder is asked for its candidates only when every earlier finder
/// failed to answer the query, and at most once per view.
pub struct CompositeCandidates {
    finders: Arc<[Arc<dyn LocallyAvailableResourceFinder>]>,
    criterion: ModuleComponentArtifactIdentifier,
    delegates: Vec<OnceLock<Box<dyn LocallyAvailableResourceCandidates>>>,
}

impl CompositeCandidates {
    pub fn new(
        finders: Arc<[Arc<dyn LocallyAvailableResourceFinder>]>,
        criterion: ModuleComponentArtifactIdentifier,
    ) -> Self {
        let delegates = finders.iter().map(|_| OnceLock::new()).collect();
        Self {
            finders,
            criterion,
            delegates,
        }
    }

    fn delegate(&self, index: usize) -> &dyn LocallyAvailableResourceCandidates {
        self.delegates[index]
            .get_or_init(|| self.finders[index].find_candidates(&self.criterion))
            .as_ref()
    }
}

impl LocallyAvailableResourceCandidates for CompositeCandidates {
    fn is_none(&self) -> bool {
        (0..self.finders.len()).all(|i| self.delegate(i).is_none())
    }

    fn find_by_hash_value(&self, hash: &HashValue) -> Option<LocallyAvailableResource> {
        (0..self.finders.len()).find_map(|i| {
            let found = self.delegate(i).find_by_hash_value(hash);
            if found.is_some() {
                tracing::debug!(
                    artifact = %self.criterion,
                    finder = %self.finders[i].display_name(),
                    "found local candidate"
                );
            }
            found
        })
    }
}
