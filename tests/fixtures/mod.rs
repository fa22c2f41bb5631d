//! Test fixtures for cache layout and artifact set tests
//!
//! This module provides:
//! - On-disk cache trees built in temporary directories
//! - File store searchers with fixed answers
//! - Artifact identifiers for a sample module

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use artres::component::{ModuleComponentArtifactIdentifier, ModuleComponentIdentifier};
use artres::resource::{
    CannotLocateLocalRepository, FileStoreSearcher, LocalRepositoryLocator,
};

/// The main jar of `org.example:lib:1.0`
pub fn lib_jar() -> ModuleComponentArtifactIdentifier {
    ModuleComponentArtifactIdentifier::main_jar(ModuleComponentIdentifier::new(
        "org.example",
        "lib",
        "1.0",
    ))
}

/// Write `content` to `root/relative`, creating parent directories
pub fn write_file(root: &Path, relative: &str, content: &[u8]) -> PathBuf {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    path
}

/// A file store that knows nothing
pub struct EmptyStore;

impl FileStoreSearcher for EmptyStore {
    fn search(&self, _id: &ModuleComponentArtifactIdentifier) -> Vec<PathBuf> {
        Vec::new()
    }
}

/// A file store answering every search with the same files
pub struct FixedStore(pub Vec<PathBuf>);

impl FileStoreSearcher for FixedStore {
    fn search(&self, _id: &ModuleComponentArtifactIdentifier) -> Vec<PathBuf> {
        self.0.clone()
    }
}

/// A locator with a fixed answer
pub struct FixedLocator(pub Result<PathBuf, CannotLocateLocalRepository>);

impl LocalRepositoryLocator for FixedLocator {
    fn local_repository(&self) -> Result<PathBuf, CannotLocateLocalRepository> {
        self.0.clone()
    }
}
