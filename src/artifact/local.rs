//! Artifacts backed by local files.

use std::path::PathBuf;
use std::sync::Arc;

use super::{ArtifactError, BuildDependency, ResolvableArtifact};
use crate::component::{ArtifactIdentifier, ModuleComponentArtifactIdentifier};
use crate::resource::{HashValue, LocallyAvailableResourceFinder};

/// An artifact at a known path, typically produced by another project of
/// the build.
#[derive(Debug, Clone)]
pub struct LocalFileArtifact {
    id: ArtifactIdentifier,
    file: PathBuf,
    build_dependencies: Vec<BuildDependency>,
}

impl LocalFileArtifact {
    pub fn new(id: ArtifactIdentifier, file: impl Into<PathBuf>) -> Self {
        Self {
            id,
            file: file.into(),
            build_dependencies: Vec::new(),
        }
    }

    /// Declare a task that produces the file.
    pub fn built_by(mut self, dependency: BuildDependency) -> Self {
        self.build_dependencies.push(dependency);
        self
    }
}

impl ResolvableArtifact for LocalFileArtifact {
    fn id(&self) -> &ArtifactIdentifier {
        &self.id
    }

    fn build_dependencies(&self) -> &[BuildDependency] {
        &self.build_dependencies
    }

    fn resolve_file(&self) -> Result<PathBuf, ArtifactError> {
        if self.file.is_file() {
            Ok(self.file.clone())
        } else {
            Err(ArtifactError::MissingFile(self.file.clone()))
        }
    }
}

/// A module artifact whose content is known by hash and looked up among
/// local copies.
pub struct CachedModuleArtifact {
    id: ArtifactIdentifier,
    criterion: ModuleComponentArtifactIdentifier,
    sha256: HashValue,
    finder: Arc<dyn LocallyAvailableResourceFinder>,
}

impl CachedModuleArtifact {
    pub fn new(
        criterion: ModuleComponentArtifactIdentifier,
        sha256: HashValue,
        finder: Arc<dyn LocallyAvailableResourceFinder>,
    ) -> Self {
        Self {
            id: criterion.to_artifact_id(),
            criterion,
            sha256,
            finder,
        }
    }

    pub fn criterion(&self) -> &ModuleComponentArtifactIdentifier {
        &self.criterion
    }

    pub fn sha256(&self) -> &HashValue {
        &self.sha256
    }
}

impl ResolvableArtifact for CachedModuleArtifact {
    fn id(&self) -> &ArtifactIdentifier {
        &self.id
    }

    fn build_dependencies(&self) -> &[BuildDependency] {
        &[]
    }

    fn resolve_file(&self) -> Result<PathBuf, ArtifactError> {
        self.finder
            .find_candidates(&self.criterion)
            .find_by_hash_value(&self.sha256)
            .map(|resource| resource.path().to_path_buf())
            .ok_or_else(|| ArtifactError::NotAvailableLocally {
                sha256: self.sha256.clone(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::{ComponentIdentifier, ModuleComponentIdentifier};
    use crate::resource::{CompositeFinder, FileStoreFinder, FileStoreSearcher};
    use std::fs;
    use tempfile::TempDir;

    struct FixedStore(Vec<PathBuf>);

    impl FileStoreSearcher for FixedStore {
        fn search(&self, _id: &ModuleComponentArtifactIdentifier) -> Vec<PathBuf> {
            self.0.clone()
        }
    }

    fn finder(files: Vec<PathBuf>) -> Arc<dyn LocallyAvailableResourceFinder> {
        let store: Arc<dyn LocallyAvailableResourceFinder> =
            Arc::new(FileStoreFinder::new(Arc::new(FixedStore(files)), "test"));
        Arc::new(CompositeFinder::new(vec![store]))
    }

    #[test]
    fn test_local_file_artifact() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("app.jar");
        fs::write(&file, b"app").unwrap();

        let artifact = LocalFileArtifact::new(
            ArtifactIdentifier::new(ComponentIdentifier::project(":app"), "app.jar"),
            &file,
        )
        .built_by(BuildDependency::new(":app:jar"));

        assert_eq!(artifact.resolve_file().unwrap(), file);
        assert_eq!(artifact.build_dependencies(), &[BuildDependency::new(":app:jar")]);
    }

    #[test]
    fn test_local_file_artifact_missing() {
        let artifact = LocalFileArtifact::new(
            ArtifactIdentifier::new(ComponentIdentifier::project(":app"), "app.jar"),
            "/definitely/not/here/app.jar",
        );
        assert!(matches!(
            artifact.resolve_file(),
            Err(ArtifactError::MissingFile(_))
        ));
    }

    #[test]
    fn test_cached_artifact_requires_matching_hash() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("lib-1.0.jar");
        fs::write(&file, b"library").unwrap();
        let criterion =
            ModuleComponentArtifactIdentifier::main_jar(ModuleComponentIdentifier::new(
                "org.example",
                "lib",
                "1.0",
            ));

        let found = CachedModuleArtifact::new(
            criterion.clone(),
            HashValue::of_bytes(b"library"),
            finder(vec![file.clone()]),
        );
        assert_eq!(found.resolve_file().unwrap(), file);
        assert_eq!(found.id().file_name, "lib-1.0.jar");

        let stale = CachedModuleArtifact::new(
            criterion,
            HashValue::of_bytes(b"other"),
            finder(vec![file]),
        );
        assert!(matches!(
            stale.resolve_file(),
            Err(ArtifactError::NotAvailableLocally { .. })
        ));
    }
}
