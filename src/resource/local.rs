//! Files on disk that may hold a wanted artifact.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};
use std::time::SystemTime;

use super::hash::HashValue;

/// A local file believed to correspond to an artifact.
///
/// The content hash is computed on first request and memoized. Clones share
/// the memoized hash.
#[derive(Clone)]
pub struct LocallyAvailableResource {
    inner: Arc<ResourceInner>,
}

struct ResourceInner {
    path: PathBuf,
    sha256: OnceLock<Option<HashValue>>,
}

impl LocallyAvailableResource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            inner: Arc::new(ResourceInner {
                path: path.into(),
                sha256: OnceLock::new(),
            }),
        }
    }

    pub fn path(&self) -> &Path {
        &self.inner.path
    }

    /// SHA-256 of the file content, or `None` if the file cannot be read.
    pub fn sha256(&self) -> Option<&HashValue> {
        self.inner
            .sha256
            .get_or_init(|| match HashValue::of_file(&self.inner.path) {
                Ok(hash) => Some(hash),
                Err(e) => {
                    tracing::debug!(path = %self.inner.path.display(), error = %e, "cannot hash candidate");
                    None
                }
            })
            .as_ref()
    }

    pub fn content_length(&self) -> io::Result<u64> {
        Ok(fs::metadata(&self.inner.path)?.len())
    }

    pub fn last_modified(&self) -> io::Result<SystemTime> {
        fs::metadata(&self.inner.path)?.modified()
    }
}

impl fmt::Debug for LocallyAvailableResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocallyAvailableResource")
            .field("path", &self.inner.path)
            .finish()
    }
}

impl PartialEq for LocallyAvailableResource {
    fn eq(&self, other: &Self) -> bool {
        self.inner.path == other.inner.path
    }
}

impl Eq for LocallyAvailableResource {}
