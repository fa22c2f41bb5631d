//! File store implementation.
//!
//! Features:
//! - Atomic writes via write-to-temp-then-rename
//! - Concurrent adds of identical content are safe (second writer discards)
//! - Optional content verification against an expected SHA-256

use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use sha2::{Digest, Sha256};
use thiserror::Error;
use walkdir::WalkDir;

use crate::key::StoreKey;

/// Name of the directory holding in-flight writes.
const TEMP_DIR: &str = ".tmp";

/// Errors from file store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("content SHA-256 mismatch for {key}: expected {expected}, got {actual}")]
    HashMismatch {
        key: String,
        expected: String,
        actual: String,
    },
}

/// A file held by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub path: PathBuf,
    /// Digest recorded by the directory the file lives in.
    pub sha256: String,
    pub size: u64,
}

/// Aggregate size information about the store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreStats {
    pub files: usize,
    pub total_bytes: u64,
}

/// Content-addressed artifact store rooted at a directory.
///
/// The store is read-only unless [`FileStore::add`] is called; searching a
/// store whose root does not exist yields nothing.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn key_dir(&self, key: &StoreKey) -> PathBuf {
        self.root.join(key.relative_dir())
    }

    fn file_path(&self, key: &StoreKey, sha256: &str) -> PathBuf {
        self.key_dir(key).join(sha256).join(key.sanitized_file_name())
    }

    fn temp_dir(&self) -> PathBuf {
        self.root.join(TEMP_DIR)
    }

    /// Find every stored copy of `key`.
    ///
    /// Copies are returned in digest order.
    pub fn search(&self, key: &StoreKey) -> Result<Vec<StoredFile>, StoreError> {
        let dir = self.key_dir(key);
        if !dir.is_dir() {
            return Ok(Vec::new());
        }

        let file_name = key.sanitized_file_name();
        let mut found = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let path = entry.path().join(&file_name);
            let Ok(metadata) = fs::metadata(&path) else {
                continue;
            };
            if !metadata.is_file() {
                continue;
            }
            found.push(StoredFile {
                path,
                sha256: entry.file_name().to_string_lossy().to_string(),
                size: metadata.len(),
            });
        }

        found.sort_by(|a, b| a.sha256.cmp(&b.sha256));
        Ok(found)
    }

    /// Get the stored copy of `key` with the given digest, if present.
    pub fn get(&self, key: &StoreKey, sha256: &str) -> Option<StoredFile> {
        let path = self.file_path(key, sha256);
        let metadata = fs::metadata(&path).ok()?;
        metadata.is_file().then(|| StoredFile {
            path,
            sha256: sha256.to_string(),
            size: metadata.len(),
        })
    }

    /// Add content for `key`, returning the stored file.
    ///
    /// When `expected_sha256` is given the content must hash to it.
    /// Adding content that is already stored is a no-op.
    pub fn add<R: Read>(
        &self,
        key: &StoreKey,
        expected_sha256: Option<&str>,
        reader: R,
    ) -> Result<StoredFile, StoreError> {
        if let Some(existing) = expected_sha256.and_then(|sha| self.get(key, sha)) {
            return Ok(existing);
        }

        let temp_dir = self.temp_dir();
        fs::create_dir_all(&temp_dir)?;

        let temp_name = format!(
            ".tmp.{}.{}",
            std::process::id(),
            SystemTime::now()
                .duration_since(SystemTime::UNIX_EPOCH)
                .map(|d| d.as_nanos())
                .unwrap_or(0)
        );
        let temp_path = temp_dir.join(temp_name);

        let (sha256, size) = match write_hashed(&temp_path, reader) {
            Ok(written) => written,
            Err(e) => {
                let _ = fs::remove_file(&temp_path);
                return Err(e.into());
            }
        };

        if let Some(expected) = expected_sha256 {
            if !expected.eq_ignore_ascii_case(&sha256) {
                let _ = fs::remove_file(&temp_path);
                return Err(StoreError::HashMismatch {
                    key: key.to_string(),
                    expected: expected.to_string(),
                    actual: sha256,
                });
            }
        }

        let final_path = self.file_path(key, &sha256);
        if let Some(parent) = final_path.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                let _ = fs::remove_file(&temp_path);
                return Err(StoreError::Io(e));
            }
        }

        if let Err(e) = fs::rename(&temp_path, &final_path) {
            let _ = fs::remove_file(&temp_path);
            // Another writer stored the same content first
            if final_path.is_file() {
                tracing::debug!(key = %key, "content already stored by a concurrent writer");
            } else {
                return Err(StoreError::Io(e));
            }
        }

        tracing::debug!(key = %key, sha256 = %sha256, "stored artifact");
        Ok(StoredFile {
            path: final_path,
            sha256,
            size,
        })
    }

    /// Count the files held by the store, excluding in-flight writes.
    pub fn stats(&self) -> Result<StoreStats, StoreError> {
        let mut stats = StoreStats::default();
        if !self.root.exists() {
            return Ok(stats);
        }

        let walker = WalkDir::new(&self.root)
            .into_iter()
            .filter_entry(|e| e.file_name() != TEMP_DIR);
        for entry in walker {
            let entry = entry.map_err(|e| StoreError::Io(e.into()))?;
            if entry.file_type().is_file() {
                stats.files += 1;
                stats.total_bytes += entry.metadata().map(|m| m.len()).unwrap_or(0);
            }
        }
        Ok(stats)
    }

    /// Remove in-flight temp files older than `threshold`.
    pub fn cleanup_orphaned_temps(&self, threshold: Duration) -> Result<usize, StoreError> {
        let temp_dir = self.temp_dir();
        if !temp_dir.exists() {
            return Ok(0);
        }

        let mut cleaned = 0;
        for entry in fs::read_dir(&temp_dir)? {
            let path = entry?.path();
            let is_temp = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with(".tmp."));
            if !is_temp {
                continue;
            }
            let age = fs::metadata(&path)
                .and_then(|m| m.modified())
                .ok()
                .and_then(|modified| modified.elapsed().ok());
            if age.is_some_and(|age| age > threshold) && fs::remove_file(&path).is_ok() {
                cleaned += 1;
            }
        }

        Ok(cleaned)
    }
}

/// Copy `reader` into a new file at `path`, hashing as it goes.
fn write_hashed<R: Read>(path: &Path, mut reader: R) -> io::Result<(String, u64)> {
    let mut file = File::create(path)?;
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; 64 * 1024];
    let mut total = 0u64;

    loop {
        let n = reader.read(&mut buffer)?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
        file.write_all(&buffer[..n])?;
        total += n as u64;
    }
    file.flush()?;

    Ok((hex::encode(hasher.finalize()), total))
}
