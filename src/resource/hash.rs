//! Content hashes used to verify local candidates.

use std::fmt;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;
use std::str::FromStr;

use sha2::{Digest, Sha256};
use thiserror::Error;

/// Length of a SHA-256 digest in bytes.
const SHA256_LEN: usize = 32;

/// Errors parsing a hash value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HashError {
    #[error("invalid hex digest '{0}'")]
    InvalidHex(String),

    #[error("digest '{value}' is {actual} bytes, expected 32")]
    InvalidLength { value: String, actual: usize },
}

/// A SHA-256 digest, held as lowercase hex.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HashValue(String);

impl HashValue {
    /// Parse a hex digest. Case is normalized.
    pub fn parse(hex_digest: &str) -> Result<Self, HashError> {
        let normalized = hex_digest.trim().to_ascii_lowercase();
        let bytes =
            hex::decode(&normalized).map_err(|_| HashError::InvalidHex(hex_digest.to_string()))?;
        if bytes.len() != SHA256_LEN {
            return Err(HashError::InvalidLength {
                value: hex_digest.to_string(),
                actual: bytes.len(),
            });
        }
        Ok(Self(normalized))
    }

    pub fn of_bytes(data: &[u8]) -> Self {
        Self(hex::encode(Sha256::digest(data)))
    }

    /// Hash a file's content, streaming it from disk.
    pub fn of_file(path: &Path) -> io::Result<Self> {
        let mut reader = BufReader::new(File::open(path)?);
        let mut hasher = Sha256::new();
        let mut buffer = [0u8; 64 * 1024];
        loop {
            let n = reader.read(&mut buffer)?;
            if n == 0 {
                break;
            }
            hasher.update(&buffer[..n]);
        }
        Ok(Self(hex::encode(hasher.finalize())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for HashValue {
    type Err = HashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for HashValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
