//! Content-addressed artifact file store.
//!
//! The store is the current-format artifact cache. Files are grouped by the
//! coordinates of the module they belong to, then by the SHA-256 digest of
//! their content:
//!
//! ```text
//! <root>/<group>/<module>/<version>/<sha256>/<file name>
//! ```
//!
//! Several copies of a same-named file with different content can coexist;
//! a lookup by key returns all of them and the caller picks by digest.

mod key;
mod store;

pub use key::StoreKey;
pub use store::{FileStore, StoreError, StoreStats, StoredFile};
