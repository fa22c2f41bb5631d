//! Store keys.

use std::fmt;
use std::path::PathBuf;

/// Identity of a stored file: module coordinates plus file name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StoreKey {
    pub group: String,
    pub module: String,
    pub version: String,
    pub file_name: String,
}

impl StoreKey {
    pub fn new(group: &str, module: &str, version: &str, file_name: &str) -> Self {
        Self {
            group: group.to_string(),
            module: module.to_string(),
            version: version.to_string(),
            file_name: file_name.to_string(),
        }
    }

    /// Relative directory holding every stored copy of this key.
    ///
    /// Each component is sanitized so that a key can never escape the
    /// store root.
    pub(crate) fn relative_dir(&self) -> PathBuf {
        [&self.group, &self.module, &self.version]
            .iter()
            .map(|c| sanitize(c))
            .collect()
    }

    pub(crate) fn sanitized_file_name(&self) -> String {
        sanitize(&self.file_name)
    }
}

impl fmt::Display for StoreKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}/{}",
            self.group, self.module, self.version, self.file_name
        )
    }
}

/// Replace path separators and parent references with underscores.
fn sanitize(component: &str) -> String {
    if component.is_empty() || component == "." || component == ".." {
        return "_".repeat(component.len().max(1));
    }
    component
        .chars()
        .map(|c| if c == '/' || c == '\\' { '_' } else { c })
        .collect()
}
