//! Resource patterns for artifact caches.
//!
//! A resource pattern describes how the coordinates of an artifact map onto
//! a relative path in some on-disk layout, for example
//! `[organisation]/[module](/[branch])/[revision]/[artifact]-[revision](.[ext])`.
//!
//! Patterns are made of literal text, bracketed substitution tokens, optional
//! parenthesised segments (dropped when any token inside has no value) and
//! `*` path segments, which are left open and expanded by listing the
//! directory at that level.

mod coordinates;
mod parser;
mod pattern;

pub use coordinates::Coordinates;
pub use parser::{parse_pattern, PatternError, PatternPart, Token};
pub use pattern::{PatternLayout, ResourcePattern};

/// Marker for an open wildcard path segment.
pub const WILDCARD_MARKER: &str = "/*/";

/// Marker for the first substitution token following a path separator.
pub const TOKEN_MARKER: &str = "/[";

/// Split a raw cache pattern into a fixed base directory and the remaining
/// Ivy pattern.
///
/// The split happens at the earliest occurrence of either [`WILDCARD_MARKER`]
/// or [`TOKEN_MARKER`]. The separator at the split point belongs to neither
/// half. A pattern containing neither marker is rejected.
///
/// ```
/// use artres_pattern::prepare_pattern;
///
/// let (base, pattern) = prepare_pattern("artifacts-7/artifacts/*/[organisation]/[module]").unwrap();
/// assert_eq!(base, "artifacts-7/artifacts");
/// assert_eq!(pattern.pattern(), "*/[organisation]/[module]");
/// ```
pub fn prepare_pattern(raw: &str) -> Result<(String, ResourcePattern), PatternError> {
    let chop_at = match (raw.find(WILDCARD_MARKER), raw.find(TOKEN_MARKER)) {
        (Some(wildcard), Some(token)) => wildcard.min(token),
        (Some(wildcard), None) => wildcard,
        (None, Some(token)) => token,
        (None, None) => return Err(PatternError::Unsupported(raw.to_string())),
    };

    let base_dir = &raw[..chop_at];
    let remaining = &raw[chop_at + 1..];
    let pattern = ResourcePattern::ivy(remaining)?;

    Ok((base_dir.to_string(), pattern))
}
