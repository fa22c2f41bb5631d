//! Rendering patterns against coordinates and expanding them on disk.

use std::fs;
use std::path::{Path, PathBuf};

use crate::coordinates::Coordinates;
use crate::parser::{parse_pattern, PatternError, PatternPart, Token};

/// The repository layout a pattern follows.
///
/// Maven layouts nest the organisation as directories (`org.example`
/// becomes `org/example`); Ivy layouts use it verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternLayout {
    Ivy,
    M2,
}

/// A parsed resource pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourcePattern {
    raw: String,
    parts: Vec<PatternPart>,
    layout: PatternLayout,
}

impl ResourcePattern {
    /// Parse an Ivy-layout pattern.
    pub fn ivy(pattern: &str) -> Result<Self, PatternError> {
        Self::parse(pattern, PatternLayout::Ivy)
    }

    /// Parse a Maven-layout pattern.
    pub fn m2(pattern: &str) -> Result<Self, PatternError> {
        Self::parse(pattern, PatternLayout::M2)
    }

    fn parse(pattern: &str, layout: PatternLayout) -> Result<Self, PatternError> {
        Ok(Self {
            raw: pattern.to_string(),
            parts: parse_pattern(pattern)?,
            layout,
        })
    }

    /// The pattern as written.
    pub fn pattern(&self) -> &str {
        &self.raw
    }

    pub fn layout(&self) -> PatternLayout {
        self.layout
    }

    /// Whether the pattern contains an open `*` path segment.
    pub fn has_wildcard(&self) -> bool {
        self.raw.split('/').any(|segment| segment == "*")
    }

    /// Substitute the coordinates into the pattern.
    ///
    /// Optional segments whose tokens are not all present are omitted
    /// together with their separators. Wildcard segments are kept as `*`.
    pub fn to_path(&self, coordinates: &Coordinates) -> String {
        let mut path = String::new();
        for part in &self.parts {
            match part {
                PatternPart::Optional(inner) => {
                    if inner.iter().all(|p| self.has_value(p, coordinates)) {
                        for p in inner {
                            self.render(p, coordinates, &mut path);
                        }
                    }
                }
                other => self.render(other, coordinates, &mut path),
            }
        }
        path
    }

    /// List the existing files under `base_dir` that this pattern yields
    /// for the coordinates.
    ///
    /// Each `*` segment is expanded by listing the directory at that level.
    /// Results are sorted so that repeated lookups see the same order.
    /// A path with an empty, `.` or `..` segment finds nothing, so
    /// coordinate values cannot reach outside `base_dir`.
    pub fn find_files(&self, base_dir: &Path, coordinates: &Coordinates) -> Vec<PathBuf> {
        let relative = self.to_path(coordinates);
        let segments: Vec<&str> = relative.split('/').collect();
        if segments
            .iter()
            .any(|s| s.is_empty() || *s == "." || *s == "..")
        {
            return Vec::new();
        }
        let mut current = vec![base_dir.to_path_buf()];

        for segment in segments {
            let mut next = Vec::new();
            for dir in &current {
                if segment == "*" {
                    next.extend(list_dir(dir));
                } else {
                    next.push(dir.join(segment));
                }
            }
            if next.is_empty() {
                return Vec::new();
            }
            current = next;
        }

        let mut files: Vec<PathBuf> = current.into_iter().filter(|p| p.is_file()).collect();
        files.sort();
        files
    }

    fn has_value(&self, part: &PatternPart, coordinates: &Coordinates) -> bool {
        match part {
            PatternPart::Token(token) => coordinates.value(*token).is_some(),
            _ => true,
        }
    }

    fn render(&self, part: &PatternPart, coordinates: &Coordinates, out: &mut String) {
        match part {
            PatternPart::Literal(text) => out.push_str(text),
            PatternPart::Token(token) => {
                let value = coordinates.value(*token).unwrap_or("");
                if *token == Token::Organisation && self.layout == PatternLayout::M2 {
                    out.push_str(&value.replace('.', "/"));
                } else {
                    out.push_str(value);
                }
            }
            PatternPart::Optional(_) => {}
        }
    }
}

fn list_dir(dir: &Path) -> Vec<PathBuf> {
    match fs::read_dir(dir) {
        Ok(entries) => {
            let mut paths: Vec<PathBuf> = entries.flatten().map(|e| e.path()).collect();
            paths.sort();
            paths
        }
        Err(_) => Vec::new(),
    }
}
