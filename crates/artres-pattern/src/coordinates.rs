//! Token values substituted into a pattern.

use crate::parser::Token;

/// The coordinate values of one artifact, keyed by pattern token.
///
/// Optional fields that are `None` or empty count as absent: any optional
/// segment referencing them is dropped from the rendered path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Coordinates {
    pub organisation: String,
    pub module: String,
    pub branch: Option<String>,
    pub revision: String,
    pub artifact: String,
    pub artifact_type: String,
    pub classifier: Option<String>,
    pub extension: Option<String>,
}

impl Coordinates {
    /// Create coordinates for an artifact of a module.
    ///
    /// The artifact name and type default to the module name and `jar`;
    /// use the `with_*` methods to refine them.
    pub fn new(organisation: &str, module: &str, revision: &str) -> Self {
        Self {
            organisation: organisation.to_string(),
            module: module.to_string(),
            branch: None,
            revision: revision.to_string(),
            artifact: module.to_string(),
            artifact_type: "jar".to_string(),
            classifier: None,
            extension: None,
        }
    }

    pub fn with_artifact(mut self, artifact: &str) -> Self {
        self.artifact = artifact.to_string();
        self
    }

    pub fn with_type(mut self, artifact_type: &str) -> Self {
        self.artifact_type = artifact_type.to_string();
        self
    }

    pub fn with_branch(mut self, branch: &str) -> Self {
        self.branch = Some(branch.to_string());
        self
    }

    pub fn with_classifier(mut self, classifier: &str) -> Self {
        self.classifier = Some(classifier.to_string());
        self
    }

    pub fn with_extension(mut self, extension: &str) -> Self {
        self.extension = Some(extension.to_string());
        self
    }

    /// The value for a token, or `None` when absent or empty.
    pub fn value(&self, token: Token) -> Option<&str> {
        let value = match token {
            Token::Organisation => Some(self.organisation.as_str()),
            Token::Module => Some(self.module.as_str()),
            Token::Branch => self.branch.as_deref(),
            Token::Revision => Some(self.revision.as_str()),
            Token::Type => Some(self.artifact_type.as_str()),
            Token::Artifact => Some(self.artifact.as_str()),
            Token::Classifier => self.classifier.as_deref(),
            Token::Extension => self.extension.as_deref(),
        };
        value.filter(|v| !v.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_follow_module() {
        let coords = Coordinates::new("org.example", "lib", "1.0");
        assert_eq!(coords.value(Token::Artifact), Some("lib"));
        assert_eq!(coords.value(Token::Type), Some("jar"));
        assert_eq!(coords.value(Token::Classifier), None);
    }

    #[test]
    fn test_empty_optional_is_absent() {
        let coords = Coordinates::new("org.example", "lib", "1.0")
            .with_classifier("")
            .with_branch("");
        assert_eq!(coords.value(Token::Classifier), None);
        assert_eq!(coords.value(Token::Branch), None);
    }

    #[test]
    fn test_empty_required_is_absent() {
        let coords = Coordinates::new("", "lib", "1.0");
        assert_eq!(coords.value(Token::Organisation), None);
    }
}
