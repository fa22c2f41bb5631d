//! Resource pattern parser.
//!
//! Parses a pattern string into literal text, substitution tokens and
//! optional segments. Optional segments cannot nest.

use thiserror::Error;

/// Errors from pattern parsing and preparation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    #[error("unsupported pattern '{0}'")]
    Unsupported(String),

    #[error("unknown token '[{token}]' in pattern '{pattern}'")]
    UnknownToken { token: String, pattern: String },

    #[error("unclosed '{delimiter}' in pattern '{pattern}'")]
    Unclosed { delimiter: char, pattern: String },

    #[error("unexpected '{found}' at offset {offset} in pattern '{pattern}'")]
    Unexpected {
        found: char,
        offset: usize,
        pattern: String,
    },
}

/// A substitution token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Token {
    Organisation,
    Module,
    Branch,
    Revision,
    Type,
    Artifact,
    Classifier,
    Extension,
}

impl Token {
    /// Look up a token by the name written between the brackets.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "organisation" | "organization" => Some(Self::Organisation),
            "module" => Some(Self::Module),
            "branch" => Some(Self::Branch),
            "revision" => Some(Self::Revision),
            "type" => Some(Self::Type),
            "artifact" => Some(Self::Artifact),
            "classifier" => Some(Self::Classifier),
            "ext" => Some(Self::Extension),
            _ => None,
        }
    }

    /// The canonical name of this token.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Organisation => "organisation",
            Self::Module => "module",
            Self::Branch => "branch",
            Self::Revision => "revision",
            Self::Type => "type",
            Self::Artifact => "artifact",
            Self::Classifier => "classifier",
            Self::Extension => "ext",
        }
    }
}

/// One element of a parsed pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternPart {
    /// Literal text, copied as-is (may contain `/` and `*`).
    Literal(String),
    /// A token replaced by a coordinate value.
    Token(Token),
    /// A segment kept only when every token inside has a value.
    Optional(Vec<PatternPart>),
}

/// Parse a pattern string.
pub fn parse_pattern(pattern: &str) -> Result<Vec<PatternPart>, PatternError> {
    let mut parts: Vec<PatternPart> = Vec::new();
    let mut optional: Option<Vec<PatternPart>> = None;
    let mut literal = String::new();
    let mut chars = pattern.char_indices();

    while let Some((offset, c)) = chars.next() {
        match c {
            '[' => {
                let mut name = String::new();
                let mut closed = false;
                for (_, next) in chars.by_ref() {
                    if next == ']' {
                        closed = true;
                        break;
                    }
                    name.push(next);
                }
                if !closed {
                    return Err(PatternError::Unclosed {
                        delimiter: '[',
                        pattern: pattern.to_string(),
                    });
                }
                let token = Token::from_name(&name).ok_or_else(|| PatternError::UnknownToken {
                    token: name.clone(),
                    pattern: pattern.to_string(),
                })?;

                let target = optional.as_mut().unwrap_or(&mut parts);
                flush_literal(&mut literal, target);
                target.push(PatternPart::Token(token));
            }
            '(' => {
                if optional.is_some() {
                    return Err(unexpected(c, offset, pattern));
                }
                flush_literal(&mut literal, &mut parts);
                optional = Some(Vec::new());
            }
            ')' => {
                let mut segment = optional.take().ok_or_else(|| unexpected(c, offset, pattern))?;
                flush_literal(&mut literal, &mut segment);
                parts.push(PatternPart::Optional(segment));
            }
            ']' => return Err(unexpected(c, offset, pattern)),
            _ => literal.push(c),
        }
    }

    if optional.is_some() {
        return Err(PatternError::Unclosed {
            delimiter: '(',
            pattern: pattern.to_string(),
        });
    }
    flush_literal(&mut literal, &mut parts);

    Ok(parts)
}

fn flush_literal(literal: &mut String, target: &mut Vec<PatternPart>) {
    if !literal.is_empty() {
        target.push(PatternPart::Literal(std::mem::take(literal)));
    }
}

fn unexpected(found: char, offset: usize, pattern: &str) -> PatternError {
    PatternError::Unexpected {
        found,
        offset,
        pattern: pattern.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit(s: &str) -> PatternPart {
        PatternPart::Literal(s.to_string())
    }

    #[test]
    fn test_parse_tokens_and_literals() {
        let parts = parse_pattern("[organisation]/[module]-[revision].jar").unwrap();
        assert_eq!(
            parts,
            vec![
                PatternPart::Token(Token::Organisation),
                lit("/"),
                PatternPart::Token(Token::Module),
                lit("-"),
                PatternPart::Token(Token::Revision),
                lit(".jar"),
            ]
        );
    }

    #[test]
    fn test_parse_optional_segment() {
        let parts = parse_pattern("[module](/[branch])/x").unwrap();
        assert_eq!(
            parts,
            vec![
                PatternPart::Token(Token::Module),
                PatternPart::Optional(vec![lit("/"), PatternPart::Token(Token::Branch)]),
                lit("/x"),
            ]
        );
    }

    #[test]
    fn test_parse_wildcard_is_literal() {
        let parts = parse_pattern("*/[type]s").unwrap();
        assert_eq!(parts, vec![lit("*/"), PatternPart::Token(Token::Type), lit("s")]);
    }

    #[test]
    fn test_parse_organization_spelling() {
        let parts = parse_pattern("[organization]").unwrap();
        assert_eq!(parts, vec![PatternPart::Token(Token::Organisation)]);
    }

    #[test]
    fn test_parse_unknown_token() {
        let err = parse_pattern("[group]/[module]").unwrap_err();
        assert_eq!(
            err,
            PatternError::UnknownToken {
                token: "group".to_string(),
                pattern: "[group]/[module]".to_string(),
            }
        );
    }

    #[test]
    fn test_parse_unclosed_bracket() {
        let err = parse_pattern("[module").unwrap_err();
        assert!(matches!(err, PatternError::Unclosed { delimiter: '[', .. }));
    }

    #[test]
    fn test_parse_unclosed_optional() {
        let err = parse_pattern("[module](-[classifier]").unwrap_err();
        assert!(matches!(err, PatternError::Unclosed { delimiter: '(', .. }));
    }

    #[test]
    fn test_parse_nested_optional_rejected() {
        let err = parse_pattern("[module]((-[classifier]))").unwrap_err();
        assert!(matches!(err, PatternError::Unexpected { found: '(', offset: 9, .. }));
    }

    #[test]
    fn test_parse_stray_close() {
        assert!(matches!(
            parse_pattern("[module])").unwrap_err(),
            PatternError::Unexpected { found: ')', .. }
        ));
        assert!(matches!(
            parse_pattern("module]").unwrap_err(),
            PatternError::Unexpected { found: ']', .. }
        ));
    }

    #[test]
    fn test_token_name_round_trip() {
        for token in [Token::Organisation, Token::Extension, Token::Type] {
            assert_eq!(Token::from_name(token.name()), Some(token));
        }
    }
}
