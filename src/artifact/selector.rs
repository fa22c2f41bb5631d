//! Variant selection.

use thiserror::Error;

use super::variant::{AttributeContainer, Variant};
use crate::component::ComponentIdentifier;

/// Selection could not settle on a variant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error(
        "cannot choose between variants {} of {component} for {requested}",
        .candidates.join(", ")
    )]
    Ambiguous {
        component: ComponentIdentifier,
        requested: AttributeContainer,
        candidates: Vec<String>,
    },

    #[error("selector chose variant #{index} of {component}, which has {count} variants")]
    InvalidSelection {
        component: ComponentIdentifier,
        index: usize,
        count: usize,
    },
}

/// Chooses at most one variant of a component.
///
/// `Ok(None)` means the component contributes nothing; ambiguity is an
/// error, distinct from having no match.
pub trait VariantSelector: Send + Sync {
    fn select(
        &self,
        component: &ComponentIdentifier,
        variants: &[Variant],
    ) -> Result<Option<usize>, SelectionError>;
}

/// Selects the variant best matching requested attributes.
///
/// A variant is compatible when each requested attribute it declares has
/// the requested value. Among compatible variants the one matching the most
/// requested attributes wins; a tie is ambiguous.
#[derive(Debug, Clone, Default)]
pub struct AttributeMatchingSelector {
    requested: AttributeContainer,
}

impl AttributeMatchingSelector {
    pub fn new(requested: AttributeContainer) -> Self {
        Self { requested }
    }

    pub fn requested(&self) -> &AttributeContainer {
        &self.requested
    }

    /// Number of requested attributes matched, or `None` if incompatible.
    fn matches(&self, variant: &Variant) -> Option<usize> {
        let mut matched = 0;
        for (name, wanted) in self.requested.iter() {
            match variant.attributes().get(name) {
                Some(value) if value == wanted => matched += 1,
                Some(_) => return None,
                None => {}
            }
        }
        Some(matched)
    }
}

impl VariantSelector for AttributeMatchingSelector {
    fn select(
        &self,
        component: &ComponentIdentifier,
        variants: &[Variant],
    ) -> Result<Option<usize>, SelectionError> {
        let compatible: Vec<(usize, usize)> = variants
            .iter()
            .enumerate()
            .filter_map(|(index, variant)| self.matches(variant).map(|score| (index, score)))
            .collect();

        let Some(best) = compatible.iter().map(|(_, score)| *score).max() else {
            return Ok(None);
        };
        let winners: Vec<usize> = compatible
            .iter()
            .filter(|(_, score)| *score == best)
            .map(|(index, _)| *index)
            .collect();

        match winners.as_slice() {
            [only] => Ok(Some(*only)),
            _ => Err(SelectionError::Ambiguous {
                component: component.clone(),
                requested: self.requested.clone(),
                candidates: winners
                    .iter()
                    .map(|i| variants[*i].name().to_string())
                    .collect(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn variant(name: &str, attributes: &[(&str, &str)]) -> Variant {
        Variant::new(name, attributes.iter().copied().collect())
    }

    fn component() -> ComponentIdentifier {
        ComponentIdentifier::module("org.example", "lib", "1.0")
    }

    #[test]
    fn test_no_variants_selects_nothing() {
        let selector = AttributeMatchingSelector::default();
        assert_eq!(selector.select(&component(), &[]), Ok(None));
    }

    #[test]
    fn test_single_variant_with_empty_request() {
        let selector = AttributeMatchingSelector::default();
        let variants = [variant("runtime", &[("usage", "java-runtime")])];
        assert_eq!(selector.select(&component(), &variants), Ok(Some(0)));
    }

    #[test]
    fn test_best_match_wins() {
        let selector = AttributeMatchingSelector::new(
            AttributeContainer::new()
                .with("usage", "java-runtime")
                .with("category", "library"),
        );
        let variants = [
            variant("api", &[("usage", "java-api")]),
            variant("runtime", &[("usage", "java-runtime"), ("category", "library")]),
            variant("loose", &[("category", "library")]),
        ];
        assert_eq!(selector.select(&component(), &variants), Ok(Some(1)));
    }

    #[test]
    fn test_incompatible_variants_select_nothing() {
        let selector =
            AttributeMatchingSelector::new(AttributeContainer::new().with("usage", "native"));
        let variants = [variant("api", &[("usage", "java-api")])];
        assert_eq!(selector.select(&component(), &variants), Ok(None));
    }

    #[test]
    fn test_tie_is_ambiguous() {
        let selector =
            AttributeMatchingSelector::new(AttributeContainer::new().with("usage", "java-runtime"));
        let variants = [
            variant("jvm", &[("usage", "java-runtime"), ("platform", "jvm")]),
            variant("android", &[("usage", "java-runtime"), ("platform", "android")]),
        ];

        let err = selector.select(&component(), &variants).unwrap_err();
        assert_eq!(
            err,
            SelectionError::Ambiguous {
                component: component(),
                requested: AttributeContainer::new().with("usage", "java-runtime"),
                candidates: vec!["jvm".to_string(), "android".to_string()],
            }
        );
        assert_eq!(
            err.to_string(),
            "cannot choose between variants jvm, android of org.example:lib:1.0 for {usage=java-runtime}"
        );
    }
}
