//! Variants and their attributes.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::ResolvableArtifact;

/// Attributes describing a variant or a consumer's request, such as
/// `usage=java-runtime`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttributeContainer(BTreeMap<String, String>);

impl AttributeContainer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, value: &str) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: &str, value: &str) {
        self.0.insert(name.to_string(), value.to_string());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for AttributeContainer {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl fmt::Display for AttributeContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (name, value)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}={}", name, value)?;
        }
        f.write_str("}")
    }
}

/// One of the alternative artifact bundles a component offers.
#[derive(Clone)]
pub struct Variant {
    name: String,
    attributes: AttributeContainer,
    artifacts: Vec<Arc<dyn ResolvableArtifact>>,
}

impl Variant {
    pub fn new(name: &str, attributes: AttributeContainer) -> Self {
        Self {
            name: name.to_string(),
            attributes,
            artifacts: Vec::new(),
        }
    }

    pub fn with_artifact(mut self, artifact: Arc<dyn ResolvableArtifact>) -> Self {
        self.artifacts.push(artifact);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attributes(&self) -> &AttributeContainer {
        &self.attributes
    }

    pub fn artifacts(&self) -> &[Arc<dyn ResolvableArtifact>] {
        &self.artifacts
    }
}

impl fmt::Debug for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Variant")
            .field("name", &self.name)
            .field("attributes", &self.attributes)
            .field(
                "artifacts",
                &self
                    .artifacts
                    .iter()
                    .map(|a| a.id().to_string())
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}
