//! Component filters applied during artifact selection.

use std::collections::HashSet;

use super::identifier::ComponentIdentifier;

/// Predicate deciding whether a component contributes artifacts.
pub trait ComponentFilter: Send + Sync {
    fn accepts(&self, component: &ComponentIdentifier) -> bool;
}

impl<F> ComponentFilter for F
where
    F: Fn(&ComponentIdentifier) -> bool + Send + Sync,
{
    fn accepts(&self, component: &ComponentIdentifier) -> bool {
        self(component)
    }
}

/// Accepts every component.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl ComponentFilter for AcceptAll {
    fn accepts(&self, _component: &ComponentIdentifier) -> bool {
        true
    }
}

/// Rejects module components by `group:module`, whatever their version.
/// Project components are always accepted.
#[derive(Debug, Clone, Default)]
pub struct ExcludeModules {
    excluded: HashSet<(String, String)>,
}

impl ExcludeModules {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn exclude(mut self, group: &str, module: &str) -> Self {
        self.excluded.insert((group.to_string(), module.to_string()));
        self
    }

    /// Build from `group:module` strings; malformed entries are returned
    /// as the error.
    pub fn parse<'a>(entries: impl IntoIterator<Item = &'a str>) -> Result<Self, String> {
        let mut filter = Self::new();
        for entry in entries {
            match entry.split_once(':') {
                Some((group, module)) if !group.is_empty() && !module.is_empty() => {
                    filter = filter.exclude(group, module);
                }
                _ => return Err(entry.to_string()),
            }
        }
        Ok(filter)
    }
}

impl ComponentFilter for ExcludeModules {
    fn accepts(&self, component: &ComponentIdentifier) -> bool {
        match component.as_module() {
            Some(id) => !self
                .excluded
                .contains(&(id.group.clone(), id.module.clone())),
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closure_filter() {
        let only_projects = |c: &ComponentIdentifier| c.as_module().is_none();
        assert!(only_projects.accepts(&ComponentIdentifier::project(":a")));
        assert!(!only_projects.accepts(&ComponentIdentifier::module("g", "m", "1")));
    }

    #[test]
    fn test_exclude_modules_ignores_version() {
        let filter = ExcludeModules::new().exclude("g", "m");
        assert!(!filter.accepts(&ComponentIdentifier::module("g", "m", "1")));
        assert!(!filter.accepts(&ComponentIdentifier::module("g", "m", "2")));
        assert!(filter.accepts(&ComponentIdentifier::module("g", "other", "1")));
        assert!(filter.accepts(&ComponentIdentifier::project(":m")));
    }

    #[test]
    fn test_exclude_modules_parse() {
        let filter = ExcludeModules::parse(["g:m", "h:n"]).unwrap();
        assert!(!filter.accepts(&ComponentIdentifier::module("h", "n", "1")));

        assert_eq!(ExcludeModules::parse(["bad"]).unwrap_err(), "bad");
    }
}
