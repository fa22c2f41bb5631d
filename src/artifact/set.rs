//! Artifact sets prior to variant selection.

use std::fmt;
use std::sync::{Arc, OnceLock};

use super::resolved::{
    self, BrokenArtifacts, CompositeResolvedArtifacts, LazyResolvedArtifacts, ResolvedArtifactSet,
    SelectedVariantArtifacts,
};
use super::selector::{SelectionError, VariantSelector};
use super::variant::Variant;
use crate::component::{ComponentFilter, ComponentIdentifier};

/// The artifacts of some part of a dependency graph, before selection.
pub trait ArtifactSet: Send + Sync {
    /// Apply `filter` to components and `selector` to their variants.
    ///
    /// Components rejected by the filter contribute nothing. A component
    /// where no variant matches contributes nothing; an ambiguous one
    /// contributes a broken set that reports the ambiguity.
    fn select(
        &self,
        filter: &dyn ComponentFilter,
        selector: Arc<dyn VariantSelector>,
    ) -> Arc<dyn ResolvedArtifactSet>;
}

/// The artifact set with no artifacts.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoArtifacts;

pub static NO_ARTIFACTS: NoArtifacts = NoArtifacts;

impl ArtifactSet for NoArtifacts {
    fn select(
        &self,
        _filter: &dyn ComponentFilter,
        _selector: Arc<dyn VariantSelector>,
    ) -> Arc<dyn ResolvedArtifactSet> {
        resolved::empty()
    }
}

/// Run the selector over a component's variants.
fn select_variant(
    component: &ComponentIdentifier,
    variants: &[Variant],
    selector: &dyn VariantSelector,
) -> Arc<dyn ResolvedArtifactSet> {
    match selector.select(component, variants) {
        Ok(None) => {
            tracing::debug!(%component, "no matching variant");
            resolved::empty()
        }
        Ok(Some(index)) => match variants.get(index) {
            Some(variant) if variant.artifacts().is_empty() => resolved::empty(),
            Some(variant) => Arc::new(SelectedVariantArtifacts::new(
                component.clone(),
                variant.clone(),
            )),
            None => Arc::new(BrokenArtifacts::new(SelectionError::InvalidSelection {
                component: component.clone(),
                index,
                count: variants.len(),
            })),
        },
        Err(failure) => {
            tracing::debug!(%component, error = %failure, "variant selection failed");
            Arc::new(BrokenArtifacts::new(failure))
        }
    }
}

/// A component whose variants are already known. Selection is immediate.
#[derive(Debug, Clone)]
pub struct ComponentArtifactSet {
    component: ComponentIdentifier,
    variants: Vec<Variant>,
}

impl ComponentArtifactSet {
    pub fn new(component: ComponentIdentifier, variants: Vec<Variant>) -> Self {
        Self {
            component,
            variants,
        }
    }

    pub fn component(&self) -> &ComponentIdentifier {
        &self.component
    }

    pub fn variants(&self) -> &[Variant] {
        &self.variants
    }
}

impl ArtifactSet for ComponentArtifactSet {
    fn select(
        &self,
        filter: &dyn ComponentFilter,
        selector: Arc<dyn VariantSelector>,
    ) -> Arc<dyn ResolvedArtifactSet> {
        if !filter.accepts(&self.component) {
            return resolved::empty();
        }
        select_variant(&self.component, &self.variants, selector.as_ref())
    }
}

type Loader = Box<dyn Fn() -> Vec<Variant> + Send + Sync>;

/// A component whose variants are expensive to determine.
///
/// The loader runs the first time any selection of this set is visited or
/// asked for build dependencies, and its result is kept for all later
/// selections. Filtering happens up front since it only needs the
/// component's identity.
#[derive(Clone)]
pub struct DeferredArtifactSet {
    component: ComponentIdentifier,
    variants: Arc<LoadedVariants>,
}

struct LoadedVariants {
    loader: Loader,
    loaded: OnceLock<Vec<Variant>>,
}

impl LoadedVariants {
    fn get(&self, component: &ComponentIdentifier) -> &[Variant] {
        self.loaded.get_or_init(|| {
            tracing::debug!(%component, "loading variants");
            (self.loader)()
        })
    }
}

impl DeferredArtifactSet {
    pub fn new(
        component: ComponentIdentifier,
        loader: impl Fn() -> Vec<Variant> + Send + Sync + 'static,
    ) -> Self {
        Self {
            component,
            variants: Arc::new(LoadedVariants {
                loader: Box::new(loader),
                loaded: OnceLock::new(),
            }),
        }
    }

    pub fn component(&self) -> &ComponentIdentifier {
        &self.component
    }

    /// Whether the variants have been loaded.
    pub fn is_loaded(&self) -> bool {
        self.variants.loaded.get().is_some()
    }
}

impl ArtifactSet for DeferredArtifactSet {
    fn select(
        &self,
        filter: &dyn ComponentFilter,
        selector: Arc<dyn VariantSelector>,
    ) -> Arc<dyn ResolvedArtifactSet> {
        if !filter.accepts(&self.component) {
            return resolved::empty();
        }
        let component = self.component.clone();
        let variants = Arc::clone(&self.variants);
        Arc::new(LazyResolvedArtifacts::new(move || {
            select_variant(&component, variants.get(&component), selector.as_ref())
        }))
    }
}

impl fmt::Debug for DeferredArtifactSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeferredArtifactSet")
            .field("component", &self.component)
            .field("loaded", &self.is_loaded())
            .finish()
    }
}

/// The artifact sets of many components.
#[derive(Default)]
pub struct CompositeArtifactSet {
    sets: Vec<Arc<dyn ArtifactSet>>,
}

impl CompositeArtifactSet {
    pub fn new(sets: Vec<Arc<dyn ArtifactSet>>) -> Self {
        Self { sets }
    }

    pub fn push(&mut self, set: Arc<dyn ArtifactSet>) {
        self.sets.push(set);
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }
}

impl ArtifactSet for CompositeArtifactSet {
    fn select(
        &self,
        filter: &dyn ComponentFilter,
        selector: Arc<dyn VariantSelector>,
    ) -> Arc<dyn ResolvedArtifactSet> {
        let mut selected: Vec<Arc<dyn ResolvedArtifactSet>> = self
            .sets
            .iter()
            .map(|set| set.select(filter, Arc::clone(&selector)))
            .filter(|selection| !resolved::is_empty(selection))
            .collect();

        match selected.len() {
            0 => resolved::empty(),
            1 => selected.remove(0),
            _ => Arc::new(CompositeResolvedArtifacts::new(selected)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::resolved::{BuildDependencyCollector, CollectingListener};
    use crate::artifact::selector::AttributeMatchingSelector;
    use crate::artifact::variant::AttributeContainer;
    use crate::artifact::{BuildDependency, InlineQueue, LocalFileArtifact};
    use crate::component::{AcceptAll, ArtifactIdentifier};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn selector() -> Arc<dyn VariantSelector> {
        Arc::new(AttributeMatchingSelector::default())
    }

    fn component_with_jar(path: &str) -> ComponentArtifactSet {
        let component = ComponentIdentifier::project(path);
        let artifact = LocalFileArtifact::new(
            ArtifactIdentifier::new(component.clone(), "out.jar"),
            "/nonexistent/out.jar",
        )
        .built_by(BuildDependency::new(format!("{path}:jar")));
        ComponentArtifactSet::new(
            component,
            vec![Variant::new("runtime", AttributeContainer::new()).with_artifact(Arc::new(artifact))],
        )
    }

    #[test]
    fn test_no_artifacts_is_empty() {
        let resolved = NO_ARTIFACTS.select(&AcceptAll, selector());
        assert!(resolved::is_empty(&resolved));
    }

    #[test]
    fn test_filtered_component_is_empty() {
        let set = component_with_jar(":lib");
        let resolved = set.select(&|_: &ComponentIdentifier| false, selector());
        assert!(resolved::is_empty(&resolved));
    }

    #[test]
    fn test_variant_without_artifacts_is_empty() {
        let set = ComponentArtifactSet::new(
            ComponentIdentifier::project(":docs"),
            vec![Variant::new("docs", AttributeContainer::new())],
        );
        assert!(resolved::is_empty(&set.select(&AcceptAll, selector())));
    }

    #[test]
    fn test_invalid_selector_index_is_broken() {
        struct Wild;
        impl VariantSelector for Wild {
            fn select(
                &self,
                _component: &ComponentIdentifier,
                _variants: &[Variant],
            ) -> Result<Option<usize>, SelectionError> {
                Ok(Some(7))
            }
        }

        let resolved = component_with_jar(":lib").select(&AcceptAll, Arc::new(Wild));
        let mut collector = BuildDependencyCollector::new();
        resolved.collect_build_dependencies(&mut collector);
        assert!(matches!(
            collector.failures.as_slice(),
            [SelectionError::InvalidSelection { index: 7, count: 1, .. }]
        ));
    }

    #[test]
    fn test_deferred_loads_on_first_use_only() {
        let loads = Arc::new(AtomicUsize::new(0));
        let counter = loads.clone();
        let set = DeferredArtifactSet::new(ComponentIdentifier::project(":lib"), move || {
            counter.fetch_add(1, Ordering::SeqCst);
            component_with_jar(":lib").variants().to_vec()
        });

        let first = set.select(&AcceptAll, selector());
        let second = set.select(&AcceptAll, selector());
        assert!(!set.is_loaded());
        assert_eq!(loads.load(Ordering::SeqCst), 0);

        let mut collector = BuildDependencyCollector::new();
        first.collect_build_dependencies(&mut collector);
        second.collect_build_dependencies(&mut collector);
        let _ = first
            .start_visit(&InlineQueue, Arc::new(CollectingListener::new()))
            .wait();

        assert!(set.is_loaded());
        assert_eq!(loads.load(Ordering::SeqCst), 1);
        assert_eq!(collector.dependencies.len(), 1);
    }

    #[test]
    fn test_deferred_filtered_never_loads() {
        let set = DeferredArtifactSet::new(ComponentIdentifier::project(":lib"), || {
            panic!("must not load")
        });
        let resolved = set.select(&|_: &ComponentIdentifier| false, selector());
        assert!(resolved::is_empty(&resolved));
    }

    #[test]
    fn test_composite_drops_empty_children() {
        let sets: Vec<Arc<dyn ArtifactSet>> = vec![
            Arc::new(NoArtifacts),
            Arc::new(component_with_jar(":a")),
            Arc::new(NoArtifacts),
        ];
        let composite = CompositeArtifactSet::new(sets);

        let resolved = composite.select(&AcceptAll, selector());
        assert!(!resolved::is_empty(&resolved));

        let mut collector = BuildDependencyCollector::new();
        resolved.collect_build_dependencies(&mut collector);
        assert_eq!(
            collector.dependencies.into_iter().collect::<Vec<_>>(),
            vec![BuildDependency::new(":a:jar")]
        );
    }

    #[test]
    fn test_composite_of_nothing_is_empty() {
        let sets: Vec<Arc<dyn ArtifactSet>> = vec![Arc::new(NoArtifacts)];
        let composite = CompositeArtifactSet::new(sets);
        assert!(resolved::is_empty(&composite.select(&AcceptAll, selector())));
    }
}
