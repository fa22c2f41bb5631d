//! Resolved artifact sets: the outcome of selecting variants.

use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use super::completion::{ArtifactFailure, Completion, Tracker};
use super::queue::BuildOperationQueue;
use super::selector::SelectionError;
use super::variant::{AttributeContainer, Variant};
use super::BuildDependency;
use crate::component::{ArtifactIdentifier, ComponentIdentifier};

/// A set of selected artifacts that can be visited.
///
/// A visit materializes each artifact as a separate unit of work on the
/// queue; the returned [`Completion`] tracks those units. Collecting build
/// dependencies never materializes anything.
pub trait ResolvedArtifactSet: Send + Sync {
    fn start_visit(
        &self,
        queue: &dyn BuildOperationQueue,
        listener: Arc<dyn ArtifactListener>,
    ) -> Completion;

    fn collect_build_dependencies(&self, visitor: &mut dyn BuildDependenciesVisitor);
}

/// The shared empty set. Every empty selection returns this instance.
pub fn empty() -> Arc<dyn ResolvedArtifactSet> {
    static EMPTY: OnceLock<Arc<dyn ResolvedArtifactSet>> = OnceLock::new();
    EMPTY
        .get_or_init(|| Arc::new(EmptyResolvedArtifacts))
        .clone()
}

/// Whether `set` is the shared empty set.
pub fn is_empty(set: &Arc<dyn ResolvedArtifactSet>) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(set), Arc::as_ptr(&empty()))
}

struct EmptyResolvedArtifacts;

impl ResolvedArtifactSet for EmptyResolvedArtifacts {
    fn start_visit(
        &self,
        _queue: &dyn BuildOperationQueue,
        _listener: Arc<dyn ArtifactListener>,
    ) -> Completion {
        Completion::ready()
    }

    fn collect_build_dependencies(&self, _visitor: &mut dyn BuildDependenciesVisitor) {}
}

/// A materialized artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedArtifactResult {
    pub id: ArtifactIdentifier,
    pub variant: String,
    pub attributes: AttributeContainer,
    pub file: PathBuf,
}

/// Receives visit results. Called from worker threads.
pub trait ArtifactListener: Send + Sync {
    fn artifact_available(&self, artifact: &ResolvedArtifactResult);

    fn artifact_failed(&self, failure: &ArtifactFailure);
}

/// Listener that records what it is told.
#[derive(Debug, Default)]
pub struct CollectingListener {
    available: Mutex<Vec<ResolvedArtifactResult>>,
    failed: Mutex<Vec<String>>,
}

impl CollectingListener {
    pub fn new() -> Self {
        Self::default()
    }

    /// Materialized artifacts, sorted by file.
    pub fn available(&self) -> Vec<ResolvedArtifactResult> {
        let mut available = self
            .available
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        available.sort_by(|a, b| a.file.cmp(&b.file));
        available
    }

    /// Failure messages, in arrival order.
    pub fn failed(&self) -> Vec<String> {
        self.failed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl ArtifactListener for CollectingListener {
    fn artifact_available(&self, artifact: &ResolvedArtifactResult) {
        self.available
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(artifact.clone());
    }

    fn artifact_failed(&self, failure: &ArtifactFailure) {
        self.failed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(failure.to_string());
    }
}

/// Receives the build dependencies of a set.
pub trait BuildDependenciesVisitor {
    fn visit_dependency(&mut self, dependency: &BuildDependency);

    fn visit_failure(&mut self, failure: &SelectionError);
}

/// Visitor that records dependencies (deduplicated, sorted) and failures.
#[derive(Debug, Default)]
pub struct BuildDependencyCollector {
    pub dependencies: BTreeSet<BuildDependency>,
    pub failures: Vec<SelectionError>,
}

impl BuildDependencyCollector {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BuildDependenciesVisitor for BuildDependencyCollector {
    fn visit_dependency(&mut self, dependency: &BuildDependency) {
        self.dependencies.insert(dependency.clone());
    }

    fn visit_failure(&mut self, failure: &SelectionError) {
        self.failures.push(failure.clone());
    }
}

/// The artifacts of the one selected variant of a component.
pub struct SelectedVariantArtifacts {
    component: ComponentIdentifier,
    variant: Variant,
}

impl SelectedVariantArtifacts {
    pub fn new(component: ComponentIdentifier, variant: Variant) -> Self {
        Self { component, variant }
    }

    pub fn component(&self) -> &ComponentIdentifier {
        &self.component
    }

    pub fn variant(&self) -> &Variant {
        &self.variant
    }
}

impl ResolvedArtifactSet for SelectedVariantArtifacts {
    fn start_visit(
        &self,
        queue: &dyn BuildOperationQueue,
        listener: Arc<dyn ArtifactListener>,
    ) -> Completion {
        let artifacts = self.variant.artifacts();
        let tracker = Tracker::new(artifacts.len());
        tracing::debug!(
            component = %self.component,
            variant = self.variant.name(),
            artifacts = artifacts.len(),
            "visiting selected variant"
        );

        for artifact in artifacts {
            let artifact = Arc::clone(artifact);
            let listener = Arc::clone(&listener);
            let variant = self.variant.name().to_string();
            let attributes = self.variant.attributes().clone();
            let report = tracker.unit(artifact.id().clone());

            queue.submit(Box::new(move || match artifact.resolve_file() {
                Ok(file) => {
                    listener.artifact_available(&ResolvedArtifactResult {
                        id: artifact.id().clone(),
                        variant,
                        attributes,
                        file,
                    });
                    report.succeeded();
                }
                Err(source) => {
                    let failure = ArtifactFailure::Artifact {
                        artifact: artifact.id().clone(),
                        source,
                    };
                    listener.artifact_failed(&failure);
                    report.failed(failure);
                }
            }));
        }

        Completion::pending(tracker)
    }

    fn collect_build_dependencies(&self, visitor: &mut dyn BuildDependenciesVisitor) {
        for artifact in self.variant.artifacts() {
            for dependency in artifact.build_dependencies() {
                visitor.visit_dependency(dependency);
            }
        }
    }
}

/// A component whose selection failed. The failure surfaces on every visit
/// and dependency collection.
#[derive(Debug, Clone)]
pub struct BrokenArtifacts {
    failure: SelectionError,
}

impl BrokenArtifacts {
    pub fn new(failure: SelectionError) -> Self {
        Self { failure }
    }

    pub fn failure(&self) -> &SelectionError {
        &self.failure
    }
}

impl ResolvedArtifactSet for BrokenArtifacts {
    fn start_visit(
        &self,
        _queue: &dyn BuildOperationQueue,
        listener: Arc<dyn ArtifactListener>,
    ) -> Completion {
        let failure = ArtifactFailure::Selection(self.failure.clone());
        listener.artifact_failed(&failure);
        Completion::failed(vec![failure])
    }

    fn collect_build_dependencies(&self, visitor: &mut dyn BuildDependenciesVisitor) {
        visitor.visit_failure(&self.failure);
    }
}

/// Several resolved sets visited together.
pub struct CompositeResolvedArtifacts {
    sets: Vec<Arc<dyn ResolvedArtifactSet>>,
}

impl CompositeResolvedArtifacts {
    pub fn new(sets: Vec<Arc<dyn ResolvedArtifactSet>>) -> Self {
        Self { sets }
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }
}

impl ResolvedArtifactSet for CompositeResolvedArtifacts {
    fn start_visit(
        &self,
        queue: &dyn BuildOperationQueue,
        listener: Arc<dyn ArtifactListener>,
    ) -> Completion {
        Completion::all(
            self.sets
                .iter()
                .map(|set| set.start_visit(queue, Arc::clone(&listener)))
                .collect(),
        )
    }

    fn collect_build_dependencies(&self, visitor: &mut dyn BuildDependenciesVisitor) {
        for set in &self.sets {
            set.collect_build_dependencies(visitor);
        }
    }
}

type Resolve = Box<dyn Fn() -> Arc<dyn ResolvedArtifactSet> + Send + Sync>;

/// A set whose selection runs on first use and is then reused.
pub struct LazyResolvedArtifacts {
    resolve: Resolve,
    resolved: OnceLock<Arc<dyn ResolvedArtifactSet>>,
}

impl LazyResolvedArtifacts {
    pub fn new(resolve: impl Fn() -> Arc<dyn ResolvedArtifactSet> + Send + Sync + 'static) -> Self {
        Self {
            resolve: Box::new(resolve),
            resolved: OnceLock::new(),
        }
    }

    /// Whether selection has already run.
    pub fn is_resolved(&self) -> bool {
        self.resolved.get().is_some()
    }

    fn resolved(&self) -> &Arc<dyn ResolvedArtifactSet> {
        self.resolved.get_or_init(|| (self.resolve)())
    }
}

impl ResolvedArtifactSet for LazyResolvedArtifacts {
    fn start_visit(
        &self,
        queue: &dyn BuildOperationQueue,
        listener: Arc<dyn ArtifactListener>,
    ) -> Completion {
        self.resolved().start_visit(queue, listener)
    }

    fn collect_build_dependencies(&self, visitor: &mut dyn BuildDependenciesVisitor) {
        self.resolved().collect_build_dependencies(visitor)
    }
}

impl fmt::Debug for LazyResolvedArtifacts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyResolvedArtifacts")
            .field("resolved", &self.is_resolved())
            .finish()
    }
}
