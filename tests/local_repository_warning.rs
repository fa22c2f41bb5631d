//! Local Repository Warning Tests
//!
//! A missing local Maven repository is reported once per finder, however
//! many threads query it at the same time.

mod fixtures;

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

use artres::resource::{
    CannotLocateLocalRepository, FinderChainBuilder, LocallyAvailableResourceCandidates,
    LocallyAvailableResourceFinder,
};
use fixtures::{lib_jar, EmptyStore, FixedLocator};
use tempfile::TempDir;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::Layer;

const WARNING: &str = "Unable to locate local Maven repository.";

/// Counts WARN events carrying the local repository warning.
struct WarningCounter(Arc<AtomicUsize>);

struct MessageVisitor(Option<String>);

impl Visit for MessageVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.0 = Some(format!("{value:?}"));
        }
    }
}

impl<S: Subscriber> Layer<S> for WarningCounter {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if *event.metadata().level() != Level::WARN {
            return;
        }
        let mut visitor = MessageVisitor(None);
        event.record(&mut visitor);
        if visitor.0.as_deref() == Some(WARNING) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }
}

// =============================================================================
// Test 1: concurrent queries warn exactly once
// =============================================================================

#[test]
fn test_missing_local_repository_warns_once() {
    let warnings = Arc::new(AtomicUsize::new(0));
    let subscriber = tracing_subscriber::registry().with(WarningCounter(Arc::clone(&warnings)));
    tracing::subscriber::set_global_default(subscriber).unwrap();

    let home = TempDir::new().unwrap();
    let chain = FinderChainBuilder::new(home.path().join("caches"), Arc::new(EmptyStore))
        .with_local_repository(Arc::new(FixedLocator(Err(
            CannotLocateLocalRepository::NoUserHome,
        ))))
        .build()
        .unwrap();
    let chain = Arc::new(chain);

    const THREADS: usize = 100;
    let barrier = Arc::new(Barrier::new(THREADS));
    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let chain = Arc::clone(&chain);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                let candidates = chain.find_candidates(&lib_jar());
                assert!(candidates.is_none());
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(warnings.load(Ordering::SeqCst), 1);

    // Later queries stay silent
    assert!(chain.find_candidates(&lib_jar()).is_none());
    assert_eq!(warnings.load(Ordering::SeqCst), 1);
}
