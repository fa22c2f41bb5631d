//! Finder Chain Tests
//!
//! Searching the current file store, historical cache layouts and the local
//! Maven repository for a copy of an artifact with known content.

mod fixtures;

use std::fs;
use std::sync::Arc;

use artres::resource::{
    FinderChainBuilder, HashValue, LocallyAvailableResourceCandidates,
    LocallyAvailableResourceFinder,
};
use artres_store::FileStore;
use fixtures::{lib_jar, write_file, EmptyStore, FixedLocator, FixedStore};
use tempfile::TempDir;

// =============================================================================
// Test 1: earlier finders win when several hold the content
// =============================================================================

#[test]
fn test_same_content_in_store_and_layout_prefers_store() {
    let caches = TempDir::new().unwrap();
    let store_copy = write_file(caches.path(), "store/lib-1.0.jar", b"library");
    let layout_copy = write_file(
        caches.path(),
        "artifacts-26/filestore/org.example/lib/1.0/jar/abc123/lib-1.0.jar",
        b"library",
    );

    let chain = FinderChainBuilder::new(caches.path(), Arc::new(FixedStore(vec![store_copy.clone()])))
        .build()
        .unwrap();
    let found = chain
        .find_candidates(&lib_jar())
        .find_by_hash_value(&HashValue::of_bytes(b"library"))
        .unwrap();

    assert_eq!(found.path(), store_copy);
    assert_ne!(found.path(), layout_copy);
}

// =============================================================================
// Test 2: later finders answer when earlier ones cannot
// =============================================================================

#[test]
fn test_content_only_in_layout_is_found() {
    let caches = TempDir::new().unwrap();
    let stale = write_file(caches.path(), "store/lib-1.0.jar", b"stale build");
    let layout_copy = write_file(
        caches.path(),
        "artifacts-26/filestore/org.example/lib/1.0/jar/abc123/lib-1.0.jar",
        b"library",
    );

    let chain = FinderChainBuilder::new(caches.path(), Arc::new(FixedStore(vec![stale])))
        .build()
        .unwrap();
    let candidates = chain.find_candidates(&lib_jar());

    let found = candidates
        .find_by_hash_value(&HashValue::of_bytes(b"library"))
        .unwrap();
    assert_eq!(found.path(), layout_copy);
    assert!(!candidates.is_none());
}

#[test]
fn test_no_match_when_content_differs_everywhere() {
    let caches = TempDir::new().unwrap();
    write_file(
        caches.path(),
        "artifacts-26/filestore/org.example/lib/1.0/jar/abc123/lib-1.0.jar",
        b"tampered",
    );

    let chain = FinderChainBuilder::new(caches.path(), Arc::new(EmptyStore))
        .build()
        .unwrap();
    let candidates = chain.find_candidates(&lib_jar());

    assert!(!candidates.is_none());
    assert!(candidates
        .find_by_hash_value(&HashValue::of_bytes(b"library"))
        .is_none());
}

// =============================================================================
// Test 3: layouts are probed when the chain is built
// =============================================================================

#[test]
fn test_absent_layout_is_not_searched() {
    let home = TempDir::new().unwrap();
    let caches = home.path().join("caches");
    fs::create_dir_all(&caches).unwrap();
    let chain = FinderChainBuilder::new(&caches, Arc::new(EmptyStore))
        .build()
        .unwrap();

    // Created after the chain was built
    write_file(home.path(), "cache/org.example/lib/jars/lib-1.0.jar", b"library");
    write_file(
        &caches,
        "artifacts-26/filestore/org.example/lib/1.0/jar/abc123/lib-1.0.jar",
        b"library",
    );

    assert_eq!(chain.delegates().len(), 1);
    let candidates = chain.find_candidates(&lib_jar());
    assert!(candidates.is_none());
    assert!(candidates
        .find_by_hash_value(&HashValue::of_bytes(b"library"))
        .is_none());
}

// =============================================================================
// Test 4: every historical layout shape resolves
// =============================================================================

#[test]
fn test_milestone_layouts() {
    let home = TempDir::new().unwrap();
    let caches = home.path().join("caches");
    fs::create_dir_all(&caches).unwrap();

    let m7 = write_file(
        &caches,
        "artifacts-7/artifacts/repo-id/org.example/lib/1.0/jar/lib-1.0.jar",
        b"m7",
    );
    let m6 = write_file(&caches, "artifacts-4/org.example/lib/some-resolver/jars/lib-1.0.jar", b"m6");
    let m6_pom = write_file(
        &caches,
        "artifacts-4/org.example/lib/some-resolver/pom.originals/lib-1.0.jar",
        b"m6 pom",
    );
    let m3 = write_file(home.path(), "cache/org.example/lib/jars/lib-1.0.jar", b"m3");

    let chain = FinderChainBuilder::new(&caches, Arc::new(EmptyStore))
        .build()
        .unwrap();
    let candidates = chain.find_candidates(&lib_jar());

    for (content, expected) in [
        (&b"m7"[..], &m7),
        (&b"m6"[..], &m6),
        (&b"m6 pom"[..], &m6_pom),
        (&b"m3"[..], &m3),
    ] {
        let found = candidates
            .find_by_hash_value(&HashValue::of_bytes(content))
            .unwrap();
        assert_eq!(&found.path().to_path_buf(), expected);
    }
}

// =============================================================================
// Test 5: the local Maven repository uses nested group directories
// =============================================================================

#[test]
fn test_local_maven_repository_lookup() {
    let caches = TempDir::new().unwrap();
    let repo = TempDir::new().unwrap();
    let jar = write_file(repo.path(), "org/example/lib/1.0/lib-1.0.jar", b"from maven");

    let chain = FinderChainBuilder::new(caches.path(), Arc::new(EmptyStore))
        .with_local_repository(Arc::new(FixedLocator(Ok(repo.path().to_path_buf()))))
        .build()
        .unwrap();

    let found = chain
        .find_candidates(&lib_jar())
        .find_by_hash_value(&HashValue::of_bytes(b"from maven"))
        .unwrap();
    assert_eq!(found.path(), jar);
}

// =============================================================================
// Test 6: the real file store is searched by artifact identity
// =============================================================================

#[test]
fn test_file_store_lookup() {
    let caches = TempDir::new().unwrap();
    let store = FileStore::new(caches.path().join("modules-2/files-2.1"));
    let stored = store
        .add(&lib_jar().store_key(), None, &b"stored library"[..])
        .unwrap();

    let chain = FinderChainBuilder::new(caches.path(), Arc::new(store))
        .build()
        .unwrap();

    let found = chain
        .find_candidates(&lib_jar())
        .find_by_hash_value(&HashValue::of_bytes(b"stored library"))
        .unwrap();
    assert_eq!(found.path(), stored.path);
}
