mod common;

use common::*;
use proptest::prelude::*;
use std::sync::Arc;
use treeshift_engine::{EngineConfig, EngineError, RootGuard};
use treeshift_store::MemoryStore;

// ── Construction ────────────────────────────────────────────────

#[test]
fn empty_prefix_is_rejected() {
    assert!(matches!(RootGuard::new(""), Err(EngineError::InvalidGuard(_))));
    assert!(matches!(RootGuard::new("   "), Err(EngineError::InvalidGuard(_))));
}

#[test]
fn guard_serde_uses_plain_string() {
    let guard = RootGuard::new("fakeClubs").unwrap();
    let json = serde_json::to_string(&guard).unwrap();
    assert_eq!(json, "\"fakeClubs\"");

    let back: RootGuard = serde_json::from_str(&json).unwrap();
    assert_eq!(back.allowed_prefix(), "fakeClubs");
    assert!(serde_json::from_str::<RootGuard>("\"\"").is_err());
}

#[test]
fn engine_config_defaults() {
    let config = EngineConfig::default();
    assert_eq!(config.copy_page_size.get(), 50);

    let parsed: EngineConfig = serde_json::from_str("{}").unwrap();
    assert_eq!(parsed, config);
}

// ── Checks ──────────────────────────────────────────────────────

#[test]
fn prefix_match_is_textual() {
    let guard = RootGuard::new("fakeClubs").unwrap();
    assert!(guard.permits(&col("fakeClubs")));
    assert!(guard.permits(&col("fakeClubs/c1/roles")));
    assert!(guard.permits(&col("fakeClubsArchive")));
    assert!(!guard.permits(&col("prodClubs")));
    assert!(!guard.permits(&col("clubs/fakeClubs/roles")));
}

#[tokio::test]
async fn violation_happens_before_any_store_call() {
    let store = Arc::new(MemoryStore::new());
    seed_club(&store, "prodClubs/real", &["roles"], 3);
    let before = store.len();

    let err = engine_over(&store)
        .delete_collection(
            &col("prodClubs/real/roles"),
            &subs(&["roles"]),
            size(50),
            &RootGuard::new("fakeClubs").unwrap(),
        )
        .await
        .unwrap_err();

    assert!(err.is_guard_violation());
    match err {
        EngineError::GuardViolation {
            collection,
            allowed_prefix,
        } => {
            assert_eq!(collection, "prodClubs/real/roles");
            assert_eq!(allowed_prefix, "fakeClubs");
        }
        other => panic!("Expected GuardViolation, got {other:?}"),
    }
    assert!(store.calls().is_empty());
    assert_eq!(store.len(), before);
}

#[tokio::test]
async fn root_collection_outside_guard_is_refused() {
    let store = Arc::new(MemoryStore::new());
    seed_many(&store, "prodClubs", 4);

    let result = engine_over(&store)
        .delete_collection(
            &col("prodClubs"),
            &subs(&[]),
            size(50),
            &RootGuard::new("fakeClubs").unwrap(),
        )
        .await;

    assert!(result.unwrap_err().is_guard_violation());
    assert_eq!(store.collection_len(&col("prodClubs")), 4);
    assert!(store.calls().is_empty());
}

// ── Properties ──────────────────────────────────────────────────

proptest! {
    #[test]
    fn guard_never_touches_store_outside_root(
        root in "[a-z]{1,8}",
        other in "[A-Z]{1,8}",
        count in 0usize..20,
    ) {
        let store = Arc::new(MemoryStore::new());
        seed_many(&store, &other, count);

        let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
        let result = rt.block_on(
            engine_over(&store).delete_collection(
                &col(&other),
                &subs(&["roles"]),
                size(5),
                &RootGuard::new(root).unwrap(),
            ),
        );

        prop_assert!(result.unwrap_err().is_guard_violation());
        prop_assert!(store.calls().is_empty());
        prop_assert_eq!(store.len(), count);
    }
}
