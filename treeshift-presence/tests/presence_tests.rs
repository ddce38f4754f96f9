use chrono::{DateTime, Duration, TimeZone, Utc};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use treeshift_presence::{
    DocumentPresenceStore, PresenceConfig, PresenceError, PresenceManager, PresenceObserver,
    PresencePolicy, PresenceSnapshot, PresenceState, PresenceStore, PresenceUpdate,
};
use treeshift_store::{FailureRule, MemoryStore, StoreOp};
use treeshift_types::{DocumentPath, FieldValue, Fields, FixedClock, PageSize};

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 9, 8, 12, 0, 0).unwrap()
}

fn doc(path: &str) -> DocumentPath {
    DocumentPath::parse(path).unwrap()
}

fn record(state: &str, last_seen: DateTime<Utc>) -> Fields {
    let mut f = Fields::new();
    f.insert("state".into(), FieldValue::from(state));
    f.insert("lastSeen".into(), FieldValue::from(last_seen));
    f
}

struct Harness {
    memory: Arc<MemoryStore>,
    clock: Arc<FixedClock>,
    store: Arc<DocumentPresenceStore>,
}

impl Harness {
    fn new() -> Self {
        Self::with_config(PresenceConfig::default())
    }

    fn with_config(config: PresenceConfig) -> Self {
        let memory = Arc::new(MemoryStore::new());
        let store = DocumentPresenceStore::new(memory.clone(), &config).unwrap();
        Self {
            memory,
            clock: Arc::new(FixedClock::new(t0())),
            store: Arc::new(store),
        }
    }

    fn manager(&self) -> PresenceManager {
        PresenceManager::new(self.store.clone(), self.clock.clone())
    }

    fn observer(&self) -> PresenceObserver {
        PresenceObserver::new(self.store.clone(), self.clock.clone())
    }
}

// ── Policy ──────────────────────────────────────────────────────

#[test]
fn policy_defaults() {
    let policy = PresencePolicy::default();
    assert_eq!(policy.online_ttl_seconds, 45);
    assert_eq!(policy.grace_seconds, 10);
    assert_eq!(policy.window(), Duration::seconds(55));
}

#[test]
fn policy_window_is_inclusive() {
    let policy = PresencePolicy::default();
    let seen = t0();

    assert!(policy.is_online(Some(seen), PresenceState::Online, seen + Duration::seconds(55)));
    assert!(!policy.is_online(Some(seen), PresenceState::Online, seen + Duration::seconds(56)));
}

#[test]
fn offline_and_never_seen_are_never_online() {
    let policy = PresencePolicy::default();
    assert!(!policy.is_online(Some(t0()), PresenceState::Offline, t0()));
    assert!(!policy.is_online(None, PresenceState::Online, t0()));
}

#[test]
fn background_counts_as_online_within_window() {
    let policy = PresencePolicy::default();
    assert!(policy.is_online(
        Some(t0()),
        PresenceState::Background,
        t0() + Duration::seconds(30)
    ));
}

#[test]
fn policy_serde_roundtrip() {
    let policy = PresencePolicy {
        online_ttl_seconds: 60,
        grace_seconds: 5,
    };
    let json = serde_json::to_string(&policy).unwrap();
    let back: PresencePolicy = serde_json::from_str(&json).unwrap();
    assert_eq!(back, policy);
}

#[test]
fn state_parsing_and_serde() {
    assert_eq!("online".parse::<PresenceState>().unwrap(), PresenceState::Online);
    assert_eq!("background".parse::<PresenceState>().unwrap(), PresenceState::Background);
    assert_eq!("away".parse::<PresenceState>().unwrap(), PresenceState::Unknown);
    assert_eq!(
        serde_json::to_string(&PresenceState::Offline).unwrap(),
        "\"offline\""
    );
}

#[test]
fn config_defaults() {
    let config: PresenceConfig = serde_json::from_str("{}").unwrap();
    assert_eq!(config.collection, "onlineUsers");
    assert_eq!(config.page_size, PageSize::default());
}

#[test]
fn config_with_invalid_collection_is_rejected() {
    let config = PresenceConfig {
        collection: "a/b".into(),
        ..Default::default()
    };
    let result = DocumentPresenceStore::new(Arc::new(MemoryStore::new()), &config);
    assert!(matches!(result, Err(PresenceError::InvalidPath(_))));
}

// ── Manager ─────────────────────────────────────────────────────

#[tokio::test]
async fn start_tracking_writes_full_record() {
    let h = Harness::new();

    h.manager()
        .start_tracking("u1", Some("device-7"), Some("2.3.0"))
        .await
        .unwrap();

    let stored = h.memory.get(&doc("onlineUsers/u1")).unwrap();
    let mut expected = Fields::new();
    expected.insert("uid".into(), FieldValue::from("u1"));
    expected.insert("state".into(), FieldValue::from("online"));
    expected.insert("lastSeen".into(), FieldValue::from(t0()));
    expected.insert("deviceID".into(), FieldValue::from("device-7"));
    expected.insert("appVersion".into(), FieldValue::from("2.3.0"));
    assert_eq!(stored, expected);
}

#[tokio::test]
async fn background_keeps_device_fields() {
    let h = Harness::new();
    let manager = h.manager();
    manager
        .start_tracking("u1", Some("device-7"), None)
        .await
        .unwrap();

    h.clock.advance(Duration::seconds(20));
    manager.mark_background("u1").await.unwrap();

    let stored = h.memory.get(&doc("onlineUsers/u1")).unwrap();
    assert_eq!(stored.get("state"), Some(&FieldValue::from("background")));
    assert_eq!(
        stored.get("lastSeen"),
        Some(&FieldValue::from(t0() + Duration::seconds(20)))
    );
    assert_eq!(stored.get("deviceID"), Some(&FieldValue::from("device-7")));
    assert!(!stored.contains_key("appVersion"));
}

#[tokio::test]
async fn foreground_after_background_is_online() {
    let h = Harness::new();
    let manager = h.manager();
    manager.mark_background("u1").await.unwrap();
    manager.mark_foreground("u1").await.unwrap();

    let snapshot = h.observer().member_presence("u1").await.unwrap().unwrap();
    assert_eq!(snapshot.state, PresenceState::Online);
}

#[tokio::test]
async fn stop_tracking_marks_offline() {
    let h = Harness::new();
    let manager = h.manager();
    manager.start_tracking("u1", None, None).await.unwrap();

    h.clock.advance(Duration::seconds(5));
    manager.stop_tracking("u1").await.unwrap();

    let snapshot = h.observer().member_presence("u1").await.unwrap().unwrap();
    assert_eq!(
        snapshot,
        PresenceSnapshot {
            uid: "u1".into(),
            state: PresenceState::Offline,
            last_seen: Some(t0() + Duration::seconds(5)),
        }
    );
}

#[tokio::test]
async fn write_failure_is_returned() {
    let h = Harness::new();
    h.memory
        .fail_on(FailureRule::always(StoreOp::Write, "onlineUsers/u1"));

    let err = h.manager().mark_foreground("u1").await.unwrap_err();
    assert!(matches!(err, PresenceError::Store(_)));
    assert!(!h.memory.contains(&doc("onlineUsers/u1")));
}

#[tokio::test]
async fn uid_with_slash_is_rejected_before_io() {
    let h = Harness::new();
    let err = h.manager().mark_foreground("a/b").await.unwrap_err();
    assert!(matches!(err, PresenceError::InvalidPath(_)));
    assert!(h.memory.calls().is_empty());
}

// ── Observer ────────────────────────────────────────────────────

#[tokio::test]
async fn unknown_member_has_no_presence() {
    let h = Harness::new();
    assert!(h.observer().member_presence("ghost").await.unwrap().is_none());
    assert!(!h
        .observer()
        .is_member_online("ghost", &PresencePolicy::default())
        .await
        .unwrap());
}

#[tokio::test]
async fn snapshot_falls_back_to_document_id() {
    let h = Harness::new();
    h.memory.seed(&doc("onlineUsers/u9"), record("online", t0()));

    let snapshot = h.observer().member_presence("u9").await.unwrap().unwrap();
    assert_eq!(snapshot.uid, "u9");
}

#[tokio::test]
async fn member_goes_stale_as_clock_moves() {
    let h = Harness::new();
    h.manager().start_tracking("u1", None, None).await.unwrap();
    let observer = h.observer();
    let policy = PresencePolicy::default();

    assert!(observer.is_member_online("u1", &policy).await.unwrap());
    h.clock.advance(Duration::seconds(56));
    assert!(!observer.is_member_online("u1", &policy).await.unwrap());
}

#[tokio::test]
async fn online_users_filters_by_state_and_age() {
    let h = Harness::new();
    let now = t0();
    h.memory.seed(&doc("onlineUsers/a"), record("online", now));
    h.memory.seed(&doc("onlineUsers/b"), record("background", now - Duration::seconds(50)));
    h.memory.seed(&doc("onlineUsers/c"), record("offline", now));
    h.memory.seed(&doc("onlineUsers/d"), record("online", now - Duration::seconds(120)));
    h.memory.seed(&doc("onlineUsers/e"), record("away", now));

    let online = h
        .observer()
        .online_users(&PresencePolicy::default())
        .await
        .unwrap();

    let uids: Vec<&str> = online.iter().map(|s| s.uid.as_str()).collect();
    assert_eq!(uids, vec!["a", "b"]);
}

#[tokio::test]
async fn online_users_pages_through_collection() {
    let h = Harness::with_config(PresenceConfig {
        page_size: PageSize::new(2).unwrap(),
        ..Default::default()
    });
    for i in 0..5 {
        h.memory
            .seed(&doc(&format!("onlineUsers/u{i}")), record("online", t0()));
    }

    let online = h
        .store
        .fetch_online_users(&PresencePolicy::default(), t0())
        .await
        .unwrap();

    assert_eq!(online.len(), 5);
    // 2 + 2 + 1
    assert_eq!(h.memory.calls_of(StoreOp::ListPage).len(), 3);
}

#[tokio::test]
async fn set_presence_through_store_seam() {
    let h = Harness::new();
    let update = PresenceUpdate {
        app_version: Some("1.0".into()),
        ..PresenceUpdate::new(PresenceState::Online, t0())
    };
    h.store.set_presence("u1", &update).await.unwrap();
    h.store
        .clear_presence("u1", t0() + Duration::seconds(1))
        .await
        .unwrap();

    let stored = h.memory.get(&doc("onlineUsers/u1")).unwrap();
    assert_eq!(stored.get("state"), Some(&FieldValue::from("offline")));
    assert_eq!(stored.get("appVersion"), Some(&FieldValue::from("1.0")));
}
