//! Integration Tests: end-to-end memory flows.
//!
//! Record → search → consolidate → stats, against the SQLite store on disk.

use std::sync::Arc;

use chrono::{Duration, Utc};

use recollect_core::config::{RecollectConfig, StoreConfig};
use recollect_core::store::{MemoryStore, RecordStore, SqliteStore};
use recollect_core::types::{EmotionTarget, EmotionalState, TimeRange};
use recollect_core::{MemoryManager, MemoryQuery};

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

fn on_disk() -> (MemoryManager, tempfile::TempDir) {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = RecollectConfig {
        store: StoreConfig {
            path: dir.path().join("memory.db"),
            ..StoreConfig::default()
        },
        ..RecollectConfig::default()
    };
    let manager = MemoryManager::open(config).expect("open");
    (manager, dir)
}

// ---------------------------------------------------------------------------
// Store and retrieve
// ---------------------------------------------------------------------------

#[tokio::test]
async fn stores_and_retrieves_work_interaction() {
    let (manager, _dir) = on_disk();

    let id = manager
        .record_interaction(
            strings(&["logan", "aton"]),
            "work",
            strings(&[
                "Discussed digital personhood architecture",
                "Created implementation plan",
            ]),
            EmotionalState::new(0.7, 0.5, 0.6).with_emotions(["joy", "curiosity"]),
            "Successfully designed complete system for agent autonomy",
        )
        .expect("record");

    assert_eq!(id.to_string().len(), 36);

    let results = manager
        .search(&MemoryQuery::new().context("work").limit(10))
        .expect("search");

    assert_eq!(results.len(), 1);
    let hit = &results[0];
    assert_eq!(hit.record.id, id);
    assert_eq!(hit.record.participants, strings(&["logan", "aton"]));
    assert_eq!(hit.record.context, "work");
    assert!(hit.record.significance > 0.5);
    assert!(hit.record.emotions.specific_emotions.contains("curiosity"));
    assert_eq!(hit.match_reasons[0], "context match: work");

    manager.close().await;
}

// ---------------------------------------------------------------------------
// Significance floors
// ---------------------------------------------------------------------------

#[tokio::test]
async fn significance_floor_separates_breakthrough_from_greeting() {
    let (manager, _dir) = on_disk();

    let high = manager
        .record_interaction(
            strings(&["alice", "bob"]),
            "learning",
            strings(&[
                "Discovered major breakthrough in AI reasoning",
                "Realized fundamental flaw in previous approach",
            ]),
            EmotionalState::new(0.9, 0.8, 0.7).with_emotions(["excitement", "insight"]),
            "Learned that previous assumptions were wrong and developed new framework",
        )
        .expect("record high");

    let low = manager
        .record_interaction(
            strings(&["alice"]),
            "casual",
            strings(&["Said hello"]),
            EmotionalState::new(0.1, 0.1, 0.5).with_emotions(["neutral"]),
            "Brief greeting",
        )
        .expect("record low");

    let high_rec = manager.get(high).expect("get").expect("present");
    let low_rec = manager.get(low).expect("get").expect("present");
    assert!(high_rec.significance > 0.7);
    assert!(low_rec.significance > 0.1 && low_rec.significance < 0.35);

    let strict = manager
        .search(&MemoryQuery::new().significance_floor(0.7))
        .expect("search");
    assert_eq!(strict.len(), 1);
    assert_eq!(strict[0].record.id, high);

    let loose = manager
        .search(&MemoryQuery::new().significance_floor(0.1))
        .expect("search");
    assert_eq!(loose.len(), 2);
    assert_eq!(loose[0].record.id, high);

    manager.close().await;
}

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

#[tokio::test]
async fn stats_count_by_context() {
    let (manager, _dir) = on_disk();

    manager
        .record_interaction(
            strings(&["test1"]),
            "work",
            strings(&["Work event"]),
            EmotionalState::new(0.5, 0.5, 0.5),
            "Work done",
        )
        .expect("record");
    manager
        .record_interaction(
            strings(&["test2"]),
            "social",
            strings(&["Social event"]),
            EmotionalState::new(0.7, 0.6, 0.6),
            "Had fun",
        )
        .expect("record");

    let stats = manager.stats().expect("stats");
    assert_eq!(stats.count, 2);
    assert_eq!(stats.group_counts.get("work"), Some(&1));
    assert_eq!(stats.group_counts.get("social"), Some(&1));
    assert!(stats.avg_significance > 0.0);

    manager.close().await;
}

// ---------------------------------------------------------------------------
// Consolidation through the manager
// ---------------------------------------------------------------------------

#[tokio::test]
async fn related_interactions_get_linked_after_flush() {
    let (manager, _dir) = on_disk();

    let first = manager
        .record_interaction(
            strings(&["logan"]),
            "work",
            strings(&["Sketched the storage schema"]),
            EmotionalState::new(0.3, 0.3, 0.5),
            "Schema draft ready",
        )
        .expect("record");
    let unrelated = manager
        .record_interaction(
            strings(&["mira"]),
            "work",
            strings(&["Ordered lunch"]),
            EmotionalState::new(0.1, 0.1, 0.5),
            "Pizza",
        )
        .expect("record");
    let second = manager
        .record_interaction(
            strings(&["aton"]),
            "work",
            strings(&["Reviewed storage schema"]),
            EmotionalState::new(0.3, 0.3, 0.5),
            "Approved",
        )
        .expect("record");

    manager.flush().await;

    let linked = manager.get(second).expect("get").expect("present");
    assert!(linked.links.contains(&first));
    assert!(!linked.links.contains(&unrelated));
    assert!(!linked.links.contains(&second));

    let lonely = manager.get(unrelated).expect("get").expect("present");
    assert!(lonely.links.is_empty());

    let stats = manager.queue_stats();
    assert_eq!(stats.scheduled, 3);
    assert_eq!(stats.completed, 3);
    assert_eq!(stats.failed, 0);

    manager.close().await;
}

#[tokio::test]
async fn links_survive_reopen() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = RecollectConfig {
        store: StoreConfig {
            path: dir.path().join("memory.db"),
            ..StoreConfig::default()
        },
        ..RecollectConfig::default()
    };

    let (a, b) = {
        let manager = MemoryManager::open(config.clone()).expect("open");
        let a = manager
            .record_interaction(strings(&["ada"]), "work", strings(&["x"]), EmotionalState::default(), "")
            .expect("record");
        let b = manager
            .record_interaction(strings(&["ada"]), "work", strings(&["y"]), EmotionalState::default(), "")
            .expect("record");
        manager.close().await;
        (a, b)
    };

    let store = SqliteStore::open(&config.store).expect("reopen");
    let rec = store.get(b).expect("get").expect("present");
    assert!(rec.links.contains(&a));
}

// ---------------------------------------------------------------------------
// Relevance through the manager
// ---------------------------------------------------------------------------

#[tokio::test]
async fn time_range_and_emotion_shape_ranking() {
    let store = Arc::new(MemoryStore::new());
    let manager = MemoryManager::new(store.clone(), RecollectConfig::default());

    let calm = manager
        .record_interaction(strings(&["ada"]), "work", vec![], EmotionalState::new(0.0, 0.0, 0.2), "")
        .expect("record");
    let bright = manager
        .record_interaction(strings(&["bob"]), "work", vec![], EmotionalState::new(0.0, 0.0, 0.9), "")
        .expect("record");

    let now = Utc::now();
    let query = MemoryQuery::new()
        .time_range(TimeRange::around(now, Duration::days(1)))
        .emotions(EmotionTarget::default().dominance(0.9))
        .participants(["bob"]);
    let results = manager.search(&query).expect("search");

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].record.id, bright);
    assert_eq!(results[1].record.id, calm);
    assert!(results.iter().all(|r| (0.0..=1.0).contains(&r.relevance_score)));
    assert!(results[0].match_reasons.iter().any(|r| r == "shared participants: bob"));
    assert!(!results[1].match_reasons.iter().any(|r| r.starts_with("shared participants")));

    manager.close().await;
}

#[tokio::test]
async fn broken_store_path_fails_open() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = RecollectConfig {
        store: StoreConfig {
            path: dir.path().join("no").join("such").join("dir.db"),
            ..StoreConfig::default()
        },
        ..RecollectConfig::default()
    };
    assert!(MemoryManager::open(config).is_err());
}

// ---------------------------------------------------------------------------
// Configuration file
// ---------------------------------------------------------------------------

#[tokio::test]
async fn manager_from_toml_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let db = dir.path().join("from_file.db");
    let cfg_path = dir.path().join("recollect.toml");
    std::fs::write(
        &cfg_path,
        format!(
            r#"
            [store]
            path = "{}"

            [search]
            default_limit = 2

            [consolidation]
            delay_ms = 0
            link_policy = "union"
            "#,
            db.display().to_string().replace('\\', "/")
        ),
    )
    .expect("write config");

    let config = RecollectConfig::from_file(&cfg_path).expect("load");
    assert_eq!(config.search.default_limit, 2);
    assert_eq!(config.consolidation.delay_ms, 0);

    let manager = MemoryManager::open(config).expect("open");
    for i in 0..4 {
        manager
            .record_interaction(strings(&["ada"]), "work", vec![format!("step {i}")], EmotionalState::default(), "")
            .expect("record");
    }
    assert_eq!(manager.search(&MemoryQuery::new()).expect("search").len(), 2);
    assert!(db.exists());

    manager.close().await;
}
