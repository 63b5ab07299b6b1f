//! End-to-end session flow against the file-backed ledger:
//! bulk load -> select -> review -> aggregate, plus reopen and
//! corrupt-ledger behavior.

use lexprep_core::{
    ConceptStore, FileEventStore, InterleavedSelector, MasteryTier, PerformanceLedger, StudyEngine,
};

const CONCEPTS_JSON: &str = r#"{
    "t-negligence": {
        "id": "t-negligence",
        "subject": "torts",
        "difficulty": 3,
        "payload": {"rule": "duty, breach, causation, damages", "traps": ["eggshell plaintiff"]}
    },
    "t-battery": {
        "id": "t-battery",
        "subject": "torts",
        "difficulty": 2,
        "payload": {"rule": "intentional harmful or offensive contact"},
        "related_concepts": ["t-assault"]
    },
    "t-assault": {
        "id": "t-assault",
        "subject": "torts",
        "difficulty": 2,
        "payload": {"rule": "apprehension of imminent contact"}
    },
    "k-consideration": {
        "id": "k-consideration",
        "subject": "contracts",
        "difficulty": 4,
        "payload": {"rule": "bargained-for exchange"},
        "mastery_level": 0.85,
        "review_count": 9
    }
}"#;

fn file_engine(path: &std::path::Path) -> StudyEngine<FileEventStore> {
    let store = ConceptStore::from_json(CONCEPTS_JSON).unwrap();
    StudyEngine::with_selector(
        store,
        InterleavedSelector::with_seed(42),
        PerformanceLedger::new(FileEventStore::open(path).unwrap()),
    )
}

#[test]
fn test_full_session_flow() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ledger.jsonl");
    let mut engine = file_engine(&path);

    let session = engine.start_session("torts", 3);
    assert_eq!(session.len(), 3);

    let mut answers = session.iter().map(|c| c.id.clone());
    let first = answers.next().unwrap();
    let outcome = engine.submit_review(&first, true).unwrap();
    assert_eq!(outcome.review_count, 1);
    assert!(outcome.mastery_level > 0.0);
    for id in answers {
        engine.submit_review(&id, false).unwrap();
    }

    let stats = engine.recent_stats().unwrap();
    assert_eq!(stats["torts"].total, 3);
    assert_eq!(stats["torts"].correct, 1);
    assert!((stats["torts"].percentage - 100.0 / 3.0).abs() < 1e-9);

    // One JSON object per line on disk.
    let content = std::fs::read_to_string(&path).unwrap();
    assert_eq!(content.lines().count(), 3);
    for line in content.lines() {
        let value: serde_json::Value = serde_json::from_str(line).unwrap();
        assert!(value.get("timestamp").is_some());
        assert_eq!(value["subject"], "torts");
    }
}

#[test]
fn test_reopened_ledger_keeps_history() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ledger.jsonl");

    {
        let mut engine = file_engine(&path);
        engine.submit_review("t-battery", true).unwrap();
    }

    let mut engine = file_engine(&path);
    engine.submit_review("k-consideration", false).unwrap();

    let stats = engine.recent_stats().unwrap();
    assert_eq!(stats["torts"].total, 1);
    assert_eq!(stats["contracts"].total, 1);
}

#[test]
fn test_corrupt_ledger_line_does_not_block_stats() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ledger.jsonl");
    std::fs::write(&path, "{{{ broken line\n").unwrap();

    let mut engine = file_engine(&path);
    engine.submit_review("t-assault", true).unwrap();

    let stats = engine.recent_stats().unwrap();
    assert_eq!(stats.len(), 1);
    assert_eq!(stats["torts"].total, 1);
}

#[test]
fn test_count_above_pool_returns_whole_pool() {
    let dir = tempfile::tempdir().unwrap();
    let mut engine = file_engine(&dir.path().join("ledger.jsonl"));

    let session = engine.start_session("contracts", 10);
    assert_eq!(session.len(), 1);
    assert_eq!(session[0].id, "k-consideration");
    assert_eq!(session[0].tier(), MasteryTier::Mastered);

    assert!(engine.start_session("evidence", 5).is_empty());
}

#[test]
fn test_mastery_moves_selection_buckets() {
    let dir = tempfile::tempdir().unwrap();
    let mut engine = file_engine(&dir.path().join("ledger.jsonl"));

    // Drill one concept until it is mastered; its summary tier moves and
    // the other torts concepts stay in the learning tier.
    for _ in 0..8 {
        engine.submit_review("t-negligence", true).unwrap();
    }
    let summary = engine.subject_summary("torts");
    assert_eq!(summary.total, 3);
    assert_eq!(summary.mastered, 1);
    assert_eq!(summary.learning, 2);
    assert!(summary.avg_mastery > 0.0);
}
