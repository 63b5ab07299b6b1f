//! # lexprep-core - study-scheduling engine for legal concept review
//!
//! This crate implements the scheduling core of a single-learner study
//! tool over a fixed corpus of legal concepts:
//!
//! - **Concept store** - bulk-loaded knowledge graph of concepts with
//!   per-concept scheduling state
//! - **Interleaved selection** - mastery-weighted, non-repeating session
//!   sampling
//! - **Spaced repetition** - deterministic per-review state transition
//!   (mastery, ease factor, interval)
//! - **Performance ledger** - append-only review log with windowed
//!   per-subject accuracy aggregation
//!
//! Design goals:
//! - **Pure computation layer** - stores are passed in explicitly; no
//!   process-wide singletons, no hidden I/O beyond the ledger backend
//! - **Opaque content** - rule text, elements and traps ride along in an
//!   uninterpreted payload
//! - **Deterministic where it matters** - seedable selection, stable load
//!   order, exact transition arithmetic
//!
//! ## Module structure
//!
//! - [`types`] - concepts, scheduling state, mastery tiers, shared constants
//! - [`store`] - bulk-loaded concept repository
//! - [`selector`] - mastery-weighted interleaved sampling
//! - [`review`] - spaced-repetition state transition
//! - [`ledger`] - append-only event sink and accuracy stats
//! - [`engine`] - session facade over the above
//!
//! ## Usage example
//!
//! ```rust
//! use lexprep_core::{
//!     Concept, ConceptStore, MemoryEventStore, PerformanceLedger, StudyEngine,
//! };
//! use serde_json::json;
//!
//! let store = ConceptStore::load(vec![
//!     Concept::new("t-negligence", "torts", 3, json!({"rule": "duty, breach, causation, damages"})),
//!     Concept::new("t-battery", "torts", 2, json!({"rule": "intentional harmful contact"})),
//! ])
//! .unwrap();
//!
//! let ledger = PerformanceLedger::new(MemoryEventStore::new());
//! let mut engine = StudyEngine::new(store, ledger);
//!
//! let session = engine.start_session("torts", 2);
//! for concept in &session {
//!     engine.submit_review(&concept.id, true).unwrap();
//! }
//! let stats = engine.recent_stats().unwrap();
//! assert_eq!(stats["torts"].total, 2);
//! ```

pub mod engine;
pub mod ledger;
pub mod review;
pub mod selector;
pub mod store;
pub mod types;

pub use types::*;

pub use store::{ConceptStore, StoreError, StoreResult, SubjectSummary};

pub use selector::{InterleavedSelector, SelectorOptions};

pub use review::{
    apply_grade, apply_review, grade_passes, review_concept, ReviewOutcome, MAX_GRADE,
    PASSING_GRADE,
};

pub use ledger::{
    EventStore, FileEventStore, LedgerError, LedgerResult, MemoryEventStore, PerformanceEvent,
    PerformanceLedger, SubjectStats, DEFAULT_WINDOW_DAYS,
};

pub use engine::{EngineError, EngineResult, StudyEngine};
