//! Session facade wiring the store, selector, updater and ledger together.
//!
//! A practice session is entirely caller-driven: request concepts, submit
//! each answer, read the aggregates. The engine owns the store and ledger
//! exclusively, so every scheduling-state mutation goes through the review
//! transition and every outcome lands in the ledger.

use std::collections::HashMap;

use chrono::Utc;
use thiserror::Error;

use crate::ledger::{
    EventStore, LedgerError, PerformanceLedger, SubjectStats, DEFAULT_WINDOW_DAYS,
};
use crate::review::{self, ReviewOutcome};
use crate::selector::InterleavedSelector;
use crate::store::{ConceptStore, StoreError, SubjectSummary};
use crate::types::Concept;

// ==================== Error Types ====================

/// Facade-level errors from either the store or the ledger
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),
}

pub type EngineResult<T> = Result<T, EngineError>;

// ==================== StudyEngine ====================

/// Single-learner study engine over one concept store and one ledger
pub struct StudyEngine<S: EventStore> {
    store: ConceptStore,
    selector: InterleavedSelector,
    ledger: PerformanceLedger<S>,
}

impl<S: EventStore> StudyEngine<S> {
    pub fn new(store: ConceptStore, ledger: PerformanceLedger<S>) -> Self {
        Self {
            store,
            selector: InterleavedSelector::new(),
            ledger,
        }
    }

    /// Engine with a custom selector (seeded sessions, tuned weights)
    pub fn with_selector(
        store: ConceptStore,
        selector: InterleavedSelector,
        ledger: PerformanceLedger<S>,
    ) -> Self {
        Self {
            store,
            selector,
            ledger,
        }
    }

    /// Select up to `count` unique concepts for a practice session.
    ///
    /// An unknown subject yields an empty vec; the front end decides how
    /// to message that.
    pub fn start_session(&mut self, subject: &str, count: usize) -> Vec<Concept> {
        self.selector.select(&self.store, subject, count)
    }

    /// Apply one answer: update the concept's scheduling state and append
    /// the outcome to the ledger.
    ///
    /// An unknown concept id fails before any state or ledger change; a
    /// ledger write failure propagates after the state update.
    pub fn submit_review(&mut self, concept_id: &str, correct: bool) -> EngineResult<ReviewOutcome> {
        let now = Utc::now();
        let outcome = review::review_concept(&mut self.store, concept_id, correct, now)?;
        self.ledger.record_at(now, &outcome.subject, correct)?;
        Ok(outcome)
    }

    /// Graded self-assessment variant; grade >= 3 counts as correct
    pub fn submit_graded(&mut self, concept_id: &str, grade: u8) -> EngineResult<ReviewOutcome> {
        self.submit_review(concept_id, review::grade_passes(grade))
    }

    /// Per-subject accuracy over the trailing window
    pub fn stats(&self, window_days: u32) -> EngineResult<HashMap<String, SubjectStats>> {
        Ok(self.ledger.stats(window_days)?)
    }

    /// Accuracy over the default 30-day window
    pub fn recent_stats(&self) -> EngineResult<HashMap<String, SubjectStats>> {
        self.stats(DEFAULT_WINDOW_DAYS)
    }

    /// Tier counts and mastery rollup for one subject
    pub fn subject_summary(&self, subject: &str) -> SubjectSummary {
        self.store.subject_summary(subject)
    }

    pub fn store(&self) -> &ConceptStore {
        &self.store
    }

    pub fn ledger(&self) -> &PerformanceLedger<S> {
        &self.ledger
    }
}
