//! Concept store: bulk-loaded, id-keyed repository of learning concepts.
//!
//! The store is the sole owner of all concepts; scheduling state is only
//! ever mutated through the review transition, never by holding an alias
//! into the store.

use std::collections::HashMap;

use serde_json::Value;
use thiserror::Error;

use crate::types::{Concept, MasteryTier, MAX_DIFFICULTY, MIN_DIFFICULTY};

// ==================== Error Types ====================

/// Store errors: lookup misses and bulk-load failures
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("concept not found: {0}")]
    NotFound(String),

    #[error("duplicate concept id: {0}")]
    DuplicateId(String),

    #[error("invalid concept data: {0}")]
    Invalid(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

// ==================== Subject Summary ====================

/// Per-subject rollup of concept counts and mastery, for reporting
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct SubjectSummary {
    pub subject: String,
    pub total: usize,
    pub learning: usize,
    pub practicing: usize,
    pub mastered: usize,
    pub avg_mastery: f64,
    pub total_reviews: u64,
}

// ==================== ConceptStore ====================

/// Bulk-loaded concept repository.
///
/// Concepts keep their load order, so `by_subject` is deterministic across
/// runs for the same input.
#[derive(Debug, Clone)]
pub struct ConceptStore {
    concepts: Vec<Concept>,
    index: HashMap<String, usize>,
}

impl ConceptStore {
    /// Build a store from concept records.
    ///
    /// Fails fast on the first duplicate id or out-of-range difficulty;
    /// a failed load never yields a partially filled store. Pre-seeded
    /// scheduling fields are clamped into their invariant ranges.
    pub fn load<I>(records: I) -> StoreResult<Self>
    where
        I: IntoIterator<Item = Concept>,
    {
        let mut concepts: Vec<Concept> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for mut concept in records {
            if concept.id.is_empty() {
                return Err(StoreError::Invalid("empty concept id".to_string()));
            }
            if !(MIN_DIFFICULTY..=MAX_DIFFICULTY).contains(&concept.difficulty) {
                return Err(StoreError::Invalid(format!(
                    "concept {}: difficulty {} outside {}..={}",
                    concept.id, concept.difficulty, MIN_DIFFICULTY, MAX_DIFFICULTY
                )));
            }
            if index.contains_key(&concept.id) {
                return Err(StoreError::DuplicateId(concept.id));
            }
            concept.state.normalize();
            index.insert(concept.id.clone(), concepts.len());
            concepts.push(concept);
        }

        tracing::info!(count = concepts.len(), "concept store loaded");
        Ok(Self { concepts, index })
    }

    /// Build a store from the bulk-load mapping format: a JSON object from
    /// concept id to concept record.
    ///
    /// Each mapping key must equal its record's `id` field; records missing
    /// required fields are rejected.
    pub fn from_json(json: &str) -> StoreResult<Self> {
        let mapping: serde_json::Map<String, Value> = serde_json::from_str(json)
            .map_err(|e| StoreError::Invalid(format!("concept mapping parse failed: {e}")))?;

        let mut records = Vec::with_capacity(mapping.len());
        for (key, value) in mapping {
            let concept: Concept = serde_json::from_value(value)
                .map_err(|e| StoreError::Invalid(format!("concept {key}: {e}")))?;
            if concept.id != key {
                return Err(StoreError::Invalid(format!(
                    "mapping key {key} does not match concept id {}",
                    concept.id
                )));
            }
            records.push(concept);
        }
        Self::load(records)
    }

    /// Exact lookup by id
    pub fn get(&self, id: &str) -> StoreResult<&Concept> {
        self.index
            .get(id)
            .map(|&i| &self.concepts[i])
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    /// Mutable lookup, reserved for the review transition
    pub(crate) fn get_mut(&mut self, id: &str) -> StoreResult<&mut Concept> {
        match self.index.get(id) {
            Some(&i) => Ok(&mut self.concepts[i]),
            None => Err(StoreError::NotFound(id.to_string())),
        }
    }

    /// All concepts whose subject matches, in load order
    pub fn by_subject(&self, subject: &str) -> Vec<&Concept> {
        self.concepts
            .iter()
            .filter(|c| c.subject == subject)
            .collect()
    }

    /// Distinct subjects, in order of first appearance
    pub fn subjects(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for concept in &self.concepts {
            if !seen.contains(&concept.subject.as_str()) {
                seen.push(&concept.subject);
            }
        }
        seen
    }

    pub fn len(&self) -> usize {
        self.concepts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.concepts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Concept> {
        self.concepts.iter()
    }

    /// Tier counts, mean mastery and review totals for one subject
    pub fn subject_summary(&self, subject: &str) -> SubjectSummary {
        let pool = self.by_subject(subject);
        let mut summary = SubjectSummary {
            subject: subject.to_string(),
            total: pool.len(),
            ..Default::default()
        };

        let mut mastery_sum = 0.0;
        for concept in &pool {
            match concept.tier() {
                MasteryTier::Learning => summary.learning += 1,
                MasteryTier::Practicing => summary.practicing += 1,
                MasteryTier::Mastered => summary.mastered += 1,
            }
            mastery_sum += concept.state.mastery_level;
            summary.total_reviews += u64::from(concept.state.review_count);
        }
        if !pool.is_empty() {
            summary.avg_mastery = mastery_sum / pool.len() as f64;
        }
        summary
    }
}
