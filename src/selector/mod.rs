//! Interleaved selection: mastery-weighted, non-repeating session sampling.
//!
//! Selection walks three mastery buckets with fixed sampling weights so a
//! session mixes subjects' weak material with occasional review of strong
//! material, instead of drilling one concept until it sticks.
//!
//! Bucket weights express the product's pedagogy:
//! - low mastery (< 0.5) gets 60% of the probability mass
//! - mid mastery ([0.5, 0.8)) gets 30%
//! - high mastery (>= 0.8) gets 10%
//!
//! An empty bucket never absorbs a draw: the walk falls through to the next
//! non-empty bucket (low -> mid -> high), and past the last bucket to the
//! whole subject pool.

use std::collections::HashSet;

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

use crate::store::ConceptStore;
use crate::types::{Concept, MASTERED_THRESHOLD, PRACTICING_THRESHOLD};

// ==================== Constants ====================

/// Probability mass for the low-mastery bucket
const LOW_WEIGHT: f64 = 0.6;

/// Probability mass for the mid-mastery bucket
const MID_WEIGHT: f64 = 0.3;

/// Probability mass for the high-mastery bucket
const HIGH_WEIGHT: f64 = 0.1;

/// Draw budget per requested concept before falling back to a
/// deterministic fill
const DRAW_BUDGET_FACTOR: usize = 3;

// ==================== Options ====================

/// Selector tuning knobs; the defaults are the product contract
#[derive(Clone, Debug)]
pub struct SelectorOptions {
    pub low_weight: f64,
    pub mid_weight: f64,
    pub high_weight: f64,
    pub draw_budget_factor: usize,
    /// Fixed RNG seed for reproducible sessions; None seeds from entropy
    pub seed: Option<u64>,
}

impl Default for SelectorOptions {
    fn default() -> Self {
        Self {
            low_weight: LOW_WEIGHT,
            mid_weight: MID_WEIGHT,
            high_weight: HIGH_WEIGHT,
            draw_budget_factor: DRAW_BUDGET_FACTOR,
            seed: None,
        }
    }
}

// ==================== InterleavedSelector ====================

/// Mastery-weighted interleaved sampler over a [`ConceptStore`]
pub struct InterleavedSelector {
    rng: ChaCha8Rng,
    options: SelectorOptions,
}

impl Default for InterleavedSelector {
    fn default() -> Self {
        Self::new()
    }
}

impl InterleavedSelector {
    pub fn new() -> Self {
        Self::with_options(SelectorOptions::default())
    }

    /// Selector with a fixed seed, for reproducible sessions
    pub fn with_seed(seed: u64) -> Self {
        Self::with_options(SelectorOptions {
            seed: Some(seed),
            ..Default::default()
        })
    }

    pub fn with_options(options: SelectorOptions) -> Self {
        let rng = match options.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Self { rng, options }
    }

    /// Select up to `count` unique concepts for `subject`.
    ///
    /// The result length is `min(count, subject pool size)`; an unknown or
    /// empty subject yields an empty vec, never an error. Concepts are
    /// returned as snapshots of their current store state.
    pub fn select(&mut self, store: &ConceptStore, subject: &str, count: usize) -> Vec<Concept> {
        let pool = store.by_subject(subject);
        if pool.is_empty() || count == 0 {
            tracing::debug!(subject, requested = count, "no concepts selected");
            return Vec::new();
        }

        // Partition the pool once; mastery does not move mid-selection.
        let mut low: Vec<usize> = Vec::new();
        let mut mid: Vec<usize> = Vec::new();
        let mut high: Vec<usize> = Vec::new();
        for (i, concept) in pool.iter().enumerate() {
            let mastery = concept.state.mastery_level;
            if mastery < PRACTICING_THRESHOLD {
                low.push(i);
            } else if mastery < MASTERED_THRESHOLD {
                mid.push(i);
            } else {
                high.push(i);
            }
        }
        let buckets = [
            (&low, self.options.low_weight),
            (&mid, self.options.mid_weight),
            (&high, self.options.high_weight),
        ];
        let total_weight: f64 = buckets.iter().map(|(_, w)| w).sum();
        let all: Vec<usize> = (0..pool.len()).collect();

        let mut selected: Vec<Concept> = Vec::with_capacity(count.min(pool.len()));
        let mut selected_ids: HashSet<String> = HashSet::new();

        let budget = count.saturating_mul(self.options.draw_budget_factor);
        for _ in 0..budget {
            if selected.len() >= count {
                break;
            }

            let draw = self.rng.gen::<f64>() * total_weight;
            let mut cumulative = 0.0;
            let mut candidates: &[usize] = &all;
            for (bucket, weight) in &buckets {
                cumulative += weight;
                if cumulative > draw && !bucket.is_empty() {
                    candidates = bucket.as_slice();
                    break;
                }
            }

            let picked = pool[candidates[self.rng.gen_range(0..candidates.len())]];
            if selected_ids.insert(picked.id.clone()) {
                selected.push(picked.clone());
            }
        }

        // Draw budget exhausted: top up deterministically in load order.
        if selected.len() < count {
            for concept in &pool {
                if selected.len() >= count {
                    break;
                }
                if selected_ids.insert(concept.id.clone()) {
                    selected.push((*concept).clone());
                }
            }
        }

        tracing::debug!(
            subject,
            requested = count,
            selected = selected.len(),
            "interleaved selection complete"
        );
        selected
    }
}
