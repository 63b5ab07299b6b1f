//! Spaced-repetition state transition applied once per review.
//!
//! The transition is a deterministic function of the prior state and a
//! binary correctness signal. Invariants (`mastery in [0,1]`,
//! `ease >= 1.3`, `interval >= 1`) are enforced by clamping inside the
//! transition, never by rejecting input.
//!
//! On a correct answer mastery approaches 1.0 asymptotically, the ease
//! factor grows, and the interval multiplies by the new ease factor. On a
//! miss mastery halves, the ease factor drops, and the interval resets to
//! an immediate re-review.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::store::{ConceptStore, StoreResult};
use crate::types::{MasteryTier, SchedulingState, MIN_EASE_FACTOR};

// ==================== Constants ====================

/// Fraction of the remaining gap to 1.0 gained per correct review
const MASTERY_GAIN_RATE: f64 = 0.3;

/// Fraction of mastery retained after a miss
const MISS_RETENTION: f64 = 0.5;

/// Ease factor reward for a correct review
const EASE_REWARD: f64 = 0.1;

/// Ease factor penalty for a miss
const EASE_PENALTY: f64 = 0.2;

/// Smallest self-assessment grade that counts as a correct recall
pub const PASSING_GRADE: u8 = 3;

/// Largest self-assessment grade
pub const MAX_GRADE: u8 = 5;

// ==================== Review Outcome ====================

/// Post-review snapshot returned to the caller for display
#[derive(Debug, Clone, Serialize)]
pub struct ReviewOutcome {
    pub concept_id: String,
    pub subject: String,
    pub correct: bool,
    pub mastery_level: f64,
    pub ease_factor: f64,
    pub interval: u32,
    pub review_count: u32,
    pub tier: MasteryTier,
}

// ==================== Transition ====================

/// Apply one review to a scheduling state.
///
/// Always succeeds; every resulting state satisfies the invariants.
pub fn apply_review(state: &mut SchedulingState, correct: bool, now: DateTime<Utc>) {
    state.review_count += 1;
    state.last_reviewed = Some(now);

    if correct {
        state.mastery_level =
            (state.mastery_level + (1.0 - state.mastery_level) * MASTERY_GAIN_RATE).min(1.0);
        state.ease_factor = (state.ease_factor + EASE_REWARD).max(MIN_EASE_FACTOR);
        state.interval = ((f64::from(state.interval) * state.ease_factor).round() as u32).max(1);
    } else {
        state.mastery_level = (state.mastery_level * MISS_RETENTION).max(0.0);
        state.ease_factor = (state.ease_factor - EASE_PENALTY).max(MIN_EASE_FACTOR);
        state.interval = 1;
    }
}

/// Whether a 0-5 self-assessment grade counts as a correct recall
pub fn grade_passes(grade: u8) -> bool {
    grade.min(MAX_GRADE) >= PASSING_GRADE
}

/// Graded variant: a 0-5 self-assessment maps onto the binary rule with
/// the SM-2 passing threshold (grade >= 3 counts as correct).
pub fn apply_grade(state: &mut SchedulingState, grade: u8, now: DateTime<Utc>) {
    apply_review(state, grade_passes(grade), now);
}

/// Apply one review to the concept with the given id.
///
/// The store is the only mutable path to scheduling state; an unknown id
/// surfaces as `NotFound`, never a silent no-op.
pub fn review_concept(
    store: &mut ConceptStore,
    concept_id: &str,
    correct: bool,
    now: DateTime<Utc>,
) -> StoreResult<ReviewOutcome> {
    let concept = store.get_mut(concept_id)?;
    apply_review(&mut concept.state, correct, now);
    Ok(ReviewOutcome {
        concept_id: concept.id.clone(),
        subject: concept.subject.clone(),
        correct,
        mastery_level: concept.state.mastery_level,
        ease_factor: concept.state.ease_factor,
        interval: concept.state.interval,
        review_count: concept.state.review_count,
        tier: concept.tier(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StoreError;
    use crate::types::Concept;
    use serde_json::json;

    fn fresh_state() -> SchedulingState {
        SchedulingState::default()
    }

    #[test]
    fn test_correct_then_incorrect_scenario() {
        let mut state = fresh_state();
        let now = Utc::now();

        apply_review(&mut state, true, now);
        assert!((state.mastery_level - 0.3).abs() < 1e-12);
        assert!((state.ease_factor - 2.6).abs() < 1e-12);
        assert_eq!(state.interval, 3); // round(1 * 2.6)
        assert_eq!(state.review_count, 1);
        assert_eq!(state.last_reviewed, Some(now));

        apply_review(&mut state, false, now);
        assert!((state.mastery_level - 0.15).abs() < 1e-12);
        assert!((state.ease_factor - 2.4).abs() < 1e-12);
        assert_eq!(state.interval, 1);
        assert_eq!(state.review_count, 2);
    }

    #[test]
    fn test_correct_streak_is_monotone_and_bounded() {
        let mut state = fresh_state();
        let now = Utc::now();

        let mut previous = state.mastery_level;
        for _ in 0..50 {
            apply_review(&mut state, true, now);
            assert!(state.mastery_level >= previous);
            assert!(state.mastery_level < 1.0, "finite correct streak never reaches 1.0");
            previous = state.mastery_level;
        }
        assert!(state.mastery_level > 0.99);
    }

    #[test]
    fn test_miss_always_resets_interval() {
        let mut state = fresh_state();
        let now = Utc::now();

        for _ in 0..6 {
            apply_review(&mut state, true, now);
        }
        assert!(state.interval > 1);

        apply_review(&mut state, false, now);
        assert_eq!(state.interval, 1);
    }

    #[test]
    fn test_ease_factor_never_drops_below_floor() {
        let mut state = fresh_state();
        let now = Utc::now();

        for _ in 0..20 {
            apply_review(&mut state, false, now);
            assert!(state.ease_factor >= MIN_EASE_FACTOR);
        }
        assert!((state.ease_factor - MIN_EASE_FACTOR).abs() < 1e-12);
    }

    #[test]
    fn test_interval_grows_with_ease() {
        let mut state = fresh_state();
        let now = Utc::now();

        let mut previous = state.interval;
        for _ in 0..8 {
            apply_review(&mut state, true, now);
            assert!(state.interval >= previous);
            previous = state.interval;
        }
    }

    #[test]
    fn test_grade_maps_onto_binary_rule() {
        let now = Utc::now();

        let mut graded = fresh_state();
        apply_grade(&mut graded, 4, now);
        let mut binary = fresh_state();
        apply_review(&mut binary, true, now);
        assert_eq!(graded, binary);

        let mut graded = fresh_state();
        apply_grade(&mut graded, 2, now);
        let mut binary = fresh_state();
        apply_review(&mut binary, false, now);
        assert_eq!(graded, binary);

        // Out-of-range grades are clamped, not rejected.
        let mut graded = fresh_state();
        apply_grade(&mut graded, 9, now);
        assert!(graded.mastery_level > 0.0);
    }

    #[test]
    fn test_review_concept_unknown_id_is_not_found() {
        let mut store =
            ConceptStore::load(vec![Concept::new("c1", "torts", 3, json!(null))]).unwrap();
        let result = review_concept(&mut store, "missing", true, Utc::now());
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }

    #[test]
    fn test_review_concept_mutates_store_state() {
        let mut store =
            ConceptStore::load(vec![Concept::new("c1", "torts", 3, json!(null))]).unwrap();
        let outcome = review_concept(&mut store, "c1", true, Utc::now()).unwrap();
        assert_eq!(outcome.review_count, 1);
        assert_eq!(outcome.tier, MasteryTier::Learning);
        assert_eq!(store.get("c1").unwrap().state.review_count, 1);
    }
}
