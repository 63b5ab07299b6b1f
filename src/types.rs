//! Shared types and constants for the scheduling core.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ==================== Constants ====================

/// Ease factor assigned to a concept that has never been reviewed
pub const DEFAULT_EASE_FACTOR: f64 = 2.5;

/// Lower bound for the ease factor; reviews can never push it below this
pub const MIN_EASE_FACTOR: f64 = 1.3;

/// Mastery level at which a concept leaves the learning tier
pub const PRACTICING_THRESHOLD: f64 = 0.5;

/// Mastery level at which a concept counts as mastered
pub const MASTERED_THRESHOLD: f64 = 0.8;

/// Smallest allowed author-assigned difficulty
pub const MIN_DIFFICULTY: u8 = 1;

/// Largest allowed author-assigned difficulty
pub const MAX_DIFFICULTY: u8 = 5;

// ==================== Mastery Tiers ====================

/// Display tier derived from a concept's mastery level.
///
/// The cutoffs are shared with the selector's sampling buckets, so a
/// concept's tier always matches the bucket it is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MasteryTier {
    Learning,
    Practicing,
    Mastered,
}

impl MasteryTier {
    /// Tier for a mastery level in [0, 1]
    pub fn from_level(level: f64) -> Self {
        if level < PRACTICING_THRESHOLD {
            Self::Learning
        } else if level < MASTERED_THRESHOLD {
            Self::Practicing
        } else {
            Self::Mastered
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Learning => "learning",
            Self::Practicing => "practicing",
            Self::Mastered => "mastered",
        }
    }
}

// ==================== Scheduling State ====================

fn default_ease_factor() -> f64 {
    DEFAULT_EASE_FACTOR
}

fn default_interval() -> u32 {
    1
}

/// Per-concept mutable review state.
///
/// Every field carries a serde default so bulk-load records may omit any or
/// all of them; a record with no scheduling fields starts unseen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulingState {
    /// Normalized mastery in [0, 1]; 0 = unseen
    #[serde(default)]
    pub mastery_level: f64,
    /// Spaced-repetition ease factor, always >= MIN_EASE_FACTOR
    #[serde(default = "default_ease_factor")]
    pub ease_factor: f64,
    /// Session units until the next due review, always >= 1
    #[serde(default = "default_interval")]
    pub interval: u32,
    /// Total reviews seen, correct or not
    #[serde(default)]
    pub review_count: u32,
    /// Timestamp of the most recent review
    #[serde(default)]
    pub last_reviewed: Option<DateTime<Utc>>,
}

impl Default for SchedulingState {
    fn default() -> Self {
        Self {
            mastery_level: 0.0,
            ease_factor: DEFAULT_EASE_FACTOR,
            interval: 1,
            review_count: 0,
            last_reviewed: None,
        }
    }
}

impl SchedulingState {
    /// Force the invariants `mastery in [0,1]`, `ease >= 1.3`,
    /// `interval >= 1` onto pre-seeded values.
    pub(crate) fn normalize(&mut self) {
        self.mastery_level = self.mastery_level.clamp(0.0, 1.0);
        self.ease_factor = self.ease_factor.max(MIN_EASE_FACTOR);
        self.interval = self.interval.max(1);
    }

    pub fn tier(&self) -> MasteryTier {
        MasteryTier::from_level(self.mastery_level)
    }
}

// ==================== Concept ====================

/// A single learning unit: static authored content plus mutable
/// scheduling state.
///
/// `payload` is opaque to the core; the rule text, elements and traps it
/// carries are only ever handed back to the front end verbatim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Concept {
    /// Unique id, never reused
    pub id: String,
    /// Subject tag used for filtering and reporting
    pub subject: String,
    /// Author-assigned difficulty, 1..=5
    pub difficulty: u8,
    /// Opaque structured content
    pub payload: Value,
    /// Advisory ordering hints: ids that should be reviewed first
    #[serde(default)]
    pub prerequisites: Vec<String>,
    /// Advisory non-ordering hints
    #[serde(default)]
    pub related_concepts: Vec<String>,
    #[serde(flatten)]
    pub state: SchedulingState,
}

impl Concept {
    /// Concept with default (unseen) scheduling state
    pub fn new(
        id: impl Into<String>,
        subject: impl Into<String>,
        difficulty: u8,
        payload: Value,
    ) -> Self {
        Self {
            id: id.into(),
            subject: subject.into(),
            difficulty,
            payload,
            prerequisites: Vec::new(),
            related_concepts: Vec::new(),
            state: SchedulingState::default(),
        }
    }

    pub fn tier(&self) -> MasteryTier {
        self.state.tier()
    }
}
