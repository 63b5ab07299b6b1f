//! Append-only performance ledger and windowed accuracy aggregation.
//!
//! Events are newline-delimited JSON objects, one per review:
//! `{"timestamp": <RFC3339>, "subject": <string>, "correct": <bool>}`.
//! The ledger never mutates or deletes an event; it only appends and later
//! filters/aggregates. A failed append propagates to the caller and is not
//! retried here.
//!
//! Aggregation is the one place partial failure is tolerated: a corrupt
//! stored line is skipped with a warning so historical damage cannot block
//! new reporting.

use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ==================== Constants ====================

/// Stats window applied when the caller does not pick one
pub const DEFAULT_WINDOW_DAYS: u32 = 30;

// ==================== Error Types ====================

/// Ledger errors: append and encoding failures
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("ledger write failed: {0}")]
    Write(#[from] std::io::Error),

    #[error("event encode failed: {0}")]
    Encode(#[from] serde_json::Error),
}

pub type LedgerResult<T> = Result<T, LedgerError>;

// ==================== Event Types ====================

/// One recorded review outcome, immutable once appended
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceEvent {
    pub timestamp: DateTime<Utc>,
    pub subject: String,
    pub correct: bool,
}

/// Windowed accuracy for one subject
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SubjectStats {
    pub correct: u64,
    pub total: u64,
    pub percentage: f64,
}

// ==================== Event Store Backends ====================

/// Append-only line storage behind the ledger.
///
/// `append_line` must be durable before it returns; `lines` returns the
/// raw stored lines so corrupt-line tolerance stays in the aggregation
/// layer rather than in each backend.
pub trait EventStore {
    fn append_line(&mut self, line: &str) -> LedgerResult<()>;
    fn lines(&self) -> LedgerResult<Vec<String>>;
}

/// Newline-delimited JSON file backend.
///
/// The file is created on open and only ever appended to; every append is
/// flushed and synced before the write counts as complete.
pub struct FileEventStore {
    file: File,
    path: PathBuf,
}

impl FileEventStore {
    pub fn open<P: AsRef<Path>>(path: P) -> LedgerResult<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self { file, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl EventStore for FileEventStore {
    fn append_line(&mut self, line: &str) -> LedgerResult<()> {
        writeln!(self.file, "{line}")?;
        self.file.flush()?;
        self.file.sync_all()?;
        Ok(())
    }

    fn lines(&self) -> LedgerResult<Vec<String>> {
        let content = std::fs::read_to_string(&self.path)?;
        Ok(content.lines().map(str::to_string).collect())
    }
}

/// Vec-backed backend for tests and in-process embedding
#[derive(Debug, Clone, Default)]
pub struct MemoryEventStore {
    lines: Vec<String>,
}

impl MemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend pre-filled with raw lines, valid or not
    pub fn with_lines(lines: Vec<String>) -> Self {
        Self { lines }
    }
}

impl EventStore for MemoryEventStore {
    fn append_line(&mut self, line: &str) -> LedgerResult<()> {
        self.lines.push(line.to_string());
        Ok(())
    }

    fn lines(&self) -> LedgerResult<Vec<String>> {
        Ok(self.lines.clone())
    }
}

// ==================== PerformanceLedger ====================

/// Append-only event sink with windowed per-subject accuracy stats
pub struct PerformanceLedger<S: EventStore> {
    store: S,
}

impl<S: EventStore> PerformanceLedger<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn backend(&self) -> &S {
        &self.store
    }

    /// Append one event stamped with the current time
    pub fn record(&mut self, subject: &str, correct: bool) -> LedgerResult<()> {
        self.record_at(Utc::now(), subject, correct)
    }

    /// Append one event with an explicit timestamp (testing, backfill)
    pub fn record_at(
        &mut self,
        timestamp: DateTime<Utc>,
        subject: &str,
        correct: bool,
    ) -> LedgerResult<()> {
        let event = PerformanceEvent {
            timestamp,
            subject: subject.to_string(),
            correct,
        };
        let line = serde_json::to_string(&event)?;
        self.store.append_line(&line)
    }

    /// Per-subject accuracy over the trailing window.
    ///
    /// Only events with `timestamp >= now - window_days` count; a fresh
    /// ledger yields an empty map. Unparseable lines are skipped.
    pub fn stats(&self, window_days: u32) -> LedgerResult<HashMap<String, SubjectStats>> {
        let cutoff = Utc::now() - Duration::days(i64::from(window_days));
        let mut stats: HashMap<String, SubjectStats> = HashMap::new();

        for line in self.store.lines()? {
            if line.trim().is_empty() {
                continue;
            }
            let event: PerformanceEvent = match serde_json::from_str(&line) {
                Ok(event) => event,
                Err(err) => {
                    tracing::warn!(error = %err, "skipping corrupt ledger line");
                    continue;
                }
            };
            if event.timestamp < cutoff {
                continue;
            }
            let entry = stats.entry(event.subject).or_default();
            entry.total += 1;
            if event.correct {
                entry.correct += 1;
            }
        }

        for entry in stats.values_mut() {
            if entry.total > 0 {
                entry.percentage = 100.0 * entry.correct as f64 / entry.total as f64;
            }
        }
        Ok(stats)
    }
}
