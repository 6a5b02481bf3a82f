//! Scout Interface Definition
//!
//! Types shared between the scoring engine and the UI layer that hosts it.
//! Record kinds implement [`SearchRecord`]; the scorer is written once
//! against that capability and never against a concrete record type.

use thiserror::Error;

// ═══════════════════════════════════════════════════════════════════════════════
// RECORD CAPABILITY
// ═══════════════════════════════════════════════════════════════════════════════

/// Value of one named field on a candidate record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue<'a> {
    Absent,
    Text(&'a str),
    /// Multi-valued field (e.g. aliases). Scores as its best item.
    List(Vec<&'a str>),
}

impl<'a> FieldValue<'a> {
    pub fn optional(value: Option<&'a str>) -> Self {
        value.map_or(FieldValue::Absent, FieldValue::Text)
    }

    pub fn list<S: AsRef<str>>(values: &'a [S]) -> Self {
        FieldValue::List(values.iter().map(AsRef::as_ref).collect())
    }
}

/// A named field exposed by a record for scoring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field<'a> {
    pub name: &'static str,
    pub value: FieldValue<'a>,
}

impl<'a> Field<'a> {
    pub fn new(name: &'static str, value: FieldValue<'a>) -> Self {
        Self { name, value }
    }
}

/// Capability every searchable record kind provides.
///
/// Records are owned by the inventory; the engine only reads them.
pub trait SearchRecord {
    /// Ordered list of named fields. Weights come from the caller's table.
    fn fields(&self) -> Vec<Field<'_>>;

    /// Secondary sort key for score ties, compared case-insensitively.
    fn tie_break_key(&self) -> String;
}

// ═══════════════════════════════════════════════════════════════════════════════
// RANKED OUTPUT
// ═══════════════════════════════════════════════════════════════════════════════

/// A record in ranked output. `score` is `None` when search is inactive.
#[derive(Debug)]
pub struct RankedRecord<'a, R> {
    pub record: &'a R,
    pub score: Option<f64>,
}

impl<R> Clone for RankedRecord<'_, R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R> Copy for RankedRecord<'_, R> {}

/// A named partition of records, ranked independently.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordGroup<R> {
    pub name: String,
    pub records: Vec<R>,
}

impl<R> RecordGroup<R> {
    pub fn new(name: impl Into<String>, records: Vec<R>) -> Self {
        Self {
            name: name.into(),
            records,
        }
    }
}

/// Ranked output for one group.
#[derive(Debug, Clone)]
pub struct RankedGroup<'a, R> {
    pub name: &'a str,
    pub records: Vec<RankedRecord<'a, R>>,
}

// ═══════════════════════════════════════════════════════════════════════════════
// SESSION
// ═══════════════════════════════════════════════════════════════════════════════

/// Where a search session is in its debounce/evaluate cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchPhase {
    Idle,
    /// Quiet-period timer running
    Pending,
    /// Evaluation dispatched, result not yet arrived
    InFlight,
    Resolved,
}

/// Published by a session on its event channel.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchEvent<T> {
    /// An evaluation was dispatched; the busy indicator turns on.
    Started { generation: u64 },
    /// The current generation finished. `notice` is set when evaluation
    /// failed, in which case `results` is empty.
    Resolved {
        generation: u64,
        results: Vec<T>,
        notice: Option<String>,
    },
    /// The query was cleared; results and busy indicator reset.
    Cleared,
}

// ═══════════════════════════════════════════════════════════════════════════════
// ERRORS
// ═══════════════════════════════════════════════════════════════════════════════

/// Error type for Scout operations
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Search failed: {0}")]
    Evaluation(String),
    #[error("Invalid config: {0}")]
    InvalidConfig(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Operation cancelled")]
    Cancelled,
}
