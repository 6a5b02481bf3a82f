//! Search query with memoized derived state.
//!
//! Module isolation ensures no code outside this module can mutate `raw`
//! after construction, so the normalized form and the `OnceLock` token cache
//! can never go stale. A new keystroke builds a new `Query`.

use std::sync::OnceLock;

use crate::text::{normalize, tokenize};

/// A user-supplied query together with its normalized form.
/// `tokens()` is computed on first access and cached, so scoring every
/// field of every candidate reuses one token list.
#[derive(Debug, Clone)]
pub struct Query {
    raw: String,
    normalized: String,
    tokens: OnceLock<Vec<String>>,
}

impl Query {
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let normalized = normalize(&raw);
        Self {
            raw,
            normalized,
            tokens: OnceLock::new(),
        }
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn normalized(&self) -> &str {
        &self.normalized
    }

    pub fn tokens(&self) -> &[String] {
        self.tokens.get_or_init(|| tokenize(&self.normalized))
    }

    /// True when nothing survives normalization; search is inactive.
    pub fn is_empty(&self) -> bool {
        self.normalized.is_empty()
    }

    /// True when the raw input is only whitespace.
    pub fn is_blank(&self) -> bool {
        self.raw.trim().is_empty()
    }
}

impl PartialEq for Query {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl Eq for Query {}

impl From<&str> for Query {
    fn from(raw: &str) -> Self {
        Query::new(raw)
    }
}

impl From<String> for Query {
    fn from(raw: String) -> Self {
        Query::new(raw)
    }
}
