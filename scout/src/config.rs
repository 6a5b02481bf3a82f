//! Caller-supplied tuning: threshold, debounce delay and field weights.
//!
//! The engine hard-codes none of these so the same scorer can serve several
//! record kinds. Tables are loaded once and never mutated afterwards.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::interface::SearchError;
use crate::models::{ACCOUNT_WEIGHTS, POST_WEIGHTS};

/// Records scoring strictly below this are dropped from active results.
pub const DEFAULT_MIN_SCORE: f64 = 22.0;

/// Quiet window before a typed query is evaluated.
pub const DEFAULT_DEBOUNCE_MS: u64 = 220;

/// Field name to weight. Unknown fields weigh 0 and are effectively ignored.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldWeights(BTreeMap<String, f64>);

impl FieldWeights {
    pub fn new<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, f64)>,
        K: Into<String>,
    {
        Self(entries.into_iter().map(|(k, w)| (k.into(), w)).collect())
    }

    pub fn weight(&self, field: &str) -> f64 {
        self.0.get(field).copied().unwrap_or(0.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(k, w)| (k.as_str(), *w))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn validate(&self) -> Result<(), SearchError> {
        for (field, weight) in self.iter() {
            if !weight.is_finite() || weight <= 0.0 {
                return Err(SearchError::InvalidConfig(format!(
                    "weight for field '{field}' must be a positive number, got {weight}"
                )));
            }
        }
        Ok(())
    }
}

fn default_min_score() -> f64 {
    DEFAULT_MIN_SCORE
}

fn default_debounce_ms() -> u64 {
    DEFAULT_DEBOUNCE_MS
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_min_score")]
    pub min_score: f64,
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    pub weights: FieldWeights,
}

impl SearchConfig {
    pub fn new(weights: FieldWeights) -> Self {
        Self {
            min_score: DEFAULT_MIN_SCORE,
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            weights,
        }
    }

    /// Default tuning for account mappings.
    pub fn accounts() -> Self {
        Self::new(ACCOUNT_WEIGHTS.clone())
    }

    /// Default tuning for crossposted messages.
    pub fn posts() -> Self {
        Self::new(POST_WEIGHTS.clone())
    }

    pub fn with_min_score(mut self, min_score: f64) -> Self {
        self.min_score = min_score;
        self
    }

    pub fn with_debounce_ms(mut self, debounce_ms: u64) -> Self {
        self.debounce_ms = debounce_ms;
        self
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn from_json_str(json: &str) -> Result<Self, SearchError> {
        let config: SearchConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SearchError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<(), SearchError> {
        if !self.min_score.is_finite() || self.min_score < 0.0 {
            return Err(SearchError::InvalidConfig(format!(
                "min_score must be a non-negative number, got {}",
                self.min_score
            )));
        }
        self.weights.validate()
    }
}
