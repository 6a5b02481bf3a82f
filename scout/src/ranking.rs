//! Multi-signal field scoring.
//!
//! A single (query, field value) pair is scored by summing four signals that
//! deliberately overlap:
//!
//! 1. literal match: exact > prefix > substring (first match wins)
//! 2. token coverage: per-token containment bonus plus a coverage ratio
//! 3. ordered subsequence: query characters found in order, gaps allowed
//! 4. bigram similarity: Dice coefficient over character shingles
//!
//! The constants are empirically tuned and asserted literally by tests.
//! An exact hit (170) plus fuzzy credit dominates everything; a substring hit
//! (108) plus partial fuzzy credit still outranks a weak multi-token match.

use crate::text::{bigrams, normalize};

pub const EXACT_MATCH_BONUS: f64 = 170.0;
pub const PREFIX_MATCH_BONUS: f64 = 138.0;
pub const SUBSTRING_MATCH_BONUS: f64 = 108.0;

/// Tokens at least this many characters long earn the long-token bonus.
pub const LONG_TOKEN_MIN_LEN: usize = 4;
pub const LONG_TOKEN_BONUS: f64 = 18.0;
pub const SHORT_TOKEN_BONUS: f64 = 12.0;
/// Multiplier for the matched/total token ratio.
pub const TOKEN_COVERAGE_WEIGHT: f64 = 46.0;

pub const SUBSEQUENCE_WEIGHT: f64 = 45.0;
pub const BIGRAM_WEIGHT: f64 = 52.0;

/// Which literal bucket a field value fell into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchKind {
    #[default]
    None,
    Substring,
    Prefix,
    Exact,
}

impl MatchKind {
    fn classify(query: &str, candidate: &str) -> Self {
        if candidate == query {
            MatchKind::Exact
        } else if candidate.starts_with(query) {
            MatchKind::Prefix
        } else if candidate.contains(query) {
            MatchKind::Substring
        } else {
            MatchKind::None
        }
    }

    pub fn bonus(self) -> f64 {
        match self {
            MatchKind::Exact => EXACT_MATCH_BONUS,
            MatchKind::Prefix => PREFIX_MATCH_BONUS,
            MatchKind::Substring => SUBSTRING_MATCH_BONUS,
            MatchKind::None => 0.0,
        }
    }
}

/// Per-signal contributions for one field value.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FieldScore {
    pub match_kind: MatchKind,
    pub literal: f64,
    pub token_coverage: f64,
    pub subsequence: f64,
    pub bigram: f64,
}

impl FieldScore {
    pub fn total(&self) -> f64 {
        self.literal + self.token_coverage + self.subsequence + self.bigram
    }
}

/// Fraction of `query` characters found in `candidate`, in order.
///
/// Greedy walk: each query character is searched for from the cursor onward;
/// a hit advances the cursor past it, a miss is skipped without moving the
/// cursor. Returns 0 for an empty query.
pub fn ordered_subsequence_score(query: &str, candidate: &str) -> f64 {
    let query_chars: Vec<char> = query.chars().collect();
    if query_chars.is_empty() {
        return 0.0;
    }
    let candidate_chars: Vec<char> = candidate.chars().collect();

    let mut cursor = 0;
    let mut matched = 0usize;
    for qc in &query_chars {
        if let Some(offset) = candidate_chars[cursor..].iter().position(|c| c == qc) {
            matched += 1;
            cursor += offset + 1;
        }
    }

    matched as f64 / query_chars.len() as f64
}

/// Dice coefficient over character bigram sets: `2|A∩B| / (|A|+|B|)`.
/// Zero when either side has no bigrams.
pub fn dice_coefficient(a: &str, b: &str) -> f64 {
    let set_a = bigrams(a);
    let set_b = bigrams(b);
    if set_a.is_empty() || set_b.is_empty() {
        return 0.0;
    }
    let shared = set_a.intersection(&set_b).count();
    2.0 * shared as f64 / (set_a.len() + set_b.len()) as f64
}

/// Score a raw field value against an already-normalized query and its tokens.
pub fn score_field(query: &str, tokens: &[String], field_value: &str) -> f64 {
    field_score_breakdown(query, tokens, field_value).total()
}

/// Same as [`score_field`] but keeps each signal separate.
pub fn field_score_breakdown(query: &str, tokens: &[String], field_value: &str) -> FieldScore {
    let candidate = normalize(field_value);
    if query.is_empty() || candidate.is_empty() {
        return FieldScore::default();
    }

    let match_kind = MatchKind::classify(query, &candidate);

    let mut token_coverage = 0.0;
    let mut matched_tokens = 0usize;
    for token in tokens {
        if candidate.contains(token.as_str()) {
            matched_tokens += 1;
            token_coverage += if token.chars().count() >= LONG_TOKEN_MIN_LEN {
                LONG_TOKEN_BONUS
            } else {
                SHORT_TOKEN_BONUS
            };
        }
    }
    if !tokens.is_empty() {
        token_coverage += matched_tokens as f64 / tokens.len() as f64 * TOKEN_COVERAGE_WEIGHT;
    }

    FieldScore {
        match_kind,
        literal: match_kind.bonus(),
        token_coverage,
        subsequence: ordered_subsequence_score(query, &candidate) * SUBSEQUENCE_WEIGHT,
        bigram: dice_coefficient(query, &candidate) * BIGRAM_WEIGHT,
    }
}
