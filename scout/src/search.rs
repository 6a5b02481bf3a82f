//! Composite record scoring and ranking.
//!
//! A record's relevance is its best weighted field score plus a fixed share
//! of every other field's weighted score, so one strong identifier hit beats
//! weak partial hits spread across several fields while corroborating fields
//! still nudge the order. Ranking filters by the configured threshold and
//! sorts by score, then by the record's tie-break key, so the same input
//! always yields the same order.

use std::cmp::Ordering;

use rayon::prelude::*;

use crate::config::{FieldWeights, SearchConfig};
use crate::interface::{FieldValue, RankedGroup, RankedRecord, RecordGroup, SearchRecord};
use crate::query::Query;
use crate::ranking::score_field;

/// Share of the non-maximal weighted field scores added to the best one.
pub const SECONDARY_MATCH_CREDIT: f64 = 0.24;

/// Per-field line of a score explanation.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldExplanation {
    pub field: &'static str,
    /// Best unweighted score across the field's values
    pub raw_score: f64,
    pub weight: f64,
    pub weighted_score: f64,
}

/// Best unweighted score for a field; lists score as their best item.
fn score_value(query: &Query, value: &FieldValue<'_>) -> f64 {
    match value {
        FieldValue::Absent => 0.0,
        FieldValue::Text(text) => score_field(query.normalized(), query.tokens(), text),
        FieldValue::List(items) => items
            .iter()
            .map(|item| score_field(query.normalized(), query.tokens(), item))
            .fold(0.0, f64::max),
    }
}

/// Weighted per-field scores, in the record's field order.
pub fn explain_record<R: SearchRecord + ?Sized>(
    record: &R,
    query: &Query,
    weights: &FieldWeights,
) -> Vec<FieldExplanation> {
    record
        .fields()
        .iter()
        .map(|field| {
            let raw_score = score_value(query, &field.value);
            let weight = weights.weight(field.name);
            FieldExplanation {
                field: field.name,
                raw_score,
                weight,
                weighted_score: raw_score * weight,
            }
        })
        .collect()
}

/// Combine a record's weighted field scores into one relevance number.
///
/// Callers skip this entirely when the query is empty.
pub fn score_record<R: SearchRecord + ?Sized>(record: &R, query: &Query, weights: &FieldWeights) -> f64 {
    let weighted: Vec<f64> = record
        .fields()
        .iter()
        .map(|field| score_value(query, &field.value) * weights.weight(field.name))
        .collect();

    let max_score = weighted.iter().copied().fold(0.0, f64::max);
    let total: f64 = weighted.iter().sum();
    max_score + (total - max_score) * SECONDARY_MATCH_CREDIT
}

/// Score ordering: higher first, then ascending case-insensitive tie key.
fn compare_ranked(a: (f64, &str), b: (f64, &str)) -> Ordering {
    b.0.total_cmp(&a.0).then_with(|| a.1.cmp(b.1))
}

pub(crate) fn rank_scored_query<'a, R>(
    records: &'a [R],
    query: &Query,
    config: &SearchConfig,
) -> Vec<RankedRecord<'a, R>>
where
    R: SearchRecord + Sync,
{
    if query.is_empty() {
        return records
            .iter()
            .map(|record| RankedRecord { record, score: None })
            .collect();
    }

    #[cfg(feature = "perf-log")]
    let t0 = std::time::Instant::now();

    // Indexed par_iter keeps input order, so the stable sort below still
    // falls back to inventory order for fully identical keys.
    let scores: Vec<f64> = records
        .par_iter()
        .map(|record| score_record(record, query, &config.weights))
        .collect();

    let mut retained: Vec<(f64, String, &'a R)> = records
        .iter()
        .zip(scores)
        .filter(|(_, score)| *score >= config.min_score)
        .map(|(record, score)| (score, record.tie_break_key().to_lowercase(), record))
        .collect();

    retained.sort_by(|a, b| compare_ranked((a.0, a.1.as_str()), (b.0, b.1.as_str())));

    tracing::trace!(
        query = query.normalized(),
        candidates = records.len(),
        retained = retained.len(),
        "ranked records"
    );

    #[cfg(feature = "perf-log")]
    tracing::debug!(
        elapsed_ms = t0.elapsed().as_secs_f64() * 1000.0,
        candidates = records.len(),
        "rank timing"
    );

    retained
        .into_iter()
        .map(|(score, _, record)| RankedRecord {
            record,
            score: Some(score),
        })
        .collect()
}

/// Filter and order records by relevance to `raw_query`, keeping scores.
///
/// An empty (after normalization) query returns every record in its given
/// order with no score.
pub fn rank_scored<'a, R>(records: &'a [R], raw_query: &str, config: &SearchConfig) -> Vec<RankedRecord<'a, R>>
where
    R: SearchRecord + Sync,
{
    rank_scored_query(records, &Query::new(raw_query), config)
}

/// Filter and order records by relevance to `raw_query`.
pub fn rank<'a, R>(records: &'a [R], raw_query: &str, config: &SearchConfig) -> Vec<&'a R>
where
    R: SearchRecord + Sync,
{
    rank_scored(records, raw_query, config)
        .into_iter()
        .map(|ranked| ranked.record)
        .collect()
}

/// Rank each group independently and drop groups left empty.
///
/// Group order is preserved. With an inactive query every group passes
/// through untouched, empty ones included.
pub fn rank_groups<'a, R>(
    groups: &'a [RecordGroup<R>],
    raw_query: &str,
    config: &SearchConfig,
) -> Vec<RankedGroup<'a, R>>
where
    R: SearchRecord + Sync,
{
    let query = Query::new(raw_query);
    groups
        .iter()
        .map(|group| RankedGroup {
            name: group.name.as_str(),
            records: rank_scored_query(&group.records, &query, config),
        })
        .filter(|group| query.is_empty() || !group.records.is_empty())
        .collect()
}
