//! Scout - live fuzzy search over small in-memory inventories
//!
//! Ranks account mappings and crossposted messages against a free-text query
//! while the user types. Scoring is a weighted blend of literal, token,
//! subsequence and bigram similarity per field; a debounced session with a
//! generation guard keeps late or out-of-order results off the screen.

pub mod config;
pub mod interface;
pub mod models;
pub mod query;
pub mod ranking;
pub mod search;
pub mod session;
pub mod text;

pub use config::{FieldWeights, SearchConfig};
pub use interface::*;
pub use models::{AccountCandidate, PostCandidate};
pub use query::Query;
pub use search::{explain_record, rank, rank_groups, rank_scored, score_record, FieldExplanation};
pub use session::{Evaluator, FnEvaluator, LocalEvaluator, SearchSession};
