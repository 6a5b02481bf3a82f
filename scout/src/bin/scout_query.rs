//! Rank a JSON inventory against a query from the command line.
//!
//! Run with: cargo run --bin scout-query -- nvidia --records accounts.json
//!
//! Set RUST_LOG=scout=trace to see per-pass ranking summaries.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use serde::de::DeserializeOwned;
use tracing_subscriber::EnvFilter;

use scout::{explain_record, rank_scored, AccountCandidate, PostCandidate, Query, SearchConfig, SearchRecord};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Kind {
    Accounts,
    Posts,
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Free-text query, typed as a user would
    query: String,

    /// JSON array of records to search
    #[arg(short, long)]
    records: PathBuf,

    /// Record kind stored in the records file
    #[arg(short, long, value_enum, default_value_t = Kind::Accounts)]
    kind: Kind,

    /// JSON tuning file (min_score, debounce_ms, weights); defaults per kind
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print at most this many results
    #[arg(short, long)]
    limit: Option<usize>,

    /// Show the weighted per-field breakdown under each result
    #[arg(long)]
    explain: bool,
}

fn load_records<R: DeserializeOwned>(path: &Path) -> Result<Vec<R>> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read records from {}", path.display()))?;
    serde_json::from_str(&json).with_context(|| format!("Failed to parse records in {}", path.display()))
}

fn print_ranked<R: SearchRecord + Sync>(records: &[R], args: &Args, config: &SearchConfig) {
    let query = Query::new(args.query.as_str());
    let ranked = rank_scored(records, query.raw(), config);
    let limit = args.limit.unwrap_or(ranked.len());

    if ranked.is_empty() {
        println!("No matches for {:?}.", query.raw());
        return;
    }

    for (i, entry) in ranked.iter().take(limit).enumerate() {
        match entry.score {
            Some(score) => println!("{:>3}. {:>8.2}  {}", i + 1, score, entry.record.tie_break_key()),
            None => println!("{:>3}. {:>8}  {}", i + 1, "-", entry.record.tie_break_key()),
        }

        if args.explain && entry.score.is_some() {
            for line in explain_record(entry.record, &query, &config.weights) {
                println!(
                    "       {:<18} raw {:>7.2} x {:<4} = {:>7.2}",
                    line.field, line.raw_score, line.weight, line.weighted_score
                );
            }
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => SearchConfig::from_path(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => match args.kind {
            Kind::Accounts => SearchConfig::accounts(),
            Kind::Posts => SearchConfig::posts(),
        },
    };

    match args.kind {
        Kind::Accounts => {
            let records: Vec<AccountCandidate> = load_records(&args.records)?;
            print_ranked(&records, &args, &config);
        }
        Kind::Posts => {
            let records: Vec<PostCandidate> = load_records(&args.records)?;
            print_ranked(&records, &args, &config);
        }
    }

    Ok(())
}
