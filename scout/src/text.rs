//! Text normalization, tokenization and character shingles.
//!
//! Everything compared by the scorers goes through [`normalize`] first, so
//! query and field values share one canonical alphabet: lowercase ASCII
//! letters and digits, the handle punctuation `@ # . _ -`, and single spaces.

use std::collections::HashSet;

/// Whether a lowercased character survives normalization.
fn is_allowed(c: char) -> bool {
    c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '@' | '#' | '.' | '_' | '-')
}

/// Canonicalize raw text for comparison.
///
/// Lowercases, drops every character outside the allow-list, collapses
/// whitespace runs to a single space and trims both ends. Total and
/// idempotent: `normalize(&normalize(s)) == normalize(s)`.
pub fn normalize(text: &str) -> String {
    let filtered: String = text
        .to_lowercase()
        .chars()
        .filter(|&c| is_allowed(c) || c.is_whitespace())
        .collect();

    let mut out = String::with_capacity(filtered.len());
    for word in filtered.split_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
    }
    out
}

/// Split normalized text on single spaces, dropping empty tokens.
pub fn tokenize(normalized: &str) -> Vec<String> {
    normalized
        .split(' ')
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

/// Character bigram set of `s`.
///
/// A one-character string yields a set holding that character so single
/// letter queries stay comparable; an empty string yields the empty set.
pub fn bigrams(s: &str) -> HashSet<String> {
    let chars: Vec<char> = s.chars().collect();
    match chars.len() {
        0 => HashSet::new(),
        1 => HashSet::from([chars[0].to_string()]),
        _ => chars.windows(2).map(|pair| pair.iter().collect()).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(items: &[&str]) -> HashSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_normalize_lowercases_and_filters() {
        assert_eq!(normalize("Hello, World!"), "hello world");
        assert_eq!(normalize("@Jack_Dorsey"), "@jack_dorsey");
        assert_eq!(normalize("#Rust-Lang v1.2"), "#rust-lang v1.2");
    }

    #[test]
    fn test_normalize_collapses_whitespace() {
        assert_eq!(normalize("  nvidia \t\n  news  "), "nvidia news");
        // Removed characters can leave adjacent spaces behind; they collapse too
        assert_eq!(normalize("a ! b"), "a b");
    }

    #[test]
    fn test_normalize_drops_non_ascii() {
        assert_eq!(normalize("café ☕ time"), "caf time");
        assert_eq!(normalize("日本語"), "");
    }

    #[test]
    fn test_normalize_empty() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   "), "");
        assert_eq!(normalize("!!!"), "");
    }

    #[test]
    fn test_normalize_idempotent() {
        let inputs = [
            "",
            "Hello World",
            "  mixed\tCASE  and   SPACES ",
            "@user.bsky.social",
            "Ünïcödé — dashes… and ‘quotes’",
            "x\u{00A0}y",
            "KELVIN \u{212A}",
        ];
        for input in inputs {
            let once = normalize(input);
            assert_eq!(normalize(&once), once, "not idempotent for {:?}", input);
        }
    }

    #[test]
    fn test_tokenize() {
        assert_eq!(tokenize("nvidia news"), vec!["nvidia", "news"]);
        assert_eq!(tokenize("single"), vec!["single"]);
        assert!(tokenize("").is_empty());
    }

    #[test]
    fn test_bigrams() {
        assert_eq!(bigrams(""), HashSet::new());
        assert_eq!(bigrams("a"), set(&["a"]));
        assert_eq!(bigrams("ab"), set(&["ab"]));
        assert_eq!(bigrams("abc"), set(&["ab", "bc"]));
    }

    #[test]
    fn test_bigrams_collapse_duplicates() {
        // "aaaa" has three windows, all "aa"
        assert_eq!(bigrams("aaaa"), set(&["aa"]));
        assert_eq!(bigrams("abab"), set(&["ab", "ba"]));
    }
}
