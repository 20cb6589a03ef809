//! Keyword relevance scoring
//!
//! A posting's description is scored by keyword frequency: every keyword word
//! is looked up in a token multiset of the text, the hits are summed and
//! normalized by `keyword_count * token_count`, then scaled to
//! `[0, scale_factor]`.
//!
//! Keyword phrases are exploded into their words before matching, so
//! "revisar documentos" contributes "revisar" and "documentos" independently.

mod recency;

pub use recency::{classify_posted_at, RecencyBucket};

use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Upper bound of the relevance score
pub const SCALE_FACTOR: f64 = 5.0;

fn word_regex() -> &'static Regex {
    static WORD: OnceLock<Regex> = OnceLock::new();
    WORD.get_or_init(|| Regex::new(r"\b\w+\b").expect("word pattern is valid"))
}

/// Intermediate values of one scoring pass
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreBreakdown {
    /// Number of keyword words after splitting phrases
    pub keyword_count: usize,

    /// Number of word tokens in the text
    pub token_count: usize,

    /// Occurrences of each keyword word in the text, in keyword order
    pub per_keyword: Vec<usize>,

    /// Sum of `per_keyword`
    pub sum_matches: usize,

    /// `sum_matches / (keyword_count * token_count)`, or 0
    pub normalized: f64,

    /// `normalized * scale_factor`
    pub score: f64,
}

/// Keyword-frequency scorer
#[derive(Debug, Clone, Copy)]
pub struct Scorer {
    scale_factor: f64,
    fold_accents: bool,
}

impl Default for Scorer {
    fn default() -> Self {
        Self {
            scale_factor: SCALE_FACTOR,
            fold_accents: false,
        }
    }
}

impl Scorer {
    pub fn new(scale_factor: f64, fold_accents: bool) -> Self {
        Self {
            scale_factor,
            fold_accents,
        }
    }

    pub fn scale_factor(&self) -> f64 {
        self.scale_factor
    }

    /// Scores `text` against `keywords`, returning a value in `[0, scale_factor]`
    pub fn score(&self, keywords: &[String], text: &str) -> f64 {
        self.breakdown(keywords, text).score
    }

    /// Scores `text` against `keywords` and keeps the intermediate counts
    pub fn breakdown(&self, keywords: &[String], text: &str) -> ScoreBreakdown {
        let keyword_words = self.keyword_words(keywords);
        let text = self.normalize(text);

        let mut counts: HashMap<&str, usize> = HashMap::new();
        let mut token_count = 0;
        for token in word_regex().find_iter(&text) {
            *counts.entry(token.as_str()).or_insert(0) += 1;
            token_count += 1;
        }

        let per_keyword: Vec<usize> = keyword_words
            .iter()
            .map(|word| counts.get(word.as_str()).copied().unwrap_or(0))
            .collect();
        let sum_matches: usize = per_keyword.iter().sum();
        let keyword_count = keyword_words.len();

        let normalized = if keyword_count == 0 || token_count == 0 {
            0.0
        } else {
            sum_matches as f64 / (keyword_count * token_count) as f64
        };

        ScoreBreakdown {
            keyword_count,
            token_count,
            per_keyword,
            sum_matches,
            normalized,
            score: normalized * self.scale_factor,
        }
    }

    /// Joins the phrases and re-splits them into normalized single words
    fn keyword_words(&self, keywords: &[String]) -> Vec<String> {
        keywords
            .join(" ")
            .split(' ')
            .filter(|word| !word.is_empty())
            .map(|word| self.normalize(word))
            .collect()
    }

    /// Canonical form used on both sides of the comparison
    fn normalize(&self, text: &str) -> String {
        let lowered = text.to_lowercase();
        if self.fold_accents {
            lowered
                .nfkd()
                .filter(|c| !is_combining_mark(*c))
                .nfc()
                .collect()
        } else {
            lowered.nfc().collect()
        }
    }
}

/// Scores `text` against `keywords` with the default scale and NFC matching
pub fn score(keywords: &[String], text: &str) -> f64 {
    Scorer::default().score(keywords, text)
}
