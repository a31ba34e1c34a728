//! Message classifier — matches message tokens against category keyword sets.
//!
//! Matching is exact token membership, not substring containment: "it" as a
//! keyword must not match inside "item". A message may match zero, one, or
//! several categories; the router acts on all of them.

use std::collections::BTreeSet;

use regex::Regex;

use crate::keywords::KeywordStore;

/// Punctuation stripped during normalization.
const PUNCTUATION_PATTERN: &str = r"[.,!?()]";

/// Normalizes message text and tests it against each category's keyword set.
pub struct Classifier {
    punctuation: Regex,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Classifier {
    pub fn new() -> Self {
        Self {
            // Fixed pattern, compiled once.
            punctuation: Regex::new(PUNCTUATION_PATTERN).expect("valid punctuation pattern"),
        }
    }

    /// Normalize text into lowercase tokens: strip `. , ! ? ( )`, split on
    /// whitespace runs.
    pub fn normalize(&self, text: &str) -> Vec<String> {
        let lowered = text.to_lowercase();
        let cleaned = self.punctuation.replace_all(&lowered, "");
        cleaned.split_whitespace().map(str::to_string).collect()
    }

    /// Classify a message against every category in the store.
    ///
    /// Returns the (sorted) set of matched category names. Text that is
    /// empty after normalization matches nothing.
    pub fn classify(&self, text: &str, keywords: &KeywordStore) -> BTreeSet<String> {
        let tokens = self.normalize(text);
        if tokens.is_empty() {
            return BTreeSet::new();
        }

        keywords
            .iter()
            .filter(|(_, set)| tokens.iter().any(|token| set.contains(token)))
            .map(|(category, _)| category.clone())
            .collect()
    }
}
