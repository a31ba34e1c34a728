//! Keyword store — category keyword sets and confirmation phrases.
//!
//! Sources are flat line-delimited text files: one token (or phrase) per
//! line, trimmed and lowercased at load time, blank lines dropped. A missing
//! or unreadable source is a recoverable condition — the category degrades
//! to an empty set and simply never matches.

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::error::LoadError;

/// Category keyword sets, loaded once at startup (reloadable on demand).
#[derive(Debug, Clone, Default)]
pub struct KeywordStore {
    sets: BTreeMap<String, HashSet<String>>,
}

impl KeywordStore {
    /// Load every category's keyword set from its source file.
    ///
    /// Unreadable sources are logged and degrade to empty sets; this never
    /// fails the caller.
    pub fn load(sources: &BTreeMap<String, PathBuf>) -> Self {
        let mut sets = BTreeMap::new();
        for (category, path) in sources {
            let set = match read_source(path) {
                Ok(blob) => parse_tokens(&blob),
                Err(e) => {
                    warn!(
                        category = %category,
                        error = %e,
                        "Keyword source unavailable, category degrades to empty set"
                    );
                    HashSet::new()
                }
            };
            info!(category = %category, count = set.len(), "Loaded keyword set");
            sets.insert(category.clone(), set);
        }
        Self { sets }
    }

    /// Build a store directly from in-memory blobs (tests, embedded defaults).
    pub fn from_blobs<'a, I>(blobs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let sets = blobs
            .into_iter()
            .map(|(category, blob)| (category.to_string(), parse_tokens(blob)))
            .collect();
        Self { sets }
    }

    /// Iterate categories with their keyword sets, in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &HashSet<String>)> {
        self.sets.iter()
    }

    /// Keyword set for one category, if known.
    pub fn set(&self, category: &str) -> Option<&HashSet<String>> {
        self.sets.get(category)
    }

    /// Number of known categories (including degraded-to-empty ones).
    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }
}

/// Ordered confirmation phrases, matched as lowercase substrings.
///
/// Phrases are natural multi-word expressions ("task completed"), so
/// substring containment is deliberate — extra words around the phrase must
/// not block recognition.
#[derive(Debug, Clone, Default)]
pub struct ConfirmationPhrases {
    phrases: Vec<String>,
}

impl ConfirmationPhrases {
    /// Load phrases from a source file. Unreadable source degrades to an
    /// empty list (no confirmation is ever recognized), logged as a warning.
    pub fn load(path: &Path) -> Self {
        match read_source(path) {
            Ok(blob) => Self::from_blob(&blob),
            Err(e) => {
                warn!(error = %e, "Confirmation phrase source unavailable, no phrases loaded");
                Self::default()
            }
        }
    }

    /// Parse phrases from an in-memory blob, preserving source order.
    pub fn from_blob(blob: &str) -> Self {
        let mut phrases = Vec::new();
        for line in blob.lines() {
            let phrase = line.trim().to_lowercase();
            if !phrase.is_empty() && !phrases.contains(&phrase) {
                phrases.push(phrase);
            }
        }
        Self { phrases }
    }

    /// True if `text` contains any phrase as a case-insensitive substring.
    pub fn matches(&self, text: &str) -> bool {
        if self.phrases.is_empty() {
            return false;
        }
        let lowered = text.to_lowercase();
        self.phrases.iter().any(|p| lowered.contains(p.as_str()))
    }

    pub fn len(&self) -> usize {
        self.phrases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phrases.is_empty()
    }
}

/// Read a source file, mapping IO failures to the recoverable `LoadError`.
fn read_source(path: &Path) -> Result<String, LoadError> {
    std::fs::read_to_string(path).map_err(|source| LoadError::Unreadable {
        path: path.to_path_buf(),
        source,
    })
}

/// Split a blob into a keyword set: trimmed, lowercased, blanks dropped.
fn parse_tokens(blob: &str) -> HashSet<String> {
    blob.lines()
        .map(|line| line.trim().to_lowercase())
        .filter(|line| !line.is_empty())
        .collect()
}
