//! Keyword to location cross-reference.
//!
//! All keyword comparisons go through [`normalize_keyword`]; nothing else in
//! the crate trims or compares keyword strings on its own.

use std::collections::HashMap;

use crate::models::{AnalysisResult, Location};

/// Normalization applied to a keyword before display and before lookup.
pub fn normalize_keyword(keyword: &str) -> &str {
    keyword.trim()
}

/// Read-only lookup table from normalized keyword to its ranked locations.
#[derive(Debug, Clone, Default)]
pub struct KeywordIndex {
    entries: HashMap<String, Vec<Location>>,
}

/// Outcome of resolving a keyword.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum KeywordLookup<'a> {
    Found(&'a [Location]),
    /// The keyword has no known locations; shown as an explicit empty state.
    NoRelatedContent,
}

impl KeywordIndex {
    /// Build the index from a result's `keyword_locations`.
    pub fn build(result: &AnalysisResult) -> Self {
        let entries = result
            .keyword_locations
            .iter()
            .map(|(k, v)| (normalize_keyword(k).to_string(), v.clone()))
            .collect();
        Self { entries }
    }

    /// Locations for `keyword` in service order; empty when unknown.
    pub fn lookup(&self, keyword: &str) -> &[Location] {
        self.entries
            .get(normalize_keyword(keyword))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn resolve(&self, keyword: &str) -> KeywordLookup<'_> {
        match self.lookup(keyword) {
            [] => KeywordLookup::NoRelatedContent,
            locations => KeywordLookup::Found(locations),
        }
    }
}

/// A clickable keyword. Position distinguishes duplicates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordTag {
    pub position: usize,
    pub label: String,
}

/// Tags for every keyword of a result, in source order.
pub fn keyword_tags(result: &AnalysisResult) -> Vec<KeywordTag> {
    result
        .display_keywords()
        .enumerate()
        .map(|(position, label)| KeywordTag {
            position,
            label: label.to_string(),
        })
        .collect()
}

/// Keyword detail modal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum KeywordModal {
    #[default]
    Closed,
    Open { keyword: String },
}

impl KeywordModal {
    /// Open on `keyword`. When already open this replaces the keyword in one step.
    pub fn select(&mut self, keyword: &str) {
        *self = KeywordModal::Open {
            keyword: normalize_keyword(keyword).to_string(),
        };
    }

    pub fn close(&mut self) {
        *self = KeywordModal::Closed;
    }

    pub fn is_open(&self) -> bool {
        matches!(self, KeywordModal::Open { .. })
    }

    pub fn keyword(&self) -> Option<&str> {
        match self {
            KeywordModal::Open { keyword } => Some(keyword),
            KeywordModal::Closed => None,
        }
    }
}
