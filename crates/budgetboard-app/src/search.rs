// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Free-text matching over arbitrary record fields.
//!
//! Queries are split into terms; a term matches an item when any of the
//! declared field paths matches it, and terms combine with OR unless
//! [`SearchOptions::match_all_words`] asks for AND. Comparison ignores case
//! and diacritics by default, so `"dupont jean"` finds `"DUPONT Jéan"`.
//!
//! Whole-word mode relies on the regex engine's `\b`, which only knows
//! Unicode word characters. Scripts without spaces between words are not
//! segmented.

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

use crate::value::{FieldPath, FieldSource, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchOptions {
    pub match_all_words: bool,
    pub whole_words_only: bool,
    pub normalize_text: bool,
    pub exact_match: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            match_all_words: false,
            whole_words_only: false,
            normalize_text: true,
            exact_match: false,
        }
    }
}

/// Either a raw query string (split on whitespace) or a pre-split term list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    Text(String),
    Terms(Vec<String>),
}

impl Query {
    pub fn terms(&self) -> Vec<String> {
        match self {
            Self::Text(text) => text.split_whitespace().map(str::to_owned).collect(),
            Self::Terms(terms) => terms.clone(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(text) => text.trim().is_empty(),
            Self::Terms(terms) => terms.is_empty(),
        }
    }
}

impl From<&str> for Query {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for Query {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&String> for Query {
    fn from(value: &String) -> Self {
        Self::Text(value.clone())
    }
}

impl From<Vec<String>> for Query {
    fn from(value: Vec<String>) -> Self {
        Self::Terms(value)
    }
}

impl From<&[&str]> for Query {
    fn from(value: &[&str]) -> Self {
        Self::Terms(value.iter().map(|term| (*term).to_owned()).collect())
    }
}

/// Decomposes, strips combining marks, and lower-cases. `None` yields an
/// empty string.
pub fn normalize<'a>(text: impl Into<Option<&'a str>>) -> String {
    let Some(text) = text.into() else {
        return String::new();
    };
    text.nfd()
        .filter(|ch| !is_combining_mark(*ch))
        .collect::<String>()
        .to_lowercase()
}

pub fn value_matches(value: &Value, term: &str, options: SearchOptions) -> bool {
    TermMatcher::new(term, options).matches(value)
}

/// Returns the items matching `query` on at least one of `fields`, keeping
/// input order. An empty query returns every item.
pub fn search<'a, T: FieldSource>(
    items: &'a [T],
    query: impl Into<Query>,
    fields: &[FieldPath],
    options: SearchOptions,
) -> Vec<&'a T> {
    let compiled = CompiledQuery::new(query, options);
    items
        .iter()
        .filter(|item| compiled.matches(*item, fields))
        .collect()
}

/// A query with its terms prepared once, for filtering many items.
#[derive(Debug, Clone)]
pub struct CompiledQuery {
    terms: Vec<TermMatcher>,
    match_all_words: bool,
}

impl CompiledQuery {
    pub fn new(query: impl Into<Query>, options: SearchOptions) -> Self {
        let query = query.into();
        let terms = if query.is_empty() {
            Vec::new()
        } else {
            query
                .terms()
                .iter()
                .map(|term| TermMatcher::new(term, options))
                .collect()
        };
        Self {
            terms,
            match_all_words: options.match_all_words,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn matches<T: FieldSource + ?Sized>(&self, item: &T, fields: &[FieldPath]) -> bool {
        if self.terms.is_empty() {
            return true;
        }
        let values = fields
            .iter()
            .map(|path| item.field(path))
            .collect::<Vec<_>>();
        let term_hit =
            |term: &TermMatcher| values.iter().flatten().any(|value| term.matches(value));
        if self.match_all_words {
            self.terms.iter().all(term_hit)
        } else {
            self.terms.iter().any(term_hit)
        }
    }

    /// Same combination rules as [`CompiledQuery::matches`], against one
    /// already rendered string.
    pub fn matches_text(&self, text: &str) -> bool {
        if self.terms.is_empty() {
            return true;
        }
        if self.match_all_words {
            self.terms.iter().all(|term| term.matches_text(text))
        } else {
            self.terms.iter().any(|term| term.matches_text(text))
        }
    }
}

#[derive(Debug, Clone)]
struct TermMatcher {
    needle: String,
    whole_word: Option<Regex>,
    options: SearchOptions,
}

impl TermMatcher {
    fn new(term: &str, options: SearchOptions) -> Self {
        let needle = prepare(term, options);
        let whole_word = if options.whole_words_only {
            RegexBuilder::new(&format!(r"\b{}\b", regex::escape(&needle)))
                .build()
                .ok()
        } else {
            None
        };
        Self {
            needle,
            whole_word,
            options,
        }
    }

    fn matches(&self, value: &Value) -> bool {
        value
            .search_text()
            .is_some_and(|text| self.matches_text(&text))
    }

    fn matches_text(&self, text: &str) -> bool {
        let haystack = prepare(text, self.options);
        if self.options.whole_words_only {
            self.whole_word
                .as_ref()
                .is_some_and(|pattern| pattern.is_match(&haystack))
        } else {
            haystack.contains(&self.needle)
        }
    }
}

fn prepare(text: &str, options: SearchOptions) -> String {
    if options.exact_match {
        text.to_owned()
    } else if options.normalize_text {
        normalize(text)
    } else {
        text.to_lowercase()
    }
}
