// src/context/mod.rs
//! Context extraction: tokenize → locate keywords → merge windows → materialize text.
//!
//! Everything here is pure and takes its configuration explicitly, so a single
//! `ContextConfig` can be shared across threads without locking.

pub mod locator;
pub mod span;
pub mod tokenizer;
pub mod window;

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

pub use locator::{locate_keywords, KeywordMatch, Located};
pub use span::materialize;
pub use tokenizer::{tokenize, Token};
pub use window::{merge_spans, merge_windows, Interval, MergedSpan};

/// Keyword list plus the window applied uniformly to every keyword.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextConfig {
    pub keywords: Vec<String>,
    pub words_before: usize,
    pub words_after: usize,
}

/// A merged span together with its materialized text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextSpan {
    pub start: i64,
    pub end: i64,
    pub keywords: BTreeSet<String>,
    pub text: String,
}

/// Per-document extraction result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    pub keyword_counts: BTreeMap<String, usize>,
    pub total_mentions: usize,
    pub spans: Vec<ContextSpan>,
}

/// Run the whole context stage over one document body.
pub fn extract_contexts(text: &str, cfg: &ContextConfig) -> Extraction {
    let tokens = tokenize(text);
    let located = locate_keywords(&tokens, &cfg.keywords);
    let total_mentions = located.total_mentions();

    let spans = merge_windows(&located.matches, cfg.words_before, cfg.words_after)
        .into_iter()
        .map(|m| {
            let text = materialize(&m, &tokens);
            ContextSpan {
                start: m.start,
                end: m.end,
                keywords: m.keywords,
                text,
            }
        })
        .collect();

    Extraction {
        keyword_counts: located.counts,
        total_mentions,
        spans,
    }
}
