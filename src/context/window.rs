// src/context/window.rs
//! Window merger: keyword hits → `[pos - before, pos + after]` intervals → disjoint spans.
//!
//! Bounds are kept signed and unclamped here; clamping to the document happens only
//! when a span is materialized (see `span.rs`), so windows near the edges still compare
//! on their true extents.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::locator::KeywordMatch;

/// Inclusive token interval; may extend below 0 or past the last token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interval {
    pub start: i64,
    pub end: i64,
}

impl Interval {
    /// Window sizes beyond `i64::MAX` saturate, so `start <= position <= end` always holds.
    pub fn around(position: usize, words_before: usize, words_after: usize) -> Self {
        let p = to_i64(position);
        Self {
            start: p.saturating_sub(to_i64(words_before)),
            end: p.saturating_add(to_i64(words_after)),
        }
    }
}

fn to_i64(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

/// A merged context window and every keyword whose interval was folded into it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergedSpan {
    pub start: i64,
    pub end: i64,
    pub keywords: BTreeSet<String>,
}

impl MergedSpan {
    fn seed(interval: Interval, keyword: &str) -> Self {
        Self {
            start: interval.start,
            end: interval.end,
            keywords: BTreeSet::from([keyword.to_string()]),
        }
    }
}

/// Build one interval per match and merge them.
pub fn merge_windows(
    matches: &[KeywordMatch],
    words_before: usize,
    words_after: usize,
) -> Vec<MergedSpan> {
    let spans = matches
        .iter()
        .map(|m| {
            MergedSpan::seed(
                Interval::around(m.position, words_before, words_after),
                &m.keyword,
            )
        })
        .collect();
    merge_spans(spans)
}

/// Merge spans whose next start is `<=` the running end (touching counts as overlap).
///
/// The sort is stable, so equal starts keep their input order. Output spans are
/// sorted, pairwise disjoint, and cover exactly the union of the inputs.
pub fn merge_spans(mut spans: Vec<MergedSpan>) -> Vec<MergedSpan> {
    spans.sort_by_key(|s| s.start);

    let mut iter = spans.into_iter();
    let Some(mut current) = iter.next() else {
        return Vec::new();
    };

    let mut merged = Vec::new();
    for next in iter {
        if next.start <= current.end {
            current.end = current.end.max(next.end);
            current.keywords.extend(next.keywords);
        } else {
            merged.push(std::mem::replace(&mut current, next));
        }
    }
    merged.push(current);
    merged
}
