// src/context/locator.rs
//! Keyword locator: exact-token, case-insensitive matches against the configured list.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use super::tokenizer::Token;

/// One keyword occurrence. Two keywords hitting the same token are two records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordMatch {
    pub keyword: String,
    pub position: usize,
}

/// Matches plus per-keyword mention counts (keyed by the configured spelling).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Located {
    pub matches: Vec<KeywordMatch>,
    pub counts: BTreeMap<String, usize>,
}

impl Located {
    pub fn total_mentions(&self) -> usize {
        self.counts.values().sum()
    }
}

/// Scan `tokens` once per configured keyword.
///
/// Matches come out keyword-major (all hits of the first keyword, then the second, ...),
/// which is the order the window merger uses to break start-position ties.
/// An exact duplicate keyword entry is searched only once; casing variants are
/// distinct entries and each gets its own count.
pub fn locate_keywords(tokens: &[Token], keywords: &[String]) -> Located {
    let lowered: Vec<String> = tokens.iter().map(|t| t.text.to_lowercase()).collect();

    let mut seen: HashSet<&str> = HashSet::new();
    let mut out = Located::default();

    for keyword in keywords {
        if !seen.insert(keyword.as_str()) {
            continue;
        }
        let needle = keyword.to_lowercase();
        let before = out.matches.len();
        for (tok, low) in tokens.iter().zip(&lowered) {
            if *low == needle {
                out.matches.push(KeywordMatch {
                    keyword: keyword.clone(),
                    position: tok.position,
                });
            }
        }
        out.counts.insert(keyword.clone(), out.matches.len() - before);
    }

    out
}
