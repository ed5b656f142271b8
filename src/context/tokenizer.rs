// src/context/tokenizer.rs
//! Word tokenizer: runs of word characters with internal hyphens kept.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// `\w` is Unicode-aware; a hyphen only survives when both neighbours are word chars
/// (the trailing `\b` forces the match to end on a word character).
static WORD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?u)\b[\w-]+\b").expect("word tokenizer regex"));

/// A single word with its dense 0-based position in the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub text: String,
    pub position: usize,
}

/// Split `input` into ordered tokens. Empty or punctuation-only input yields nothing.
pub fn tokenize(input: &str) -> Vec<Token> {
    WORD_RE
        .find_iter(input)
        .enumerate()
        .map(|(position, m)| Token {
            text: m.as_str().to_string(),
            position,
        })
        .collect()
}
