// src/context/span.rs
//! Span materializer: merged span → literal text, clamped to the token sequence.

use super::tokenizer::Token;
use super::window::MergedSpan;

/// Join the tokens in `[max(0,start), min(len-1,end)]` with single spaces.
/// Returns an empty string when nothing of the span lies inside the document.
pub fn materialize(span: &MergedSpan, tokens: &[Token]) -> String {
    let Some(last) = tokens.len().checked_sub(1) else {
        return String::new();
    };
    let start = span.start.max(0);
    let end = span.end.min(last as i64);
    if start > end {
        return String::new();
    }

    tokens[start as usize..=end as usize]
        .iter()
        .map(|t| t.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}
