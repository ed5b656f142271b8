// src/sentiment/normalize.rs
//! Map each backend's raw output onto `(score in [-1,1], Classification)`.

use super::{Classification, RawResult};

/// Compound scores at or beyond ±this value leave the neutral band.
pub const COMPOUND_THRESHOLD: f64 = 0.05;

/// Backend-specific normalization rules.
///
/// - polarity: score = polarity; sign decides the class (0.0 is neutral)
/// - compound: score = compound; `>= 0.05` positive, `<= -0.05` negative
/// - label: class from the label; score = ±(2·confidence − 1), i.e. P(pos) − P(neg)
/// - distribution: argmax class; score = P(pos) − P(neg)
pub fn normalize(raw: &RawResult) -> (f64, Classification) {
    match raw {
        RawResult::Polarity { polarity, .. } => {
            let class = if *polarity > 0.0 {
                Classification::Positive
            } else if *polarity < 0.0 {
                Classification::Negative
            } else {
                Classification::Neutral
            };
            (clamp_score(*polarity), class)
        }
        RawResult::Compound { compound, .. } => {
            let class = if *compound >= COMPOUND_THRESHOLD {
                Classification::Positive
            } else if *compound <= -COMPOUND_THRESHOLD {
                Classification::Negative
            } else {
                Classification::Neutral
            };
            (clamp_score(*compound), class)
        }
        RawResult::Label { label, confidence } => {
            let class = classify_label(label);
            let margin = (2.0 * confidence - 1.0).max(0.0);
            let score = match class {
                Classification::Positive => margin,
                Classification::Negative => -margin,
                Classification::Neutral => 0.0,
            };
            (clamp_score(score), class)
        }
        RawResult::Distribution {
            positive,
            negative,
            neutral,
        } => {
            // Ties resolve in this order.
            let mut best = (Classification::Positive, *positive);
            for (class, p) in [
                (Classification::Negative, *negative),
                (Classification::Neutral, *neutral),
            ] {
                if p > best.1 {
                    best = (class, p);
                }
            }
            (clamp_score(positive - negative), best.0)
        }
    }
}

/// Model label → class. Unknown labels count as neutral.
pub fn classify_label(label: &str) -> Classification {
    match label.trim().to_ascii_lowercase().as_str() {
        "positive" | "pos" => Classification::Positive,
        "negative" | "neg" => Classification::Negative,
        _ => Classification::Neutral,
    }
}

fn clamp_score(x: f64) -> f64 {
    if x.is_nan() {
        0.0
    } else {
        x.clamp(-1.0, 1.0)
    }
}
