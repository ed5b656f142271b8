// src/sentiment/polarity.rs
//! Lexicon polarity backend: averages per-word (polarity, subjectivity) over lexicon hits.
//!
//! Modifiers:
//! - an intensifier directly before a hit scales both polarity and subjectivity
//! - a negator within the previous two words flips and halves polarity (× -0.5)

use std::collections::{HashMap, HashSet};

use anyhow::{Context, Result};
use serde::Deserialize;

use super::{fold_word, lexical_words, BackendKind, RawResult, SentimentBackend};

const EMBEDDED_LEXICON: &str = include_str!("../../assets/lexicon/polarity.json");

const NEGATION_FACTOR: f64 = -0.5;

#[derive(Debug, Clone, Deserialize)]
struct PolarityLexicon {
    /// word → (polarity, subjectivity)
    words: HashMap<String, (f64, f64)>,
    #[serde(default)]
    intensifiers: HashMap<String, f64>,
    #[serde(default)]
    negators: HashSet<String>,
}

#[derive(Debug, Clone)]
pub struct PolarityBackend {
    lexicon: PolarityLexicon,
}

impl PolarityBackend {
    /// Backend over the lexicon compiled into the binary.
    pub fn embedded() -> Result<Self> {
        Self::from_json_str(EMBEDDED_LEXICON).context("embedded polarity lexicon")
    }

    pub fn from_json_str(raw: &str) -> Result<Self> {
        let mut lexicon: PolarityLexicon =
            serde_json::from_str(raw).context("parsing polarity lexicon")?;
        // Keys are matched against folded words.
        lexicon.words = lexicon
            .words
            .into_iter()
            .map(|(k, v)| (fold_word(&k), v))
            .collect();
        lexicon.intensifiers = lexicon
            .intensifiers
            .into_iter()
            .map(|(k, v)| (fold_word(&k), v))
            .collect();
        lexicon.negators = lexicon.negators.iter().map(|k| fold_word(k)).collect();
        Ok(Self { lexicon })
    }

    /// Returns `(polarity, subjectivity)`; both 0.0 when no lexicon word occurs.
    pub fn polarity(&self, text: &str) -> (f64, f64) {
        let words: Vec<String> = lexical_words(text).into_iter().map(fold_word).collect();

        let mut sum_p = 0.0;
        let mut sum_s = 0.0;
        let mut hits = 0usize;

        for (i, w) in words.iter().enumerate() {
            let Some(&(mut p, mut s)) = self.lexicon.words.get(w) else {
                continue;
            };

            if let Some(m) = i
                .checked_sub(1)
                .and_then(|j| self.lexicon.intensifiers.get(&words[j]))
            {
                p *= m;
                s *= m;
            }

            let negated = (1..=2).any(|k| i >= k && self.lexicon.negators.contains(&words[i - k]));
            if negated {
                p *= NEGATION_FACTOR;
            }

            sum_p += p;
            sum_s += s;
            hits += 1;
        }

        if hits == 0 {
            return (0.0, 0.0);
        }
        let n = hits as f64;
        ((sum_p / n).clamp(-1.0, 1.0), (sum_s / n).clamp(0.0, 1.0))
    }
}

impl SentimentBackend for PolarityBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Polarity
    }

    fn score(&self, text: &str) -> Result<RawResult> {
        let (polarity, subjectivity) = self.polarity(text);
        Ok(RawResult::Polarity {
            polarity,
            subjectivity,
        })
    }
}
