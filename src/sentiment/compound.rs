// src/sentiment/compound.rs
//! Rule-based compound backend.
//!
//! Every lexicon word contributes a valence (roughly -4..4), adjusted by:
//! - boosters up to three words back (dampened with distance)
//! - ALL-CAPS emphasis when the text mixes caps and lower case
//! - negation up to three words back (× -0.74)
//! - a contrastive "but": valences before it × 0.5, after it × 1.5
//! - trailing `!`/`?` emphasis
//!
//! The sum is squashed with `x / sqrt(x² + 15)` into the compound score; positive,
//! neutral and negative proportions are reported alongside and sum to 1.

use std::collections::{HashMap, HashSet};

use anyhow::{Context, Result};
use serde::Deserialize;

use super::{fold_word, lexical_words, BackendKind, RawResult, SentimentBackend};

const EMBEDDED_LEXICON: &str = include_str!("../../assets/lexicon/valence.json");

const CAPS_BOOST: f64 = 0.733;
const NEGATION_SCALAR: f64 = -0.74;
const NORMALIZE_ALPHA: f64 = 15.0;
const EXCLAIM_BOOST: f64 = 0.292;
const QUESTION_BOOST: f64 = 0.18;
const BOOSTER_DAMPING: [f64; 3] = [1.0, 0.95, 0.9];

#[derive(Debug, Clone, Deserialize)]
struct ValenceLexicon {
    valence: HashMap<String, f64>,
    #[serde(default)]
    boosters: HashMap<String, f64>,
    #[serde(default)]
    negators: HashSet<String>,
}

/// Compound score plus proportions, as produced by the rule scorer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompoundScores {
    pub compound: f64,
    pub positive: f64,
    pub neutral: f64,
    pub negative: f64,
}

#[derive(Debug, Clone)]
pub struct CompoundBackend {
    lexicon: ValenceLexicon,
}

impl CompoundBackend {
    pub fn embedded() -> Result<Self> {
        Self::from_json_str(EMBEDDED_LEXICON).context("embedded valence lexicon")
    }

    pub fn from_json_str(raw: &str) -> Result<Self> {
        let mut lexicon: ValenceLexicon =
            serde_json::from_str(raw).context("parsing valence lexicon")?;
        lexicon.valence = lexicon
            .valence
            .into_iter()
            .map(|(k, v)| (fold_word(&k), v))
            .collect();
        lexicon.boosters = lexicon
            .boosters
            .into_iter()
            .map(|(k, v)| (fold_word(&k), v))
            .collect();
        lexicon.negators = lexicon.negators.iter().map(|k| fold_word(k)).collect();
        Ok(Self { lexicon })
    }

    fn is_negator(&self, folded: &str) -> bool {
        self.lexicon.negators.contains(folded) || folded.ends_with("n't")
    }

    pub fn scores(&self, text: &str) -> CompoundScores {
        let words = lexical_words(text);
        let folded: Vec<String> = words.iter().map(|w| fold_word(w)).collect();
        let caps_differential = is_cap_differential(&words);

        let mut valences = Vec::with_capacity(words.len());
        for (i, lw) in folded.iter().enumerate() {
            if self.lexicon.boosters.contains_key(lw) {
                valences.push(0.0);
                continue;
            }
            let Some(&base) = self.lexicon.valence.get(lw) else {
                valences.push(0.0);
                continue;
            };

            let mut v = base;
            if caps_differential && is_all_caps(words[i]) {
                v += CAPS_BOOST * v.signum();
            }

            for (k, damping) in (1..=3).zip(BOOSTER_DAMPING) {
                if i < k {
                    break;
                }
                if let Some(&boost) = self.lexicon.boosters.get(&folded[i - k]) {
                    let mut scalar = if v < 0.0 { -boost } else { boost };
                    if caps_differential && is_all_caps(words[i - k]) {
                        scalar += CAPS_BOOST * v.signum();
                    }
                    v += scalar * damping;
                }
            }

            if (1..=3).any(|k| i >= k && self.is_negator(&folded[i - k])) {
                v *= NEGATION_SCALAR;
            }
            valences.push(v);
        }

        if let Some(pivot) = folded.iter().position(|w| w == "but") {
            for (i, v) in valences.iter_mut().enumerate() {
                if i < pivot {
                    *v *= 0.5;
                } else if i > pivot {
                    *v *= 1.5;
                }
            }
        }

        let emphasis = punctuation_emphasis(text);
        let sum: f64 = valences.iter().sum();
        let compound = if sum == 0.0 {
            0.0
        } else {
            squash(sum + emphasis * sum.signum())
        };

        let (mut pos, mut neg, mut neu) = (0.0f64, 0.0f64, 0.0f64);
        for &v in &valences {
            if v > 0.0 {
                pos += v + 1.0;
            } else if v < 0.0 {
                neg += v - 1.0;
            } else {
                neu += 1.0;
            }
        }
        if pos > neg.abs() {
            pos += emphasis;
        } else if pos < neg.abs() {
            neg -= emphasis;
        }

        let total = pos + neg.abs() + neu;
        if total == 0.0 {
            return CompoundScores {
                compound,
                positive: 0.0,
                neutral: 1.0,
                negative: 0.0,
            };
        }
        CompoundScores {
            compound,
            positive: pos / total,
            neutral: neu / total,
            negative: neg.abs() / total,
        }
    }
}

impl SentimentBackend for CompoundBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Compound
    }

    fn score(&self, text: &str) -> Result<RawResult> {
        let s = self.scores(text);
        Ok(RawResult::Compound {
            compound: s.compound,
            positive: s.positive,
            neutral: s.neutral,
            negative: s.negative,
        })
    }
}

fn squash(x: f64) -> f64 {
    (x / (x * x + NORMALIZE_ALPHA).sqrt()).clamp(-1.0, 1.0)
}

fn is_all_caps(word: &str) -> bool {
    word.chars().any(char::is_alphabetic)
        && word
            .chars()
            .filter(|c| c.is_alphabetic())
            .all(char::is_uppercase)
}

/// True when some, but not all, words are shouted.
fn is_cap_differential(words: &[&str]) -> bool {
    let caps = words.iter().filter(|w| is_all_caps(w)).count();
    caps > 0 && caps < words.len()
}

fn punctuation_emphasis(text: &str) -> f64 {
    let exclaims = text.chars().filter(|&c| c == '!').count().min(4) as f64;
    let questions = text.chars().filter(|&c| c == '?').count();
    let question_amp = match questions {
        0 | 1 => 0.0,
        2 | 3 => questions as f64 * QUESTION_BOOST,
        _ => 0.96,
    };
    exclaims * EXCLAIM_BOOST + question_amp
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend() -> CompoundBackend {
        CompoundBackend::embedded().unwrap()
    }

    fn assert_sums_to_one(s: &CompoundScores) {
        let total = s.positive + s.neutral + s.negative;
        assert!((total - 1.0).abs() < 1e-9, "proportions sum to {total}");
    }

    #[test]
    fn single_positive_word() {
        let s = backend().scores("good");
        assert!((s.compound - 0.4404).abs() < 1e-4, "got {}", s.compound);
        assert_sums_to_one(&s);
    }

    #[test]
    fn negation_flips() {
        let s = backend().scores("not good");
        assert!((s.compound + 0.3412).abs() < 1e-4, "got {}", s.compound);
        let s = backend().scores("it doesn't look good");
        assert!(s.compound < 0.0);
    }

    #[test]
    fn no_lexicon_words_is_fully_neutral() {
        let s = backend().scores("The parliament convened in Tiraspol");
        assert_eq!(s.compound, 0.0);
        assert_eq!(s.neutral, 1.0);
        assert_sums_to_one(&s);
    }

    #[test]
    fn exclamation_and_caps_amplify() {
        let b = backend();
        let plain = b.scores("the plan is good").compound;
        assert!(b.scores("the plan is good!!!").compound > plain);
        assert!(b.scores("the plan is GOOD").compound > plain);
    }

    #[test]
    fn boosters_amplify_and_dampen() {
        let b = backend();
        let plain = b.scores("a good deal").compound;
        assert!(b.scores("a very good deal").compound > plain);
        assert!(b.scores("a slightly good deal").compound < plain);
    }

    #[test]
    fn but_shifts_weight_to_second_clause() {
        let s = backend().scores("the talks were good but the outcome was bad");
        assert!(s.compound < 0.0, "got {}", s.compound);
        assert_sums_to_one(&s);
    }
}
