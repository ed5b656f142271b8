// src/sentiment/classifier.rs
//! Distribution classifier backend: bag-of-words softmax over a JSON weight table.
//!
//! JSON shape:
//! {
//!   "name": "binary-sentiment-bow",
//!   "labels": ["NEGATIVE", "POSITIVE"],
//!   "max_tokens": 512,
//!   "bias": [0.0, 0.05],
//!   "weights": { "good": [-1.0, 1.0], ... }
//! }
//!
//! Two labels produce `RawResult::Label` (winning label + probability); three labels
//! (positive / negative / neutral, any order) produce `RawResult::Distribution`.
//! Input beyond `max_tokens` words is ignored.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{fold_word, lexical_words, BackendKind, RawResult, SentimentBackend};

const EMBEDDED_BINARY: &str = include_str!("../../assets/models/binary_sentiment.json");
const EMBEDDED_FINANCE: &str = include_str!("../../assets/models/finance_sentiment.json");

fn default_max_tokens() -> usize {
    512
}

/// Optional on-disk replacements for the compiled-in model weights.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelOverrides {
    #[serde(default)]
    pub binary: Option<PathBuf>,
    #[serde(default)]
    pub finance: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LinearModel {
    pub name: String,
    pub labels: Vec<String>,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,
    #[serde(default)]
    bias: Vec<f64>,
    weights: HashMap<String, Vec<f64>>,
}

impl LinearModel {
    pub fn from_json_str(raw: &str) -> Result<Self> {
        let mut model: LinearModel = serde_json::from_str(raw).context("parsing model json")?;
        let n = model.labels.len();
        if n < 2 {
            bail!("model `{}` needs at least two labels", model.name);
        }
        if model.bias.is_empty() {
            model.bias = vec![0.0; n];
        } else if model.bias.len() != n {
            bail!(
                "model `{}`: bias has {} entries for {} labels",
                model.name,
                model.bias.len(),
                n
            );
        }
        if let Some((word, w)) = model.weights.iter().find(|(_, w)| w.len() != n) {
            bail!(
                "model `{}`: weight row `{}` has {} entries for {} labels",
                model.name,
                word,
                w.len(),
                n
            );
        }
        if model.max_tokens == 0 {
            model.max_tokens = default_max_tokens();
        }
        model.weights = model
            .weights
            .into_iter()
            .map(|(k, v)| (fold_word(&k), v))
            .collect();
        Ok(model)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading model from {}", path.display()))?;
        Self::from_json_str(&raw)
    }

    /// Class probabilities in `labels` order.
    pub fn predict(&self, text: &str) -> Vec<f64> {
        let mut logits = self.bias.clone();
        for word in lexical_words(text).into_iter().take(self.max_tokens) {
            if let Some(row) = self.weights.get(&fold_word(word)) {
                for (l, w) in logits.iter_mut().zip(row) {
                    *l += w;
                }
            }
        }
        softmax(&logits)
    }

    fn label_index(&self, name: &str) -> Option<usize> {
        self.labels.iter().position(|l| l.eq_ignore_ascii_case(name))
    }
}

fn softmax(logits: &[f64]) -> Vec<f64> {
    let max = logits.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = logits.iter().map(|l| (l - max).exp()).collect();
    let sum: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

/// Position of the largest probability; the first wins ties.
fn argmax(probs: &[f64]) -> usize {
    let mut best = 0;
    for (i, p) in probs.iter().enumerate().skip(1) {
        if *p > probs[best] {
            best = i;
        }
    }
    best
}

#[derive(Debug, Clone, Copy)]
enum Layout {
    Binary,
    /// Indices of positive, negative, neutral.
    ThreeWay(usize, usize, usize),
}

#[derive(Debug, Clone)]
pub struct ClassifierBackend {
    kind: BackendKind,
    model: LinearModel,
    layout: Layout,
}

impl ClassifierBackend {
    /// Load the model for `kind`, honouring any path override.
    pub fn load(kind: BackendKind, overrides: &ModelOverrides) -> Result<Self> {
        let (path, embedded) = match kind {
            BackendKind::BinaryClassifier => (overrides.binary.as_deref(), EMBEDDED_BINARY),
            BackendKind::FinanceClassifier => (overrides.finance.as_deref(), EMBEDDED_FINANCE),
            other => bail!("{} is not a classifier backend", other.id()),
        };
        let model = match path {
            Some(p) => LinearModel::from_path(p)?,
            None => LinearModel::from_json_str(embedded)?,
        };
        info!(
            backend = kind.id(),
            model = %model.name,
            labels = model.labels.len(),
            max_tokens = model.max_tokens,
            "classifier model loaded"
        );
        Self::new(kind, model)
    }

    pub fn new(kind: BackendKind, model: LinearModel) -> Result<Self> {
        let layout = match (kind, model.labels.len()) {
            (BackendKind::BinaryClassifier, 2) => Layout::Binary,
            (BackendKind::FinanceClassifier, 3) => {
                let (Some(p), Some(n), Some(u)) = (
                    model.label_index("positive"),
                    model.label_index("negative"),
                    model.label_index("neutral"),
                ) else {
                    bail!(
                        "model `{}` must label positive, negative and neutral",
                        model.name
                    );
                };
                Layout::ThreeWay(p, n, u)
            }
            (kind, n) => bail!(
                "model `{}` has {} labels, which does not fit {}",
                model.name,
                n,
                kind.id()
            ),
        };
        Ok(Self {
            kind,
            model,
            layout,
        })
    }
}

impl SentimentBackend for ClassifierBackend {
    fn kind(&self) -> BackendKind {
        self.kind
    }

    fn score(&self, text: &str) -> Result<RawResult> {
        let probs = self.model.predict(text);
        Ok(match self.layout {
            Layout::Binary => {
                let best = argmax(&probs);
                RawResult::Label {
                    label: self.model.labels[best].clone(),
                    confidence: probs[best],
                }
            }
            Layout::ThreeWay(p, n, u) => RawResult::Distribution {
                positive: probs[p],
                negative: probs[n],
                neutral: probs[u],
            },
        })
    }
}
