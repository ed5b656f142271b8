// src/sentiment/mod.rs
//! Sentiment backends behind one capability trait, plus the loaded backend set.
//!
//! Each backend turns span text into a backend-specific `RawResult`; `normalize`
//! maps that onto a common `[-1, 1]` score and a three-way classification.
//! No cross-backend fusion happens here: every backend's output is kept as is.

pub mod classifier;
pub mod compound;
pub mod normalize;
pub mod polarity;

use std::sync::Arc;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use metrics::{counter, histogram};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub use classifier::{ClassifierBackend, LinearModel, ModelOverrides};
pub use compound::CompoundBackend;
pub use normalize::normalize;
pub use polarity::PolarityBackend;

/// Compiled-in backend identifiers (selected by configuration).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BackendKind {
    /// Lexicon polarity + subjectivity.
    Polarity,
    /// Rule-based compound valence.
    Compound,
    /// Two-label softmax classifier (POSITIVE / NEGATIVE).
    BinaryClassifier,
    /// Three-label financial-domain classifier.
    FinanceClassifier,
}

impl BackendKind {
    pub const ALL: [BackendKind; 4] = [
        BackendKind::Polarity,
        BackendKind::Compound,
        BackendKind::BinaryClassifier,
        BackendKind::FinanceClassifier,
    ];

    /// Stable key used in reports and config files.
    pub fn id(&self) -> &'static str {
        match self {
            BackendKind::Polarity => "polarity",
            BackendKind::Compound => "compound",
            BackendKind::BinaryClassifier => "binary-classifier",
            BackendKind::FinanceClassifier => "finance-classifier",
        }
    }

    /// Human-readable name for `models_used` and the console summary.
    pub fn display_name(&self) -> &'static str {
        match self {
            BackendKind::Polarity => "Lexicon polarity",
            BackendKind::Compound => "Rule-based compound",
            BackendKind::BinaryClassifier => "Binary sentiment classifier",
            BackendKind::FinanceClassifier => "Financial 3-class classifier",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        let key = s.trim().to_ascii_lowercase().replace('_', "-");
        Self::ALL.into_iter().find(|k| k.id() == key)
    }
}

/// Three-way label shared by all backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    Positive,
    Neutral,
    Negative,
}

/// Backend-specific output before normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RawResult {
    /// `polarity` in [-1,1], `subjectivity` in [0,1].
    Polarity { polarity: f64, subjectivity: f64 },
    /// `compound` in [-1,1]; the three proportions sum to 1.
    Compound {
        compound: f64,
        positive: f64,
        neutral: f64,
        negative: f64,
    },
    /// Winning label of a two-label classifier and its probability.
    Label { label: String, confidence: f64 },
    /// Full three-way probability distribution.
    Distribution {
        positive: f64,
        negative: f64,
        neutral: f64,
    },
}

/// One backend's verdict on one span.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentResult {
    pub backend: BackendKind,
    pub raw: RawResult,
    pub score: f64,
    pub classification: Classification,
}

/// Capability implemented by every scoring backend.
///
/// Implementations must be pure with respect to the input text and must truncate
/// overlong input themselves instead of failing.
pub trait SentimentBackend: Send + Sync {
    fn kind(&self) -> BackendKind;
    fn score(&self, text: &str) -> Result<RawResult>;
}

pub type DynBackend = Arc<dyn SentimentBackend>;

/// Word split shared by the lexicon backends. Keeps apostrophes and hyphens inside
/// words ("isn't", "long-term") and preserves case.
pub(crate) fn lexical_words(text: &str) -> Vec<&str> {
    let joiner = |c: char| c == '\'' || c == '\u{2019}' || c == '-';
    text.split(|c: char| !(c.is_alphanumeric() || joiner(c)))
        .map(|w| w.trim_matches(joiner))
        .filter(|w| !w.is_empty())
        .collect()
}

/// Lowercase and fold the typographic apostrophe so lexicon lookups hit.
pub(crate) fn fold_word(word: &str) -> String {
    word.to_lowercase().replace('\u{2019}', "'")
}

/// Whether `text` carries anything a backend can score (not empty or whitespace only).
pub fn is_scorable(text: &str) -> bool {
    !text.trim().is_empty()
}

/// Backends loaded for one batch run. Built once, shared read-only, dropped at run end.
#[derive(Clone)]
pub struct BackendSet {
    backends: Vec<DynBackend>,
}

impl std::fmt::Debug for BackendSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.kinds()).finish()
    }
}

impl BackendSet {
    /// Load the requested backends in order. Duplicate kinds are loaded once.
    pub fn load(kinds: &[BackendKind], models: &ModelOverrides) -> Result<Self> {
        let mut backends: Vec<DynBackend> = Vec::with_capacity(kinds.len());
        let mut loaded: Vec<BackendKind> = Vec::new();
        for &kind in kinds {
            if loaded.contains(&kind) {
                continue;
            }
            let backend: DynBackend = match kind {
                BackendKind::Polarity => Arc::new(PolarityBackend::embedded()?),
                BackendKind::Compound => Arc::new(CompoundBackend::embedded()?),
                BackendKind::BinaryClassifier | BackendKind::FinanceClassifier => Arc::new(
                    ClassifierBackend::load(kind, models)
                        .with_context(|| format!("loading {} model", kind.id()))?,
                ),
            };
            debug!(backend = kind.id(), "sentiment backend loaded");
            loaded.push(kind);
            backends.push(backend);
        }
        Ok(Self { backends })
    }

    /// Wrap already-built backends (custom or test implementations).
    pub fn from_backends(backends: Vec<DynBackend>) -> Self {
        Self { backends }
    }

    pub fn kinds(&self) -> Vec<BackendKind> {
        self.backends.iter().map(|b| b.kind()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }

    /// Score `text` with every backend, in order. The first backend error aborts
    /// the whole span so no partial result escapes.
    pub fn score_text(&self, text: &str) -> Result<Vec<SentimentResult>> {
        if !is_scorable(text) {
            bail!("refusing to score empty text");
        }

        let mut out = Vec::with_capacity(self.backends.len());
        for backend in &self.backends {
            let kind = backend.kind();
            let started = Instant::now();
            let raw = backend.score(text).map_err(|e| {
                counter!("kcs_backend_errors_total", "backend" => kind.id()).increment(1);
                e.context(format!("{} backend failed", kind.id()))
            })?;
            histogram!("kcs_score_ms", "backend" => kind.id())
                .record(started.elapsed().as_secs_f64() * 1000.0);

            let (score, classification) = normalize(&raw);
            out.push(SentimentResult {
                backend: kind,
                raw,
                score,
                classification,
            });
        }
        Ok(out)
    }
}
