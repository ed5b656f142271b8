// src/report.rs
//! Per-document reports and the batch-level summary reduction.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::sentiment::{BackendKind, Classification, SentimentResult};

/// Scoring outcome for one span. Empty span text is never sent to a backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "results", rename_all = "snake_case")]
pub enum SpanSentiment {
    Scored(Vec<SentimentResult>),
    NoContent,
}

impl SpanSentiment {
    pub fn results(&self) -> &[SentimentResult] {
        match self {
            SpanSentiment::Scored(r) => r.as_slice(),
            SpanSentiment::NoContent => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpanReport {
    pub start: i64,
    pub end: i64,
    pub keywords: BTreeSet<String>,
    pub context: String,
    pub sentiment: SpanSentiment,
}

/// Everything produced for one document with at least one mention.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentReport {
    pub title: Option<String>,
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scraped_at: Option<String>,
    pub keyword_counts: BTreeMap<String, usize>,
    pub total_mentions: usize,
    pub spans: Vec<SpanReport>,
}

/// Classification counts and score moments for one backend across the batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendSummary {
    pub backend: BackendKind,
    pub scored: usize,
    pub positive: usize,
    pub neutral: usize,
    pub negative: usize,
    pub mean_score: f64,
    /// Population standard deviation.
    pub stddev_score: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub documents_with_mentions: usize,
    pub total_spans: usize,
    pub no_content_spans: usize,
    pub keyword_totals: BTreeMap<String, usize>,
    pub backends: Vec<BackendSummary>,
}

/// Reduce all reports of a finished batch.
///
/// `keywords` seeds zero totals so every configured keyword shows up;
/// `backends` fixes the order (backends seen only in results are appended).
pub fn summarize(
    reports: &[DocumentReport],
    keywords: &[String],
    backends: &[BackendKind],
) -> BatchSummary {
    let mut keyword_totals: BTreeMap<String, usize> =
        keywords.iter().map(|k| (k.clone(), 0)).collect();
    let mut order: Vec<BackendKind> = Vec::new();
    for b in backends {
        if !order.contains(b) {
            order.push(*b);
        }
    }
    let mut scores: BTreeMap<BackendKind, Vec<(f64, Classification)>> = BTreeMap::new();
    let mut total_spans = 0;
    let mut no_content_spans = 0;

    for report in reports {
        for (kw, n) in &report.keyword_counts {
            *keyword_totals.entry(kw.clone()).or_insert(0) += n;
        }
        for span in &report.spans {
            total_spans += 1;
            if matches!(span.sentiment, SpanSentiment::NoContent) {
                no_content_spans += 1;
            }
            for r in span.sentiment.results() {
                if !order.contains(&r.backend) {
                    order.push(r.backend);
                }
                scores
                    .entry(r.backend)
                    .or_default()
                    .push((r.score, r.classification));
            }
        }
    }

    let backends = order
        .into_iter()
        .map(|kind| {
            let rows = scores.remove(&kind).unwrap_or_default();
            backend_summary(kind, &rows)
        })
        .collect();

    BatchSummary {
        documents_with_mentions: reports.len(),
        total_spans,
        no_content_spans,
        keyword_totals,
        backends,
    }
}

fn backend_summary(backend: BackendKind, rows: &[(f64, Classification)]) -> BackendSummary {
    let count = |c: Classification| rows.iter().filter(|(_, k)| *k == c).count();
    let n = rows.len();
    let (mean_score, stddev_score) = if n == 0 {
        (0.0, 0.0)
    } else {
        let mean = rows.iter().map(|(s, _)| s).sum::<f64>() / n as f64;
        let var = rows.iter().map(|(s, _)| (s - mean).powi(2)).sum::<f64>() / n as f64;
        (mean, var.sqrt())
    };
    BackendSummary {
        backend,
        scored: n,
        positive: count(Classification::Positive),
        neutral: count(Classification::Neutral),
        negative: count(Classification::Negative),
        mean_score,
        stddev_score,
    }
}

impl BatchSummary {
    /// Console view of this summary for the given window sizes.
    pub fn display(&self, words_before: usize, words_after: usize) -> SummaryDisplay<'_> {
        SummaryDisplay {
            summary: self,
            words_before,
            words_after,
        }
    }
}

/// Plain-text rendering of a [`BatchSummary`] plus the window it was run with.
pub struct SummaryDisplay<'a> {
    summary: &'a BatchSummary,
    words_before: usize,
    words_after: usize,
}

impl fmt::Display for SummaryDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = self.summary;
        let rule = "=".repeat(60);
        writeln!(f, "{rule}")?;
        writeln!(f, "KEYWORD CONTEXT SENTIMENT SUMMARY")?;
        writeln!(f, "{rule}")?;
        let keywords: Vec<&str> = s.keyword_totals.keys().map(String::as_str).collect();
        writeln!(f, "Keywords searched: {}", keywords.join(", "))?;
        writeln!(
            f,
            "Context window: {} words before, {} words after",
            self.words_before, self.words_after
        )?;
        writeln!(f, "Articles with keyword mentions: {}", s.documents_with_mentions)?;
        writeln!(
            f,
            "Contexts: {} ({} without content)",
            s.total_spans, s.no_content_spans
        )?;
        writeln!(f, "\nKeyword mention totals:")?;
        for (kw, n) in &s.keyword_totals {
            writeln!(f, "  - {kw}: {n}")?;
        }
        for b in &s.backends {
            writeln!(f, "\n{} ({}):", b.backend.display_name(), b.backend.id())?;
            writeln!(f, "  Positive: {}", b.positive)?;
            writeln!(f, "  Neutral: {}", b.neutral)?;
            writeln!(f, "  Negative: {}", b.negative)?;
            writeln!(
                f,
                "  Score: mean {:+.3}, stddev {:.3}",
                b.mean_score, b.stddev_score
            )?;
        }
        write!(f, "{rule}")
    }
}
