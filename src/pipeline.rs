// src/pipeline.rs
//! Batch pipeline: article → context spans → per-span sentiment → report.
//!
//! `process_document` is the core transform and propagates backend failures.
//! The two batch runners are its callers: they record a failed document, log it,
//! and move on. The summary is reduced only after every document has finished.

use std::sync::Arc;

use anyhow::{Context, Result};
use metrics::counter;
use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use crate::article::Article;
use crate::context::{extract_contexts, ContextConfig};
use crate::report::{summarize, BatchSummary, DocumentReport, SpanReport, SpanSentiment};
use crate::sentiment::{is_scorable, BackendSet};
use crate::telemetry::ensure_metrics_described;

/// A document whose spans could not all be scored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentFailure {
    pub index: usize,
    pub title: Option<String>,
    pub error: String,
}

/// Result of a whole batch run.
#[derive(Debug, Clone, Default)]
pub struct BatchOutcome {
    /// Reports for documents with at least one mention, in input order.
    pub reports: Vec<DocumentReport>,
    pub failures: Vec<DocumentFailure>,
    pub summary: BatchSummary,
}

/// Context configuration plus the backends loaded for this run.
#[derive(Debug)]
pub struct ContextPipeline {
    config: ContextConfig,
    backends: BackendSet,
}

impl ContextPipeline {
    pub fn new(config: ContextConfig, backends: BackendSet) -> Self {
        ensure_metrics_described();
        Self { config, backends }
    }

    pub fn config(&self) -> &ContextConfig {
        &self.config
    }

    pub fn backends(&self) -> &BackendSet {
        &self.backends
    }

    /// Extract and score one article.
    ///
    /// Returns `Ok(None)` when the article has no keyword mention.
    pub fn process_document(&self, article: &Article) -> Result<Option<DocumentReport>> {
        let doc = article.log_id();
        counter!("kcs_documents_total").increment(1);

        let extraction = extract_contexts(&article.body(), &self.config);
        if extraction.total_mentions == 0 {
            debug!(%doc, "no keyword mentions");
            return Ok(None);
        }
        counter!("kcs_documents_matched_total").increment(1);
        counter!("kcs_spans_total").increment(extraction.spans.len() as u64);

        let mut spans = Vec::with_capacity(extraction.spans.len());
        for (i, span) in extraction.spans.into_iter().enumerate() {
            let sentiment = self
                .score_span(&span.text)
                .with_context(|| format!("scoring context {i} of document {doc}"))?;
            if matches!(sentiment, SpanSentiment::NoContent) {
                warn!(%doc, span = i, "empty context, not scored");
            }
            spans.push(SpanReport {
                start: span.start,
                end: span.end,
                keywords: span.keywords,
                context: span.text,
                sentiment,
            });
        }

        info!(
            %doc,
            mentions = extraction.total_mentions,
            contexts = spans.len(),
            "document scored"
        );

        Ok(Some(DocumentReport {
            title: article.title.clone(),
            url: article.url.clone(),
            scraped_at: article.scraped_at.clone(),
            keyword_counts: extraction.keyword_counts,
            total_mentions: extraction.total_mentions,
            spans,
        }))
    }

    /// Blank context is reported as `NoContent` and never reaches a backend.
    fn score_span(&self, text: &str) -> Result<SpanSentiment> {
        if !is_scorable(text) {
            return Ok(SpanSentiment::NoContent);
        }
        Ok(SpanSentiment::Scored(self.backends.score_text(text)?))
    }

    /// Process documents one at a time, in order.
    pub fn run_batch(&self, articles: &[Article]) -> BatchOutcome {
        let mut acc = Collector::default();
        for (index, article) in articles.iter().enumerate() {
            let res = self.process_document(article);
            acc.push(index, article.title.clone(), res);
        }
        acc.finish(self)
    }

    /// Process documents on a bounded pool of blocking workers.
    ///
    /// Each document is independent; results are gathered back in input order
    /// and summarised once all workers are done.
    pub async fn run_batch_concurrent(
        self: &Arc<Self>,
        articles: Vec<Article>,
        workers: usize,
    ) -> BatchOutcome {
        let permits = Arc::new(Semaphore::new(workers.max(1)));
        let mut handles = Vec::with_capacity(articles.len());

        for (index, article) in articles.into_iter().enumerate() {
            let Ok(permit) = Arc::clone(&permits).acquire_owned().await else {
                break;
            };
            let title = article.title.clone();
            let pipeline = Arc::clone(self);
            let handle = tokio::task::spawn_blocking(move || {
                let _permit = permit;
                pipeline.process_document(&article)
            });
            handles.push((index, title, handle));
        }

        let mut acc = Collector::default();
        for (index, title, handle) in handles {
            let res = match handle.await {
                Ok(res) => res,
                Err(e) => Err(anyhow::anyhow!("worker panicked: {e}")),
            };
            acc.push(index, title, res);
        }
        acc.finish(self)
    }
}

#[derive(Default)]
struct Collector {
    reports: Vec<DocumentReport>,
    failures: Vec<DocumentFailure>,
}

impl Collector {
    fn push(&mut self, index: usize, title: Option<String>, res: Result<Option<DocumentReport>>) {
        match res {
            Ok(Some(report)) => self.reports.push(report),
            Ok(None) => {}
            Err(e) => {
                warn!(index, error = %format!("{e:#}"), "document skipped");
                self.failures.push(DocumentFailure {
                    index,
                    title,
                    error: format!("{e:#}"),
                });
            }
        }
    }

    fn finish(self, pipeline: &ContextPipeline) -> BatchOutcome {
        let summary = summarize(
            &self.reports,
            &pipeline.config.keywords,
            &pipeline.backends.kinds(),
        );
        BatchOutcome {
            reports: self.reports,
            failures: self.failures,
            summary,
        }
    }
}
