// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod article;
pub mod config;
pub mod context;
pub mod output;
pub mod pipeline;
pub mod report;
pub mod sentiment;
pub mod telemetry;

// ---- Re-exports for stable public API ----
pub use crate::article::{Article, ArticleSource, JsonFileSource};
pub use crate::config::RunConfig;
pub use crate::context::{extract_contexts, ContextConfig};
pub use crate::pipeline::{BatchOutcome, ContextPipeline, DocumentFailure};
pub use crate::report::{BatchSummary, DocumentReport, SpanReport, SpanSentiment};
pub use crate::sentiment::{
    BackendKind, BackendSet, Classification, RawResult, SentimentBackend, SentimentResult,
};

use std::sync::Arc;
use tracing::info;

/// Load backends for `cfg`, run every article through the pipeline, and release
/// the backends before returning.
pub async fn run(cfg: &RunConfig, articles: Vec<Article>) -> anyhow::Result<BatchOutcome> {
    let backends = BackendSet::load(&cfg.backends, &cfg.models)?;
    info!(
        backends = ?backends.kinds(),
        keywords = cfg.keywords.len(),
        words_before = cfg.words_before,
        words_after = cfg.words_after,
        articles = articles.len(),
        "batch starting"
    );

    let pipeline = Arc::new(ContextPipeline::new(cfg.context(), backends));
    let outcome = if cfg.workers > 1 {
        pipeline.run_batch_concurrent(articles, cfg.workers).await
    } else {
        pipeline.run_batch(&articles)
    };
    drop(pipeline);

    info!(
        matched = outcome.reports.len(),
        failed = outcome.failures.len(),
        "batch finished"
    );
    Ok(outcome)
}
