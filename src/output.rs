// src/output.rs
//! Batch report file written at the end of a run.

use std::fs;
use std::io::Write as _;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::config::RunConfig;
use crate::pipeline::{BatchOutcome, DocumentFailure};
use crate::report::{BatchSummary, DocumentReport};

#[derive(Debug, Serialize)]
pub struct RunReport<'a> {
    pub analyzed_at: String,
    pub models_used: Vec<&'static str>,
    pub keywords_searched: &'a [String],
    pub words_before: usize,
    pub words_after: usize,
    pub total_articles_with_keywords: usize,
    pub articles: &'a [DocumentReport],
    #[serde(skip_serializing_if = "no_failures")]
    pub failures: &'a [DocumentFailure],
    pub summary: &'a BatchSummary,
}

fn no_failures(f: &&[DocumentFailure]) -> bool {
    f.is_empty()
}

impl<'a> RunReport<'a> {
    pub fn new(cfg: &'a RunConfig, outcome: &'a BatchOutcome) -> Self {
        let mut models_used = Vec::new();
        for kind in &cfg.backends {
            if !models_used.contains(&kind.display_name()) {
                models_used.push(kind.display_name());
            }
        }
        Self {
            analyzed_at: chrono::Utc::now().to_rfc3339(),
            models_used,
            keywords_searched: &cfg.keywords,
            words_before: cfg.words_before,
            words_after: cfg.words_after,
            total_articles_with_keywords: outcome.reports.len(),
            articles: &outcome.reports,
            failures: &outcome.failures,
            summary: &outcome.summary,
        }
    }
}

/// Write pretty JSON via a temp file + rename so readers never see a half-written report.
pub fn write_report(path: &Path, report: &RunReport<'_>) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    }
    let json = serde_json::to_string_pretty(report).context("serializing run report")?;
    let tmp = path.with_extension("json.tmp");
    let mut f = fs::File::create(&tmp).with_context(|| format!("creating {}", tmp.display()))?;
    f.write_all(json.as_bytes())?;
    f.sync_all()?;
    fs::rename(&tmp, path).with_context(|| format!("renaming into {}", path.display()))?;
    Ok(())
}
