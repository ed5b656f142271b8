//! `kcs`: keyword context sentiment over a batch of scraped articles.
//!
//! Reads the scraper's JSON, extracts merged context windows around the configured
//! keywords, scores each with the enabled backends, writes the report and prints
//! a summary.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::{info, warn};

use keyword_context_sentiment::{
    output::{write_report, RunReport},
    telemetry, ArticleSource, JsonFileSource, RunConfig,
};

#[derive(Debug, Parser)]
#[command(name = "kcs", version, about)]
struct Cli {
    /// Scraped articles (`{"articles": [...]}` or a bare array).
    #[arg(short, long, env = "KCS_INPUT", default_value = "jsons/scraped_articles.json")]
    input: PathBuf,

    /// Where to write the sentiment report.
    #[arg(short, long, env = "KCS_OUTPUT", default_value = "jsons/sentiment_analysis.json")]
    output: PathBuf,

    /// Run config (TOML or JSON). Defaults to $KCS_CONFIG_PATH, then config/context.{toml,json}.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Comma-separated keywords; replaces the configured list.
    #[arg(long, value_delimiter = ',')]
    keywords: Vec<String>,

    #[arg(long)]
    words_before: Option<usize>,

    #[arg(long)]
    words_after: Option<usize>,

    /// Worker threads for document processing (1 = sequential).
    #[arg(long)]
    workers: Option<usize>,

    /// Emit JSON log lines instead of compact text.
    #[arg(long, env = "KCS_JSON_LOGS")]
    json_logs: bool,
}

impl Cli {
    fn apply(&self, cfg: &mut RunConfig) {
        if !self.keywords.is_empty() {
            cfg.keywords = self.keywords.clone();
        }
        if let Some(n) = self.words_before {
            cfg.words_before = n;
        }
        if let Some(n) = self.words_after {
            cfg.words_after = n;
        }
        if let Some(n) = self.workers {
            cfg.workers = n;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    telemetry::init_tracing(cli.json_logs);

    let mut cfg = match &cli.config {
        Some(p) => RunConfig::load_from(p)?,
        None => RunConfig::load_default()?,
    };
    cfg.apply_env_overrides();
    cli.apply(&mut cfg);
    let cfg = cfg.finalize()?;

    let source = JsonFileSource::new(&cli.input);
    let articles = source.fetch_articles().await?;
    info!(source = source.name(), count = articles.len(), "articles loaded");
    if articles.is_empty() {
        warn!("no articles to analyze");
    }

    let outcome = keyword_context_sentiment::run(&cfg, articles).await?;

    write_report(&cli.output, &RunReport::new(&cfg, &outcome))?;
    info!(path = %cli.output.display(), "report written");

    println!("{}", outcome.summary.display(cfg.words_before, cfg.words_after));
    for f in &outcome.failures {
        println!(
            "skipped article #{} ({}): {}",
            f.index + 1,
            f.title.as_deref().unwrap_or("Untitled"),
            f.error
        );
    }
    Ok(())
}
