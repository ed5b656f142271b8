// src/article.rs
//! Input documents and the source abstraction that yields them.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer, Serialize};

use crate::telemetry::anon_id;

/// One scraped article. Every field is optional on the wire; a missing or null
/// `content` is an empty body, not an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub scraped_at: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub content: Vec<String>,
}

impl Article {
    /// Paragraphs joined with single spaces.
    pub fn body(&self) -> String {
        self.content.join(" ")
    }

    /// Log-safe identifier derived from url, then title, then body.
    pub fn log_id(&self) -> String {
        match (&self.url, &self.title) {
            (Some(u), _) => anon_id(u),
            (None, Some(t)) => anon_id(t),
            (None, None) => anon_id(&self.body()),
        }
    }
}

fn null_as_empty<'de, D>(de: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(de)?.unwrap_or_default())
}

/// Anything that can hand the pipeline a finite batch of articles.
#[async_trait::async_trait]
pub trait ArticleSource {
    async fn fetch_articles(&self) -> Result<Vec<Article>>;
    fn name(&self) -> &'static str;
}

/// Reads the scraper's output file: `{ "articles": [...] }` or a bare array.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ArticleFile {
    Bare(Vec<Article>),
    Wrapped {
        #[serde(default)]
        articles: Vec<Article>,
    },
}

/// Parse the scraper file shape from a string.
pub fn parse_articles(raw: &str) -> Result<Vec<Article>> {
    let parsed: ArticleFile = serde_json::from_str(raw).context("parsing articles json")?;
    Ok(match parsed {
        ArticleFile::Wrapped { articles } => articles,
        ArticleFile::Bare(v) => v,
    })
}

#[async_trait::async_trait]
impl ArticleSource for JsonFileSource {
    async fn fetch_articles(&self) -> Result<Vec<Article>> {
        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("reading articles from {}", self.path.display()))?;
        parse_articles(&raw)
    }

    fn name(&self) -> &'static str {
        "json-file"
    }
}
