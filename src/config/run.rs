// src/config/run.rs
use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::context::ContextConfig;
use crate::sentiment::{BackendKind, ModelOverrides};

pub const ENV_CONFIG_PATH: &str = "KCS_CONFIG_PATH";
pub const ENV_KEYWORDS: &str = "KCS_KEYWORDS";
pub const ENV_WORDS_BEFORE: &str = "KCS_WORDS_BEFORE";
pub const ENV_WORDS_AFTER: &str = "KCS_WORDS_AFTER";
pub const ENV_WORKERS: &str = "KCS_WORKERS";
pub const ENV_BACKENDS: &str = "KCS_BACKENDS";

pub const DEFAULT_TOML_PATH: &str = "config/context.toml";
pub const DEFAULT_JSON_PATH: &str = "config/context.json";

fn default_keywords() -> Vec<String> {
    vec!["transnistria".to_string(), "Trans-Dniester".to_string()]
}
fn default_window() -> usize {
    40
}
fn default_backends() -> Vec<BackendKind> {
    vec![
        BackendKind::Polarity,
        BackendKind::Compound,
        BackendKind::BinaryClassifier,
    ]
}
fn default_workers() -> usize {
    1
}

/// Everything one batch run needs. Built once, then passed down explicitly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunConfig {
    #[serde(default = "default_keywords")]
    pub keywords: Vec<String>,
    #[serde(default = "default_window")]
    pub words_before: usize,
    #[serde(default = "default_window")]
    pub words_after: usize,
    #[serde(default = "default_backends")]
    pub backends: Vec<BackendKind>,
    #[serde(default)]
    pub models: ModelOverrides,
    /// 1 = sequential; more = blocking worker pool over documents.
    #[serde(default = "default_workers")]
    pub workers: usize,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            keywords: default_keywords(),
            words_before: default_window(),
            words_after: default_window(),
            backends: default_backends(),
            models: ModelOverrides::default(),
            workers: default_workers(),
        }
    }
}

impl RunConfig {
    /// Load from an explicit path. Supports TOML or JSON.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading run config from {}", path.display()))?;
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        parse_config(&content, ext.as_str())
            .with_context(|| format!("parsing run config {}", path.display()))
    }

    /// Load using env var + fallbacks:
    /// 1) $KCS_CONFIG_PATH
    /// 2) config/context.toml
    /// 3) config/context.json
    /// 4) built-in defaults
    pub fn load_default() -> Result<Self> {
        if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if pb.exists() {
                return Self::load_from(&pb);
            } else {
                bail!("{ENV_CONFIG_PATH} points to non-existent path");
            }
        }
        for candidate in [DEFAULT_TOML_PATH, DEFAULT_JSON_PATH] {
            let p = PathBuf::from(candidate);
            if p.exists() {
                return Self::load_from(&p);
            }
        }
        Ok(Self::default())
    }

    /// Apply `KCS_*` overrides. Unparseable values are ignored with a warning.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(raw) = std::env::var(ENV_KEYWORDS) {
            self.keywords = split_list(&raw);
        }
        if let Some(n) = env_usize(ENV_WORDS_BEFORE) {
            self.words_before = n;
        }
        if let Some(n) = env_usize(ENV_WORDS_AFTER) {
            self.words_after = n;
        }
        if let Some(n) = env_usize(ENV_WORKERS) {
            self.workers = n;
        }
        if let Ok(raw) = std::env::var(ENV_BACKENDS) {
            self.backends = split_list(&raw)
                .iter()
                .filter_map(|s| {
                    let kind = BackendKind::parse(s);
                    if kind.is_none() {
                        warn!(backend = %s, "unknown backend in {ENV_BACKENDS}, skipped");
                    }
                    kind
                })
                .collect();
        }
    }

    /// Clean keywords and check the result is runnable.
    ///
    /// Keywords are trimmed and empty entries dropped; order, duplicates and
    /// casing variants are kept.
    pub fn finalize(mut self) -> Result<Self> {
        self.keywords = self
            .keywords
            .into_iter()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .collect();
        if self.keywords.is_empty() {
            bail!("no keywords configured");
        }
        if self.backends.is_empty() {
            bail!("no sentiment backends enabled");
        }
        if self.workers == 0 {
            self.workers = 1;
        }
        Ok(self)
    }

    pub fn context(&self) -> ContextConfig {
        ContextConfig {
            keywords: self.keywords.clone(),
            words_before: self.words_before,
            words_after: self.words_after,
        }
    }
}

fn parse_config(s: &str, hint_ext: &str) -> Result<RunConfig> {
    let try_toml_first = hint_ext == "toml" || hint_ext.is_empty();
    if try_toml_first {
        if let Ok(v) = toml::from_str::<RunConfig>(s) {
            return Ok(v);
        }
    }
    match serde_json::from_str::<RunConfig>(s) {
        Ok(v) => Ok(v),
        Err(json_err) => {
            if !try_toml_first {
                if let Ok(v) = toml::from_str::<RunConfig>(s) {
                    return Ok(v);
                }
            }
            // Report the error of the format the file claims to be.
            if hint_ext == "json" {
                Err(anyhow!(json_err))
            } else {
                toml::from_str::<RunConfig>(s).map_err(|e| anyhow!(e))
            }
        }
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn env_usize(name: &str) -> Option<usize> {
    let raw = std::env::var(name).ok()?;
    match raw.trim().parse::<usize>() {
        Ok(n) => Some(n),
        Err(_) => {
            warn!(var = name, value = %raw, "ignoring non-numeric override");
            None
        }
    }
}
