// src/telemetry.rs
//! Tracing setup, metric descriptions and anonymised document ids for logs.

use metrics::{describe_counter, describe_histogram};
use once_cell::sync::OnceCell;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const DEFAULT_FILTER: &str = "keyword_context_sentiment=info,kcs=info,warn";

/// Install the global subscriber. `RUST_LOG` wins over the default filter.
/// Safe to call more than once; later calls are ignored.
pub fn init_tracing(json: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let registry = tracing_subscriber::registry().with(filter);
    let _ = if json {
        registry.with(fmt::layer().json()).try_init()
    } else {
        registry.with(fmt::layer().compact()).try_init()
    };
}

/// One-time metrics registration (so series carry help text once a recorder exists).
pub fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("kcs_documents_total", "Documents run through the pipeline.");
        describe_counter!(
            "kcs_documents_matched_total",
            "Documents with at least one keyword mention."
        );
        describe_counter!("kcs_spans_total", "Merged context spans produced.");
        describe_counter!(
            "kcs_backend_errors_total",
            "Sentiment backend scoring failures."
        );
        describe_histogram!("kcs_score_ms", "Per-backend scoring time in milliseconds.");
    });
}

/// Short SHA-256 prefix used to identify a document in logs without echoing its text.
pub fn anon_id(text: &str) -> String {
    use sha2::{Digest, Sha256};
    let digest = Sha256::digest(text.as_bytes());
    digest.iter().take(6).map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anon_id_is_short_and_stable() {
        let a = anon_id("https://example.org/a");
        assert_eq!(a.len(), 12);
        assert_eq!(a, anon_id("https://example.org/a"));
        assert_ne!(a, anon_id("https://example.org/b"));
    }
}
