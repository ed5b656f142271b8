// tests/batch_concurrent.rs
use std::sync::Arc;

use anyhow::{bail, Result};
use keyword_context_sentiment::{
    output::{write_report, RunReport},
    sentiment::{DynBackend, ModelOverrides, PolarityBackend},
    Article, ArticleSource, BackendKind, BackendSet, ContextConfig, ContextPipeline,
    JsonFileSource, RawResult, RunConfig, SentimentBackend,
};
use rand::{rngs::StdRng, Rng, SeedableRng};

const VOCAB: &[&str] = &[
    "the", "talks", "in", "Tiraspol", "were", "good", "bad", "peace", "war", "and", "growth",
    "crisis", "not", "very", "Transnistria", "border", "trade", "fear",
];

fn random_articles(seed: u64, n: usize) -> Vec<Article> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|i| {
            let len = rng.random_range(0..60);
            let words: Vec<&str> = (0..len)
                .map(|_| VOCAB[rng.random_range(0..VOCAB.len())])
                .collect();
            Article {
                title: Some(format!("doc-{i}")),
                url: Some(format!("https://news.example/{i}")),
                content: vec![words.join(" ")],
                ..Default::default()
            }
        })
        .collect()
}

fn context() -> ContextConfig {
    ContextConfig {
        keywords: vec!["tiraspol".into(), "transnistria".into()],
        words_before: 4,
        words_after: 4,
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn concurrent_matches_sequential() {
    let backends = BackendSet::load(&BackendKind::ALL, &ModelOverrides::default()).unwrap();
    let pipeline = Arc::new(ContextPipeline::new(context(), backends));
    let articles = random_articles(42, 40);

    let seq = pipeline.run_batch(&articles);
    let par = pipeline.run_batch_concurrent(articles, 4).await;

    assert!(!seq.reports.is_empty());
    assert_eq!(seq.reports, par.reports);
    assert_eq!(seq.summary, par.summary);
    assert!(par.failures.is_empty());
}

/// Polarity backend that refuses anything mentioning "war".
struct Picky(PolarityBackend);

impl SentimentBackend for Picky {
    fn kind(&self) -> BackendKind {
        BackendKind::Polarity
    }
    fn score(&self, text: &str) -> Result<RawResult> {
        if text.to_lowercase().contains("war") {
            bail!("pathological input");
        }
        self.0.score(text)
    }
}

#[tokio::test]
async fn backend_failure_skips_document_and_batch_continues() {
    let picky: DynBackend = Arc::new(Picky(PolarityBackend::embedded().unwrap()));
    let backends = BackendSet::from_backends(vec![picky]);
    let pipeline = Arc::new(ContextPipeline::new(context(), backends));
    let docs = vec![
        Article {
            title: Some("ok".into()),
            content: vec!["Tiraspol was calm.".into()],
            ..Default::default()
        },
        Article {
            title: Some("boom".into()),
            content: vec!["War near Tiraspol.".into()],
            ..Default::default()
        },
        Article {
            title: Some("ok too".into()),
            content: vec!["Transnistria held good talks.".into()],
            ..Default::default()
        },
    ];

    for out in [
        pipeline.run_batch(&docs),
        pipeline.run_batch_concurrent(docs.clone(), 2).await,
    ] {
        assert_eq!(out.reports.len(), 2);
        assert_eq!(out.failures.len(), 1);
        let f = &out.failures[0];
        assert_eq!(f.index, 1);
        assert_eq!(f.title.as_deref(), Some("boom"));
        assert!(f.error.contains("pathological input"), "{}", f.error);
        // The failed document contributes nothing to the summary.
        assert_eq!(out.summary.documents_with_mentions, 2);
        assert_eq!(out.summary.backends[0].scored, 2);
    }
}

#[tokio::test]
async fn json_file_source_to_report_file() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("scraped_articles.json");
    std::fs::write(
        &input,
        r#"{
  "scrape_date": "2025-01-01T00:00:00",
  "total_articles": 3,
  "articles": [
    {"title": "A", "url": "https://a", "scraped_at": "2025-01-01T00:00:00",
     "content": ["Transnistria is tense.", "Talks continue."]},
    {"title": "B", "url": "https://b", "content": null},
    {"title": "C", "url": "https://c", "content": ["Unrelated news."]}
  ]
}"#,
    )
    .unwrap();

    let source = JsonFileSource::new(&input);
    assert_eq!(source.name(), "json-file");
    let articles = source.fetch_articles().await.unwrap();
    assert_eq!(articles.len(), 3);

    let cfg = RunConfig::default().finalize().unwrap();
    let outcome = keyword_context_sentiment::run(&cfg, articles).await.unwrap();
    assert_eq!(outcome.reports.len(), 1);
    assert_eq!(outcome.reports[0].scraped_at.as_deref(), Some("2025-01-01T00:00:00"));

    let out = dir.path().join("sentiment_analysis.json");
    write_report(&out, &RunReport::new(&cfg, &outcome)).unwrap();
    let v: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(v["total_articles_with_keywords"], 1);
    assert_eq!(v["articles"][0]["title"], "A");
    assert_eq!(v["articles"][0]["spans"][0]["sentiment"]["status"], "scored");
    assert_eq!(
        v["articles"][0]["spans"][0]["sentiment"]["results"]
            .as_array()
            .unwrap()
            .len(),
        3
    );
    assert_eq!(v["summary"]["keyword_totals"]["transnistria"], 1);
    assert_eq!(v["summary"]["keyword_totals"]["Trans-Dniester"], 0);
}

#[tokio::test]
async fn missing_input_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let source = JsonFileSource::new(dir.path().join("nope.json"));
    assert!(source.fetch_articles().await.is_err());
}
