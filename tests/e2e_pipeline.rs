// tests/e2e_pipeline.rs
use keyword_context_sentiment::{
    extract_contexts, sentiment::ModelOverrides, Article, BackendKind, BackendSet,
    Classification, ContextConfig, ContextPipeline, RawResult, SpanSentiment,
};

fn cfg(keywords: &[&str], before: usize, after: usize) -> ContextConfig {
    ContextConfig {
        keywords: keywords.iter().map(|s| s.to_string()).collect(),
        words_before: before,
        words_after: after,
    }
}

fn all_backends() -> BackendSet {
    BackendSet::load(&BackendKind::ALL, &ModelOverrides::default()).unwrap()
}

fn article(paragraphs: &[&str]) -> Article {
    Article {
        title: Some("test".into()),
        url: Some("https://news.example/t".into()),
        content: paragraphs.iter().map(|s| s.to_string()).collect(),
        ..Default::default()
    }
}

#[test]
fn transnistria_sentence_end_to_end() {
    let p = ContextPipeline::new(cfg(&["transnistria"], 2, 2), all_backends());
    let report = p
        .process_document(&article(&[
            "The region of Transnistria declared independence in 1990.",
        ]))
        .unwrap()
        .expect("one mention");

    assert_eq!(report.total_mentions, 1);
    assert_eq!(report.keyword_counts.get("transnistria"), Some(&1));
    assert_eq!(report.spans.len(), 1);
    let span = &report.spans[0];
    assert_eq!(span.context, "region of Transnistria declared independence");
    assert_eq!((span.start, span.end), (1, 5));

    let results = span.sentiment.results();
    assert_eq!(results.len(), 4);
    for r in results {
        assert!((-1.0..=1.0).contains(&r.score), "{r:?}");
    }
    assert!(matches!(results[0].raw, RawResult::Polarity { .. }));
    assert!(matches!(results[1].raw, RawResult::Compound { .. }));
    assert!(matches!(results[2].raw, RawResult::Label { .. }));
    assert!(matches!(results[3].raw, RawResult::Distribution { .. }));
}

#[test]
fn exact_token_matching_only() {
    let out = extract_contexts(
        "Transnistrian officials met. TRANSNISTRIA replied.",
        &cfg(&["transnistria"], 0, 0),
    );
    assert_eq!(out.total_mentions, 1);
    assert_eq!(out.spans[0].text, "TRANSNISTRIA");
}

#[test]
fn hyphenated_keyword_and_casing_variants() {
    let out = extract_contexts(
        "The Trans-Dniester conflict; trans-dniester again.",
        &cfg(&["Trans-Dniester", "trans-dniester"], 0, 0),
    );
    // Each casing variant counts every case-insensitive hit.
    assert_eq!(out.keyword_counts.get("Trans-Dniester"), Some(&2));
    assert_eq!(out.keyword_counts.get("trans-dniester"), Some(&2));
    assert_eq!(out.total_mentions, 4);
    // Both variants share each position, so windows merge per position.
    assert_eq!(out.spans.len(), 2);
    assert_eq!(out.spans[0].keywords.len(), 2);
}

#[test]
fn clamping_at_both_document_edges() {
    let text = "Transnistria is small and Tiraspol is its capital city Transnistria";
    let out = extract_contexts(text, &cfg(&["transnistria"], 40, 40));
    assert_eq!(out.spans.len(), 1);
    assert_eq!(out.spans[0].start, -40);
    assert_eq!(out.spans[0].end, 9 + 40);
    assert_eq!(out.spans[0].text, text);
}

#[test]
fn unbounded_windows_cover_whole_document() {
    let text = "Transnistria is small and Tiraspol is its capital";
    let out = extract_contexts(text, &cfg(&["tiraspol"], usize::MAX, usize::MAX));
    assert_eq!(out.spans.len(), 1);
    assert!(out.spans[0].start < 0);
    assert_eq!(out.spans[0].end, i64::MAX);
    assert_eq!(out.spans[0].text, text);
}

#[test]
fn polar_contexts_move_scores_in_the_right_direction() {
    let p = ContextPipeline::new(cfg(&["tiraspol"], 6, 6), all_backends());
    let good = p
        .process_document(&article(&[
            "Talks in Tiraspol were a great success and brought peace and growth.",
        ]))
        .unwrap()
        .unwrap();
    let bad = p
        .process_document(&article(&[
            "Violence in Tiraspol caused a terrible crisis, war and losses.",
        ]))
        .unwrap()
        .unwrap();

    let g = good.spans[0].sentiment.results();
    let b = bad.spans[0].sentiment.results();
    for (gr, br) in g.iter().zip(b) {
        assert_eq!(gr.backend, br.backend);
        assert!(gr.score > br.score, "{:?}: {} vs {}", gr.backend, gr.score, br.score);
    }
    assert_eq!(g[0].classification, Classification::Positive);
    assert_eq!(b[0].classification, Classification::Negative);
    assert_eq!(g[1].classification, Classification::Positive);
    assert_eq!(b[1].classification, Classification::Negative);
}

#[test]
fn batch_keeps_input_order_and_drops_misses() {
    let p = ContextPipeline::new(cfg(&["chisinau"], 3, 3), all_backends());
    let docs = vec![
        Article {
            title: Some("first".into()),
            content: vec!["Chisinau hosted a good summit.".into()],
            ..Default::default()
        },
        Article {
            title: Some("miss".into()),
            content: vec!["Nothing relevant.".into()],
            ..Default::default()
        },
        Article {
            title: Some("no content".into()),
            ..Default::default()
        },
        Article {
            title: Some("last".into()),
            content: vec!["Protests in Chisinau.".into(), "Chisinau again.".into()],
            ..Default::default()
        },
    ];
    let out = p.run_batch(&docs);
    let titles: Vec<_> = out.reports.iter().map(|r| r.title.as_deref()).collect();
    assert_eq!(titles, vec![Some("first"), Some("last")]);
    assert!(out.failures.is_empty());
    assert_eq!(out.summary.documents_with_mentions, 2);
    assert_eq!(out.summary.keyword_totals.get("chisinau"), Some(&3));
    assert_eq!(out.summary.backends.len(), 4);
    assert!(out.reports[1]
        .spans
        .iter()
        .all(|s| matches!(s.sentiment, SpanSentiment::Scored(_))));
}
