// tests/config_env.rs
use keyword_context_sentiment::{config::run::*, BackendKind, RunConfig};
use std::{env, fs};

fn clear_env() {
    for var in [
        ENV_CONFIG_PATH,
        ENV_KEYWORDS,
        ENV_WORDS_BEFORE,
        ENV_WORDS_AFTER,
        ENV_WORKERS,
        ENV_BACKENDS,
    ] {
        env::remove_var(var);
    }
}

#[test]
fn load_from_toml_and_json_files() {
    let dir = tempfile::tempdir().unwrap();

    let p_toml = dir.path().join("context.toml");
    fs::write(
        &p_toml,
        r#"
keywords = ["Moldova", "Tiraspol"]
words_before = 10
words_after = 12
backends = ["finance-classifier"]
"#,
    )
    .unwrap();
    let cfg = RunConfig::load_from(&p_toml).unwrap();
    assert_eq!(cfg.keywords, vec!["Moldova".to_string(), "Tiraspol".to_string()]);
    assert_eq!((cfg.words_before, cfg.words_after), (10, 12));
    assert_eq!(cfg.backends, vec![BackendKind::FinanceClassifier]);

    let p_json = dir.path().join("context.json");
    fs::write(&p_json, r#"{"keywords": ["x"], "models": {"binary": "m.json"}}"#).unwrap();
    let cfg = RunConfig::load_from(&p_json).unwrap();
    assert_eq!(cfg.keywords, vec!["x".to_string()]);
    assert_eq!(cfg.words_before, 40);
    assert_eq!(
        cfg.models.binary.as_deref(),
        Some(std::path::Path::new("m.json"))
    );

    assert!(RunConfig::load_from(&dir.path().join("missing.toml")).is_err());
}

#[serial_test::serial]
#[test]
fn default_uses_env_then_fallbacks() {
    let old = env::current_dir().unwrap();
    let tmp = tempfile::tempdir().unwrap();
    env::set_current_dir(tmp.path()).unwrap();
    clear_env();

    // 1) Nothing on disk → built-in defaults
    let cfg = RunConfig::load_default().unwrap();
    assert_eq!(cfg, RunConfig::default());

    // 2) ./config/context.json fallback
    let cfg_dir = tmp.path().join("config");
    fs::create_dir_all(&cfg_dir).unwrap();
    fs::write(cfg_dir.join("context.json"), r#"{"words_before": 3}"#).unwrap();
    assert_eq!(RunConfig::load_default().unwrap().words_before, 3);

    // 3) TOML wins over JSON
    fs::write(cfg_dir.join("context.toml"), "words_before = 4").unwrap();
    assert_eq!(RunConfig::load_default().unwrap().words_before, 4);

    // 4) env path wins over both
    let p_env = tmp.path().join("elsewhere.toml");
    fs::write(&p_env, "words_before = 5").unwrap();
    env::set_var(ENV_CONFIG_PATH, p_env.display().to_string());
    assert_eq!(RunConfig::load_default().unwrap().words_before, 5);

    // 5) env path that does not exist is an error, not a silent fallback
    env::set_var(ENV_CONFIG_PATH, tmp.path().join("nope.toml").display().to_string());
    assert!(RunConfig::load_default().is_err());

    clear_env();
    env::set_current_dir(&old).unwrap();
}

#[serial_test::serial]
#[test]
fn env_overrides_apply_and_bad_values_are_ignored() {
    clear_env();
    env::set_var(ENV_KEYWORDS, " Dow , , fed ");
    env::set_var(ENV_WORDS_BEFORE, "7");
    env::set_var(ENV_WORDS_AFTER, "many");
    env::set_var(ENV_WORKERS, "4");
    env::set_var(ENV_BACKENDS, "compound, transformer, binary_classifier");

    let mut cfg = RunConfig::default();
    cfg.apply_env_overrides();
    let cfg = cfg.finalize().unwrap();

    assert_eq!(cfg.keywords, vec!["Dow".to_string(), "fed".to_string()]);
    assert_eq!(cfg.words_before, 7);
    assert_eq!(cfg.words_after, 40);
    assert_eq!(cfg.workers, 4);
    assert_eq!(
        cfg.backends,
        vec![BackendKind::Compound, BackendKind::BinaryClassifier]
    );

    let ctx = cfg.context();
    assert_eq!(ctx.keywords, cfg.keywords);
    assert_eq!(ctx.words_before, 7);

    clear_env();
}

#[serial_test::serial]
#[test]
fn env_backends_all_unknown_fails_finalize() {
    clear_env();
    env::set_var(ENV_BACKENDS, "bert");
    let mut cfg = RunConfig::default();
    cfg.apply_env_overrides();
    assert!(cfg.finalize().is_err());
    clear_env();
}
