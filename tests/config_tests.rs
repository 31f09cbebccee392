use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use herald::config::{Config, PacingConfig, PhraseEntry, TranscriberKind, ENV_LOG_FILE, ENV_MODEL, ENV_OLLAMA_HOST};

#[test]
fn test_defaults() {
    let config = Config::default();
    assert_eq!(config.memory.path, PathBuf::from("conversation.json"));
    assert_eq!(config.memory.max_turns, 50);
    assert_eq!(config.log.path, PathBuf::from("assistant.log"));
    assert_eq!(config.reasoning.model, "phi3");
    assert_eq!(config.reasoning.timeout(), Duration::from_secs(20));
    assert_eq!(config.listen.duration_secs, 4);
    assert_eq!(config.listen.transcriber, TranscriberKind::Console);
    assert!(config.monitor.sensor_path.is_none());
    assert!(config.phrases.is_empty());
}

#[test]
fn test_empty_toml_is_default() {
    let config = Config::from_toml_str("").unwrap();
    assert_eq!(config.memory.max_turns, 50);
    assert_eq!(config.reasoning.history_turns, 6);
}

#[test]
fn test_parse_sections() {
    let config = Config::from_toml_str(
        r#"
        [memory]
        path = "/var/lib/herald/conversation.json"
        max_turns = 20

        [reasoning]
        host = "http://gpu-box:11434"
        timeout_secs = 5

        [listen]
        transcriber = "whisper"

        [monitor]
        sensor_path = "/run/sensors/temp"
        threshold = 38.5

        [[phrases]]
        phrase = "thank you"
        response = "You're welcome!"
        "#,
    )
    .unwrap();

    assert_eq!(config.memory.max_turns, 20);
    assert_eq!(config.reasoning.host, "http://gpu-box:11434");
    assert_eq!(config.reasoning.model, "phi3", "unset keys keep defaults");
    assert_eq!(config.reasoning.timeout(), Duration::from_secs(5));
    assert_eq!(config.listen.transcriber, TranscriberKind::Whisper);
    assert_eq!(config.monitor.sensor_path, Some(PathBuf::from("/run/sensors/temp")));
    assert_eq!(config.monitor.threshold, 38.5);
    assert_eq!(
        config.phrases,
        vec![PhraseEntry { phrase: "thank you".into(), response: "You're welcome!".into() }]
    );
}

#[test]
fn test_rejects_zero_cap_and_bad_toml() {
    assert!(Config::from_toml_str("[memory]\nmax_turns = 0").is_err());
    assert!(Config::from_toml_str("[listen]\ntranscriber = \"telepathy\"").is_err());
    assert!(Config::from_toml_str("memory = [").is_err());
}

#[test]
fn test_load_missing_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    assert!(Config::load(Some(dir.path().join("absent.toml").as_path())).is_err());
}

#[test]
fn test_environment_overrides() {
    let env: HashMap<&str, &str> = HashMap::from([
        (ENV_LOG_FILE, "/tmp/herald.log"),
        (ENV_OLLAMA_HOST, "http://10.0.0.2:11434"),
        (ENV_MODEL, ""),
    ]);

    let mut config = Config::default();
    config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

    assert_eq!(config.log.path, PathBuf::from("/tmp/herald.log"));
    assert_eq!(config.reasoning.host, "http://10.0.0.2:11434");
    assert_eq!(config.reasoning.model, "phi3", "empty values are ignored");
}

#[test]
fn test_feedback_pause_scales_with_words() {
    let pacing = PacingConfig::default();
    assert_eq!(pacing.feedback_pause(""), Duration::from_secs(1));

    // 1.0 + 4 * 0.15
    let pause = pacing.feedback_pause("Turning on the light.");
    assert!((pause.as_secs_f64() - 1.6).abs() < 1e-6, "got {pause:?}");
}

#[test]
fn test_feedback_pause_falls_back_on_invalid_value() {
    let pacing = PacingConfig { base_secs: f64::NAN, ..PacingConfig::default() };
    assert_eq!(pacing.feedback_pause("hello there"), Duration::from_secs(3));

    let negative = PacingConfig { per_word_secs: -5.0, ..PacingConfig::default() };
    assert_eq!(negative.feedback_pause("one two"), Duration::from_secs(3));
}

#[test]
fn test_immediate_pacing() {
    let pacing = PacingConfig::immediate();
    assert_eq!(pacing.feedback_pause("a long sentence with many words"), Duration::ZERO);
    assert_eq!(pacing.error_pause(), Duration::ZERO);
}
