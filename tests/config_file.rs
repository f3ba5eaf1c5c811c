use shelfcast::{AppConfig, DEFAULT_CONFIG_PATH};
use std::path::Path;

#[test]
fn test_shipped_config_matches_defaults() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join(DEFAULT_CONFIG_PATH);
    let config = AppConfig::from_file(&path).unwrap();

    assert_eq!(config, AppConfig::default());
}

#[test]
fn test_partial_config_keeps_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("models.toml");
    std::fs::write(&path, "[reporting_llm]\ntemperature = 0.0\n").unwrap();

    let config = AppConfig::from_file(&path).unwrap();
    assert_eq!(config.reporting_llm.temperature, 0.0);
    assert_eq!(config.reporting_llm.model_name, "gpt-4o");
    assert_eq!(config.forecast, AppConfig::default().forecast);
}
