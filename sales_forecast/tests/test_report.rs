use pretty_assertions::assert_eq;
use sales_forecast::config::ReportConfig;
use sales_forecast::report::{
    ChatCompletionNarrator, NarrativeGenerator, ReportBundle, ReportError, TemplateNarrator,
    API_KEY_ENV,
};
use std::path::PathBuf;

fn bundle() -> ReportBundle {
    ReportBundle {
        entity_id: "1".to_string(),
        mape: 4.17,
        forecast_total: 78_451_234.56,
        avg_weekly: 1_508_677.59,
        regressor_effects: "- **Holiday_Flag:** `61234.50`\n- **CPI:** `-812.04`".to_string(),
        forecast_plot_path: PathBuf::from("outputs/store_1_forecast_plot.svg"),
    }
}

#[test]
fn test_template_report_sections() {
    let report = TemplateNarrator::new().summarize(&bundle()).unwrap();

    assert!(report.starts_with("# Sales Forecast Briefing: Store 1"));
    assert!(report.contains("**MAPE (Mean Absolute Percentage Error):** 4.17%"));
    assert!(report.contains("**Total Forecasted Sales:** $78,451,234"));
    assert!(report.contains("**Average Weekly Sales:** $1,508,677"));
    assert!(report.contains("- **CPI:** `-812.04`"));
    assert!(report.contains("![Forecast for Store 1](outputs/store_1_forecast_plot.svg)"));
}

#[test]
fn test_template_report_without_regressors() {
    let bundle = ReportBundle {
        regressor_effects: String::new(),
        ..bundle()
    };
    let report = TemplateNarrator::new().summarize(&bundle).unwrap();

    assert!(report.contains("No regressors were included"));
}

#[test]
fn test_template_report_is_deterministic() {
    let narrator = TemplateNarrator::new();
    assert_eq!(
        narrator.summarize(&bundle()).unwrap(),
        narrator.summarize(&bundle()).unwrap()
    );
}

#[test]
fn test_boxed_generator() {
    let narrator: Box<dyn NarrativeGenerator> = Box::new(TemplateNarrator::new());
    assert!(narrator.summarize(&bundle()).unwrap().contains("Store 1"));
}

#[test]
fn test_missing_api_key() {
    std::env::remove_var(API_KEY_ENV);

    let result = ChatCompletionNarrator::from_env(ReportConfig::default());
    assert!(matches!(result, Err(ReportError::MissingCredential(API_KEY_ENV))));
}

#[test]
fn test_explicit_key_and_endpoint() {
    let narrator = ChatCompletionNarrator::new("test-key", ReportConfig::default())
        .unwrap()
        .with_endpoint("http://localhost:9/v1/chat/completions");

    assert_eq!(narrator.config(), &ReportConfig::default());
}

#[test]
fn test_unreachable_endpoint_is_http_error() {
    let narrator = ChatCompletionNarrator::new("test-key", ReportConfig::default())
        .unwrap()
        .with_endpoint("http://127.0.0.1:9/v1/chat/completions");

    assert!(matches!(narrator.summarize(&bundle()), Err(ReportError::Http(_))));
}
