//! Integration tests for loading feedback configuration from disk

use std::fs;

use prf_expansion::prelude::*;
use tempfile::TempDir;

#[test]
fn test_load_from_file() -> Result<()> {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("feedback.json");
    fs::write(
        &path,
        r#"{
            "model": "rm1",
            "fb_terms": 25,
            "fb_docs": 8,
            "min_df": 1,
            "max_doc_percentage": 0.5
        }"#,
    )?;

    let config = FeedbackConfig::load_from_file(&path)?;
    assert_eq!(config.model, ExpansionModel::Rm1);
    assert_eq!(config.fb_terms, 25);
    assert_eq!(config.fb_docs, 8);
    assert_eq!(config.min_df, 1);
    assert_eq!(config.max_doc_percentage, 0.5);
    assert_eq!(config.lambda, 0.6);

    let expansion = QueryExpansionBuilder::new(config).build()?;
    assert_eq!(expansion.expander().name(), "rm1");

    Ok(())
}

#[test]
fn test_round_trip_through_file() -> Result<()> {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("feedback.json");

    let config = FeedbackConfig {
        rm3_renormalize: true,
        beta: 0.3,
        ..FeedbackConfig::default().with_model(ExpansionModel::Axiomatic)
    };
    fs::write(&path, serde_json::to_string_pretty(&config)?)?;

    let loaded = FeedbackConfig::load_from_file(&path)?;
    assert_eq!(loaded.model, ExpansionModel::Axiomatic);
    assert!(loaded.rm3_renormalize);
    assert_eq!(loaded.beta, 0.3);

    Ok(())
}

#[test]
fn test_missing_file_is_an_io_error() {
    let temp_dir = TempDir::new().unwrap();
    let err = FeedbackConfig::load_from_file(temp_dir.path().join("absent.json")).unwrap_err();
    match err {
        ExpansionError::Io(e) => assert_eq!(e.kind(), std::io::ErrorKind::NotFound),
        other => panic!("Expected I/O error, got {other:?}"),
    }
    assert!(!FeedbackConfig::load_from_file(temp_dir.path()).unwrap_err().is_index_access());
}

#[test]
fn test_invalid_values_are_rejected_on_load() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("feedback.json");
    fs::write(&path, r#"{"beta": -1.0}"#).unwrap();

    let err = FeedbackConfig::load_from_file(&path).unwrap_err();
    assert!(matches!(err, ExpansionError::Config(_)));
}
