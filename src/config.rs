//! Configuration for pseudo-relevance feedback.
//!
//! A [`FeedbackConfig`] is read once when an expander is constructed and is
//! immutable afterwards. The only per-request override is the RM3
//! interpolation weight, carried by
//! [`ExpansionRequest::lambda`](crate::feedback::ExpansionRequest).
//!
//! Validation happens here, at the loading boundary. The estimators never
//! re-check their parameters.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ExpansionError, Result};

/// Default number of expansion terms.
pub const DEFAULT_FB_TERMS: usize = 10;
/// Default number of feedback documents.
pub const DEFAULT_FB_DOCS: usize = 3;
/// Default minimum collection document frequency of a feedback term.
pub const DEFAULT_MIN_DF: u64 = 2;
/// Terms found in this fraction of the collection or more are ignored.
pub const DEFAULT_MAX_DOC_PERCENTAGE: f64 = 0.1;
/// Default RM3 interpolation weight of the original query.
pub const DEFAULT_LAMBDA: f64 = 0.6;
/// Default axiomatic discount of mutual information for new terms.
pub const DEFAULT_BETA: f64 = 0.6;
/// Default axiomatic shortlist size per original query term.
pub const DEFAULT_K: usize = 1000;
/// Default axiomatic background-sample multiplier.
pub const DEFAULT_R: usize = 10;

/// Which estimator builds the expanded query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpansionModel {
    /// Relevance model over the feedback documents only.
    Rm1,
    /// Relevance model interpolated with the original query.
    #[default]
    Rm3,
    /// Mutual-information based axiomatic expansion.
    Axiomatic,
}

/// Configuration for feedback expansion.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedbackConfig {
    /// Estimator used by [`QueryExpansionBuilder`](crate::feedback::QueryExpansionBuilder).
    pub model: ExpansionModel,
    /// Number of expansion terms to emit (M).
    pub fb_terms: usize,
    /// Number of top-ranked documents used as feedback (N).
    pub fb_docs: usize,
    /// Minimum collection document frequency for a feedback term.
    pub min_df: u64,
    /// Terms with document frequency at or above this fraction of the
    /// collection are dropped from feedback documents.
    pub max_doc_percentage: f64,
    /// RM3 weight of the original query distribution.
    pub lambda: f64,
    /// Re-clip to `fb_terms` and renormalize after RM3 interpolation.
    pub rm3_renormalize: bool,
    /// Axiomatic discount applied to mutual information of new terms.
    pub beta: f64,
    /// Axiomatic shortlist capacity per original query term.
    pub k: usize,
    /// Axiomatic background documents drawn per feedback document.
    pub r: usize,
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        Self {
            model: ExpansionModel::default(),
            fb_terms: DEFAULT_FB_TERMS,
            fb_docs: DEFAULT_FB_DOCS,
            min_df: DEFAULT_MIN_DF,
            max_doc_percentage: DEFAULT_MAX_DOC_PERCENTAGE,
            lambda: DEFAULT_LAMBDA,
            rm3_renormalize: false,
            beta: DEFAULT_BETA,
            k: DEFAULT_K,
            r: DEFAULT_R,
        }
    }
}

impl FeedbackConfig {
    /// Parse and validate a configuration from JSON.
    ///
    /// Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: FeedbackConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a configuration from a JSON file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.lambda) {
            return Err(ExpansionError::config(format!(
                "lambda must be within [0, 1], got {}",
                self.lambda
            )));
        }
        if !(self.max_doc_percentage > 0.0 && self.max_doc_percentage <= 1.0) {
            return Err(ExpansionError::config(format!(
                "max_doc_percentage must be within (0, 1], got {}",
                self.max_doc_percentage
            )));
        }
        if !self.beta.is_finite() || self.beta < 0.0 {
            return Err(ExpansionError::config(format!(
                "beta must be a non-negative finite number, got {}",
                self.beta
            )));
        }
        Ok(())
    }

    /// Set the estimator.
    pub fn with_model(mut self, model: ExpansionModel) -> Self {
        self.model = model;
        self
    }

    /// Set the document-frequency filter bounds.
    pub fn with_df_bounds(mut self, min_df: u64, max_doc_percentage: f64) -> Self {
        self.min_df = min_df;
        self.max_doc_percentage = max_doc_percentage;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = FeedbackConfig::default();
        assert_eq!(config.model, ExpansionModel::Rm3);
        assert_eq!(config.fb_terms, 10);
        assert_eq!(config.fb_docs, 3);
        assert_eq!(config.min_df, 2);
        assert_eq!(config.max_doc_percentage, 0.1);
        assert_eq!(config.lambda, 0.6);
        assert!(!config.rm3_renormalize);
        assert_eq!(config.beta, 0.6);
        assert_eq!(config.k, 1000);
        assert_eq!(config.r, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config =
            FeedbackConfig::from_json_str(r#"{"model": "axiomatic", "fb_terms": 20}"#).unwrap();
        assert_eq!(config.model, ExpansionModel::Axiomatic);
        assert_eq!(config.fb_terms, 20);
        assert_eq!(config.fb_docs, DEFAULT_FB_DOCS);
        assert_eq!(config.k, DEFAULT_K);
    }

    #[test]
    fn test_invalid_lambda_rejected() {
        let err = FeedbackConfig::from_json_str(r#"{"lambda": 1.5}"#).unwrap_err();
        assert!(matches!(err, ExpansionError::Config(_)));
    }

    #[test]
    fn test_negative_fb_docs_rejected_by_parser() {
        let err = FeedbackConfig::from_json_str(r#"{"fb_docs": -1}"#).unwrap_err();
        assert!(matches!(err, ExpansionError::Json(_)));
    }

    #[test]
    fn test_max_doc_percentage_bounds() {
        let config = FeedbackConfig::default().with_df_bounds(0, 0.0);
        assert!(config.validate().is_err());

        let config = FeedbackConfig::default().with_df_bounds(0, 1.0);
        assert!(config.validate().is_ok());
    }
}
