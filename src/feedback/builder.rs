//! Builder for creating QueryExpansion instances.

use crate::config::{ExpansionModel, FeedbackConfig};
use crate::error::Result;
use crate::feedback::axiomatic::AxiomaticExpander;
use crate::feedback::core::QueryExpansion;
use crate::feedback::expander::QueryExpander;
use crate::feedback::rm1::Rm1Expander;
use crate::feedback::rm3::Rm3Expander;

/// Builder for creating `QueryExpansion` instances.
///
/// # Example
///
/// ```
/// use prf_expansion::config::{ExpansionModel, FeedbackConfig};
/// use prf_expansion::feedback::QueryExpansionBuilder;
///
/// # fn main() -> prf_expansion::error::Result<()> {
/// let expansion = QueryExpansionBuilder::new(FeedbackConfig::default())
///     .model(ExpansionModel::Rm3)
///     .fb_docs(5)
///     .fb_terms(20)
///     .lambda(0.5)
///     .build()?;
/// assert_eq!(expansion.expander().name(), "rm3");
/// # Ok(())
/// # }
/// ```
pub struct QueryExpansionBuilder {
    config: FeedbackConfig,
    custom: Option<Box<dyn QueryExpander>>,
}

impl QueryExpansionBuilder {
    /// Create a new builder from a configuration.
    pub fn new(config: FeedbackConfig) -> Self {
        Self {
            config,
            custom: None,
        }
    }

    /// Set the estimator.
    pub fn model(mut self, model: ExpansionModel) -> Self {
        self.config.model = model;
        self
    }

    /// Set the number of expansion terms.
    pub fn fb_terms(mut self, fb_terms: usize) -> Self {
        self.config.fb_terms = fb_terms;
        self
    }

    /// Set the number of feedback documents.
    pub fn fb_docs(mut self, fb_docs: usize) -> Self {
        self.config.fb_docs = fb_docs;
        self
    }

    /// Set the RM3 interpolation weight.
    pub fn lambda(mut self, lambda: f64) -> Self {
        self.config.lambda = lambda;
        self
    }

    /// Use a custom expander instead of the configured model.
    pub fn add_expander(mut self, expander: Box<dyn QueryExpander>) -> Self {
        self.custom = Some(expander);
        self
    }

    /// Validate the configuration and build the `QueryExpansion` instance.
    pub fn build(self) -> Result<QueryExpansion> {
        self.config.validate()?;
        let expander: Box<dyn QueryExpander> = match self.custom {
            Some(expander) => expander,
            None => match self.config.model {
                ExpansionModel::Rm1 => Box::new(Rm1Expander::new(&self.config)),
                ExpansionModel::Rm3 => Box::new(Rm3Expander::new(&self.config)),
                ExpansionModel::Axiomatic => Box::new(AxiomaticExpander::new(&self.config)),
            },
        };
        Ok(QueryExpansion::new(expander))
    }
}
