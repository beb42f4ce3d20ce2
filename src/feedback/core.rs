//! Applying an expander to the active query.

use tracing::info;

use crate::error::Result;
use crate::feedback::expander::{Expansion, ExpansionRequest, MergeMode, QueryExpander};
use crate::index::FeedbackIndex;
use crate::query::{QueryModel, QueryTerm, ResultSet};

/// Rewrites queries with a feedback expander.
pub struct QueryExpansion {
    expander: Box<dyn QueryExpander>,
}

impl std::fmt::Debug for QueryExpansion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryExpansion")
            .field("expander", &self.expander.name())
            .finish()
    }
}

impl QueryExpansion {
    /// Wrap an expander.
    pub fn new(expander: Box<dyn QueryExpander>) -> Self {
        QueryExpansion { expander }
    }

    /// The wrapped expander.
    pub fn expander(&self) -> &dyn QueryExpander {
        self.expander.as_ref()
    }

    /// Compute the expansion for a query without modifying it.
    pub fn expansion(
        &self,
        index: &dyn FeedbackIndex,
        query: &QueryModel,
        results: &ResultSet,
        lambda: Option<f64>,
    ) -> Result<Expansion> {
        let request = ExpansionRequest {
            query,
            results,
            lambda,
        };
        self.expander.expand(index, &request)
    }

    /// Expand `query` in place from the first-pass `results`.
    ///
    /// Returns `false`, leaving the query untouched, when there was no
    /// feedback or no term survived.
    pub fn expand_query(
        &self,
        index: &dyn FeedbackIndex,
        query: &mut QueryModel,
        results: &ResultSet,
        lambda: Option<f64>,
    ) -> Result<bool> {
        let expansion = self.expansion(index, query, results, lambda)?;
        if !expansion.is_applicable() {
            info!(
                query_id = query.query_id(),
                model = self.expander.name(),
                feedback_documents = expansion.feedback_documents,
                "No expansion applied"
            );
            return Ok(false);
        }

        match self.expander.merge_mode() {
            MergeMode::Replace => {
                query.replace_terms(expansion.terms.into_iter().map(QueryTerm::from));
            }
            MergeMode::Accumulate => {
                for term in &expansion.terms {
                    query.add_weight(&term.term, term.weight);
                }
            }
        }

        info!(
            query_id = query.query_id(),
            model = self.expander.name(),
            lambda,
            "Reformulated query: {}",
            query
        );
        Ok(true)
    }
}
