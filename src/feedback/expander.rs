//! Query expander trait and the values it exchanges.

use serde::{Deserialize, Serialize};

use crate::error::{ExpansionError, Result};
use crate::index::{FeedbackIndex, TermId};
use crate::query::{QueryModel, QueryTerm, ResultSet};

/// Inputs of one expansion request.
#[derive(Debug, Clone, Copy)]
pub struct ExpansionRequest<'a> {
    /// The original query.
    pub query: &'a QueryModel,
    /// Ranked results of the first retrieval pass.
    pub results: &'a ResultSet,
    /// Per-request override of the RM3 interpolation weight.
    pub lambda: Option<f64>,
}

impl<'a> ExpansionRequest<'a> {
    /// Create a request without overrides.
    pub fn new(query: &'a QueryModel, results: &'a ResultSet) -> Self {
        ExpansionRequest {
            query,
            results,
            lambda: None,
        }
    }

    /// Override the RM3 interpolation weight for this request only.
    pub fn with_lambda(mut self, lambda: f64) -> Self {
        self.lambda = Some(lambda);
        self
    }
}

/// A weighted expansion term.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpansionTerm {
    /// Term id in the index snapshot.
    pub term_id: TermId,
    /// Term text.
    pub term: String,
    /// Probability mass (RM1/RM3) or unnormalized score (axiomatic).
    pub weight: f64,
}

impl From<ExpansionTerm> for QueryTerm {
    fn from(term: ExpansionTerm) -> Self {
        QueryTerm::new(term.term, term.weight)
    }
}

/// Output of one expander run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Expansion {
    /// Expansion terms, highest weight first.
    pub terms: Vec<ExpansionTerm>,
    /// Number of feedback documents used.
    pub feedback_documents: usize,
    /// Number of documents whose postings were read.
    pub analysed_documents: usize,
}

impl Expansion {
    /// An expansion that was skipped for lack of feedback documents.
    pub fn no_feedback() -> Self {
        Self::default()
    }

    /// Whether the expansion should be applied to the query.
    pub fn is_applicable(&self) -> bool {
        self.feedback_documents > 0 && !self.terms.is_empty()
    }

    /// Sum of all term weights.
    pub fn total_weight(&self) -> f64 {
        self.terms.iter().map(|t| t.weight).sum()
    }

    /// Weight of a term by text.
    pub fn weight(&self, term: &str) -> Option<f64> {
        self.terms.iter().find(|t| t.term == term).map(|t| t.weight)
    }
}

/// How an expansion is merged into the active query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeMode {
    /// The expansion terms become the whole query.
    Replace,
    /// Expansion weights are added to the existing query weights.
    Accumulate,
}

/// Pseudo-relevance feedback strategy.
///
/// Implementations hold only immutable configuration; all per-request state
/// is created inside [`expand`](QueryExpander::expand), so one expander can
/// serve concurrent requests.
pub trait QueryExpander: Send + Sync {
    /// Derive weighted expansion terms for a request.
    fn expand(&self, index: &dyn FeedbackIndex, request: &ExpansionRequest<'_>) -> Result<Expansion>;

    /// How the result is merged into the query.
    fn merge_mode(&self) -> MergeMode;

    /// Get the name of this expander for logging.
    fn name(&self) -> &str;
}

/// Resolve term ids to text and order them by weight, ties by term id.
pub(crate) fn resolve_terms<I>(index: &dyn FeedbackIndex, weights: I) -> Result<Vec<ExpansionTerm>>
where
    I: IntoIterator<Item = (TermId, f64)>,
{
    let mut terms = weights
        .into_iter()
        .map(|(term_id, weight)| {
            let term = index.term_text(term_id)?.ok_or_else(|| {
                ExpansionError::index_access(format!("No lexicon entry for term id {term_id}"))
            })?;
            Ok(ExpansionTerm {
                term_id,
                term,
                weight,
            })
        })
        .collect::<Result<Vec<_>>>()?;
    terms.sort_by(|a, b| {
        b.weight
            .total_cmp(&a.weight)
            .then_with(|| a.term_id.cmp(&b.term_id))
    });
    Ok(terms)
}

/// Resolve the original query's terms against the index, skipping unknown
/// terms.
pub(crate) fn resolve_query_terms(
    index: &dyn FeedbackIndex,
    query: &QueryModel,
) -> Result<Vec<(TermId, f64)>> {
    let mut resolved = Vec::with_capacity(query.len());
    for term in query.iter() {
        if let Some(term_id) = index.term_id(&term.term)? {
            resolved.push((term_id, term.weight));
        }
    }
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::MemoryIndex;

    #[test]
    fn test_resolve_terms_orders_by_weight_then_id() {
        let index = MemoryIndex::from_texts(&["a b c"]);
        let terms = resolve_terms(&index, vec![(2, 0.25), (0, 0.5), (1, 0.25)]).unwrap();
        let order: Vec<&str> = terms.iter().map(|t| t.term.as_str()).collect();
        assert_eq!(order, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_resolve_unknown_term_id_fails() {
        let index = MemoryIndex::from_texts(&["a"]);
        assert!(resolve_terms(&index, vec![(3, 1.0)]).unwrap_err().is_index_access());
    }

    #[test]
    fn test_resolve_query_terms_skips_unknown() {
        let index = MemoryIndex::from_texts(&["fox dog"]);
        let query = QueryModel::from_text("q", "cat dog");
        assert_eq!(resolve_query_terms(&index, &query).unwrap(), vec![(1, 1.0)]);
    }

    #[test]
    fn test_expansion_applicability() {
        assert!(!Expansion::no_feedback().is_applicable());
        let expansion = Expansion {
            terms: vec![ExpansionTerm {
                term_id: 0,
                term: "fox".to_string(),
                weight: 1.0,
            }],
            feedback_documents: 1,
            analysed_documents: 1,
        };
        assert!(expansion.is_applicable());
        assert_eq!(expansion.weight("fox"), Some(1.0));
        assert_eq!(expansion.total_weight(), 1.0);
    }
}
