//! Query models and result sets exchanged with the host pipeline.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::index::DocId;

/// A weighted query term.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryTerm {
    /// Term text, as stored in the index lexicon.
    pub term: String,
    /// Term weight.
    pub weight: f64,
}

impl QueryTerm {
    /// Create a new query term.
    pub fn new<S: Into<String>>(term: S, weight: f64) -> Self {
        QueryTerm {
            term: term.into(),
            weight,
        }
    }
}

/// Ordered collection of weighted terms forming the active query.
///
/// Each term text appears at most once; adding an existing term updates it in
/// place, keeping its original position.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryModel {
    query_id: String,
    terms: Vec<QueryTerm>,
}

impl QueryModel {
    /// Create an empty query model.
    pub fn new<S: Into<String>>(query_id: S) -> Self {
        QueryModel {
            query_id: query_id.into(),
            terms: Vec::new(),
        }
    }

    /// Build a query from whitespace-separated text, each token with weight 1.
    ///
    /// Repeated tokens accumulate weight.
    pub fn from_text<S: Into<String>>(query_id: S, text: &str) -> Self {
        let mut query = QueryModel::new(query_id);
        for token in text.split_whitespace() {
            query.add_weight(&token.to_lowercase(), 1.0);
        }
        query
    }

    /// Identifier of the query, used to seed random sampling.
    pub fn query_id(&self) -> &str {
        &self.query_id
    }

    /// Set a term's weight, appending the term if it is new.
    pub fn add_term<S: Into<String>>(&mut self, term: S, weight: f64) {
        let term = term.into();
        match self.terms.iter_mut().find(|t| t.term == term) {
            Some(existing) => existing.weight = weight,
            None => self.terms.push(QueryTerm::new(term, weight)),
        }
    }

    /// Add to a term's weight, appending the term if it is new.
    pub fn add_weight(&mut self, term: &str, weight: f64) {
        match self.terms.iter_mut().find(|t| t.term == term) {
            Some(existing) => existing.weight += weight,
            None => self.terms.push(QueryTerm::new(term, weight)),
        }
    }

    /// Replace every term of the query.
    pub fn replace_terms<I>(&mut self, terms: I)
    where
        I: IntoIterator<Item = QueryTerm>,
    {
        self.terms.clear();
        for term in terms {
            self.add_term(term.term, term.weight);
        }
    }

    /// Weight of a term, if present.
    pub fn weight(&self, term: &str) -> Option<f64> {
        self.terms.iter().find(|t| t.term == term).map(|t| t.weight)
    }

    /// Sum of all term weights.
    pub fn total_weight(&self) -> f64 {
        self.terms.iter().map(|t| t.weight).sum()
    }

    /// Number of terms.
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Iterate over the terms in order.
    pub fn iter(&self) -> std::slice::Iter<'_, QueryTerm> {
        self.terms.iter()
    }

    /// Render as `term^weight` pairs separated by spaces.
    pub fn to_query_string(&self) -> String {
        self.terms
            .iter()
            .map(|t| format!("{}^{}", t.term, t.weight))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for QueryModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_query_string())
    }
}

/// A retrieved document with its retrieval score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoredDocument {
    /// Document id.
    pub doc_id: DocId,
    /// Retrieval score from the first pass.
    pub score: f64,
}

/// Ranked output of the first retrieval pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultSet {
    documents: Vec<ScoredDocument>,
}

impl ResultSet {
    /// Create an empty result set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a document. Documents are kept in insertion (rank) order.
    pub fn push(&mut self, doc_id: DocId, score: f64) {
        self.documents.push(ScoredDocument { doc_id, score });
    }

    /// Number of documents.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// The first `n` documents (or all of them if fewer).
    pub fn top(&self, n: usize) -> &[ScoredDocument] {
        &self.documents[..n.min(self.documents.len())]
    }

    /// All scores in rank order.
    pub fn scores(&self) -> Vec<f64> {
        self.documents.iter().map(|d| d.score).collect()
    }

    /// Iterate over documents in rank order.
    pub fn iter(&self) -> std::slice::Iter<'_, ScoredDocument> {
        self.documents.iter()
    }
}

impl FromIterator<(DocId, f64)> for ResultSet {
    fn from_iter<T: IntoIterator<Item = (DocId, f64)>>(iter: T) -> Self {
        let mut results = ResultSet::new();
        for (doc_id, score) in iter {
            results.push(doc_id, score);
        }
        results
    }
}
