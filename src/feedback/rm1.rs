//! RM1 relevance model.
//!
//! Each feedback document gets a relevance weight `p_d` from a softmax over
//! the retrieval scores of the whole result set. A term's feedback score is
//! the mean over feedback documents of `tf(t, d) / |d| * p_d`. The `fb_terms`
//! best terms are kept and renormalized into a probability distribution.

use ahash::{AHashMap, AHashSet};
use tracing::{info, warn};

use crate::config::FeedbackConfig;
use crate::error::Result;
use crate::feedback::document::{FeedbackDocument, TermFilter};
use crate::feedback::expander::{
    Expansion, ExpansionRequest, MergeMode, QueryExpander, resolve_terms,
};
use crate::feedback::scoring::log_sum_exp;
use crate::feedback::top_k::TopKSelector;
use crate::index::{FeedbackIndex, TermId};
use crate::query::ResultSet;

/// Normalized feedback distribution of one request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RelevanceModel {
    /// (term, probability) pairs, highest probability first.
    pub weights: Vec<(TermId, f64)>,
    /// Number of feedback documents it was estimated from.
    pub feedback_documents: usize,
}

impl RelevanceModel {
    /// Probability of a term, 0 if absent.
    pub fn probability(&self, term_id: TermId) -> f64 {
        self.weights
            .iter()
            .find(|(t, _)| *t == term_id)
            .map(|(_, w)| *w)
            .unwrap_or(0.0)
    }
}

/// RM1 query expander.
#[derive(Debug, Clone)]
pub struct Rm1Expander {
    fb_terms: usize,
    fb_docs: usize,
    filter: TermFilter,
}

impl Rm1Expander {
    /// Create an expander from configuration.
    pub fn new(config: &FeedbackConfig) -> Self {
        Rm1Expander {
            fb_terms: config.fb_terms,
            fb_docs: config.fb_docs,
            filter: TermFilter::new(config.min_df, config.max_doc_percentage),
        }
    }

    /// Number of expansion terms kept.
    pub fn fb_terms(&self) -> usize {
        self.fb_terms
    }

    /// Number of feedback documents used.
    pub fn fb_docs(&self) -> usize {
        self.fb_docs
    }

    /// Build the feedback documents of a result set.
    ///
    /// The softmax normalizer is taken over every result, not only the
    /// `fb_docs` selected ones.
    pub fn retrieve_top_documents(
        &self,
        index: &dyn FeedbackIndex,
        results: &ResultSet,
    ) -> Result<Vec<FeedbackDocument>> {
        let selected = results.top(self.fb_docs);
        if selected.is_empty() {
            return Ok(Vec::new());
        }

        let norm = log_sum_exp(&results.scores());
        let mut documents = Vec::with_capacity(selected.len());
        let mut lexicon: AHashSet<TermId> = AHashSet::new();
        for result in selected {
            let relevance = (result.score - norm).exp();
            let document = FeedbackDocument::build(index, result.doc_id, relevance, &self.filter)?;
            lexicon.extend(document.term_ids());
            documents.push(document);
        }

        if lexicon.is_empty() {
            warn!(
                feedback_documents = documents.len(),
                "Did not find any useful candidate expansion terms after feedback document analysis"
            );
        } else {
            info!(
                terms = lexicon.len(),
                "Found candidate terms after feedback document analysis"
            );
        }
        Ok(documents)
    }

    /// Raw RM1 score of every term in the feedback documents.
    pub fn feedback_term_scores(documents: &[FeedbackDocument]) -> AHashMap<TermId, f64> {
        let mut scores: AHashMap<TermId, f64> = AHashMap::new();
        if documents.is_empty() {
            return scores;
        }
        for document in documents {
            if document.length() == 0 {
                continue;
            }
            let length = document.length() as f64;
            for (term_id, frequency) in document.terms() {
                *scores.entry(term_id).or_insert(0.0) +=
                    frequency as f64 / length * document.relevance();
            }
        }
        let scale = 1.0 / documents.len() as f64;
        for score in scores.values_mut() {
            *score *= scale;
        }
        scores
    }

    /// Keep the `fb_terms` highest scores, best first.
    pub fn clip_terms(scores: AHashMap<TermId, f64>, fb_terms: usize) -> Vec<(TermId, f64)> {
        let mut selector = TopKSelector::new(fb_terms);
        selector.extend(scores);
        selector.into_sorted_vec()
    }

    /// Turn clipped scores into a probability distribution.
    ///
    /// Returns `None` when the total is not a positive finite number, in which
    /// case no expansion is produced.
    pub fn normalize(terms: Vec<(TermId, f64)>) -> Option<Vec<(TermId, f64)>> {
        if terms.is_empty() {
            return Some(terms);
        }
        let norm: f64 = terms.iter().map(|(_, w)| w).sum();
        if !(norm > 0.0 && norm.is_finite()) {
            warn!(norm, candidates = terms.len(), "Degenerate feedback distribution");
            return None;
        }
        Some(terms.into_iter().map(|(t, w)| (t, w / norm)).collect())
    }

    /// Run retrieval, scoring, clipping and normalization for one request.
    pub fn relevance_model(
        &self,
        index: &dyn FeedbackIndex,
        results: &ResultSet,
    ) -> Result<RelevanceModel> {
        let documents = self.retrieve_top_documents(index, results)?;
        let scores = Self::feedback_term_scores(&documents);
        let clipped = Self::clip_terms(scores, self.fb_terms);
        let weights = Self::normalize(clipped).unwrap_or_default();
        Ok(RelevanceModel {
            weights,
            feedback_documents: documents.len(),
        })
    }
}

impl QueryExpander for Rm1Expander {
    fn expand(&self, index: &dyn FeedbackIndex, request: &ExpansionRequest<'_>) -> Result<Expansion> {
        let model = self.relevance_model(index, request.results)?;
        Ok(Expansion {
            terms: resolve_terms(index, model.weights)?,
            feedback_documents: model.feedback_documents,
            analysed_documents: model.feedback_documents,
        })
    }

    fn merge_mode(&self) -> MergeMode {
        MergeMode::Replace
    }

    fn name(&self) -> &str {
        "rm1"
    }
}
