//! RM3: RM1 interpolated with the original query.
//!
//! `p(t) = lambda * p_query(t) + (1 - lambda) * p_rm1(t)`, where a term
//! missing from either distribution contributes 0 from that side and terms
//! whose mixed weight is exactly 0 are dropped. With the
//! default configuration the interpolated map is emitted as is; setting
//! `rm3_renormalize` clips it to `fb_terms` and renormalizes it.
//!
//! When RM1 yields no distribution (no candidate survived the filters, or the
//! scores could not be normalized) nothing is emitted and the query is kept.

use ahash::AHashMap;
use tracing::debug;

use crate::config::FeedbackConfig;
use crate::error::Result;
use crate::feedback::expander::{
    Expansion, ExpansionRequest, MergeMode, QueryExpander, resolve_query_terms, resolve_terms,
};
use crate::feedback::rm1::{RelevanceModel, Rm1Expander};
use crate::index::{FeedbackIndex, TermId};
use crate::query::QueryModel;

/// RM3 query expander.
#[derive(Debug, Clone)]
pub struct Rm3Expander {
    rm1: Rm1Expander,
    lambda: f64,
    renormalize: bool,
}

impl Rm3Expander {
    /// Create an expander from configuration.
    pub fn new(config: &FeedbackConfig) -> Self {
        Rm3Expander {
            rm1: Rm1Expander::new(config),
            lambda: config.lambda,
            renormalize: config.rm3_renormalize,
        }
    }

    /// Configured interpolation weight.
    pub fn lambda(&self) -> f64 {
        self.lambda
    }

    /// Normalized distribution of the original query's terms.
    ///
    /// Terms unknown to the index are skipped but still count towards the
    /// normalizer.
    pub fn original_term_scores(
        index: &dyn FeedbackIndex,
        query: &QueryModel,
    ) -> Result<AHashMap<TermId, f64>> {
        let mut scores = AHashMap::new();
        let query_length = query.total_weight();
        if query_length <= 0.0 {
            return Ok(scores);
        }
        for (term_id, weight) in resolve_query_terms(index, query)? {
            scores.insert(term_id, weight / query_length);
        }
        Ok(scores)
    }

    /// Mix the original query distribution with the feedback distribution.
    pub fn interpolate(
        original: &AHashMap<TermId, f64>,
        feedback: &RelevanceModel,
        lambda: f64,
    ) -> AHashMap<TermId, f64> {
        let mut mixed = AHashMap::with_capacity(original.len() + feedback.weights.len());
        for &(term_id, probability) in &feedback.weights {
            let prior = original.get(&term_id).copied().unwrap_or(0.0);
            mixed.insert(term_id, lambda * prior + (1.0 - lambda) * probability);
        }
        for (&term_id, &prior) in original {
            mixed.entry(term_id).or_insert(lambda * prior);
        }
        // A side weighted out entirely must not leave zero-weight terms behind.
        mixed.retain(|_, weight| *weight != 0.0);
        mixed
    }
}

impl QueryExpander for Rm3Expander {
    fn expand(&self, index: &dyn FeedbackIndex, request: &ExpansionRequest<'_>) -> Result<Expansion> {
        let lambda = request.lambda.unwrap_or(self.lambda);
        let original = Self::original_term_scores(index, request.query)?;
        let feedback = self.rm1.relevance_model(index, request.results)?;
        if feedback.feedback_documents == 0 {
            return Ok(Expansion::no_feedback());
        }
        if feedback.weights.is_empty() {
            // Without a feedback distribution the mix would not sum to 1.
            debug!(
                query_id = request.query.query_id(),
                feedback_documents = feedback.feedback_documents,
                "Empty feedback model, query left unchanged"
            );
            return Ok(Expansion {
                terms: Vec::new(),
                feedback_documents: feedback.feedback_documents,
                analysed_documents: feedback.feedback_documents,
            });
        }

        let mixed = Self::interpolate(&original, &feedback, lambda);
        let weights: Vec<(TermId, f64)> = if self.renormalize {
            let clipped = Rm1Expander::clip_terms(mixed, self.rm1.fb_terms());
            Rm1Expander::normalize(clipped).unwrap_or_default()
        } else {
            mixed.into_iter().collect()
        };
        debug!(
            query_id = request.query.query_id(),
            lambda,
            terms = weights.len(),
            "Interpolated feedback model"
        );

        Ok(Expansion {
            terms: resolve_terms(index, weights)?,
            feedback_documents: feedback.feedback_documents,
            analysed_documents: feedback.feedback_documents,
        })
    }

    fn merge_mode(&self) -> MergeMode {
        MergeMode::Replace
    }

    fn name(&self) -> &str {
        "rm3"
    }
}
