//! Axiomatic query expansion.
//!
//! Semantic term matching after Fang and Zhai (SIGIR 2006), in the variant
//! reproduced by Yang and Lin (ECIR 2019). Candidate terms are scored by the
//! mutual information of their presence with each original query term, over
//! the feedback documents plus a random sample of background documents
//! assumed non-relevant, and weighted by idf.
//!
//! Background sampling is seeded from the query id, so the same query against
//! the same index snapshot and configuration always expands identically.

use ahash::{AHashMap, AHashSet};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use crate::config::FeedbackConfig;
use crate::error::Result;
use crate::feedback::expander::{
    Expansion, ExpansionRequest, MergeMode, QueryExpander, resolve_query_terms, resolve_terms,
};
use crate::feedback::scoring::Idf;
use crate::feedback::statistics::TermStatistics;
use crate::feedback::top_k::TopKSelector;
use crate::index::{DocId, FeedbackIndex, TermId};

/// Seed used when the query id contains no digits.
pub const DEFAULT_SEED: u64 = 13_081_982;

/// Derive the sampling seed from a query id.
///
/// The decimal digits of the id are read as one number, wrapping on overflow.
pub fn seed_from_query_id(query_id: &str) -> u64 {
    let mut digits = query_id.chars().filter_map(|c| c.to_digit(10)).peekable();
    if digits.peek().is_none() {
        return DEFAULT_SEED;
    }
    digits.fold(0u64, |seed, digit| {
        seed.wrapping_mul(10).wrapping_add(digit as u64)
    })
}

/// Axiomatic query expander.
#[derive(Debug, Clone)]
pub struct AxiomaticExpander {
    fb_terms: usize,
    fb_docs: usize,
    beta: f64,
    k: usize,
    r: usize,
}

impl AxiomaticExpander {
    /// Create an expander from configuration.
    pub fn new(config: &FeedbackConfig) -> Self {
        AxiomaticExpander {
            fb_terms: config.fb_terms,
            fb_docs: config.fb_docs,
            beta: config.beta,
            k: config.k,
            r: config.r,
        }
    }

    /// Number of terms emitted for a query of `query_len` terms.
    pub fn output_size(&self, query_len: usize) -> usize {
        if self.fb_terms == 0 {
            0
        } else {
            self.fb_terms.max(query_len)
        }
    }

    /// Draw `(feedback.len() - 1) * r` distinct background documents.
    ///
    /// Ids already drawn, feedback documents included, are never drawn
    /// again. The draw stops early once the collection is exhausted.
    pub fn sample_documents(&self, feedback: &[DocId], doc_count: u64, seed: u64) -> Vec<DocId> {
        let mut seen: AHashSet<DocId> = feedback.iter().copied().collect();
        let wanted = feedback.len().saturating_sub(1).saturating_mul(self.r);
        let available = doc_count.saturating_sub(seen.len() as u64);
        let wanted = (wanted as u64).min(available) as usize;

        let mut rng = StdRng::seed_from_u64(seed);
        let mut sample = Vec::with_capacity(wanted);
        while sample.len() < wanted {
            let doc_id = rng.random_range(0..doc_count);
            if seen.insert(doc_id) {
                sample.push(doc_id);
            }
        }
        sample
    }

    /// Score candidates against every original query term and sum the
    /// per-term shortlists.
    pub fn aggregate_scores(
        &self,
        index: &dyn FeedbackIndex,
        stats: &TermStatistics,
        query_terms: &[TermId],
    ) -> Result<AHashMap<TermId, f64>> {
        let idf = Idf::new(index.doc_count());
        let mut idfs: AHashMap<TermId, f64> = AHashMap::with_capacity(stats.vocabulary_size());
        for candidate in stats.candidates() {
            idfs.insert(candidate, idf.idf(index.doc_freq(candidate)?));
        }

        let mut aggregate: AHashMap<TermId, f64> = AHashMap::new();
        for &query_term in query_terms {
            let mut shortlist = TopKSelector::new(self.k);
            for (&candidate, &candidate_idf) in &idfs {
                if candidate == query_term {
                    continue;
                }
                let multiplier = if stats.is_query_term(candidate) {
                    1.0
                } else {
                    self.beta * stats.mutual_information(query_term, candidate)
                };
                shortlist.insert(candidate, multiplier * candidate_idf);
            }
            if let Some((best, score)) = shortlist.best() {
                debug!(query_term, best = *best, score, "Best candidate for query term");
            }
            for (candidate, score) in shortlist.drain() {
                *aggregate.entry(candidate).or_insert(0.0) += score;
            }
        }
        Ok(aggregate)
    }
}

impl QueryExpander for AxiomaticExpander {
    fn expand(&self, index: &dyn FeedbackIndex, request: &ExpansionRequest<'_>) -> Result<Expansion> {
        let output_size = self.output_size(request.query.len());
        // A document listed twice in the results is still one document.
        let mut distinct: AHashSet<DocId> = AHashSet::new();
        let feedback: Vec<DocId> = request
            .results
            .top(self.fb_docs)
            .iter()
            .map(|d| d.doc_id)
            .filter(|doc_id| distinct.insert(*doc_id))
            .collect();
        if feedback.is_empty() || output_size == 0 {
            return Ok(Expansion::no_feedback());
        }

        info!(
            k = self.k,
            n = feedback.len(),
            m = output_size,
            r = self.r,
            beta = self.beta,
            "Axiomatic expansion"
        );

        let seed = seed_from_query_id(request.query.query_id());
        let mut analysed = feedback.clone();
        analysed.extend(self.sample_documents(&feedback, index.doc_count(), seed));

        let mut query_terms: Vec<TermId> = resolve_query_terms(index, request.query)?
            .into_iter()
            .map(|(term_id, _)| term_id)
            .collect();
        query_terms.sort_unstable();
        query_terms.dedup();

        let mut stats = TermStatistics::new(query_terms.iter().copied());
        stats.analyse_documents(index, &analysed)?;

        let aggregate = self.aggregate_scores(index, &stats, &query_terms)?;
        let mut selector = TopKSelector::new(output_size);
        selector.extend(aggregate);

        Ok(Expansion {
            terms: resolve_terms(index, selector.into_sorted_vec())?,
            feedback_documents: feedback.len(),
            analysed_documents: analysed.len(),
        })
    }

    fn merge_mode(&self) -> MergeMode {
        MergeMode::Accumulate
    }

    fn name(&self) -> &str {
        "axiomatic"
    }
}
