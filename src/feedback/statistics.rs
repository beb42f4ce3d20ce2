//! Term containment and co-occurrence statistics over sampled documents.
//!
//! Pair counts are only kept for pairs touching an original query term, which
//! bounds memory to `|query| * |vocabulary of the sample|`.

use ahash::{AHashMap, AHashSet};
use tracing::debug;

use crate::error::Result;
use crate::index::{DocId, FeedbackIndex, ScopedPostings, TermId};

/// Unordered pair of distinct terms, stored smaller id first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TermPairKey {
    first: TermId,
    second: TermId,
}

impl TermPairKey {
    /// Canonicalize a pair.
    pub fn new(a: TermId, b: TermId) -> Self {
        debug_assert_ne!(a, b, "a term pair needs two distinct terms");
        if a <= b {
            TermPairKey {
                first: a,
                second: b,
            }
        } else {
            TermPairKey {
                first: b,
                second: a,
            }
        }
    }

    /// Smaller term id.
    pub fn first(&self) -> TermId {
        self.first
    }

    /// Larger term id.
    pub fn second(&self) -> TermId {
        self.second
    }
}

/// Per-request term and pair document counts.
#[derive(Debug, Default)]
pub struct TermStatistics {
    query_terms: AHashSet<TermId>,
    term_counts: AHashMap<TermId, u32>,
    pair_counts: AHashMap<TermPairKey, u32>,
    documents: u64,
}

impl TermStatistics {
    /// Create empty statistics restricted to pairs touching `query_terms`.
    pub fn new<I: IntoIterator<Item = TermId>>(query_terms: I) -> Self {
        TermStatistics {
            query_terms: query_terms.into_iter().collect(),
            ..Default::default()
        }
    }

    /// Whether `term_id` is an original query term.
    pub fn is_query_term(&self, term_id: TermId) -> bool {
        self.query_terms.contains(&term_id)
    }

    /// Original query terms.
    pub fn query_terms(&self) -> impl Iterator<Item = TermId> + '_ {
        self.query_terms.iter().copied()
    }

    /// Count the terms of one document.
    ///
    /// Each distinct term counts once regardless of how often it is listed.
    pub fn add_document(&mut self, terms: &[TermId]) {
        self.documents += 1;

        let mut distinct = terms.to_vec();
        distinct.sort_unstable();
        distinct.dedup();

        for &term in &distinct {
            *self.term_counts.entry(term).or_insert(0) += 1;
        }

        for &query_term in distinct.iter().filter(|t| self.query_terms.contains(*t)) {
            for &other in &distinct {
                if other == query_term {
                    continue;
                }
                // Pairs of two query terms are counted from the smaller one.
                if other < query_term && self.query_terms.contains(&other) {
                    continue;
                }
                *self
                    .pair_counts
                    .entry(TermPairKey::new(query_term, other))
                    .or_insert(0) += 1;
            }
        }
    }

    /// Scan the forward postings of `doc_ids` and count them.
    ///
    /// Documents are visited in ascending id order so storage is read
    /// sequentially.
    pub fn analyse_documents<I: FeedbackIndex + ?Sized>(
        &mut self,
        index: &I,
        doc_ids: &[DocId],
    ) -> Result<()> {
        let mut ordered = doc_ids.to_vec();
        ordered.sort_unstable();

        debug!(documents = ordered.len(), "Analysing documents");
        let mut terms = Vec::new();
        for doc_id in ordered {
            terms.clear();
            let mut postings = ScopedPostings::open(index, doc_id)?;
            while let Some(posting) = postings.next()? {
                terms.push(posting.term_id);
            }
            postings.finish()?;
            self.add_document(&terms);
        }
        debug!(
            terms = self.term_counts.len(),
            pairs = self.pair_counts.len(),
            "Done analysing documents"
        );
        Ok(())
    }

    /// Number of documents counted.
    pub fn document_count(&self) -> u64 {
        self.documents
    }

    /// Number of documents containing `term_id`.
    pub fn term_count(&self, term_id: TermId) -> u32 {
        self.term_counts.get(&term_id).copied().unwrap_or(0)
    }

    /// Number of documents containing both terms, in either order.
    pub fn pair_count(&self, a: TermId, b: TermId) -> u32 {
        if a == b {
            return self.term_count(a);
        }
        self.pair_counts
            .get(&TermPairKey::new(a, b))
            .copied()
            .unwrap_or(0)
    }

    /// Every term seen in the counted documents.
    pub fn candidates(&self) -> impl Iterator<Item = TermId> + '_ {
        self.term_counts.keys().copied()
    }

    /// Number of distinct terms seen.
    pub fn vocabulary_size(&self) -> usize {
        self.term_counts.len()
    }

    /// Number of distinct pairs counted.
    pub fn pair_total(&self) -> usize {
        self.pair_counts.len()
    }

    /// Mutual information between the presence of `t1` and of `t2` across
    /// the counted documents.
    ///
    /// Symmetric in its arguments. Cells with zero joint probability
    /// contribute nothing, and with no counted document the result is 0.
    pub fn mutual_information(&self, t1: TermId, t2: TermId) -> f64 {
        if self.documents == 0 {
            return 0.0;
        }
        let total = self.documents as f64;
        let x1 = self.term_count(t1) as f64;
        let y1 = self.term_count(t2) as f64;
        let xy11 = self.pair_count(t1, t2) as f64;
        let xy10 = x1 - xy11;
        let xy01 = y1 - xy11;
        let xy00 = total - x1 - y1 + xy11;

        let p_x1 = x1 / total;
        let p_y1 = y1 / total;
        let p_x0 = 1.0 - p_x1;
        let p_y0 = 1.0 - p_y1;

        // The mixed cells are summed first so swapping t1 and t2 is exact.
        let mixed = mi_cell(xy10 / total, p_x1 * p_y0) + mi_cell(xy01 / total, p_x0 * p_y1);
        mi_cell(xy11 / total, p_x1 * p_y1) + mixed + mi_cell(xy00 / total, p_x0 * p_y0)
    }
}

fn mi_cell(joint: f64, independent: f64) -> f64 {
    if joint <= 0.0 || independent <= 0.0 {
        0.0
    } else {
        joint * (joint / independent).ln()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_key_is_canonical() {
        let key = TermPairKey::new(9, 2);
        assert_eq!(key, TermPairKey::new(2, 9));
        assert_eq!((key.first(), key.second()), (2, 9));
        assert!(TermPairKey::new(1, 5) < TermPairKey::new(2, 3));
    }

    #[test]
    fn test_counts_once_per_document() {
        let mut stats = TermStatistics::new([1]);
        stats.add_document(&[1, 2, 2, 3]);
        stats.add_document(&[2, 4]);

        assert_eq!(stats.document_count(), 2);
        assert_eq!(stats.term_count(2), 2);
        assert_eq!(stats.term_count(1), 1);
        assert_eq!(stats.pair_count(1, 2), 1);
        assert_eq!(stats.pair_count(2, 1), 1);
        assert_eq!(stats.vocabulary_size(), 4);
    }

    #[test]
    fn test_pairs_restricted_to_query_terms() {
        let mut stats = TermStatistics::new([1, 2]);
        stats.add_document(&[1, 2, 3, 4]);

        // (1,2) (1,3) (1,4) (2,3) (2,4); (3,4) touches no query term.
        assert_eq!(stats.pair_total(), 5);
        assert_eq!(stats.pair_count(1, 2), 1);
        assert_eq!(stats.pair_count(3, 4), 0);
        assert!(stats.is_query_term(2));
        assert!(!stats.is_query_term(3));
    }

    #[test]
    fn test_mutual_information_symmetric() {
        let mut stats = TermStatistics::new([1]);
        stats.add_document(&[1, 2]);
        stats.add_document(&[1, 3]);
        stats.add_document(&[2, 3]);
        stats.add_document(&[1, 2, 3]);

        let forward = stats.mutual_information(1, 3);
        let backward = stats.mutual_information(3, 1);
        assert_eq!(forward, backward);
    }

    #[test]
    fn test_mutual_information_perfect_correlation() {
        let mut stats = TermStatistics::new([1]);
        stats.add_document(&[1, 2]);
        stats.add_document(&[1, 2]);
        stats.add_document(&[5]);
        stats.add_document(&[6]);

        // Two equiprobable perfectly correlated indicators share ln 2 nats.
        let mi = stats.mutual_information(1, 2);
        assert!(mi > 0.0);
        assert!((mi - 2f64.ln()).abs() < 1e-12);
    }

    #[test]
    fn test_mutual_information_independent_is_zero() {
        let mut stats = TermStatistics::new([1]);
        stats.add_document(&[1, 2]);
        stats.add_document(&[1]);
        stats.add_document(&[2]);
        stats.add_document(&[9]);

        assert!(stats.mutual_information(1, 2).abs() < 1e-12);
    }

    #[test]
    fn test_mutual_information_without_documents() {
        let stats = TermStatistics::new([1]);
        assert_eq!(stats.mutual_information(1, 2), 0.0);
    }
}
