//! Materialized term vectors of feedback documents.

use ahash::AHashMap;
use tracing::warn;

use crate::error::Result;
use crate::index::{DocId, FeedbackIndex, ScopedPostings, TermId};

/// Document-frequency bounds a term must satisfy to be kept in a feedback
/// document: `min_df <= df < max_doc_percentage * doc_count`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TermFilter {
    /// Minimum collection document frequency.
    pub min_df: u64,
    /// Exclusive upper bound, as a fraction of the collection size.
    pub max_doc_percentage: f64,
}

impl TermFilter {
    /// Create a filter.
    pub fn new(min_df: u64, max_doc_percentage: f64) -> Self {
        TermFilter {
            min_df,
            max_doc_percentage,
        }
    }

    /// Check a term's document frequency against the bounds.
    pub fn accepts(&self, doc_freq: u64, doc_count: u64) -> bool {
        doc_freq >= self.min_df && (doc_freq as f64) < self.max_doc_percentage * doc_count as f64
    }
}

/// Sparse term-frequency vector of one feedback document.
#[derive(Debug, Clone)]
pub struct FeedbackDocument {
    doc_id: DocId,
    terms: AHashMap<TermId, u32>,
    length: u64,
    relevance: f64,
}

impl FeedbackDocument {
    /// Read the document's forward postings and keep the terms accepted by
    /// `filter`.
    ///
    /// The length counts every posting scanned, including filtered terms. A
    /// document with a nonzero length but no retained term is valid.
    pub fn build<I: FeedbackIndex + ?Sized>(
        index: &I,
        doc_id: DocId,
        relevance: f64,
        filter: &TermFilter,
    ) -> Result<Self> {
        let doc_count = index.doc_count();
        let mut terms = AHashMap::new();
        let mut length = 0u64;

        let mut postings = ScopedPostings::open(index, doc_id)?;
        while let Some(posting) = postings.next()? {
            length += posting.frequency as u64;
            if filter.accepts(index.doc_freq(posting.term_id)?, doc_count) {
                terms.insert(posting.term_id, posting.frequency);
            }
        }
        postings.finish()?;

        if length > 0 && terms.is_empty() {
            warn!(
                doc_id,
                length, "Did not identify any usable candidate expansion terms in feedback document"
            );
        }

        Ok(FeedbackDocument {
            doc_id,
            terms,
            length,
            relevance,
        })
    }

    /// Construct directly from a term-frequency map.
    pub fn from_terms(doc_id: DocId, terms: AHashMap<TermId, u32>, length: u64, relevance: f64) -> Self {
        FeedbackDocument {
            doc_id,
            terms,
            length,
            relevance,
        }
    }

    /// Document id.
    pub fn doc_id(&self) -> DocId {
        self.doc_id
    }

    /// Unfiltered document length.
    pub fn length(&self) -> u64 {
        self.length
    }

    /// Relevance weight assigned for this expansion run.
    pub fn relevance(&self) -> f64 {
        self.relevance
    }

    /// Frequency of a retained term, 0 if absent.
    pub fn frequency(&self, term_id: TermId) -> u32 {
        self.terms.get(&term_id).copied().unwrap_or(0)
    }

    /// Retained term ids.
    pub fn term_ids(&self) -> impl Iterator<Item = TermId> + '_ {
        self.terms.keys().copied()
    }

    /// Retained (term, frequency) pairs.
    pub fn terms(&self) -> impl Iterator<Item = (TermId, u32)> + '_ {
        self.terms.iter().map(|(&t, &f)| (t, f))
    }

    /// Number of retained terms.
    pub fn term_count(&self) -> usize {
        self.terms.len()
    }

    /// Whether no term survived filtering.
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::MemoryIndex;

    fn index() -> MemoryIndex {
        let mut builder = MemoryIndex::builder();
        builder.add_document([("rare", 5), ("shared", 1), ("common", 2)]);
        builder.add_document([("shared", 1), ("common", 1)]);
        builder.add_document([("common", 1)]);
        builder.add_document([("other", 1)]);
        builder.build()
    }

    #[test]
    fn test_min_df_excludes_singletons() {
        let index = index();
        let doc = FeedbackDocument::build(&index, 0, 0.5, &TermFilter::new(2, 1.0)).unwrap();

        let rare = index.term_id("rare").unwrap().unwrap();
        let shared = index.term_id("shared").unwrap().unwrap();
        assert_eq!(doc.frequency(rare), 0);
        assert_eq!(doc.frequency(shared), 1);
        assert_eq!(doc.length(), 8);
        assert_eq!(doc.relevance(), 0.5);
    }

    #[test]
    fn test_max_doc_percentage_is_exclusive() {
        let index = index();
        // 0.75 * 4 = 3: "common" has df 3 and is dropped.
        let doc = FeedbackDocument::build(&index, 0, 1.0, &TermFilter::new(0, 0.75)).unwrap();
        let common = index.term_id("common").unwrap().unwrap();
        assert_eq!(doc.frequency(common), 0);
        assert_eq!(doc.term_count(), 2);
    }

    #[test]
    fn test_all_terms_filtered_is_not_an_error() {
        let index = index();
        let doc = FeedbackDocument::build(&index, 3, 1.0, &TermFilter::new(2, 0.1)).unwrap();
        assert!(doc.is_empty());
        assert_eq!(doc.length(), 1);
        assert_eq!(doc.doc_id(), 3);
    }

    #[test]
    fn test_missing_document_fails() {
        let index = index();
        let err = FeedbackDocument::build(&index, 42, 1.0, &TermFilter::new(0, 1.0)).unwrap_err();
        assert!(err.is_index_access());
    }
}
