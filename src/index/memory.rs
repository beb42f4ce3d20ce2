//! In-memory forward index.
//!
//! A complete [`FeedbackIndex`] for tests, benchmarks and hosts that keep
//! small collections in memory. Term ids are assigned in first-seen order and
//! every document's postings are kept sorted by term id.

use ahash::AHashMap;

use crate::error::{ExpansionError, Result};
use crate::index::{DirectPosting, DirectPostingIterator, DocId, FeedbackIndex, TermId};

/// Builder for [`MemoryIndex`].
#[derive(Debug, Default)]
pub struct MemoryIndexBuilder {
    lexicon: AHashMap<String, TermId>,
    terms: Vec<String>,
    doc_freqs: Vec<u64>,
    documents: Vec<Vec<DirectPosting>>,
}

impl MemoryIndexBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    fn intern(&mut self, term: &str) -> TermId {
        if let Some(&term_id) = self.lexicon.get(term) {
            return term_id;
        }
        let term_id = self.terms.len() as TermId;
        self.lexicon.insert(term.to_string(), term_id);
        self.terms.push(term.to_string());
        self.doc_freqs.push(0);
        term_id
    }

    /// Add a document given as (term, frequency) pairs and return its id.
    ///
    /// Repeated terms are merged; zero frequencies are ignored.
    pub fn add_document<'t, I>(&mut self, terms: I) -> DocId
    where
        I: IntoIterator<Item = (&'t str, u32)>,
    {
        let mut frequencies: AHashMap<TermId, u32> = AHashMap::new();
        for (term, frequency) in terms {
            if frequency == 0 {
                continue;
            }
            let term_id = self.intern(term);
            *frequencies.entry(term_id).or_insert(0) += frequency;
        }

        let mut postings: Vec<DirectPosting> = frequencies
            .into_iter()
            .map(|(term_id, frequency)| DirectPosting::new(term_id, frequency))
            .collect();
        postings.sort_by_key(|p| p.term_id);

        for posting in &postings {
            self.doc_freqs[posting.term_id as usize] += 1;
        }

        let doc_id = self.documents.len() as DocId;
        self.documents.push(postings);
        doc_id
    }

    /// Add a document from raw text, lowercased and split on whitespace.
    pub fn add_text(&mut self, text: &str) -> DocId {
        let tokens: Vec<String> = text.split_whitespace().map(str::to_lowercase).collect();
        self.add_document(tokens.iter().map(|t| (t.as_str(), 1)))
    }

    /// Finish building.
    pub fn build(self) -> MemoryIndex {
        MemoryIndex {
            lexicon: self.lexicon,
            terms: self.terms,
            doc_freqs: self.doc_freqs,
            documents: self.documents,
        }
    }
}

/// Immutable in-memory forward index.
#[derive(Debug, Clone)]
pub struct MemoryIndex {
    lexicon: AHashMap<String, TermId>,
    terms: Vec<String>,
    doc_freqs: Vec<u64>,
    documents: Vec<Vec<DirectPosting>>,
}

impl MemoryIndex {
    /// Start building a new index.
    pub fn builder() -> MemoryIndexBuilder {
        MemoryIndexBuilder::new()
    }

    /// Build an index from raw texts, one document per text.
    pub fn from_texts<S: AsRef<str>>(texts: &[S]) -> Self {
        let mut builder = MemoryIndexBuilder::new();
        for text in texts {
            builder.add_text(text.as_ref());
        }
        builder.build()
    }

    /// Number of distinct terms.
    pub fn term_count(&self) -> usize {
        self.terms.len()
    }

    /// Sum of term frequencies of a document.
    pub fn document_length(&self, doc_id: DocId) -> Option<u64> {
        self.documents
            .get(doc_id as usize)
            .map(|postings| postings.iter().map(|p| p.frequency as u64).sum())
    }
}

impl FeedbackIndex for MemoryIndex {
    fn doc_count(&self) -> u64 {
        self.documents.len() as u64
    }

    fn term_id(&self, term: &str) -> Result<Option<TermId>> {
        Ok(self.lexicon.get(term).copied())
    }

    fn term_text(&self, term_id: TermId) -> Result<Option<String>> {
        Ok(self.terms.get(term_id as usize).cloned())
    }

    fn doc_freq(&self, term_id: TermId) -> Result<u64> {
        self.doc_freqs
            .get(term_id as usize)
            .copied()
            .ok_or_else(|| ExpansionError::index_access(format!("Unknown term id {term_id}")))
    }

    fn direct_postings(&self, doc_id: DocId) -> Result<Box<dyn DirectPostingIterator + '_>> {
        let postings = self
            .documents
            .get(doc_id as usize)
            .ok_or_else(|| ExpansionError::index_access(format!("Unknown document id {doc_id}")))?;
        Ok(Box::new(MemoryPostingIterator::new(postings)))
    }
}

/// Forward posting iterator over a borrowed slice.
#[derive(Debug)]
pub struct MemoryPostingIterator<'a> {
    postings: &'a [DirectPosting],
    position: usize,
    closed: bool,
}

impl<'a> MemoryPostingIterator<'a> {
    /// Create a new iterator.
    pub fn new(postings: &'a [DirectPosting]) -> Self {
        MemoryPostingIterator {
            postings,
            position: 0,
            closed: false,
        }
    }
}

impl DirectPostingIterator for MemoryPostingIterator<'_> {
    fn next(&mut self) -> Result<Option<DirectPosting>> {
        if self.closed {
            return Err(ExpansionError::index_access("Posting iterator already closed"));
        }
        let posting = self.postings.get(self.position).copied();
        if posting.is_some() {
            self.position += 1;
        }
        Ok(posting)
    }

    fn close(&mut self) -> Result<()> {
        self.closed = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_index_statistics() {
        let index = MemoryIndex::from_texts(&[
            "the lazy fox jumped over the dog",
            "but had the presence of mind",
        ]);

        assert_eq!(index.doc_count(), 2);
        let the = index.term_id("the").unwrap().unwrap();
        let fox = index.term_id("fox").unwrap().unwrap();
        assert_eq!(the, 0);
        assert_eq!(index.doc_freq(the).unwrap(), 2);
        assert_eq!(index.doc_freq(fox).unwrap(), 1);
        assert_eq!(index.term_text(fox).unwrap().as_deref(), Some("fox"));
        assert_eq!(index.document_length(0), Some(7));
        assert!(index.term_id("cat").unwrap().is_none());
    }

    #[test]
    fn test_direct_postings_sorted_and_merged() {
        let mut builder = MemoryIndex::builder();
        builder.add_document([("b", 1), ("a", 2)]);
        let doc = builder.add_document([("a", 1), ("c", 0), ("b", 4), ("a", 1)]);
        let index = builder.build();

        let mut postings = index.direct_postings(doc).unwrap();
        let mut seen = Vec::new();
        while let Some(posting) = postings.next().unwrap() {
            seen.push((posting.term_id, posting.frequency));
        }
        assert_eq!(seen, vec![(0, 4), (1, 2)]);
        assert!(index.term_id("c").unwrap().is_none());
    }

    #[test]
    fn test_unknown_document_is_index_access_error() {
        let index = MemoryIndex::from_texts(&["alpha"]);
        let err = index.direct_postings(7).unwrap_err();
        assert!(err.is_index_access());
    }

    #[test]
    fn test_closed_iterator_rejects_reads() {
        let index = MemoryIndex::from_texts(&["alpha beta"]);
        let mut postings = index.direct_postings(0).unwrap();
        postings.close().unwrap();
        postings.close().unwrap();
        assert!(postings.next().is_err());
    }
}
