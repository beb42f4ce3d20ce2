//! Read-only index capability consumed by the feedback estimators.
//!
//! Expansion never writes to the index. Implementations must allow many
//! concurrent readers, which is why [`FeedbackIndex`] requires `Send + Sync`
//! and takes `&self` everywhere.

pub mod memory;

use std::fmt::Debug;

use tracing::warn;

use crate::error::Result;

pub use memory::{MemoryIndex, MemoryIndexBuilder};

/// Term identifier, stable within one index snapshot.
pub type TermId = u32;

/// Document identifier.
pub type DocId = u64;

/// One entry of a document's forward (direct) posting list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirectPosting {
    /// Term occurring in the document.
    pub term_id: TermId,
    /// Number of occurrences in the document.
    pub frequency: u32,
}

impl DirectPosting {
    /// Create a new posting.
    pub fn new(term_id: TermId, frequency: u32) -> Self {
        DirectPosting { term_id, frequency }
    }
}

/// Trait for index readers used by query expansion.
pub trait FeedbackIndex: Send + Sync + Debug {
    /// Number of documents in the collection.
    fn doc_count(&self) -> u64;

    /// Resolve term text to its id.
    fn term_id(&self, term: &str) -> Result<Option<TermId>>;

    /// Resolve a term id to its text.
    fn term_text(&self, term_id: TermId) -> Result<Option<String>>;

    /// Number of documents in the collection containing the term.
    fn doc_freq(&self, term_id: TermId) -> Result<u64>;

    /// Open the forward posting list of a document.
    ///
    /// The returned iterator must be closed by the caller; wrap it in
    /// [`ScopedPostings`] to have that happen on every exit path.
    fn direct_postings(&self, doc_id: DocId) -> Result<Box<dyn DirectPostingIterator + '_>>;
}

/// Iterator over one document's forward postings.
pub trait DirectPostingIterator: Debug {
    /// Advance to the next posting. `Ok(None)` is the end marker.
    fn next(&mut self) -> Result<Option<DirectPosting>>;

    /// Release the underlying resource. Must be idempotent.
    fn close(&mut self) -> Result<()>;
}

/// Owns an open posting iterator and guarantees it is closed.
///
/// Dropping the guard closes the iterator, so early returns through `?`
/// release it. Call [`finish`](ScopedPostings::finish) on the success path to
/// observe close failures.
#[derive(Debug)]
pub struct ScopedPostings<'a> {
    inner: Box<dyn DirectPostingIterator + 'a>,
    doc_id: DocId,
    closed: bool,
}

impl<'a> ScopedPostings<'a> {
    /// Acquire the forward postings of `doc_id`.
    pub fn open<I: FeedbackIndex + ?Sized>(index: &'a I, doc_id: DocId) -> Result<Self> {
        let inner = index.direct_postings(doc_id)?;
        Ok(ScopedPostings {
            inner,
            doc_id,
            closed: false,
        })
    }

    /// Document these postings belong to.
    pub fn doc_id(&self) -> DocId {
        self.doc_id
    }

    /// Advance to the next posting.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Result<Option<DirectPosting>> {
        self.inner.next()
    }

    /// Close the iterator, reporting any failure.
    pub fn finish(mut self) -> Result<()> {
        self.closed = true;
        self.inner.close()
    }
}

impl Drop for ScopedPostings<'_> {
    fn drop(&mut self) {
        if !self.closed {
            self.closed = true;
            if let Err(e) = self.inner.close() {
                warn!(doc_id = self.doc_id, error = %e, "Failed to close direct postings");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::error::ExpansionError;

    #[derive(Debug)]
    struct FailingIterator {
        closes: Arc<AtomicUsize>,
        remaining: u32,
    }

    impl DirectPostingIterator for FailingIterator {
        fn next(&mut self) -> Result<Option<DirectPosting>> {
            if self.remaining == 0 {
                return Err(ExpansionError::index_access("corrupt posting block"));
            }
            self.remaining -= 1;
            Ok(Some(DirectPosting::new(self.remaining, 1)))
        }

        fn close(&mut self) -> Result<()> {
            self.closes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[derive(Debug)]
    struct FailingIndex {
        closes: Arc<AtomicUsize>,
    }

    impl FeedbackIndex for FailingIndex {
        fn doc_count(&self) -> u64 {
            1
        }

        fn term_id(&self, _term: &str) -> Result<Option<TermId>> {
            Ok(None)
        }

        fn term_text(&self, _term_id: TermId) -> Result<Option<String>> {
            Ok(None)
        }

        fn doc_freq(&self, _term_id: TermId) -> Result<u64> {
            Ok(0)
        }

        fn direct_postings(&self, _doc_id: DocId) -> Result<Box<dyn DirectPostingIterator + '_>> {
            Ok(Box::new(FailingIterator {
                closes: self.closes.clone(),
                remaining: 2,
            }))
        }
    }

    fn drain(index: &FailingIndex) -> Result<usize> {
        let mut postings = ScopedPostings::open(index, 0)?;
        let mut seen = 0;
        while postings.next()?.is_some() {
            seen += 1;
        }
        postings.finish()?;
        Ok(seen)
    }

    #[test]
    fn test_scoped_postings_closed_on_error_path() {
        let closes = Arc::new(AtomicUsize::new(0));
        let index = FailingIndex {
            closes: closes.clone(),
        };

        let result = drain(&index);
        assert!(result.unwrap_err().is_index_access());
        assert_eq!(closes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_scoped_postings_closed_once_on_finish() {
        let closes = Arc::new(AtomicUsize::new(0));
        let index = FailingIndex {
            closes: closes.clone(),
        };

        let mut postings = ScopedPostings::open(&index, 0).unwrap();
        assert_eq!(postings.doc_id(), 0);
        assert!(postings.next().unwrap().is_some());
        postings.finish().unwrap();
        assert_eq!(closes.load(Ordering::SeqCst), 1);
    }
}
