//! DocSet trait and concrete implementations for document iteration.
//!
//! `DocSet` is the base abstraction for forward-only cursors over sorted,
//! duplicate-free segment-local document IDs. Filters hand them out per
//! segment; the join walks them in both phases.

use std::sync::Arc;

use crate::DocId;

/// Sentinel returned by a cursor once it is exhausted.
pub const TERMINATED: DocId = DocId::MAX;

// ── DocSet trait ─────────────────────────────────────────────────────────

/// Forward-only cursor over sorted document IDs.
pub trait DocSet {
    /// Current document ID, or [`TERMINATED`] if exhausted.
    fn doc(&self) -> DocId;

    /// Advance to the next document. Returns the new doc ID or [`TERMINATED`].
    fn advance(&mut self) -> DocId;

    /// Seek to the first document >= `target`. Returns doc ID or [`TERMINATED`].
    fn seek(&mut self, target: DocId) -> DocId {
        let mut doc = self.doc();
        while doc < target {
            doc = self.advance();
        }
        doc
    }

    /// Estimated number of remaining documents.
    fn size_hint(&self) -> u32;
}

// ── DocSet for Box<dyn DocSet> ───────────────────────────────────────────

impl DocSet for Box<dyn DocSet + '_> {
    #[inline]
    fn doc(&self) -> DocId {
        (**self).doc()
    }
    #[inline]
    fn advance(&mut self) -> DocId {
        (**self).advance()
    }
    #[inline]
    fn seek(&mut self, target: DocId) -> DocId {
        (**self).seek(target)
    }
    #[inline]
    fn size_hint(&self) -> u32 {
        (**self).size_hint()
    }
}

// ── SortedVecDocSet ──────────────────────────────────────────────────────

/// DocSet backed by a sorted `Vec<u32>`. Binary search for seek.
pub struct SortedVecDocSet {
    docs: Arc<Vec<u32>>,
    pos: usize,
}

impl SortedVecDocSet {
    pub fn new(docs: Arc<Vec<u32>>) -> Self {
        Self { docs, pos: 0 }
    }
}

impl DocSet for SortedVecDocSet {
    #[inline]
    fn doc(&self) -> DocId {
        self.docs.get(self.pos).copied().unwrap_or(TERMINATED)
    }

    #[inline]
    fn advance(&mut self) -> DocId {
        if self.pos < self.docs.len() {
            self.pos += 1;
        }
        self.doc()
    }

    fn seek(&mut self, target: DocId) -> DocId {
        if self.pos >= self.docs.len() {
            return TERMINATED;
        }
        let remaining = &self.docs[self.pos..];
        match remaining.binary_search(&target) {
            Ok(offset) => {
                self.pos += offset;
                self.docs[self.pos]
            }
            Err(offset) => {
                self.pos += offset;
                self.doc()
            }
        }
    }

    fn size_hint(&self) -> u32 {
        self.docs.len().saturating_sub(self.pos) as u32
    }
}

// ── AllDocSet ────────────────────────────────────────────────────────────

/// DocSet that yields all documents 0..num_docs.
pub struct AllDocSet {
    current: u32,
    num_docs: u32,
}

impl AllDocSet {
    pub fn new(num_docs: u32) -> Self {
        Self {
            current: 0,
            num_docs,
        }
    }
}

impl DocSet for AllDocSet {
    #[inline]
    fn doc(&self) -> DocId {
        if self.current >= self.num_docs {
            TERMINATED
        } else {
            self.current
        }
    }

    #[inline]
    fn advance(&mut self) -> DocId {
        if self.current < self.num_docs {
            self.current += 1;
        }
        self.doc()
    }

    #[inline]
    fn seek(&mut self, target: DocId) -> DocId {
        self.current = target.max(self.current).min(self.num_docs);
        self.doc()
    }

    fn size_hint(&self) -> u32 {
        self.num_docs.saturating_sub(self.current)
    }
}

// ── FilteredDocSet ───────────────────────────────────────────────────────

/// Per-doc predicate used by [`FilteredDocSet`].
pub type DocPredicate<'a> = Box<dyn Fn(DocId) -> bool + 'a>;

/// Wraps a driving DocSet and skips docs rejected by a predicate.
///
/// The predicate is checked lazily on advance/seek, so only visited docs pay
/// for it.
pub struct FilteredDocSet<'a> {
    driver: Box<dyn DocSet + 'a>,
    predicate: DocPredicate<'a>,
}

impl<'a> FilteredDocSet<'a> {
    pub fn new(driver: Box<dyn DocSet + 'a>, predicate: DocPredicate<'a>) -> Self {
        let mut s = Self { driver, predicate };
        // Position on first matching doc
        s.skip_non_matching();
        s
    }

    fn skip_non_matching(&mut self) -> DocId {
        let mut doc = self.driver.doc();
        while doc != TERMINATED && !(self.predicate)(doc) {
            doc = self.driver.advance();
        }
        doc
    }
}

impl DocSet for FilteredDocSet<'_> {
    fn doc(&self) -> DocId {
        self.driver.doc()
    }

    fn advance(&mut self) -> DocId {
        self.driver.advance();
        self.skip_non_matching()
    }

    fn seek(&mut self, target: DocId) -> DocId {
        self.driver.seek(target);
        self.skip_non_matching()
    }

    fn size_hint(&self) -> u32 {
        self.driver.size_hint()
    }
}

// ── Tests ────────────────────────────────────────────────────────────────
