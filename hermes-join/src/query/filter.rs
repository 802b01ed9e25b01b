//! Per-segment document filters.
//!
//! A [`SegmentFilter`] is the "in"/"out" predicate of a join: bound to a
//! segment it yields an ascending [`DocSet`] of matching local doc ids. For
//! membership tests the doc set is wrapped in [`SequentialBits`], which
//! answers `get(doc)` as long as callers ask in non-decreasing doc order.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::segment::SegmentContext;
use crate::{DocId, Result};

use super::docset::{AllDocSet, DocSet, FilteredDocSet, SortedVecDocSet, TERMINATED};

/// A predicate over documents, evaluated one segment at a time.
pub trait SegmentFilter {
    /// Matching docs of `segment` in ascending order, or `None` if nothing in
    /// the segment can match.
    fn docset<'a>(&'a self, segment: &'a SegmentContext) -> Result<Option<Box<dyn DocSet + 'a>>>;
}

impl<F: SegmentFilter + ?Sized> SegmentFilter for Arc<F> {
    fn docset<'a>(&'a self, segment: &'a SegmentContext) -> Result<Option<Box<dyn DocSet + 'a>>> {
        (**self).docset(segment)
    }
}

// ── SequentialBits ───────────────────────────────────────────────────────

/// Random-access view over a filter's doc set for forward-only lookups.
///
/// Each `get` seeks the underlying cursor, so lookups must arrive in
/// non-decreasing doc order.
pub struct SequentialBits<'a> {
    docset: Option<Box<dyn DocSet + 'a>>,
    last: DocId,
}

impl<'a> SequentialBits<'a> {
    pub fn new(docset: Option<Box<dyn DocSet + 'a>>) -> Self {
        Self { docset, last: 0 }
    }

    /// Bind `filter` to `segment`.
    pub fn for_segment(filter: &'a dyn SegmentFilter, segment: &'a SegmentContext) -> Result<Self> {
        Ok(Self::new(filter.docset(segment)?))
    }

    /// Whether `doc` matches the filter.
    pub fn get(&mut self, doc: DocId) -> bool {
        assert!(
            doc >= self.last,
            "sequential access went backwards: doc {} after {}",
            doc,
            self.last
        );
        self.last = doc;
        let Some(docset) = self.docset.as_mut() else {
            return false;
        };
        let mut current = docset.doc();
        if current < doc {
            current = docset.seek(doc);
        }
        current == doc && current != TERMINATED
    }
}

// ── Concrete filters ─────────────────────────────────────────────────────

/// Matches every document of every segment.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllDocsFilter;

impl SegmentFilter for AllDocsFilter {
    fn docset<'a>(&'a self, segment: &'a SegmentContext) -> Result<Option<Box<dyn DocSet + 'a>>> {
        if segment.max_doc() == 0 {
            return Ok(None);
        }
        Ok(Some(Box::new(AllDocSet::new(segment.max_doc()))))
    }
}

/// Matches nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct MatchNoneFilter;

impl SegmentFilter for MatchNoneFilter {
    fn docset<'a>(&'a self, _segment: &'a SegmentContext) -> Result<Option<Box<dyn DocSet + 'a>>> {
        Ok(None)
    }
}

/// Explicit per-segment lists of matching doc ids.
#[derive(Debug, Clone, Default)]
pub struct DocIdsFilter {
    segments: FxHashMap<usize, Arc<Vec<DocId>>>,
}

impl DocIdsFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the matching docs of segment `segment_ord`. Input order and
    /// duplicates don't matter.
    pub fn with_segment(mut self, segment_ord: usize, docs: impl IntoIterator<Item = DocId>) -> Self {
        self.insert_segment(segment_ord, docs);
        self
    }

    pub fn insert_segment(&mut self, segment_ord: usize, docs: impl IntoIterator<Item = DocId>) {
        let mut docs: Vec<DocId> = docs.into_iter().collect();
        docs.sort_unstable();
        docs.dedup();
        self.segments.insert(segment_ord, Arc::new(docs));
    }
}

impl SegmentFilter for DocIdsFilter {
    fn docset<'a>(&'a self, segment: &'a SegmentContext) -> Result<Option<Box<dyn DocSet + 'a>>> {
        match self.segments.get(&segment.ord()) {
            Some(docs) if !docs.is_empty() => {
                Ok(Some(Box::new(SortedVecDocSet::new(Arc::clone(docs)))))
            }
            _ => Ok(None),
        }
    }
}

/// Per-doc predicate evaluated lazily over every doc of a segment.
pub type SegmentDocPredicate = dyn Fn(&SegmentContext, DocId) -> bool + Send + Sync;

/// Matches docs accepted by a closure, e.g. a fast-field equality check.
#[derive(Clone)]
pub struct PredicateFilter {
    predicate: Arc<SegmentDocPredicate>,
}

impl PredicateFilter {
    pub fn new(predicate: impl Fn(&SegmentContext, DocId) -> bool + Send + Sync + 'static) -> Self {
        Self {
            predicate: Arc::new(predicate),
        }
    }
}

impl std::fmt::Debug for PredicateFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PredicateFilter").finish_non_exhaustive()
    }
}

impl SegmentFilter for PredicateFilter {
    fn docset<'a>(&'a self, segment: &'a SegmentContext) -> Result<Option<Box<dyn DocSet + 'a>>> {
        if segment.max_doc() == 0 {
            return Ok(None);
        }
        let predicate: &SegmentDocPredicate = &*self.predicate;
        Ok(Some(Box::new(FilteredDocSet::new(
            Box::new(AllDocSet::new(segment.max_doc())),
            Box::new(move |doc| predicate(segment, doc)),
        ))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::SegmentId;

    fn segment(ord: usize, max_doc: u32) -> SegmentContext {
        SegmentContext::new(ord, SegmentId(ord as u128), max_doc)
    }

    fn drain(mut ds: Box<dyn DocSet + '_>) -> Vec<DocId> {
        let mut out = Vec::new();
        let mut doc = ds.doc();
        while doc != TERMINATED {
            out.push(doc);
            doc = ds.advance();
        }
        out
    }

    #[test]
    fn test_doc_ids_filter_sorts_and_dedups() {
        let filter = DocIdsFilter::new().with_segment(0, [7, 1, 7, 3]);
        let seg = segment(0, 10);
        let ds = filter.docset(&seg).unwrap().unwrap();
        assert_eq!(drain(ds), vec![1, 3, 7]);
    }

    #[test]
    fn test_doc_ids_filter_unknown_segment() {
        let filter = DocIdsFilter::new().with_segment(0, [1]);
        assert!(filter.docset(&segment(1, 10)).unwrap().is_none());
    }

    #[test]
    fn test_all_and_none() {
        let seg = segment(0, 3);
        assert_eq!(drain(AllDocsFilter.docset(&seg).unwrap().unwrap()), vec![0, 1, 2]);
        assert!(MatchNoneFilter.docset(&seg).unwrap().is_none());
        assert!(AllDocsFilter.docset(&segment(1, 0)).unwrap().is_none());
    }

    #[test]
    fn test_predicate_filter_sees_segment() {
        let filter = PredicateFilter::new(|seg, doc| seg.ord() == 1 && doc % 2 == 1);
        assert_eq!(drain(filter.docset(&segment(1, 6)).unwrap().unwrap()), vec![1, 3, 5]);
        assert!(drain(filter.docset(&segment(0, 6)).unwrap().unwrap()).is_empty());
    }

    #[test]
    fn test_sequential_bits() {
        let filter = DocIdsFilter::new().with_segment(0, [2, 4, 9]);
        let seg = segment(0, 10);
        let mut bits = SequentialBits::for_segment(&filter, &seg).unwrap();
        let hits: Vec<DocId> = (0..10).filter(|&d| bits.get(d)).collect();
        assert_eq!(hits, vec![2, 4, 9]);
    }

    #[test]
    fn test_sequential_bits_repeat_lookup() {
        let filter = DocIdsFilter::new().with_segment(0, [5]);
        let seg = segment(0, 10);
        let mut bits = SequentialBits::for_segment(&filter, &seg).unwrap();
        assert!(bits.get(5));
        assert!(bits.get(5));
        assert!(!bits.get(6));
    }

    #[test]
    fn test_sequential_bits_without_docset() {
        let mut bits = SequentialBits::new(None);
        assert!(!bits.get(0));
        assert!(!bits.get(100));
    }

    #[test]
    #[should_panic(expected = "went backwards")]
    fn test_sequential_bits_backwards_panics() {
        let mut bits = SequentialBits::new(None);
        bits.get(5);
        bits.get(4);
    }
}
