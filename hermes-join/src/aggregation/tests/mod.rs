//! Join aggregation tests over hand-built segments.


use std::io;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::segment::{LiveDocs, SegmentContext, SegmentId};
use crate::structures::{Ordinal, OrdinalsSource, SegmentOrdinals};
use crate::{DocId, Error, Result};

/// Ordinal source with hand-assigned ordinals per (segment, doc).
pub(super) struct FixedOrdinals {
    max_ord: u64,
    segments: Vec<FxHashMap<DocId, Vec<Ordinal>>>,
}

impl FixedOrdinals {
    pub(super) fn new(max_ord: u64, num_segments: usize) -> Self {
        Self {
            max_ord,
            segments: (0..num_segments).map(|_| FxHashMap::default()).collect(),
        }
    }

    pub(super) fn with(mut self, segment: usize, doc: DocId, ordinal: Ordinal) -> Self {
        self.segments[segment].entry(doc).or_default().push(ordinal);
        self
    }

    pub(super) fn into_source(self) -> Arc<dyn OrdinalsSource> {
        Arc::new(self)
    }
}

struct FixedCursor<'a> {
    docs: &'a FxHashMap<DocId, Vec<Ordinal>>,
    current: &'a [Ordinal],
    pos: usize,
}

impl SegmentOrdinals for FixedCursor<'_> {
    fn advance_exact(&mut self, doc: DocId) -> Result<bool> {
        self.current = self.docs.get(&doc).map(Vec::as_slice).unwrap_or(&[]);
        self.pos = 0;
        Ok(!self.current.is_empty())
    }

    fn next_ord(&mut self) -> Option<Ordinal> {
        let ord = self.current.get(self.pos).copied();
        self.pos += 1;
        ord
    }
}

impl OrdinalsSource for FixedOrdinals {
    fn max_ord(&self) -> u64 {
        self.max_ord
    }

    fn segment_ordinals<'a>(
        &'a self,
        segment: &SegmentContext,
    ) -> Result<Box<dyn SegmentOrdinals + 'a>> {
        let docs = self
            .segments
            .get(segment.ord())
            .ok_or(Error::SegmentNotFound(segment.ord()))?;
        Ok(Box::new(FixedCursor {
            docs,
            current: &[],
            pos: 0,
        }))
    }
}

/// Ordinal source whose storage fails on one segment.
pub(super) struct FailingOrdinals {
    pub(super) inner: FixedOrdinals,
    pub(super) failing_segment: usize,
}

impl OrdinalsSource for FailingOrdinals {
    fn max_ord(&self) -> u64 {
        self.inner.max_ord
    }

    fn segment_ordinals<'a>(
        &'a self,
        segment: &SegmentContext,
    ) -> Result<Box<dyn SegmentOrdinals + 'a>> {
        if segment.ord() == self.failing_segment {
            return Err(io::Error::other("doc values block checksum mismatch").into());
        }
        self.inner.segment_ordinals(segment)
    }
}

pub(super) fn segment(ord: usize, max_doc: u32) -> SegmentContext {
    SegmentContext::new(ord, SegmentId(0xfeed_0000 + ord as u128), max_doc)
}

pub(super) fn segment_with_deletes(
    ord: usize,
    max_doc: u32,
    deleted: impl IntoIterator<Item = DocId>,
) -> SegmentContext {
    segment(ord, max_doc).with_live_docs(Arc::new(LiveDocs::with_deleted(max_doc, deleted)))
}
