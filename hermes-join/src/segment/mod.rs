//! Segment handles seen by the join
//!
//! The join never reads segment storage itself. The host hands it a
//! [`SegmentContext`] per segment: its position in the reader's segment list,
//! its id, its doc count and an optional deletion bitmap. Filters, ordinal
//! sources and sub-aggregators key their own per-segment state off
//! [`SegmentContext::ord`].

use std::sync::Arc;

use crate::DocId;
use crate::structures::BitArray;

/// Unique segment identifier (hex-printed, 32 chars).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SegmentId(pub u128);

impl SegmentId {
    pub fn from_u128(id: u128) -> Self {
        Self(id)
    }

    pub fn to_hex(&self) -> String {
        format!("{:032x}", self.0)
    }
}

impl std::fmt::Display for SegmentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:032x}", self.0)
    }
}

/// Liveness bitmap for one segment: bit set = document is live.
#[derive(Debug, Clone)]
pub struct LiveDocs {
    bits: BitArray,
    num_deleted: u32,
}

impl LiveDocs {
    /// All `max_doc` documents live.
    pub fn all_live(max_doc: u32) -> Self {
        let mut bits = BitArray::new(max_doc as usize);
        for doc in 0..max_doc as usize {
            bits.set(doc);
        }
        Self {
            bits,
            num_deleted: 0,
        }
    }

    /// Build from a list of deleted doc ids.
    pub fn with_deleted(max_doc: u32, deleted: impl IntoIterator<Item = DocId>) -> Self {
        let mut live = Self::all_live(max_doc);
        for doc in deleted {
            live.delete(doc);
        }
        live
    }

    /// Tombstone `doc`. Returns true if it was live.
    pub fn delete(&mut self, doc: DocId) -> bool {
        if !self.bits.get(doc as usize) {
            return false;
        }
        self.bits.clear(doc as usize);
        self.num_deleted += 1;
        true
    }

    #[inline]
    pub fn is_live(&self, doc: DocId) -> bool {
        self.bits.get(doc as usize)
    }

    pub fn num_deleted(&self) -> u32 {
        self.num_deleted
    }
}

/// One segment of the searched data set.
#[derive(Debug, Clone)]
pub struct SegmentContext {
    ord: usize,
    segment_id: SegmentId,
    max_doc: u32,
    live_docs: Option<Arc<LiveDocs>>,
}

impl SegmentContext {
    pub fn new(ord: usize, segment_id: SegmentId, max_doc: u32) -> Self {
        Self {
            ord,
            segment_id,
            max_doc,
            live_docs: None,
        }
    }

    pub fn with_live_docs(mut self, live_docs: Arc<LiveDocs>) -> Self {
        self.live_docs = if live_docs.num_deleted() == 0 {
            None
        } else {
            Some(live_docs)
        };
        self
    }

    /// Position of this segment in the reader's segment list.
    pub fn ord(&self) -> usize {
        self.ord
    }

    pub fn segment_id(&self) -> SegmentId {
        self.segment_id
    }

    /// Exclusive upper bound on local doc ids.
    pub fn max_doc(&self) -> u32 {
        self.max_doc
    }

    /// Deletion bitmap, `None` when every document is live.
    pub fn live_docs(&self) -> Option<&LiveDocs> {
        self.live_docs.as_deref()
    }

    #[inline]
    pub fn is_live(&self, doc: DocId) -> bool {
        self.live_docs.as_ref().is_none_or(|live| live.is_live(doc))
    }

    pub fn num_docs(&self) -> u32 {
        self.max_doc - self.live_docs.as_ref().map_or(0, |l| l.num_deleted())
    }
}
