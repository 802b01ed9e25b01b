//! Sub-aggregator sinks
//!
//! Documents routed into a bucket are handed to a [`BucketCollector`], which
//! binds a [`LeafBucketCollector`] per segment. Emissions arrive in ascending
//! doc order within a segment and in segment order across segments.

use crate::segment::SegmentContext;
use crate::{DocId, Result, Score};

/// Bucket ordinal within an aggregator.
pub type BucketOrd = u64;

/// Segment-bound sink for `(doc, bucket)` emissions.
pub trait LeafBucketCollector {
    fn collect(&mut self, doc: DocId, bucket: BucketOrd, score: Score) -> Result<()>;
}

/// Sub-aggregation that receives bucketed documents.
pub trait BucketCollector {
    fn leaf_collector<'a>(
        &'a mut self,
        segment: &'a SegmentContext,
    ) -> Result<Box<dyn LeafBucketCollector + 'a>>;
}

// ── DocCountCollector ────────────────────────────────────────────────────

/// Counts documents per bucket.
#[derive(Debug, Default)]
pub struct DocCountCollector {
    counts: Vec<u64>,
}

impl DocCountCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn doc_count(&self, bucket: BucketOrd) -> u64 {
        self.counts.get(bucket as usize).copied().unwrap_or(0)
    }

    /// Sum over all buckets.
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }
}

struct DocCountLeaf<'a> {
    counts: &'a mut Vec<u64>,
}

impl LeafBucketCollector for DocCountLeaf<'_> {
    #[inline]
    fn collect(&mut self, _doc: DocId, bucket: BucketOrd, _score: Score) -> Result<()> {
        let bucket = bucket as usize;
        if bucket >= self.counts.len() {
            self.counts.resize(bucket + 1, 0);
        }
        self.counts[bucket] += 1;
        Ok(())
    }
}

impl BucketCollector for DocCountCollector {
    fn leaf_collector<'a>(
        &'a mut self,
        _segment: &'a SegmentContext,
    ) -> Result<Box<dyn LeafBucketCollector + 'a>> {
        Ok(Box::new(DocCountLeaf {
            counts: &mut self.counts,
        }))
    }
}

// ── CollectedDocs ────────────────────────────────────────────────────────

/// One recorded emission.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct CollectedDoc {
    pub segment_ord: usize,
    pub doc: DocId,
    pub bucket: BucketOrd,
    pub score: Score,
}

/// Records every emission in arrival order.
#[derive(Debug, Default)]
pub struct CollectedDocs {
    docs: Vec<CollectedDoc>,
}

impl CollectedDocs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn docs(&self) -> &[CollectedDoc] {
        &self.docs
    }

    /// `(segment_ord, doc)` pairs in arrival order.
    pub fn addresses(&self) -> Vec<(usize, DocId)> {
        self.docs.iter().map(|d| (d.segment_ord, d.doc)).collect()
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }
}

struct CollectedDocsLeaf<'a> {
    segment_ord: usize,
    docs: &'a mut Vec<CollectedDoc>,
}

impl LeafBucketCollector for CollectedDocsLeaf<'_> {
    fn collect(&mut self, doc: DocId, bucket: BucketOrd, score: Score) -> Result<()> {
        self.docs.push(CollectedDoc {
            segment_ord: self.segment_ord,
            doc,
            bucket,
            score,
        });
        Ok(())
    }
}

impl BucketCollector for CollectedDocs {
    fn leaf_collector<'a>(
        &'a mut self,
        segment: &'a SegmentContext,
    ) -> Result<Box<dyn LeafBucketCollector + 'a>> {
        Ok(Box::new(CollectedDocsLeaf {
            segment_ord: segment.ord(),
            docs: &mut self.docs,
        }))
    }
}

// Fan out to two sinks
impl<A: BucketCollector, B: BucketCollector> BucketCollector for (&mut A, &mut B) {
    fn leaf_collector<'a>(
        &'a mut self,
        segment: &'a SegmentContext,
    ) -> Result<Box<dyn LeafBucketCollector + 'a>> {
        let first = self.0.leaf_collector(segment)?;
        let second = self.1.leaf_collector(segment)?;
        Ok(Box::new(PairLeaf(first, second)))
    }
}

struct PairLeaf<'a>(
    Box<dyn LeafBucketCollector + 'a>,
    Box<dyn LeafBucketCollector + 'a>,
);

impl LeafBucketCollector for PairLeaf<'_> {
    fn collect(&mut self, doc: DocId, bucket: BucketOrd, score: Score) -> Result<()> {
        self.0.collect(doc, bucket, score)?;
        self.1.collect(doc, bucket, score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::SegmentId;

    #[test]
    fn test_doc_count_collector() {
        let seg = SegmentContext::new(0, SegmentId(1), 10);
        let mut counts = DocCountCollector::new();
        {
            let mut leaf = counts.leaf_collector(&seg).unwrap();
            leaf.collect(1, 0, 1.0).unwrap();
            leaf.collect(2, 0, 1.0).unwrap();
            leaf.collect(3, 2, 1.0).unwrap();
        }
        assert_eq!(counts.doc_count(0), 2);
        assert_eq!(counts.doc_count(1), 0);
        assert_eq!(counts.doc_count(2), 1);
        assert_eq!(counts.doc_count(7), 0);
        assert_eq!(counts.total(), 3);
    }

    #[test]
    fn test_collected_docs_records_segment() {
        let seg0 = SegmentContext::new(0, SegmentId(1), 10);
        let seg1 = SegmentContext::new(1, SegmentId(2), 10);
        let mut docs = CollectedDocs::new();
        docs.leaf_collector(&seg0).unwrap().collect(4, 0, 1.0).unwrap();
        docs.leaf_collector(&seg1).unwrap().collect(2, 0, 1.0).unwrap();
        assert_eq!(docs.addresses(), vec![(0, 4), (1, 2)]);
        assert_eq!(docs.docs()[1].score, 1.0);
    }

    #[test]
    fn test_pair_fans_out() {
        let seg = SegmentContext::new(0, SegmentId(1), 10);
        let mut counts = DocCountCollector::new();
        let mut docs = CollectedDocs::new();
        {
            let mut pair = (&mut counts, &mut docs);
            let mut leaf = pair.leaf_collector(&seg).unwrap();
            leaf.collect(5, 0, 1.0).unwrap();
        }
        assert_eq!(counts.total(), 1);
        assert_eq!(docs.addresses(), vec![(0, 5)]);
    }
}
