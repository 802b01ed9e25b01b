//! Parent/child join over global ordinals.
//!
//! Two phases, strictly ordered:
//!
//! 1. **Collect**: the host drives a [`LeafJoinCollector`] per segment with
//!    every doc matching the main query. Docs also matching the "in" filter
//!    record their join ordinal in the [`OrdinalSet`].
//! 2. **Replay**: [`JoinCollector::replay`] walks the "out" filter over every
//!    segment, not just the ones the main query touched, and routes each live
//!    doc whose ordinal was recorded into bucket 0 of the sub-aggregator.
//!
//! Contract violations (non-zero bucket, multi-valued join field, collecting
//! after replay, replaying twice) panic. The ordinal set is freed by
//! [`JoinCollector::release`] or on drop, including during unwinding.

use std::sync::Arc;

use crate::query::{SegmentFilter, SequentialBits, TERMINATED};
use crate::segment::SegmentContext;
use crate::structures::{Ordinal, OrdinalSet, OrdinalSetKind, OrdinalsSource, SegmentOrdinals};
use crate::{DocId, Error, Result, Score};

use super::bucket::{BucketCollector, BucketOrd};
use super::config::{JoinConfig, JoinDirection};
use super::result::SingleBucketResult;

/// Largest `max_ord` a join can be built for.
pub const MAX_ORDINALS: u64 = i32::MAX as u64;

/// The only bucket a join aggregator fills.
pub const JOIN_BUCKET: BucketOrd = 0;

/// Constant score attached to replayed docs.
const REPLAY_SCORE: Score = 1.0;

/// Lifecycle of a [`JoinCollector`]. Never goes back to `Collecting`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinPhase {
    Collecting,
    Replaying,
}

/// Single-bucket join aggregator.
pub struct JoinCollector {
    name: String,
    in_filter: Arc<dyn SegmentFilter>,
    out_filter: Arc<dyn SegmentFilter>,
    ordinals: Option<Arc<dyn OrdinalsSource>>,
    ordinal_set: OrdinalSet,
    phase: JoinPhase,
    doc_count: u64,
}

impl JoinCollector {
    /// Build a join collecting ordinals of `in_filter` docs and replaying
    /// `out_filter` docs.
    ///
    /// `ordinals = None` means the join field has no data here; the collector
    /// then collects and emits nothing. Fails if `max_ord` exceeds
    /// [`MAX_ORDINALS`].
    pub fn new(
        config: &JoinConfig,
        in_filter: Arc<dyn SegmentFilter>,
        out_filter: Arc<dyn SegmentFilter>,
        ordinals: Option<Arc<dyn OrdinalsSource>>,
        max_ord: u64,
    ) -> Result<Self> {
        if max_ord > MAX_ORDINALS {
            return Err(Error::TooManyOrdinals {
                max_ord,
                limit: MAX_ORDINALS,
            });
        }

        let kind = config.nesting.ordinal_set_kind();
        let ordinal_set = OrdinalSet::new(kind, max_ord);
        log::debug!(
            "Join [{}]: {:?} ordinal set, max_ord={}, {} bytes{}",
            config.name,
            kind,
            max_ord,
            ordinal_set.ram_bytes_used(),
            if ordinals.is_none() {
                " (no join field, no-op)"
            } else {
                ""
            }
        );

        Ok(Self {
            name: config.name.clone(),
            in_filter,
            out_filter,
            ordinals,
            ordinal_set,
            phase: JoinPhase::Collecting,
            doc_count: 0,
        })
    }

    /// Build a join between parent and child docs, oriented by
    /// `config.direction`. `max_ord` is taken from the ordinal source.
    pub fn for_relation(
        config: &JoinConfig,
        parent_filter: Arc<dyn SegmentFilter>,
        child_filter: Arc<dyn SegmentFilter>,
        ordinals: Option<Arc<dyn OrdinalsSource>>,
    ) -> Result<Self> {
        let max_ord = ordinals.as_ref().map_or(0, |o| o.max_ord());
        let (in_filter, out_filter) = match config.direction {
            JoinDirection::ParentToChildren => (parent_filter, child_filter),
            JoinDirection::ChildrenToParent => (child_filter, parent_filter),
        };
        Self::new(config, in_filter, out_filter, ordinals, max_ord)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn phase(&self) -> JoinPhase {
        self.phase
    }

    /// True when there is no join field to resolve.
    pub fn is_noop(&self) -> bool {
        self.ordinals.is_none()
    }

    /// Ordinal set representation, `None` once released.
    pub fn ordinal_set_kind(&self) -> Option<OrdinalSetKind> {
        self.ordinal_set.kind()
    }

    /// Distinct ordinals recorded so far.
    pub fn collected_ordinals(&self) -> usize {
        self.ordinal_set.len()
    }

    /// Docs routed into the bucket by replay.
    pub fn doc_count(&self) -> u64 {
        self.doc_count
    }

    pub fn ram_bytes_used(&self) -> usize {
        self.ordinal_set.ram_bytes_used()
    }

    /// Bind phase 1 to `segment`.
    pub fn leaf_collector<'a>(
        &'a mut self,
        segment: &'a SegmentContext,
    ) -> Result<LeafJoinCollector<'a>> {
        assert_eq!(
            self.phase,
            JoinPhase::Collecting,
            "join [{}] cannot collect after replay",
            self.name
        );
        let Some(ordinals) = self.ordinals.as_deref() else {
            return Ok(LeafJoinCollector { state: None });
        };
        let in_docs = SequentialBits::for_segment(self.in_filter.as_ref(), segment)?;
        let ords = ordinals.segment_ordinals(segment)?;
        Ok(LeafJoinCollector {
            state: Some(LeafState {
                in_docs,
                ords,
                ordinal_set: &mut self.ordinal_set,
            }),
        })
    }

    /// Phase 2: route every live "out" doc whose ordinal was collected into
    /// bucket 0 of `sub`. Runs once, after all collection is done.
    pub fn replay<C>(&mut self, segments: &[SegmentContext], sub: &mut C) -> Result<()>
    where
        C: BucketCollector + ?Sized,
    {
        assert_eq!(
            self.phase,
            JoinPhase::Collecting,
            "join [{}] replayed twice",
            self.name
        );
        self.phase = JoinPhase::Replaying;

        let Some(ordinals) = self.ordinals.as_deref() else {
            log::debug!("Join [{}]: no join field, nothing to replay", self.name);
            return Ok(());
        };

        let mut emitted = 0u64;
        let mut visited = 0usize;
        for segment in segments {
            let Some(mut out_docs) = self.out_filter.docset(segment)? else {
                continue;
            };
            visited += 1;

            let mut leaf = sub.leaf_collector(segment)?;
            let mut ords = ordinals.segment_ordinals(segment)?;
            let mut segment_emitted = 0u64;

            let mut doc = out_docs.doc();
            while doc != TERMINATED {
                if segment.is_live(doc) && ords.advance_exact(doc)? {
                    let ordinal = single_ordinal(ords.as_mut(), doc);
                    if self.ordinal_set.contains(ordinal) {
                        leaf.collect(doc, JOIN_BUCKET, REPLAY_SCORE)?;
                        segment_emitted += 1;
                    }
                }
                doc = out_docs.advance();
            }

            log::trace!(
                "Join [{}]: segment {} emitted {} docs",
                self.name,
                segment.segment_id(),
                segment_emitted
            );
            emitted += segment_emitted;
        }

        self.doc_count += emitted;
        log::debug!(
            "Join [{}]: replayed {} of {} segments, {} ordinals matched {} docs",
            self.name,
            visited,
            segments.len(),
            self.ordinal_set.len(),
            emitted
        );
        Ok(())
    }

    /// Bucket result. Only meaningful after replay.
    pub fn build_result(&self) -> SingleBucketResult {
        assert_eq!(
            self.phase,
            JoinPhase::Replaying,
            "join [{}] result requested before replay",
            self.name
        );
        SingleBucketResult {
            name: self.name.clone(),
            doc_count: self.doc_count,
        }
    }

    /// Free the ordinal set. Safe to call more than once; also runs on drop.
    pub fn release(&mut self) {
        let freed = self.ordinal_set.release();
        if freed > 0 {
            log::debug!("Join [{}]: released {} bytes", self.name, freed);
        }
    }
}

impl Drop for JoinCollector {
    fn drop(&mut self) {
        if self.phase == JoinPhase::Collecting
            && !self.ordinal_set.is_released()
            && !self.ordinal_set.is_empty()
        {
            log::warn!(
                "Join [{}] dropped with {} collected ordinals that were never replayed",
                self.name,
                self.ordinal_set.len()
            );
        }
        self.release();
    }
}

impl std::fmt::Debug for JoinCollector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JoinCollector")
            .field("name", &self.name)
            .field("phase", &self.phase)
            .field("ordinal_set", &self.ordinal_set.kind())
            .field("noop", &self.is_noop())
            .field("doc_count", &self.doc_count)
            .finish()
    }
}

// ── Phase 1 ──────────────────────────────────────────────────────────────

struct LeafState<'a> {
    in_docs: SequentialBits<'a>,
    ords: Box<dyn SegmentOrdinals + 'a>,
    ordinal_set: &'a mut OrdinalSet,
}

/// Phase-1 collector bound to one segment.
///
/// Docs must be fed in ascending order, as a main-query scorer yields them.
pub struct LeafJoinCollector<'a> {
    state: Option<LeafState<'a>>,
}

impl LeafJoinCollector<'_> {
    /// True when nothing can ever be collected (no join field).
    pub fn is_noop(&self) -> bool {
        self.state.is_none()
    }

    /// Record the join ordinal of `doc` if it matches the "in" filter.
    pub fn collect(&mut self, doc: DocId, bucket: BucketOrd) -> Result<()> {
        assert_eq!(
            bucket, JOIN_BUCKET,
            "join aggregator has a single bucket, got bucket {}",
            bucket
        );
        let Some(state) = self.state.as_mut() else {
            return Ok(());
        };
        if !state.in_docs.get(doc) || !state.ords.advance_exact(doc)? {
            return Ok(());
        }
        let ordinal = single_ordinal(state.ords.as_mut(), doc);
        state.ordinal_set.add(ordinal);
        Ok(())
    }
}

/// The one ordinal of a doc the cursor is positioned on.
fn single_ordinal<O: SegmentOrdinals + ?Sized>(ords: &mut O, doc: DocId) -> Ordinal {
    let Some(ordinal) = ords.next_ord() else {
        panic!("doc {} has a join value but no ordinal", doc);
    };
    assert!(
        ords.next_ord().is_none(),
        "doc {} has more than one join ordinal; the join field must be single-valued",
        doc
    );
    ordinal
}
