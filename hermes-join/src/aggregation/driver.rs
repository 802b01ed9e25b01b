//! Query-side driver for a join aggregation.
//!
//! Plays the role of the search loop: feeds the main query's live matches
//! into phase 1 segment by segment, then runs phase 2 over every segment.

use crate::query::{SegmentFilter, TERMINATED};
use crate::segment::SegmentContext;
use crate::Result;

use super::bucket::BucketCollector;
use super::join::{JOIN_BUCKET, JoinCollector};
use super::result::SingleBucketResult;

/// Phase 1 for one segment: feed every live doc of `main_query` to `join`.
///
/// Returns the number of docs fed.
pub fn collect_segment<Q>(
    main_query: &Q,
    segment: &SegmentContext,
    join: &mut JoinCollector,
) -> Result<u32>
where
    Q: SegmentFilter + ?Sized,
{
    let Some(mut docs) = main_query.docset(segment)? else {
        return Ok(0);
    };
    let mut leaf = join.leaf_collector(segment)?;
    if leaf.is_noop() {
        return Ok(0);
    }

    let mut fed = 0u32;
    let mut doc = docs.doc();
    while doc != TERMINATED {
        if segment.is_live(doc) {
            leaf.collect(doc, JOIN_BUCKET)?;
            fed += 1;
        }
        doc = docs.advance();
    }
    Ok(fed)
}

/// Run a join end to end over `segments` and release its ordinal set.
///
/// On error the collector is left as is; dropping it frees the set.
pub fn execute_join<Q, C>(
    main_query: &Q,
    segments: &[SegmentContext],
    join: &mut JoinCollector,
    sub: &mut C,
) -> Result<SingleBucketResult>
where
    Q: SegmentFilter + ?Sized,
    C: BucketCollector + ?Sized,
{
    let mut fed = 0u64;
    for segment in segments {
        fed += collect_segment(main_query, segment, join)? as u64;
    }
    log::debug!(
        "Join [{}]: main query fed {} docs, {} distinct ordinals",
        join.name(),
        fed,
        join.collected_ordinals()
    );

    join.replay(segments, sub)?;
    let result = join.build_result();
    join.release();
    Ok(result)
}
