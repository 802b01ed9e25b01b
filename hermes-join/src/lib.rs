//! Hermes Join - parent/child join aggregation over global ordinals
//!
//! Given an "in" filter, an "out" filter and a single-valued join field, the
//! join collects the global ordinals of docs matching both the main query and
//! the "in" filter, then replays every live "out" doc sharing one of those
//! ordinals into a single bucket for sub-aggregation:
//! - Dense bit-per-ordinal set for top-level aggregators
//! - Sparse hashed set for aggregators nested under other buckets
//! - Replay over every segment, in segment then doc id order
//! - Global ordinals merged from per-segment term dictionaries

pub mod aggregation;
pub mod error;
pub mod query;
pub mod segment;
pub mod structures;

// Re-exports from aggregation
pub use aggregation::{
    AggregatorNesting, BucketCollector, BucketOrd, CollectedDocs, DocCountCollector, JoinCollector,
    JoinConfig, JoinDirection, JoinPhase, LeafBucketCollector, LeafJoinCollector, MAX_ORDINALS,
    SingleBucketResult, collect_segment, execute_join,
};

// Re-exports from query
pub use query::{
    AllDocsFilter, DocIdsFilter, DocSet, MatchNoneFilter, PredicateFilter, SegmentFilter,
    SequentialBits, TERMINATED,
};

// Re-exports from segment
pub use segment::{LiveDocs, SegmentContext, SegmentId};

// Re-exports from structures
pub use structures::{
    BitArray, GlobalOrdinals, GlobalOrdinalsBuilder, Ordinal, OrdinalHash, OrdinalSet,
    OrdinalSetKind, OrdinalsSource, SegmentOrdinals,
};

pub use error::{Error, Result};

pub type DocId = u32;
pub type Score = f32;
