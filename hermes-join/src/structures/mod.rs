mod bit_array;
mod global_ordinals;
mod ordinal_hash;
mod ordinal_set;

pub use bit_array::BitArray;
pub use global_ordinals::{
    GlobalOrdinals, GlobalOrdinalsBuilder, Ordinal, OrdinalsSource, SegmentOrdinals,
};
pub use ordinal_hash::OrdinalHash;
pub use ordinal_set::{OrdinalSet, OrdinalSetKind};
