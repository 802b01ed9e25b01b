//! Global ordinals for a keyword join field.
//!
//! Each segment keeps its own sorted dictionary of join-key terms and stores
//! per-doc local ordinals into it. Global ordinals number the union of all
//! segment dictionaries in sorted term order, so the same term resolves to
//! the same ordinal in every segment. A per-segment `ordinal_map` remaps
//! local ordinals to global ones at read time.
//!
//! Column layout per segment (multi-value capable):
//!
//! ```text
//! doc_offsets: [u32; max_doc + 1]    values of doc d are local_ords[off[d]..off[d+1]]
//! local_ords:  [u32; num_values]     ascending within a doc
//! ordinal_map: [u32; dict_len]       local ordinal -> global ordinal
//! ```

use crate::segment::SegmentContext;
use crate::{DocId, Error, Result};

/// Dense id of a distinct join-key value, in `[0, max_ord)`.
pub type Ordinal = u64;

/// Per-segment cursor over the global ordinals of a doc.
pub trait SegmentOrdinals {
    /// Position on `doc`. Returns false if the doc has no value.
    fn advance_exact(&mut self, doc: DocId) -> Result<bool>;

    /// Next global ordinal of the current doc in ascending order, `None` once
    /// the doc's values are exhausted.
    fn next_ord(&mut self) -> Option<Ordinal>;
}

/// Resolves documents to global ordinals of the join field.
pub trait OrdinalsSource {
    /// Exclusive upper bound on the ordinals this source yields.
    fn max_ord(&self) -> u64;

    /// Bind to one segment.
    fn segment_ordinals<'a>(
        &'a self,
        segment: &SegmentContext,
    ) -> Result<Box<dyn SegmentOrdinals + 'a>>;
}

// ── Column ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
struct SegmentColumn {
    doc_offsets: Vec<u32>,
    local_ords: Vec<u32>,
    ordinal_map: Vec<u32>,
}

impl SegmentColumn {
    fn max_doc(&self) -> u32 {
        self.doc_offsets.len().saturating_sub(1) as u32
    }
}

struct ColumnCursor<'a> {
    column: &'a SegmentColumn,
    pos: usize,
    end: usize,
}

impl SegmentOrdinals for ColumnCursor<'_> {
    fn advance_exact(&mut self, doc: DocId) -> Result<bool> {
        if doc >= self.column.max_doc() {
            self.pos = 0;
            self.end = 0;
            return Ok(false);
        }
        let doc = doc as usize;
        self.pos = self.column.doc_offsets[doc] as usize;
        self.end = self.column.doc_offsets[doc + 1] as usize;
        Ok(self.pos < self.end)
    }

    #[inline]
    fn next_ord(&mut self) -> Option<Ordinal> {
        if self.pos >= self.end {
            return None;
        }
        let local = self.column.local_ords[self.pos] as usize;
        self.pos += 1;
        Some(self.column.ordinal_map[local] as Ordinal)
    }
}

// ── GlobalOrdinals ───────────────────────────────────────────────────────

/// Join field with global ordinals across a fixed list of segments.
#[derive(Debug, Clone)]
pub struct GlobalOrdinals {
    terms: Vec<String>,
    segments: Vec<SegmentColumn>,
}

impl GlobalOrdinals {
    pub fn builder() -> GlobalOrdinalsBuilder {
        GlobalOrdinalsBuilder::default()
    }

    /// Number of distinct terms across all segments.
    pub fn max_ord(&self) -> u64 {
        self.terms.len() as u64
    }

    pub fn num_segments(&self) -> usize {
        self.segments.len()
    }

    /// Term for a global ordinal.
    pub fn term(&self, ordinal: Ordinal) -> Option<&str> {
        self.terms.get(ordinal as usize).map(String::as_str)
    }

    /// Global ordinal for a term.
    pub fn ordinal(&self, term: &str) -> Option<Ordinal> {
        self.terms
            .binary_search_by(|t| t.as_str().cmp(term))
            .ok()
            .map(|o| o as Ordinal)
    }
}

impl OrdinalsSource for GlobalOrdinals {
    fn max_ord(&self) -> u64 {
        GlobalOrdinals::max_ord(self)
    }

    fn segment_ordinals<'a>(
        &'a self,
        segment: &SegmentContext,
    ) -> Result<Box<dyn SegmentOrdinals + 'a>> {
        let column = self
            .segments
            .get(segment.ord())
            .ok_or(Error::SegmentNotFound(segment.ord()))?;
        Ok(Box::new(ColumnCursor {
            column,
            pos: 0,
            end: 0,
        }))
    }
}

// ── Builder ──────────────────────────────────────────────────────────────

/// Collects per-segment join-key values and merges their dictionaries.
#[derive(Debug, Default)]
pub struct GlobalOrdinalsBuilder {
    segments: Vec<Vec<Vec<String>>>,
}

impl GlobalOrdinalsBuilder {
    /// Add a segment whose docs carry any number of values each.
    /// Returns the segment ordinal.
    pub fn add_segment<D, V, S>(&mut self, docs: D) -> usize
    where
        D: IntoIterator<Item = V>,
        V: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.segments.push(
            docs.into_iter()
                .map(|values| values.into_iter().map(Into::into).collect())
                .collect(),
        );
        self.segments.len() - 1
    }

    /// Add a segment whose docs carry at most one value each.
    pub fn add_single_valued_segment<D, S>(&mut self, docs: D) -> usize
    where
        D: IntoIterator<Item = Option<S>>,
        S: Into<String>,
    {
        self.add_segment(docs.into_iter().map(|v| v.into_iter()))
    }

    pub fn build(self) -> GlobalOrdinals {
        let dicts: Vec<Vec<&str>> = self
            .segments
            .iter()
            .map(|docs| {
                let mut dict: Vec<&str> = docs.iter().flatten().map(String::as_str).collect();
                dict.sort_unstable();
                dict.dedup();
                dict
            })
            .collect();

        let mut terms: Vec<&str> = dicts.iter().flatten().copied().collect();
        terms.sort_unstable();
        terms.dedup();

        let segments = self
            .segments
            .iter()
            .zip(&dicts)
            .map(|(docs, dict)| {
                let ordinal_map = dict
                    .iter()
                    .map(|t| terms.binary_search(t).unwrap_or_default() as u32)
                    .collect();

                let mut doc_offsets = Vec::with_capacity(docs.len() + 1);
                let mut local_ords = Vec::new();
                doc_offsets.push(0);
                for values in docs {
                    let start = local_ords.len();
                    local_ords.extend(
                        values
                            .iter()
                            .filter_map(|v| dict.binary_search(&v.as_str()).ok())
                            .map(|o| o as u32),
                    );
                    local_ords[start..].sort_unstable();
                    dedup_tail(&mut local_ords, start);
                    doc_offsets.push(local_ords.len() as u32);
                }

                SegmentColumn {
                    doc_offsets,
                    local_ords,
                    ordinal_map,
                }
            })
            .collect();

        let global = GlobalOrdinals {
            terms: terms.into_iter().map(str::to_owned).collect(),
            segments,
        };
        log::debug!(
            "Built global ordinals: {} terms across {} segments",
            global.terms.len(),
            global.segments.len()
        );
        global
    }
}

/// Remove adjacent duplicates in `values[start..]`.
fn dedup_tail(values: &mut Vec<u32>, start: usize) {
    let mut tail = values.split_off(start);
    tail.dedup();
    values.extend(tail);
}
