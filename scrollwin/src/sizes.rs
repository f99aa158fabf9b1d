use alloc::vec::Vec;

use crate::fenwick::Fenwick;
use crate::{ItemSize, SizeSource, WindowRange};

/// Per-index size table with offset ↔ index lookup.
///
/// Items without a known size are estimated with the rounded average of the known sizes (or
/// `estimated_item_size` while nothing is known). Offsets are always answered from
/// the current estimate, so `offset(i + 1) == offset(i) + effective_size(i)` holds for every `i`.
///
/// Two Fenwick trees back the lookups: one over known sizes and one over "is known" flags.
#[derive(Clone, Debug)]
pub struct ItemSizeTracker {
    sizes: Vec<u32>,
    sources: Vec<SizeSource>,
    known_sums: Fenwick,
    known_counts: Fenwick,
    given: usize,
    estimated_item_size: u32,
}

impl ItemSizeTracker {
    pub fn new(count: usize, estimated_item_size: u32) -> Self {
        let mut tracker = Self {
            sizes: Vec::new(),
            sources: Vec::new(),
            known_sums: Fenwick::default(),
            known_counts: Fenwick::default(),
            given: 0,
            estimated_item_size,
        };
        tracker.reset(count);
        tracker
    }

    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }

    /// Forgets every size and resizes the table to `count` unknown items.
    pub fn reset(&mut self, count: usize) {
        self.sizes.clear();
        self.sizes.resize(count, 0);
        self.sources.clear();
        self.sources.resize(count, SizeSource::Unknown);
        self.rebuild();
    }

    pub fn set_estimated_item_size(&mut self, estimated_item_size: u32) {
        self.estimated_item_size = estimated_item_size;
    }

    /// The size used for items whose size is unknown.
    pub fn estimate(&self) -> u32 {
        let count = self.known_counts.total();
        if count == 0 {
            return self.estimated_item_size;
        }
        let sum = self.known_sums.total();
        ((sum + count / 2) / count).min(u32::MAX as u64) as u32
    }

    /// The known size of `index`, if any.
    pub fn size(&self, index: usize) -> Option<u32> {
        let source = *self.sources.get(index)?;
        source.is_known().then(|| self.sizes[index])
    }

    /// The size used for layout: known or estimated.
    pub fn effective_size(&self, index: usize) -> u32 {
        self.size(index).unwrap_or_else(|| self.estimate())
    }

    pub fn source(&self, index: usize) -> Option<SizeSource> {
        self.sources.get(index).copied()
    }

    /// Absolute offset of the item start. `offset(len())` is the total size.
    pub fn offset(&self, index: usize) -> u64 {
        let index = index.min(self.len());
        let known_sum = self.known_sums.prefix_sum(index);
        let unknown = index as u64 - self.known_counts.prefix_sum(index);
        known_sum.saturating_add(unknown.saturating_mul(self.estimate() as u64))
    }

    pub fn item(&self, index: usize) -> Option<ItemSize> {
        if index >= self.len() {
            return None;
        }
        Some(ItemSize {
            size: self.effective_size(index),
            offset: self.offset(index),
        })
    }

    pub fn total_size(&self) -> u64 {
        self.offset(self.len())
    }

    /// Sum of effective sizes in `[range.start_index, range.end_index)`.
    pub fn range_size(&self, range: WindowRange) -> u64 {
        self.offset(range.end_index) - self.offset(range.start_index)
    }

    pub fn average_size(&self) -> u32 {
        self.estimate()
    }

    pub fn is_all_given(&self) -> bool {
        !self.sources.is_empty() && self.given == self.sources.len()
    }

    /// Whether `index` should be measured on its next render.
    pub fn needs_measure(&self, index: usize) -> bool {
        matches!(
            self.sources.get(index),
            Some(SizeSource::Unknown | SizeSource::Stale)
        )
    }

    /// The index of the item covering `offset`.
    ///
    /// Offsets past the end map to the last item; zero-sized items are never returned unless
    /// every item up to the end is zero-sized.
    pub fn index_at_offset(&self, offset: u64) -> Option<usize> {
        let len = self.len();
        if len == 0 {
            return None;
        }
        if offset >= self.total_size() {
            return Some(len - 1);
        }
        // Largest i with offset(i) <= target.
        let (mut lo, mut hi) = (0usize, len - 1);
        while lo < hi {
            let mid = lo + (hi - lo).div_ceil(2);
            if self.offset(mid) <= offset {
                lo = mid;
            } else {
                hi = mid - 1;
            }
        }
        Some(lo)
    }

    /// Records a measurement. Returns the size delta applied to the layout.
    ///
    /// Given sizes are authoritative and are left untouched.
    pub fn set_size(&mut self, index: usize, size: u32) -> i64 {
        let Some(source) = self.sources.get(index).copied() else {
            return 0;
        };
        let before = self.effective_size(index) as i64;
        match source {
            SizeSource::Given => {
                vtrace!(index, size, "ignoring measurement of a given size");
                return 0;
            }
            SizeSource::Measured | SizeSource::Stale => {
                let delta = size as i64 - self.sizes[index] as i64;
                self.known_sums.add(index, delta);
            }
            SizeSource::Unknown => {
                self.known_sums.add(index, size as i64);
                self.known_counts.add(index, 1);
            }
        }
        self.sizes[index] = size;
        self.sources[index] = SizeSource::Measured;
        size as i64 - before
    }

    /// Installs item sizes supplied by the data, starting at `start`.
    ///
    /// `None` entries are declared-but-missing values: those items fall back to the estimate and
    /// their indexes are returned.
    pub fn set_given_sizes(&mut self, start: usize, sizes: &[Option<u32>]) -> Vec<usize> {
        let mut missing = Vec::new();
        for (offset, given) in sizes.iter().enumerate() {
            let index = start + offset;
            if index >= self.len() {
                break;
            }
            match given {
                Some(size) => {
                    self.sizes[index] = *size;
                    self.sources[index] = SizeSource::Given;
                }
                None => {
                    self.sizes[index] = 0;
                    self.sources[index] = SizeSource::Unknown;
                    missing.push(index);
                }
            }
        }
        self.rebuild();
        if !missing.is_empty() {
            verror!(
                count = missing.len(),
                first = missing[0],
                "item size property has no value; falling back to the estimated size"
            );
        }
        missing
    }

    /// Marks measured items in `range` as stale (they were detached and must be re-measured).
    pub fn invalidate(&mut self, range: WindowRange) {
        let end = range.end_index.min(self.len());
        for source in &mut self.sources[range.start_index.min(end)..end] {
            if *source == SizeSource::Measured {
                *source = SizeSource::Stale;
            }
        }
    }

    pub fn insert(&mut self, at: usize, count: usize) {
        let at = at.min(self.len());
        if at == self.len() {
            for _ in 0..count {
                self.sizes.push(0);
                self.sources.push(SizeSource::Unknown);
                self.known_sums.push_value(0);
                self.known_counts.push_value(0);
            }
            return;
        }
        self.sizes.splice(at..at, core::iter::repeat_n(0, count));
        self.sources
            .splice(at..at, core::iter::repeat_n(SizeSource::Unknown, count));
        self.rebuild();
    }

    pub fn remove(&mut self, at: usize, count: usize) {
        let at = at.min(self.len());
        let end = at.saturating_add(count).min(self.len());
        self.sizes.drain(at..end);
        self.sources.drain(at..end);
        self.rebuild();
    }

    /// Moves `count` items starting at `from` so the first one lands at `to` (post-move index).
    pub fn move_items(&mut self, from: usize, count: usize, to: usize) {
        if count == 0 || from == to {
            return;
        }
        let moved_sizes: Vec<u32> = self.sizes.drain(from..from + count).collect();
        let moved_sources: Vec<SizeSource> = self.sources.drain(from..from + count).collect();
        self.sizes.splice(to..to, moved_sizes);
        self.sources.splice(to..to, moved_sources);
        self.rebuild();
    }

    fn rebuild(&mut self) {
        let known = |s: &SizeSource| s.is_known();
        self.known_sums = Fenwick::from_values(
            self.sizes
                .iter()
                .zip(&self.sources)
                .map(|(size, source)| if known(source) { *size as u64 } else { 0 }),
        );
        self.known_counts =
            Fenwick::from_values(self.sources.iter().map(|s| u64::from(known(s))));
        self.given = self
            .sources
            .iter()
            .filter(|s| **s == SizeSource::Given)
            .count();
        debug_assert_eq!(self.known_sums.len(), self.sizes.len());
    }
}
