use alloc::vec::Vec;
use core::cmp;

/// Prefix sums over per-item values with `O(log n)` point updates.
#[derive(Clone, Debug, Default)]
pub(crate) struct Fenwick {
    tree: Vec<u64>, // 1-indexed
    total: u64,
}

impl Fenwick {
    pub(crate) fn from_values(values: impl ExactSizeIterator<Item = u64>) -> Self {
        let n = values.len();
        let mut tree = alloc::vec![0u64; n + 1];
        let mut total = 0u64;
        for (i, v) in (1..=n).zip(values) {
            total = total.saturating_add(v);
            tree[i] = tree[i].saturating_add(v);
            let j = i + lsb(i);
            if j <= n {
                tree[j] = tree[j].saturating_add(tree[i]);
            }
        }
        Self { tree, total }
    }

    pub(crate) fn len(&self) -> usize {
        self.tree.len().saturating_sub(1)
    }

    /// Appends a value in `O(log n)`.
    pub(crate) fn push_value(&mut self, value: u64) {
        let new_len = self.len() + 1;
        self.tree.push(0);
        self.total = self.total.saturating_add(value);

        // tree[i] holds the sum of the lsb(i) values ending at i.
        let start_exclusive = new_len - lsb(new_len);
        let before = self
            .prefix_sum(new_len - 1)
            .saturating_sub(self.prefix_sum(start_exclusive));
        self.tree[new_len] = before.saturating_add(value);
    }

    pub(crate) fn add(&mut self, index: usize, delta: i64) {
        let n = self.len();
        if index >= n || delta == 0 {
            return;
        }
        if delta > 0 {
            self.total = self.total.saturating_add(delta as u64);
        } else {
            self.total = self.total.saturating_sub(delta.unsigned_abs());
        }
        let mut i = index + 1;
        while i <= n {
            let next = self.tree[i] as i128 + delta as i128;
            debug_assert!(next >= 0, "Fenwick underflow (idx={i}, delta={delta})");
            self.tree[i] = next.clamp(0, u64::MAX as i128) as u64;
            i += lsb(i);
        }
    }

    /// Sum of the first `count` values.
    pub(crate) fn prefix_sum(&self, count: usize) -> u64 {
        let mut i = cmp::min(count, self.len());
        let mut sum = 0u64;
        while i > 0 {
            sum = sum.saturating_add(self.tree[i]);
            i &= i - 1;
        }
        sum
    }

    pub(crate) fn total(&self) -> u64 {
        self.total
    }
}

fn lsb(i: usize) -> usize {
    i & i.wrapping_neg()
}
