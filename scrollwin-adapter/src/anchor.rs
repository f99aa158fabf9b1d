use scrollwin::{CollectionChange, EdgeItem, ScrollDirection, WindowRange, WindowRangeCalculator};

/// Captures the edge item of the viewport inside `range`.
///
/// - `Backward`: the item under the viewport top, measured from the viewport top to the item's
///   bottom border (`border == Forward`).
/// - `Forward`: the item under the viewport bottom, measured from the item's top border to the
///   viewport bottom (`border == Backward`).
///
/// Returns `None` if the range is empty or the viewport does not overlap it.
pub fn capture_edge_item(
    calc: &WindowRangeCalculator,
    direction: ScrollDirection,
    range: WindowRange,
) -> Option<EdgeItem> {
    if range.is_empty() || range.end_index > calc.total_count() {
        return None;
    }
    let sizes = calc.sizes();
    let top = calc.scroll_position();
    let bottom = top.saturating_add(calc.viewport_size() as u64);
    let block_start = sizes.offset(range.start_index);
    let block_end = sizes.offset(range.end_index);
    if bottom < block_start || top > block_end {
        return None;
    }

    let line = match direction {
        ScrollDirection::Backward => top,
        ScrollDirection::Forward => bottom.saturating_sub(1),
    };
    let index = sizes
        .index_at_offset(line)?
        .clamp(range.start_index, range.end_index - 1);
    let item = sizes.item(index)?;

    let (border, border_distance) = match direction {
        ScrollDirection::Backward => (ScrollDirection::Forward, item.end().saturating_sub(top)),
        ScrollDirection::Forward => (ScrollDirection::Backward, bottom.saturating_sub(item.offset)),
    };
    Some(EdgeItem {
        index,
        border,
        border_distance,
        direction,
    })
}

/// The scroll position that puts `edge` back where it was captured, under current sizes.
///
/// Returns `None` if the item no longer exists.
pub fn restore_position(calc: &WindowRangeCalculator, edge: &EdgeItem) -> Option<u64> {
    let item = calc.sizes().item(edge.index)?;
    let anchor_line = match edge.border {
        ScrollDirection::Forward => item.end().saturating_sub(edge.border_distance),
        ScrollDirection::Backward => item.offset.saturating_add(edge.border_distance),
    };
    let position = match edge.direction {
        ScrollDirection::Backward => anchor_line,
        ScrollDirection::Forward => anchor_line.saturating_sub(calc.viewport_size() as u64),
    };
    Some(position.min(calc.max_scroll_position()))
}

/// Follows an edge item through a collection change.
///
/// If the anchored item itself was removed, the item that took its place (the first survivor
/// after the removed block) is aligned to the viewport top instead. `total_after` is the
/// collection length after the change.
pub fn remap_edge_item(
    edge: EdgeItem,
    change: CollectionChange,
    total_after: usize,
) -> Option<EdgeItem> {
    if let Some(index) = change.remap_index(edge.index) {
        return Some(EdgeItem { index, ..edge });
    }
    let CollectionChange::Remove { index, .. } = change else {
        return None;
    };
    if total_after == 0 {
        return None;
    }
    Some(EdgeItem {
        index: index.min(total_after - 1),
        border: ScrollDirection::Backward,
        border_distance: 0,
        direction: ScrollDirection::Backward,
    })
}

/// Anchor bookkeeping that outlives a single change: a saved position and the restore
/// direction predicted by the caller for the next mutation.
#[derive(Clone, Debug, Default)]
pub struct ScrollAnchorEngine {
    saved: Option<EdgeItem>,
    predicted_direction: Option<ScrollDirection>,
}

impl ScrollAnchorEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Captures the edge item of the current range.
    pub fn capture(
        &self,
        calc: &WindowRangeCalculator,
        direction: ScrollDirection,
    ) -> Option<EdgeItem> {
        capture_edge_item(calc, direction, calc.range())
    }

    /// Remembers the backward edge item so it can be restored later.
    pub fn save(&mut self, calc: &WindowRangeCalculator) -> Option<EdgeItem> {
        self.saved = self.capture(calc, ScrollDirection::Backward);
        self.saved
    }

    pub fn take_saved(&mut self) -> Option<EdgeItem> {
        self.saved.take()
    }

    /// Overrides the anchor side for the next collection change only.
    pub fn set_predicted_direction(&mut self, direction: ScrollDirection) {
        self.predicted_direction = Some(direction);
    }

    /// The anchor side for a collection change: the predicted one if set, else `Backward`.
    pub fn take_direction(&mut self) -> ScrollDirection {
        self.predicted_direction
            .take()
            .unwrap_or(ScrollDirection::Backward)
    }

    /// Follows the saved anchor through a collection change.
    pub fn remap_saved(&mut self, change: CollectionChange, total_after: usize) {
        self.saved = self
            .saved
            .and_then(|edge| remap_edge_item(edge, change, total_after));
    }

    pub fn clear(&mut self) {
        self.saved = None;
        self.predicted_direction = None;
    }
}
