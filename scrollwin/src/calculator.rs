use alloc::vec::Vec;

use crate::{
    Align, CollectionChange, ItemSizeTracker, ItemsOutOfRange, Placeholders, ScrollDirection,
    TriggerObserverState, TriggerOffsetMode, TriggerOffsets, VisibilityMode, WindowError,
    WindowOptions, WindowRange, WindowSnapshot,
};

const MIN_INDEX_LINE_RATIO: f64 = 0.15;
const MAX_INDEX_LINE_RATIO: f64 = 0.85;

/// The outcome of one calculator pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CalculatorResult {
    pub range: WindowRange,
    pub old_range: WindowRange,
    pub placeholders: Placeholders,
    pub old_placeholders: Placeholders,
    pub items_out_of_range: ItemsOutOfRange,
    pub old_items_out_of_range: ItemsOutOfRange,
    /// Set when the range moved by a segment shift or a jump.
    pub shift_direction: Option<ScrollDirection>,
    /// Set when a trigger appeared at an end the range cannot grow past.
    pub more_data_needed: Option<ScrollDirection>,
}

impl CalculatorResult {
    pub fn range_changed(&self) -> bool {
        self.range != self.old_range
    }

    pub fn placeholders_changed(&self) -> bool {
        self.placeholders != self.old_placeholders
    }

    pub fn items_out_of_range_changed(&self) -> bool {
        self.items_out_of_range != self.old_items_out_of_range
    }
}

#[derive(Clone, Copy)]
struct Before {
    range: WindowRange,
    placeholders: Placeholders,
    items_out_of_range: ItemsOutOfRange,
}

/// Decides which contiguous part of the collection is materialized.
///
/// Offsets are absolute: item `i` starts at `sizes().offset(i)` and the backward placeholder
/// covers `[0, offset(range.start_index))`. A scroll position is therefore directly comparable
/// to item offsets, and
/// `placeholders.backward + size(range) + placeholders.forward == sizes().total_size()`.
#[derive(Clone, Debug)]
pub struct WindowRangeCalculator {
    options: WindowOptions,
    sizes: ItemSizeTracker,
    triggers: TriggerObserverState,
    range: WindowRange,
    placeholders: Placeholders,
    scroll_position: u64,
    viewport_size: u32,
    content_size: u64,
    missing_given_sizes: Vec<usize>,
}

impl WindowRangeCalculator {
    pub fn new(options: WindowOptions) -> Self {
        let options = options.sanitized();
        vdebug!(
            page_size = options.page_size,
            segment_size = options.segment_size(),
            viewport = options.viewport_height,
            "WindowRangeCalculator::new"
        );
        Self {
            sizes: ItemSizeTracker::new(0, options.estimated_item_size),
            triggers: TriggerObserverState::new(
                options.viewport_height,
                options.backward_trigger_coefficient,
                options.forward_trigger_coefficient,
            ),
            range: WindowRange::EMPTY,
            placeholders: Placeholders::default(),
            scroll_position: 0,
            viewport_size: options.viewport_height,
            content_size: 0,
            missing_given_sizes: Vec::new(),
            options,
        }
    }

    pub fn options(&self) -> &WindowOptions {
        &self.options
    }

    pub fn sizes(&self) -> &ItemSizeTracker {
        &self.sizes
    }

    pub fn triggers(&self) -> &TriggerObserverState {
        &self.triggers
    }

    pub fn trigger_offsets(&self) -> TriggerOffsets {
        self.triggers.offsets()
    }

    pub fn range(&self) -> WindowRange {
        self.range
    }

    pub fn placeholders(&self) -> Placeholders {
        self.placeholders
    }

    pub fn total_count(&self) -> usize {
        self.sizes.len()
    }

    pub fn total_size(&self) -> u64 {
        self.sizes.total_size()
    }

    pub fn scroll_position(&self) -> u64 {
        self.scroll_position
    }

    pub fn viewport_size(&self) -> u32 {
        self.viewport_size
    }

    pub fn content_size(&self) -> u64 {
        self.content_size
    }

    /// Indexes whose declared size was missing at the last reset/add.
    pub fn missing_given_sizes(&self) -> &[usize] {
        &self.missing_given_sizes
    }

    pub fn items_out_of_range(&self) -> ItemsOutOfRange {
        ItemsOutOfRange {
            backward: self.range.start_index > 0,
            forward: self.range.end_index < self.total_count(),
        }
    }

    pub fn max_scroll_position(&self) -> u64 {
        self.total_size()
            .max(self.content_size)
            .saturating_sub(self.viewport_size as u64)
    }

    pub fn snapshot(&self) -> WindowSnapshot {
        WindowSnapshot {
            range: self.range,
            placeholders: self.placeholders,
            scroll_position: self.scroll_position,
            viewport_size: self.viewport_size,
            content_size: self.content_size,
            total_count: self.total_count(),
        }
    }

    /// Restores geometry and range from a snapshot taken over the same collection.
    ///
    /// The range is clamped to the current collection; a snapshot of a different collection
    /// length falls back to the range at the snapshot's scroll position.
    pub fn restore_snapshot(&mut self, snapshot: WindowSnapshot) -> CalculatorResult {
        let before = self.before();
        self.viewport_size = snapshot.viewport_size;
        self.triggers.set_viewport(snapshot.viewport_size);
        self.content_size = snapshot.content_size;
        self.scroll_position = snapshot.scroll_position;
        self.triggers.reset_visibility();
        let total = self.total_count();
        self.range = if snapshot.total_count == total && snapshot.range.end_index <= total {
            snapshot.range
        } else {
            self.range_by_scroll_position(snapshot.scroll_position)
        };
        self.finish(before, None, None)
    }

    /// Reinitializes the collection.
    ///
    /// With `keep_scroll_position`, the current scroll position is reinterpreted against the new
    /// collection; otherwise the range starts at index 0 and the scroll position is reset.
    ///
    /// `given_sizes`, when present, holds a priori sizes for the new items (index 0 onward).
    pub fn reset_items(
        &mut self,
        total: usize,
        keep_scroll_position: bool,
        given_sizes: Option<&[Option<u32>]>,
    ) -> CalculatorResult {
        let before = self.before();
        self.sizes.reset(total);
        self.missing_given_sizes.clear();
        if let Some(given) = given_sizes {
            self.missing_given_sizes = self.sizes.set_given_sizes(0, given);
        }
        self.triggers.reset_visibility();

        self.range = if total == 0 {
            WindowRange::EMPTY
        } else if keep_scroll_position {
            self.range_by_scroll_position(self.scroll_position)
        } else {
            self.scroll_position = 0;
            self.range_from_start(0)
        };
        vdebug!(
            total,
            keep_scroll_position,
            start = self.range.start_index,
            end = self.range.end_index,
            "reset_items"
        );
        self.finish(before, None, None)
    }

    /// Scroll input. Jumps when the viewport left the materialized block, otherwise shifts by a
    /// segment toward a trigger that just became visible.
    pub fn scroll_position_change(&mut self, scroll_position: u64) -> CalculatorResult {
        self.scroll_position = scroll_position;
        let before = self.before();
        if self.total_count() == 0 || self.options.page_size == 0 {
            return self.finish(before, None, None);
        }

        if self.viewport_outside_range() {
            let next = self.range_by_scroll_position(scroll_position);
            let direction = if next.start_index < self.range.start_index {
                ScrollDirection::Backward
            } else {
                ScrollDirection::Forward
            };
            vtrace!(
                scroll_position,
                start = next.start_index,
                end = next.end_index,
                "jump to scroll position"
            );
            self.detach(next);
            self.range = next;
            self.triggers.reset_visibility();
            return self.finish(before, Some(direction), None);
        }

        self.check_triggers(before, false)
    }

    pub fn viewport_resized(&mut self, viewport_size: u32) -> CalculatorResult {
        let before = self.before();
        if viewport_size == self.viewport_size {
            return self.finish(before, None, None);
        }
        self.viewport_size = viewport_size;
        self.triggers.set_viewport(viewport_size);
        self.check_triggers(before, false)
    }

    pub fn content_resized(&mut self, content_size: u64) -> CalculatorResult {
        let before = self.before();
        if content_size == self.content_size {
            return self.finish(before, None, None);
        }
        self.content_size = content_size;
        self.check_triggers(before, false)
    }

    /// Re-evaluates trigger visibility, shifting for any trigger that is visible now.
    ///
    /// Run this once the UI has committed a render: a trigger that stayed visible across a
    /// shift never reports a new intersection.
    pub fn check_triggers_visibility(&mut self) -> CalculatorResult {
        let before = self.before();
        self.check_triggers(before, true)
    }

    /// Visibility reported by the UI's own intersection observer.
    pub fn set_trigger_visible(
        &mut self,
        direction: ScrollDirection,
        visible: bool,
    ) -> CalculatorResult {
        let before = self.before();
        if !self.triggers.set_visible(direction, visible) {
            return self.finish(before, None, None);
        }
        self.shift_or_request(before, direction)
    }

    pub fn set_trigger_offset_mode(&mut self, direction: ScrollDirection, mode: TriggerOffsetMode) {
        self.triggers.set_offset_mode(direction, mode, self.viewport_size);
    }

    /// Grows the range by one segment toward `direction`, hiding items far on the other side.
    pub fn shift_range_to_direction(&mut self, direction: ScrollDirection) -> CalculatorResult {
        let before = self.before();
        let next = self.shifted_range(direction);
        self.detach(next);
        self.range = next;
        self.finish(before, Some(direction), None)
    }

    /// Makes sure `index` is materialized. No-op if it already is.
    pub fn shift_range_to_index(&mut self, index: usize) -> CalculatorResult {
        let before = self.before();
        let total = self.total_count();
        if total == 0 || self.range.contains(index) {
            return self.finish(before, None, None);
        }
        let index = index.min(total - 1);
        let next = self.range_from_start(index);
        let direction = if index < self.range.start_index {
            ScrollDirection::Backward
        } else {
            ScrollDirection::Forward
        };
        self.detach(next);
        self.range = next;
        self.finish(before, Some(direction), None)
    }

    /// Records measurements of rendered items.
    pub fn apply_measurements(
        &mut self,
        measurements: impl IntoIterator<Item = (usize, u32)>,
    ) -> CalculatorResult {
        let before = self.before();
        for (index, size) in measurements {
            self.sizes.set_size(index, size);
        }
        self.finish(before, None, None)
    }

    pub fn add_items(
        &mut self,
        index: usize,
        count: usize,
        given_sizes: Option<&[Option<u32>]>,
    ) -> Result<CalculatorResult, WindowError> {
        let old_total = self.total_count();
        CollectionChange::Add { index, count }.validate(old_total)?;
        let before = self.before();
        self.sizes.insert(index, count);
        if let Some(given) = given_sizes {
            self.missing_given_sizes = self.sizes.set_given_sizes(index, given);
        }
        let total = self.total_count();
        let page = self.options.page_size;

        let WindowRange {
            mut start_index,
            mut end_index,
        } = self.range;
        if count == 0 {
            // Nothing to shift.
        } else if page == 0 {
            start_index = 0;
            end_index = total;
        } else if old_total == 0 {
            let next = self.range_from_start(0);
            start_index = next.start_index;
            end_index = next.end_index;
        } else if index < start_index {
            start_index += count;
            end_index += count;
        } else if index < end_index {
            end_index += count;
        } else if index == end_index && end_index == old_total {
            let len = end_index - start_index;
            let grow = count
                .min(self.options.segment_size())
                .max(page.saturating_sub(len));
            end_index = (end_index + grow).min(total);
        }
        self.range = WindowRange::new(start_index, end_index);
        vtrace!(index, count, start_index, end_index, "add_items");
        Ok(self.finish(before, None, None))
    }

    pub fn remove_items(
        &mut self,
        index: usize,
        count: usize,
    ) -> Result<CalculatorResult, WindowError> {
        CollectionChange::Remove { index, count }.validate(self.total_count())?;
        let before = self.before();
        self.sizes.remove(index, count);
        let total = self.total_count();

        let WindowRange {
            mut start_index,
            mut end_index,
        } = self.range;
        let removed_end = index + count;
        let before_range = removed_end.min(start_index).saturating_sub(index);
        let inside_range = removed_end
            .min(end_index)
            .saturating_sub(index.max(start_index));
        start_index -= before_range;
        end_index -= before_range + inside_range;

        let page = self.options.page_size;
        if total == 0 {
            start_index = 0;
            end_index = 0;
        } else if page == 0 {
            start_index = 0;
            end_index = total;
        } else if end_index - start_index < page {
            end_index = (start_index + page).min(total);
            if end_index - start_index < page {
                start_index = end_index.saturating_sub(page);
            }
        }
        self.range = WindowRange::new(start_index, end_index);
        vtrace!(index, count, start_index, end_index, "remove_items");
        Ok(self.finish(before, None, None))
    }

    /// Moves `count` items from `from` so the first lands at `to` (index after the move).
    ///
    /// Measurements travel with their items; the range keeps its bounds.
    pub fn move_items(
        &mut self,
        from: usize,
        count: usize,
        to: usize,
    ) -> Result<CalculatorResult, WindowError> {
        CollectionChange::Move { from, count, to }.validate(self.total_count())?;
        let before = self.before();
        self.sizes.move_items(from, count, to);
        Ok(self.finish(before, None, None))
    }

    /// First item in the range whose top border is at or below the scroll position.
    pub fn first_visible_index(&self) -> Option<usize> {
        if self.range.is_empty() {
            return None;
        }
        let scroll = self.scroll_position;
        let mut index = self.sizes.index_at_offset(scroll)?;
        if self.sizes.offset(index) < scroll {
            index += 1;
        }
        Some(index.clamp(self.range.start_index, self.range.end_index - 1))
    }

    /// The item under an "index line" that slides from 15% to 85% of the viewport as the list
    /// scrolls from top to bottom.
    pub fn active_element_index(&self) -> Option<usize> {
        let total = self.total_count();
        if total == 0 || self.range.is_empty() {
            return None;
        }
        let viewport = self.viewport_size as u64;
        let total_size = self.total_size();
        let scroll = self.scroll_position.min(self.max_scroll_position());

        if self.range.start_index == 0 && scroll == 0 {
            return Some(self.range.start_index);
        }
        if self.range.end_index == total && scroll + viewport >= total_size {
            return Some(self.range.end_index - 1);
        }

        let scrollable = total_size.saturating_sub(viewport);
        let ratio = if scrollable == 0 {
            0.0
        } else {
            scroll as f64 / scrollable as f64
        };
        let ratio = ratio.clamp(MIN_INDEX_LINE_RATIO, MAX_INDEX_LINE_RATIO);
        let line = scroll + (viewport as f64 * ratio) as u64;

        if self.sizes.offset(self.range.start_index) >= line {
            return None;
        }
        let index = self.sizes.index_at_offset(line.saturating_sub(1))?;
        Some(index.clamp(self.range.start_index, self.range.end_index - 1))
    }

    /// The scroll position that brings `index` into view with the given alignment.
    pub fn scroll_offset_for_index(&self, index: usize, align: Align) -> u64 {
        let total = self.total_count();
        if total == 0 {
            return 0;
        }
        let Some(item) = self.sizes.item(index.min(total - 1)) else {
            return 0;
        };
        let view = self.viewport_size as u64;

        let target = match align {
            Align::Start => item.offset,
            Align::End => item.end().saturating_sub(view),
            Align::Center => {
                let center = item.offset.saturating_add(item.size as u64 / 2);
                center.saturating_sub(view / 2)
            }
            Align::Auto => {
                let cur = self.scroll_position;
                let cur_end = cur.saturating_add(view);
                if item.offset >= cur && item.end() <= cur_end {
                    cur
                } else if item.offset < cur {
                    item.offset
                } else {
                    item.end().saturating_sub(view)
                }
            }
        };

        target.min(self.max_scroll_position())
    }

    fn before(&self) -> Before {
        Before {
            range: self.range,
            placeholders: self.placeholders,
            items_out_of_range: self.items_out_of_range(),
        }
    }

    fn finish(
        &mut self,
        before: Before,
        shift_direction: Option<ScrollDirection>,
        more_data_needed: Option<ScrollDirection>,
    ) -> CalculatorResult {
        let total = self.total_count();
        debug_assert!(self.range.start_index <= self.range.end_index);
        debug_assert!(self.range.end_index <= total, "range exceeds collection");

        self.placeholders = if total == 0 {
            Placeholders::default()
        } else {
            Placeholders {
                backward: self.sizes.offset(self.range.start_index),
                forward: self.total_size() - self.sizes.offset(self.range.end_index),
            }
        };

        CalculatorResult {
            range: self.range,
            old_range: before.range,
            placeholders: self.placeholders,
            old_placeholders: before.placeholders,
            items_out_of_range: self.items_out_of_range(),
            old_items_out_of_range: before.items_out_of_range,
            shift_direction: shift_direction.filter(|_| self.range != before.range),
            more_data_needed,
        }
    }

    /// In `Remove` mode, items leaving the range lose the validity of their measurement.
    fn detach(&mut self, next: WindowRange) {
        if self.options.mode != VisibilityMode::Remove {
            return;
        }
        let old = self.range;
        let head_end = old.end_index.min(next.start_index);
        if old.start_index < head_end {
            self.sizes.invalidate(WindowRange::new(old.start_index, head_end));
        }
        let tail_start = old.start_index.max(next.end_index);
        if tail_start < old.end_index {
            self.sizes.invalidate(WindowRange::new(tail_start, old.end_index));
        }
    }

    fn viewport_outside_range(&self) -> bool {
        if self.range.is_empty() {
            return true;
        }
        let block_start = self.sizes.offset(self.range.start_index);
        let block_end = self.sizes.offset(self.range.end_index);
        let top = self.scroll_position;
        let bottom = top.saturating_add(self.viewport_size as u64);
        (bottom <= block_start && block_start > 0)
            || (top >= block_end && block_end < self.total_size())
    }

    fn check_triggers(&mut self, before: Before, force: bool) -> CalculatorResult {
        // A viewport away from the block is handled by the next scroll jump, not by triggers.
        if self.total_count() == 0 || self.viewport_outside_range() {
            return self.finish(before, None, None);
        }
        let (backward, forward) = self.triggers.visibility_for(
            self.scroll_position,
            self.viewport_size,
            self.sizes.offset(self.range.start_index),
            self.sizes.offset(self.range.end_index),
        );
        let forward_appeared = self.triggers.set_visible(ScrollDirection::Forward, forward);
        let backward_appeared = self.triggers.set_visible(ScrollDirection::Backward, backward);

        if forward && (forward_appeared || force) {
            return self.shift_or_request(before, ScrollDirection::Forward);
        }
        if backward && (backward_appeared || force) {
            return self.shift_or_request(before, ScrollDirection::Backward);
        }
        self.finish(before, None, None)
    }

    fn shift_or_request(&mut self, before: Before, direction: ScrollDirection) -> CalculatorResult {
        if self.options.page_size == 0 || !self.items_out_of_range().get(direction) {
            vtrace!(?direction, "trigger at the collection edge");
            return self.finish(before, None, Some(direction));
        }
        let next = self.shifted_range(direction);
        self.detach(next);
        self.range = next;
        self.finish(before, Some(direction), None)
    }

    fn page_size_from(&self, start: usize) -> usize {
        let page = self.options.page_size;
        if page == 0 || self.viewport_size == 0 || !self.sizes.is_all_given() {
            return page;
        }
        let limit = (self.viewport_size as f32 * self.options.page_multiplier) as u64;
        let target = self.sizes.offset(start).saturating_add(limit);
        let total = self.total_count();
        let fit = if target >= self.total_size() {
            total - start.min(total)
        } else {
            self.sizes
                .index_at_offset(target)
                .map_or(0, |end| end.saturating_sub(start))
        };
        fit.max(1)
    }

    fn range_from_start(&self, start: usize) -> WindowRange {
        let total = self.total_count();
        let page = self.page_size_from(start);
        if page == 0 || page >= total {
            return WindowRange::new(0, total);
        }
        let start = start.min(total);
        let end = start + page;
        if end >= total {
            WindowRange::new(total - page, total)
        } else {
            WindowRange::new(start, end)
        }
    }

    fn range_by_scroll_position(&self, scroll_position: u64) -> WindowRange {
        let total = self.total_count();
        if total == 0 {
            return WindowRange::EMPTY;
        }
        // The block must hold the viewport plus both trigger zones, or the first render after
        // the jump would see a trigger and shift again.
        let offsets = self.triggers.offsets();
        let top = scroll_position
            .saturating_sub(offsets.backward)
            .saturating_sub(1);
        let bottom = scroll_position
            .saturating_add(self.viewport_size as u64)
            .saturating_add(offsets.forward);
        let first = self.sizes.index_at_offset(top).unwrap_or(0);
        let last = self.sizes.index_at_offset(bottom).unwrap_or(first).max(first);
        let page = self.page_size_from(first);
        if page == 0 || page >= total {
            return WindowRange::new(0, total);
        }
        let needed = last + 1 - first;
        let start = if needed > page {
            // Too small a page for that: keep the viewport top covered.
            self.sizes.index_at_offset(scroll_position).unwrap_or(first)
        } else {
            first.saturating_sub((page - needed) / 2)
        };
        let end = (start + page).min(total);
        WindowRange::new(end.saturating_sub(page), end)
    }

    fn shifted_range(&self, direction: ScrollDirection) -> WindowRange {
        let total = self.total_count();
        let page = self.page_size_from(self.range.start_index);
        if page == 0 {
            return WindowRange::new(0, total);
        }
        let WindowRange {
            mut start_index,
            mut end_index,
        } = self.range;
        let fill = page.saturating_sub(end_index - start_index);
        let step = self.options.segment_size().max(fill);
        let hide = self.segment_size_to_hide(direction);

        match direction {
            ScrollDirection::Backward => {
                start_index = start_index.saturating_sub(step);
                end_index = (end_index - hide).max((start_index + page).min(total));
            }
            ScrollDirection::Forward => {
                end_index = (end_index + step).min(total);
                if end_index < page && end_index < total {
                    end_index = page.min(total);
                }
                start_index = (start_index + hide).min(end_index.saturating_sub(page));
            }
        }
        WindowRange::new(start_index, end_index)
    }

    /// How many items on the side opposite to `direction` are far enough from the viewport to be
    /// dropped without the trigger on that side becoming visible.
    fn segment_size_to_hide(&self, direction: ScrollDirection) -> usize {
        let WindowRange {
            start_index,
            end_index,
        } = self.range;
        let len = end_index - start_index;
        let offsets = self.triggers.offsets().sum();
        let mut hide = 0usize;
        match direction {
            ScrollDirection::Forward => {
                let limit = self.scroll_position.saturating_sub(offsets);
                while hide < len && self.sizes.offset(start_index + hide + 1) < limit {
                    hide += 1;
                }
            }
            ScrollDirection::Backward => {
                let limit = self
                    .scroll_position
                    .saturating_add(self.viewport_size as u64)
                    .saturating_add(offsets);
                while hide < len && self.sizes.offset(end_index - hide - 1) > limit {
                    hide += 1;
                }
            }
        }
        hide
    }
}
