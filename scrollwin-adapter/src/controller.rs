use alloc::vec::Vec;

use scrollwin::{
    Align, CalculatorResult, CollectionChange, EdgeItem, ItemsOutOfRange, Placeholders,
    ScrollDirection, TriggerOffsetMode, WindowError, WindowRange, WindowRangeCalculator,
    WindowSnapshot,
};

use crate::anchor::{capture_edge_item, remap_edge_item, restore_position};
use crate::completion::completion_pair;
use crate::scheduled::ScrollSchedule;
use crate::{
    ControllerOptions, IndicatorStateMachine, ScheduledScroll, ScrollAnchorEngine,
    ScrollCompleter, ScrollCompletion, ScrollOutcome, WindowKey,
};

#[derive(Clone, Copy, Debug, Default)]
struct ScrollThrottle {
    last_applied_ms: Option<u64>,
    pending: Option<u64>,
}

/// A framework-neutral controller that wires the window calculation, scroll anchoring, deferred
/// scroll requests and loading indicators together.
///
/// This type does not hold any UI objects. Adapters drive it by calling:
/// - `reset_items` / `add_items` / `remove_items` / `move_items` on collection changes
/// - `scroll_position_change`, `viewport_resized`, `content_resized` when UI events occur
/// - `before_render` right before rendering and `render_committed` right after it, with the
///   measured sizes of the rendered items
/// - `tick(now_ms)` on a timer (throttled scroll events, indicator delays)
///
/// Results come back through the callbacks in [`ControllerOptions`]. After
/// [`ScrollWindowController::destroy`] every operation is a no-op.
#[derive(Debug)]
pub struct ScrollWindowController<K> {
    options: ControllerOptions<K>,
    calc: WindowRangeCalculator,
    anchor: ScrollAnchorEngine,
    schedule: ScrollSchedule<K>,
    indicators: IndicatorStateMachine,
    throttle: ScrollThrottle,
    active_element: Option<usize>,
    /// Latest clock value seen by a timed operation.
    now_ms: u64,
    destroyed: bool,
}

impl<K: WindowKey> ScrollWindowController<K> {
    pub fn new(options: ControllerOptions<K>) -> Self {
        let indicators = IndicatorStateMachine::new(
            options.indicators,
            options.on_indicator_state_changed.clone(),
        );
        Self {
            calc: WindowRangeCalculator::new(options.window),
            anchor: ScrollAnchorEngine::new(),
            schedule: ScrollSchedule::default(),
            indicators,
            throttle: ScrollThrottle::default(),
            active_element: None,
            now_ms: 0,
            destroyed: false,
            options,
        }
    }

    pub fn options(&self) -> &ControllerOptions<K> {
        &self.options
    }

    pub fn calculator(&self) -> &WindowRangeCalculator {
        &self.calc
    }

    pub fn range(&self) -> WindowRange {
        self.calc.range()
    }

    pub fn placeholders(&self) -> Placeholders {
        self.calc.placeholders()
    }

    pub fn scroll_position(&self) -> u64 {
        self.calc.scroll_position()
    }

    pub fn items_out_of_range(&self) -> ItemsOutOfRange {
        self.calc.items_out_of_range()
    }

    pub fn scheduled_scroll(&self) -> Option<&ScheduledScroll<K>> {
        self.schedule.pending()
    }

    pub fn indicators(&self) -> &IndicatorStateMachine {
        &self.indicators
    }

    /// Feeds the indicator state machine (has-more flags, loaded data, searches).
    pub fn indicators_mut(&mut self) -> &mut IndicatorStateMachine {
        &mut self.indicators
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    pub fn snapshot(&self) -> WindowSnapshot {
        self.calc.snapshot()
    }

    pub fn restore_snapshot(&mut self, snapshot: WindowSnapshot) {
        if self.destroyed {
            return;
        }
        let result = self.calc.restore_snapshot(snapshot);
        self.apply_result(result);
    }

    /// `true` if the item has no valid measurement and should be measured after rendering.
    pub fn needs_measure(&self, index: usize) -> bool {
        self.calc.sizes().needs_measure(index)
    }

    pub fn first_visible_index(&self) -> Option<usize> {
        self.calc.first_visible_index()
    }

    pub fn active_element_index(&self) -> Option<usize> {
        self.calc.active_element_index()
    }

    /// Replaces the collection with `total` items.
    ///
    /// Pending scrolls are dropped. Without `keep_scroll_position`, the UI is asked to scroll
    /// back to the top after the next render.
    pub fn reset_items(&mut self, total: usize, keep_scroll_position: bool) {
        if self.destroyed {
            return;
        }
        let had_scroll = self.calc.scroll_position() != 0;
        let given = self.given_sizes(0, total);
        self.schedule.clear();
        self.anchor.clear();
        self.throttle.pending = None;

        let result = self
            .calc
            .reset_items(total, keep_scroll_position, given.as_deref());
        if !keep_scroll_position && had_scroll {
            self.schedule.schedule(ScheduledScroll::ApplyScrollPosition(0));
        }
        self.indicators.on_collection_reset(self.now_ms);
        self.apply_result(result);
    }

    /// Scroll input from the UI.
    ///
    /// The first event of a burst is processed at once; later events inside
    /// `scroll_throttle_ms` are coalesced and the last one is applied by [`Self::tick`].
    pub fn scroll_position_change(&mut self, position: u64, now_ms: u64) {
        if self.destroyed {
            return;
        }
        self.now_ms = now_ms;
        if let Some(last) = self.throttle.last_applied_ms {
            if now_ms.saturating_sub(last) < self.options.scroll_throttle_ms {
                self.throttle.pending = Some(position);
                return;
            }
        }
        self.apply_scroll(position, now_ms);
    }

    pub fn viewport_resized(&mut self, viewport_size: u32) {
        if self.destroyed {
            return;
        }
        let result = self.calc.viewport_resized(viewport_size);
        self.apply_result(result);
    }

    pub fn content_resized(&mut self, content_size: u64) {
        if self.destroyed {
            return;
        }
        let result = self.calc.content_resized(content_size);
        self.apply_result(result);
    }

    /// Trigger visibility reported by the UI's own intersection observer.
    pub fn set_trigger_visible(&mut self, direction: ScrollDirection, visible: bool) {
        if self.destroyed {
            return;
        }
        let result = self.calc.set_trigger_visible(direction, visible);
        self.apply_result(result);
    }

    pub fn set_trigger_offset_mode(&mut self, direction: ScrollDirection, mode: TriggerOffsetMode) {
        if self.destroyed {
            return;
        }
        self.calc.set_trigger_offset_mode(direction, mode);
    }

    /// Items were inserted at `index`. The item at the viewport edge keeps its on-screen position
    /// once the next render is committed.
    pub fn add_items(&mut self, index: usize, count: usize) -> Result<(), WindowError> {
        if self.destroyed {
            return Ok(());
        }
        let change = CollectionChange::Add { index, count };
        change.validate(self.calc.total_count())?;
        let edge = self.capture_for_change();
        let given = self.given_sizes(index, count);
        let result = self.calc.add_items(index, count, given.as_deref())?;
        self.after_change(change, edge);
        self.indicators.on_collection_add();
        self.apply_result(result);
        Ok(())
    }

    pub fn remove_items(&mut self, index: usize, count: usize) -> Result<(), WindowError> {
        if self.destroyed {
            return Ok(());
        }
        let change = CollectionChange::Remove { index, count };
        change.validate(self.calc.total_count())?;
        let edge = self.capture_for_change();
        let result = self.calc.remove_items(index, count)?;
        self.after_change(change, edge);
        self.apply_result(result);
        Ok(())
    }

    /// Moves `count` items from `from` so the first one ends up at `to`.
    pub fn move_items(&mut self, from: usize, count: usize, to: usize) -> Result<(), WindowError> {
        if self.destroyed {
            return Ok(());
        }
        let change = CollectionChange::Move { from, count, to };
        change.validate(self.calc.total_count())?;
        let edge = self.capture_for_change();
        let result = self.calc.move_items(from, count, to)?;
        self.after_change(change, edge);
        self.apply_result(result);
        Ok(())
    }

    /// Applies one event of the collection mutation feed. Events must arrive in emission order.
    pub fn apply_change(&mut self, change: CollectionChange) -> Result<(), WindowError> {
        match change {
            CollectionChange::Add { index, count } => self.add_items(index, count),
            CollectionChange::Remove { index, count } => self.remove_items(index, count),
            CollectionChange::Move { from, count, to } => self.move_items(from, count, to),
            CollectionChange::Reset { total } => {
                self.reset_items(total, false);
                Ok(())
            }
        }
    }

    /// Brings the item identified by `key` into view.
    ///
    /// If the item is already materialized the UI is asked right away. Otherwise the range moves
    /// to it first and the request goes out after the next committed render. The returned future
    /// resolves once the UI completed the request (see [`ScrollCompleter`]).
    pub fn scroll_to_item(
        &mut self,
        key: K,
        align: Align,
        force: bool,
        key_to_index: impl FnOnce(&K) -> Option<usize>,
    ) -> ScrollCompletion {
        if self.destroyed {
            return ScrollCompletion::resolved(ScrollOutcome::Cancelled);
        }
        let total = self.calc.total_count();
        let Some(index) = key_to_index(&key).filter(|&i| i < total) else {
            vwarn!(?key, "scroll_to_item: key is not in the collection");
            return ScrollCompletion::resolved(ScrollOutcome::NotFound);
        };

        let (completer, completion) = completion_pair();
        if self.calc.range().contains(index) {
            // Supersedes whatever was pending.
            self.schedule.clear();
            self.request_scroll_to_element(&key, index, align, force, completer);
            return completion;
        }

        let result = self.calc.shift_range_to_index(index);
        self.apply_result(result);
        self.schedule.schedule(ScheduledScroll::ScrollToElement {
            key,
            index,
            align,
            force,
            completer,
        });
        completion
    }

    /// Call right before the UI renders a new range: captures the edge item of the range that is
    /// still on screen so the scroll position can be restored after the render.
    pub fn before_render(&mut self) {
        if self.destroyed {
            return;
        }
        if let Some((direction, range)) = self.schedule.take_restore_params() {
            if let Some(edge) = capture_edge_item(&self.calc, direction, range) {
                self.schedule.schedule(ScheduledScroll::RestoreScroll(edge));
            }
        }
    }

    /// Call once the UI committed a render, with the measured sizes of rendered items.
    ///
    /// Runs the pending scheduled scroll (at most one correction or scroll request per render),
    /// then re-checks the load-more triggers and fires due indicator timers.
    pub fn render_committed(
        &mut self,
        measurements: impl IntoIterator<Item = (usize, u32)>,
        now_ms: u64,
    ) {
        if self.destroyed {
            return;
        }
        self.now_ms = now_ms;
        self.before_render();

        let result = self.calc.apply_measurements(measurements);
        self.apply_result(result);

        if let Some(scheduled) = self.schedule.take() {
            self.run_scheduled(scheduled);
        }

        let result = self.calc.check_triggers_visibility();
        self.apply_result(result);
        self.indicators.tick(now_ms);
    }

    /// Flushes a throttled scroll event and fires due indicator timers.
    pub fn tick(&mut self, now_ms: u64) {
        if self.destroyed {
            return;
        }
        self.now_ms = now_ms;
        if let Some(position) = self.throttle.pending {
            let due = self
                .throttle
                .last_applied_ms
                .is_none_or(|last| now_ms.saturating_sub(last) >= self.options.scroll_throttle_ms);
            if due {
                self.apply_scroll(position, now_ms);
            }
        }
        self.indicators.tick(now_ms);
    }

    /// The item at the viewport edge in `direction`, if the viewport overlaps the range.
    pub fn edge_visible_item(&self, direction: ScrollDirection) -> Option<EdgeItem> {
        self.anchor.capture(&self.calc, direction)
    }

    /// Remembers the item at the viewport top.
    pub fn save_scroll_position(&mut self) -> Option<EdgeItem> {
        if self.destroyed {
            return None;
        }
        self.anchor.save(&self.calc)
    }

    /// Schedules a restore of the position saved by [`Self::save_scroll_position`].
    pub fn restore_saved_scroll_position(&mut self) -> bool {
        if self.destroyed {
            return false;
        }
        let Some(edge) = self.anchor.take_saved() else {
            return false;
        };
        self.schedule.schedule(ScheduledScroll::RestoreScroll(edge));
        true
    }

    /// Anchor side for the next collection change (default: the viewport top).
    pub fn set_predicted_restore_direction(&mut self, direction: ScrollDirection) {
        if self.destroyed {
            return;
        }
        self.anchor.set_predicted_direction(direction);
    }

    /// Target scroll position for a page-up/page-down.
    ///
    /// Small edge items page by item: the item cut by the viewport edge becomes the first (or
    /// last) fully visible one. Otherwise the page is one viewport.
    pub fn page_scroll_target(&self, direction: ScrollDirection) -> u64 {
        let viewport = self.calc.viewport_size() as u64;
        let scroll = self.calc.scroll_position();
        let edge = self
            .anchor
            .capture(&self.calc, direction)
            .and_then(|edge| self.calc.sizes().item(edge.index))
            .filter(|item| (item.size as u64).saturating_mul(3) <= viewport);

        let target = match (direction, edge) {
            (ScrollDirection::Forward, Some(item)) => item.offset,
            (ScrollDirection::Backward, Some(item)) => item.end().saturating_sub(viewport),
            (ScrollDirection::Forward, None) => scroll.saturating_add(viewport),
            (ScrollDirection::Backward, None) => scroll.saturating_sub(viewport),
        };
        target.min(self.calc.max_scroll_position())
    }

    /// Cancels timers and pending scrolls. Every later call is a no-op.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        vdebug!("ScrollWindowController::destroy");
        self.destroyed = true;
        self.schedule.clear();
        self.anchor.clear();
        self.throttle = ScrollThrottle::default();
        self.indicators.destroy();
    }

    fn apply_scroll(&mut self, position: u64, now_ms: u64) {
        self.throttle.last_applied_ms = Some(now_ms);
        self.throttle.pending = None;
        let result = self.calc.scroll_position_change(position);
        self.apply_result(result);
    }

    fn given_sizes(&self, start: usize, count: usize) -> Option<Vec<Option<u32>>> {
        let provider = self.options.item_size.as_ref()?;
        Some((start..start + count).map(|i| provider(i)).collect())
    }

    fn capture_for_change(&mut self) -> Option<EdgeItem> {
        let direction = self.anchor.take_direction();
        self.anchor.capture(&self.calc, direction)
    }

    fn after_change(&mut self, change: CollectionChange, edge: Option<EdgeItem>) {
        let total = self.calc.total_count();
        self.schedule.remap(change, total);
        self.anchor.remap_saved(change, total);
        if let Some(edge) = edge.and_then(|edge| remap_edge_item(edge, change, total)) {
            self.schedule.schedule(ScheduledScroll::RestoreScroll(edge));
        }
    }

    fn run_scheduled(&mut self, scheduled: ScheduledScroll<K>) {
        match scheduled {
            ScheduledScroll::RestoreScroll(edge) => {
                if let Some(position) = restore_position(&self.calc, &edge) {
                    self.correct_scroll(position, false);
                }
            }
            // `before_render` turns these into a restore before the schedule runs.
            ScheduledScroll::CalculateRestoreScrollParams { .. } => {
                vwarn!("restore parameters reached the schedule unresolved");
            }
            ScheduledScroll::ScrollToElement {
                key,
                index,
                align,
                force,
                completer,
            } => self.request_scroll_to_element(&key, index, align, force, completer),
            // The UI may still sit at a position the calculator already dropped.
            ScheduledScroll::ApplyScrollPosition(position) => self.correct_scroll(position, true),
        }
    }

    fn request_scroll_to_element(
        &mut self,
        key: &K,
        index: usize,
        align: Align,
        force: bool,
        completer: ScrollCompleter,
    ) {
        if let Some(cb) = &self.options.on_scroll_to_element_requested {
            vtrace!(?key, ?align, force, "scroll to element requested");
            cb(key, align, force, completer);
            return;
        }
        if self.options.on_scroll_correction_requested.is_some() {
            let position = self.calc.scroll_offset_for_index(index, align);
            self.correct_scroll(position, force);
            completer.complete();
            return;
        }
        completer.resolve(ScrollOutcome::Cancelled);
    }

    /// Asks the UI to scroll to `position` and follows it. Without `force`, nothing happens if
    /// the scroll position is already there.
    fn correct_scroll(&mut self, position: u64, force: bool) {
        if !force && position == self.calc.scroll_position() {
            return;
        }
        let Some(cb) = self.options.on_scroll_correction_requested.clone() else {
            return;
        };
        vtrace!(from = self.calc.scroll_position(), to = position, "scroll correction");
        cb(position);
        let result = self.calc.scroll_position_change(position);
        self.apply_result(result);
    }

    fn apply_result(&mut self, result: CalculatorResult) {
        if result.range_changed() {
            vtrace!(
                start = result.range.start_index,
                end = result.range.end_index,
                "range changed"
            );
            if let Some(cb) = &self.options.on_range_changed {
                cb(result.range);
            }
        }
        if result.placeholders_changed() {
            if let Some(cb) = &self.options.on_placeholders_changed {
                cb(result.placeholders);
            }
        }
        if result.items_out_of_range_changed() {
            self.indicators.set_items_out_of_range(result.items_out_of_range);
            if let Some(cb) = &self.options.on_items_out_of_range_changed {
                cb(result.items_out_of_range);
            }
        }
        if let Some(direction) = result.shift_direction {
            self.schedule.schedule(ScheduledScroll::CalculateRestoreScrollParams {
                direction,
                range: result.old_range,
            });
        }
        if let Some(direction) = result.more_data_needed {
            if let Some(cb) = &self.options.on_more_data_needed {
                cb(direction);
            }
            self.indicators.start_loading(direction.into(), self.now_ms);
        }
        self.update_active_element();
    }

    fn update_active_element(&mut self) {
        let active = self.calc.active_element_index();
        if active == self.active_element {
            return;
        }
        self.active_element = active;
        if let (Some(index), Some(cb)) = (active, &self.options.on_active_element_changed) {
            cb(index);
        }
    }
}
