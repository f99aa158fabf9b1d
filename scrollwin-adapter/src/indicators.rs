use alloc::sync::Arc;
use core::fmt;

use scrollwin::{ItemsOutOfRange, ScrollDirection};

use crate::timer::Deadline;

/// Where an indicator is drawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum IndicatorDirection {
    Top,
    Bottom,
    Global,
}

impl IndicatorDirection {
    fn slot(self) -> usize {
        match self {
            Self::Top => 0,
            Self::Bottom => 1,
            Self::Global => 2,
        }
    }
}

impl From<ScrollDirection> for IndicatorDirection {
    fn from(direction: ScrollDirection) -> Self {
        match direction {
            ScrollDirection::Backward => Self::Top,
            ScrollDirection::Forward => Self::Bottom,
        }
    }
}

/// What an indicator currently shows.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum IndicatorState {
    #[default]
    None,
    Loading,
    PortionedSearchStarted,
    PortionedSearchStopped,
    PortionedSearchContinued,
    PortionedSearchAborted,
}

/// Progress of an iterative ("portioned") search.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SearchState {
    #[default]
    NotStarted,
    Started,
    Stopped,
    Continued,
    Aborted,
}

impl SearchState {
    fn is_running(self) -> bool {
        matches!(self, Self::Started | Self::Continued)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct IndicatorOptions {
    /// Delay before a loading or search indicator becomes visible.
    pub show_delay_ms: u64,
    /// How long a search may run before it stops and offers to continue.
    pub search_timeout_ms: u64,
    /// Same, after the user continued a stopped search.
    pub continued_search_timeout_ms: u64,
}

impl Default for IndicatorOptions {
    fn default() -> Self {
        Self {
            show_delay_ms: 2000,
            search_timeout_ms: 30_000,
            continued_search_timeout_ms: 30_000,
        }
    }
}

pub type IndicatorCallback = Arc<dyn Fn(IndicatorDirection, IndicatorState) + Send + Sync>;

/// Timed loading and portioned-search indicators.
///
/// Indicators appear only after [`IndicatorOptions::show_delay_ms`]; data that arrives sooner
/// cancels them before anything is shown. The callback fires only when a displayed state
/// actually changes.
///
/// Time comes from the caller: pass `now_ms` to the timed operations and call
/// [`IndicatorStateMachine::tick`] regularly.
pub struct IndicatorStateMachine {
    options: IndicatorOptions,
    on_change: Option<IndicatorCallback>,
    states: [IndicatorState; 3],
    has_more: ItemsOutOfRange,
    hidden_items: ItemsOutOfRange,
    iterative: bool,
    // Delayed shows, one per indicator slot.
    pending_show: [Option<IndicatorState>; 3],
    show_timers: [Deadline; 3],
    search: SearchState,
    search_direction: IndicatorDirection,
    search_timer: Deadline,
    destroyed: bool,
}

impl fmt::Debug for IndicatorStateMachine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IndicatorStateMachine")
            .field("options", &self.options)
            .field("states", &self.states)
            .field("has_more", &self.has_more)
            .field("hidden_items", &self.hidden_items)
            .field("iterative", &self.iterative)
            .field("pending_show", &self.pending_show)
            .field("search", &self.search)
            .field("search_direction", &self.search_direction)
            .field("destroyed", &self.destroyed)
            .finish_non_exhaustive()
    }
}

impl IndicatorStateMachine {
    pub fn new(options: IndicatorOptions, on_change: Option<IndicatorCallback>) -> Self {
        Self {
            options,
            on_change,
            states: [IndicatorState::None; 3],
            has_more: ItemsOutOfRange::default(),
            hidden_items: ItemsOutOfRange::default(),
            iterative: false,
            pending_show: [None; 3],
            show_timers: [Deadline::default(); 3],
            search: SearchState::NotStarted,
            search_direction: IndicatorDirection::Bottom,
            search_timer: Deadline::default(),
            destroyed: false,
        }
    }

    pub fn options(&self) -> &IndicatorOptions {
        &self.options
    }

    pub fn state(&self, direction: IndicatorDirection) -> IndicatorState {
        self.states[direction.slot()]
    }

    pub fn search_state(&self) -> SearchState {
        self.search
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Whether more data exists beyond the loaded collection, per direction.
    pub fn set_has_more(&mut self, backward: bool, forward: bool) {
        self.has_more = ItemsOutOfRange { backward, forward };
    }

    /// Iterative sources run a portioned search instead of a plain loading indicator.
    pub fn set_iterative(&mut self, iterative: bool) {
        self.iterative = iterative;
    }

    /// Items already loaded but hidden by virtualization. A direction with hidden items never
    /// shows a loading indicator.
    pub fn set_items_out_of_range(&mut self, hidden_items: ItemsOutOfRange) {
        self.hidden_items = hidden_items;
    }

    /// The UI started loading toward `direction` (`Top` or `Bottom`).
    pub fn start_loading(&mut self, direction: IndicatorDirection, now_ms: u64) {
        let Some(scroll) = edge_direction(direction) else {
            return;
        };
        if self.destroyed
            || self.search.is_running()
            || self.search == SearchState::Aborted
            || !self.has_more.get(scroll)
            || self.hidden_items.get(scroll)
            || self.state(direction) != IndicatorState::None
        {
            return;
        }
        if self.iterative {
            self.start_portioned_search(direction, now_ms);
            return;
        }
        self.arm_show(direction, IndicatorState::Loading, now_ms);
    }

    /// Data arrived from `direction`. `page_loaded` tells whether a full page came in.
    pub fn data_loaded(&mut self, direction: IndicatorDirection, page_loaded: bool, now_ms: u64) {
        if self.destroyed {
            return;
        }
        if !self.search.is_running() {
            self.cancel_show(direction);
        }
        if self.state(direction) == IndicatorState::Loading {
            self.set_state(direction, IndicatorState::None);
        }

        if self.search.is_running() && direction == self.search_direction {
            if page_loaded && self.search == SearchState::Started {
                self.stop_search();
            } else if self.show_timers[direction.slot()].is_armed() {
                // Progress: keep the search indicator from flashing up.
                self.show_timers[direction.slot()].start(now_ms, self.options.show_delay_ms);
            }
        }
    }

    pub fn show_global(&mut self, now_ms: u64) {
        if self.destroyed
            || self.search.is_running()
            || self.show_timers.iter().any(Deadline::is_armed)
            || self.state(IndicatorDirection::Global) != IndicatorState::None
        {
            return;
        }
        self.arm_show(IndicatorDirection::Global, IndicatorState::Loading, now_ms);
    }

    pub fn hide_global(&mut self) {
        if self.destroyed || self.search.is_running() {
            return;
        }
        self.cancel_show(IndicatorDirection::Global);
        self.set_state(IndicatorDirection::Global, IndicatorState::None);
    }

    /// Starts an iterative search toward `direction` (`Top` or `Bottom`).
    ///
    /// A loading indicator already on screen turns into the search indicator at once; otherwise
    /// the search indicator waits for the show delay.
    pub fn start_portioned_search(&mut self, direction: IndicatorDirection, now_ms: u64) {
        if self.destroyed
            || edge_direction(direction).is_none()
            || self.search.is_running()
            || self.search == SearchState::Aborted
        {
            return;
        }
        vdebug!(?direction, "portioned search started");
        self.search = SearchState::Started;
        self.search_direction = direction;
        self.search_timer.start(now_ms, self.options.search_timeout_ms);

        self.cancel_show(IndicatorDirection::Global);
        self.cancel_show(direction);
        self.set_state(IndicatorDirection::Global, IndicatorState::None);
        if self.state(direction) == IndicatorState::Loading {
            self.set_state(direction, IndicatorState::PortionedSearchStarted);
        } else {
            self.arm_show(direction, IndicatorState::PortionedSearchStarted, now_ms);
        }
    }

    /// Resumes a stopped search.
    pub fn continue_search(&mut self, now_ms: u64) {
        if self.destroyed || self.search != SearchState::Stopped {
            return;
        }
        self.search = SearchState::Continued;
        self.search_timer
            .start(now_ms, self.options.continued_search_timeout_ms);
        self.set_state(
            self.search_direction,
            IndicatorState::PortionedSearchContinued,
        );
    }

    /// Aborts the search. Terminal until the next collection reset.
    pub fn abort_search(&mut self) {
        if self.destroyed || matches!(self.search, SearchState::NotStarted | SearchState::Aborted)
        {
            return;
        }
        self.search = SearchState::Aborted;
        self.search_timer.clear();
        self.cancel_show(self.search_direction);
        self.set_state(self.search_direction, IndicatorState::PortionedSearchAborted);
    }

    /// The source is exhausted: the search ends and its indicator goes away.
    pub fn end_search(&mut self) {
        if self.destroyed || self.search == SearchState::NotStarted {
            return;
        }
        self.search = SearchState::NotStarted;
        self.search_timer.clear();
        self.cancel_show(self.search_direction);
        self.set_state(self.search_direction, IndicatorState::None);
    }

    /// Every indicator returns to `None`. An iterative source with more data restarts its
    /// search (forward first).
    pub fn on_collection_reset(&mut self, now_ms: u64) {
        if self.destroyed {
            return;
        }
        self.cancel_all_shows();
        self.search_timer.clear();
        self.search = SearchState::NotStarted;
        for direction in [
            IndicatorDirection::Top,
            IndicatorDirection::Bottom,
            IndicatorDirection::Global,
        ] {
            self.set_state(direction, IndicatorState::None);
        }

        if self.iterative {
            if self.has_more.forward {
                self.start_portioned_search(IndicatorDirection::Bottom, now_ms);
            } else if self.has_more.backward {
                self.start_portioned_search(IndicatorDirection::Top, now_ms);
            }
        }
    }

    /// Items were added. Loading indicators for exhausted directions go away.
    pub fn on_collection_add(&mut self) {
        if self.destroyed {
            return;
        }
        if !self.has_more.backward && !self.has_more.forward {
            self.hide_global();
        }
        for (direction, more) in [
            (IndicatorDirection::Top, self.has_more.backward),
            (IndicatorDirection::Bottom, self.has_more.forward),
        ] {
            if !more && self.state(direction) == IndicatorState::Loading {
                self.set_state(direction, IndicatorState::None);
            }
        }
    }

    /// Fires due timers.
    pub fn tick(&mut self, now_ms: u64) {
        if self.destroyed {
            return;
        }
        for direction in [
            IndicatorDirection::Top,
            IndicatorDirection::Bottom,
            IndicatorDirection::Global,
        ] {
            let slot = direction.slot();
            if self.show_timers[slot].fire(now_ms) {
                if let Some(state) = self.pending_show[slot].take() {
                    self.set_state(direction, state);
                }
            }
        }
        if self.search.is_running() && self.search_timer.fire(now_ms) {
            self.stop_search();
        }
    }

    /// Cancels every timer. Nothing is emitted afterwards.
    pub fn destroy(&mut self) {
        self.cancel_all_shows();
        self.search_timer.clear();
        self.destroyed = true;
    }

    fn stop_search(&mut self) {
        vdebug!(direction = ?self.search_direction, "portioned search stopped");
        self.search = SearchState::Stopped;
        self.search_timer.clear();
        self.cancel_show(self.search_direction);
        self.set_state(self.search_direction, IndicatorState::PortionedSearchStopped);
    }

    fn arm_show(&mut self, direction: IndicatorDirection, state: IndicatorState, now_ms: u64) {
        let slot = direction.slot();
        self.pending_show[slot] = Some(state);
        self.show_timers[slot].start(now_ms, self.options.show_delay_ms);
    }

    fn cancel_show(&mut self, direction: IndicatorDirection) {
        let slot = direction.slot();
        self.pending_show[slot] = None;
        self.show_timers[slot].clear();
    }

    fn cancel_all_shows(&mut self) {
        self.pending_show = [None; 3];
        self.show_timers = [Deadline::default(); 3];
    }

    fn set_state(&mut self, direction: IndicatorDirection, state: IndicatorState) {
        let slot = &mut self.states[direction.slot()];
        if *slot == state {
            return;
        }
        *slot = state;
        vtrace!(?direction, ?state, "indicator state changed");
        if let Some(cb) = &self.on_change {
            cb(direction, state);
        }
    }
}

fn edge_direction(direction: IndicatorDirection) -> Option<ScrollDirection> {
    match direction {
        IndicatorDirection::Top => Some(ScrollDirection::Backward),
        IndicatorDirection::Bottom => Some(ScrollDirection::Forward),
        IndicatorDirection::Global => None,
    }
}
