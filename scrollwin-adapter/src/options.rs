use alloc::sync::Arc;

use scrollwin::{Align, ItemsOutOfRange, Placeholders, ScrollDirection, WindowOptions, WindowRange};

use crate::{
    IndicatorCallback, IndicatorDirection, IndicatorOptions, IndicatorState, ScrollCompleter,
};

pub type RangeChangedCallback = Arc<dyn Fn(WindowRange) + Send + Sync>;
pub type PlaceholdersChangedCallback = Arc<dyn Fn(Placeholders) + Send + Sync>;

/// Asks the UI to set its scroll position to the given value.
pub type ScrollCorrectionCallback = Arc<dyn Fn(u64) + Send + Sync>;

/// Asks the UI to bring an item into view. The UI must call
/// [`ScrollCompleter::complete`] once it has scrolled.
pub type ScrollToElementCallback<K> =
    Arc<dyn Fn(&K, Align, bool, ScrollCompleter) + Send + Sync>;

pub type MoreDataNeededCallback = Arc<dyn Fn(ScrollDirection) + Send + Sync>;
pub type ItemsOutOfRangeCallback = Arc<dyn Fn(ItemsOutOfRange) + Send + Sync>;
pub type ActiveElementCallback = Arc<dyn Fn(usize) + Send + Sync>;

/// Declared (a priori) size of the item at an index, if the source knows it.
pub type ItemSizeProvider = Arc<dyn Fn(usize) -> Option<u32> + Send + Sync>;

/// Configuration for [`crate::ScrollWindowController`].
pub struct ControllerOptions<K> {
    pub window: WindowOptions,
    pub indicators: IndicatorOptions,
    /// Minimum interval between two processed scroll events. The last position inside an
    /// interval is applied by [`crate::ScrollWindowController::tick`].
    pub scroll_throttle_ms: u64,
    pub item_size: Option<ItemSizeProvider>,

    pub on_range_changed: Option<RangeChangedCallback>,
    pub on_placeholders_changed: Option<PlaceholdersChangedCallback>,
    pub on_scroll_correction_requested: Option<ScrollCorrectionCallback>,
    pub on_scroll_to_element_requested: Option<ScrollToElementCallback<K>>,
    pub on_indicator_state_changed: Option<IndicatorCallback>,
    pub on_more_data_needed: Option<MoreDataNeededCallback>,
    pub on_items_out_of_range_changed: Option<ItemsOutOfRangeCallback>,
    pub on_active_element_changed: Option<ActiveElementCallback>,
}

impl<K> ControllerOptions<K> {
    pub fn new(window: WindowOptions) -> Self {
        Self {
            window,
            indicators: IndicatorOptions::default(),
            scroll_throttle_ms: 150,
            item_size: None,
            on_range_changed: None,
            on_placeholders_changed: None,
            on_scroll_correction_requested: None,
            on_scroll_to_element_requested: None,
            on_indicator_state_changed: None,
            on_more_data_needed: None,
            on_items_out_of_range_changed: None,
            on_active_element_changed: None,
        }
    }

    pub fn with_indicators(mut self, indicators: IndicatorOptions) -> Self {
        self.indicators = indicators;
        self
    }

    pub fn with_scroll_throttle_ms(mut self, scroll_throttle_ms: u64) -> Self {
        self.scroll_throttle_ms = scroll_throttle_ms;
        self
    }

    pub fn with_item_size(
        mut self,
        item_size: Option<impl Fn(usize) -> Option<u32> + Send + Sync + 'static>,
    ) -> Self {
        self.item_size = item_size.map(|f| Arc::new(f) as _);
        self
    }

    pub fn with_on_range_changed(
        mut self,
        f: Option<impl Fn(WindowRange) + Send + Sync + 'static>,
    ) -> Self {
        self.on_range_changed = f.map(|f| Arc::new(f) as _);
        self
    }

    pub fn with_on_placeholders_changed(
        mut self,
        f: Option<impl Fn(Placeholders) + Send + Sync + 'static>,
    ) -> Self {
        self.on_placeholders_changed = f.map(|f| Arc::new(f) as _);
        self
    }

    pub fn with_on_scroll_correction_requested(
        mut self,
        f: Option<impl Fn(u64) + Send + Sync + 'static>,
    ) -> Self {
        self.on_scroll_correction_requested = f.map(|f| Arc::new(f) as _);
        self
    }

    pub fn with_on_scroll_to_element_requested(
        mut self,
        f: Option<impl Fn(&K, Align, bool, ScrollCompleter) + Send + Sync + 'static>,
    ) -> Self {
        self.on_scroll_to_element_requested = f.map(|f| Arc::new(f) as _);
        self
    }

    pub fn with_on_indicator_state_changed(
        mut self,
        f: Option<impl Fn(IndicatorDirection, IndicatorState) + Send + Sync + 'static>,
    ) -> Self {
        self.on_indicator_state_changed = f.map(|f| Arc::new(f) as _);
        self
    }

    pub fn with_on_more_data_needed(
        mut self,
        f: Option<impl Fn(ScrollDirection) + Send + Sync + 'static>,
    ) -> Self {
        self.on_more_data_needed = f.map(|f| Arc::new(f) as _);
        self
    }

    pub fn with_on_items_out_of_range_changed(
        mut self,
        f: Option<impl Fn(ItemsOutOfRange) + Send + Sync + 'static>,
    ) -> Self {
        self.on_items_out_of_range_changed = f.map(|f| Arc::new(f) as _);
        self
    }

    pub fn with_on_active_element_changed(
        mut self,
        f: Option<impl Fn(usize) + Send + Sync + 'static>,
    ) -> Self {
        self.on_active_element_changed = f.map(|f| Arc::new(f) as _);
        self
    }
}

impl<K> Clone for ControllerOptions<K> {
    fn clone(&self) -> Self {
        Self {
            window: self.window,
            indicators: self.indicators,
            scroll_throttle_ms: self.scroll_throttle_ms,
            item_size: self.item_size.clone(),
            on_range_changed: self.on_range_changed.clone(),
            on_placeholders_changed: self.on_placeholders_changed.clone(),
            on_scroll_correction_requested: self.on_scroll_correction_requested.clone(),
            on_scroll_to_element_requested: self.on_scroll_to_element_requested.clone(),
            on_indicator_state_changed: self.on_indicator_state_changed.clone(),
            on_more_data_needed: self.on_more_data_needed.clone(),
            on_items_out_of_range_changed: self.on_items_out_of_range_changed.clone(),
            on_active_element_changed: self.on_active_element_changed.clone(),
        }
    }
}

impl<K> core::fmt::Debug for ControllerOptions<K> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ControllerOptions")
            .field("window", &self.window)
            .field("indicators", &self.indicators)
            .field("scroll_throttle_ms", &self.scroll_throttle_ms)
            .field("item_size", &self.item_size.is_some())
            .finish_non_exhaustive()
    }
}
