use crate::VisibilityMode;

/// Configuration for [`crate::WindowRangeCalculator`].
///
/// This is plain data: with `feature = "serde"` it can be loaded from any serde format.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct WindowOptions {
    /// Target number of materialized items. `0` disables virtualization.
    pub page_size: usize,

    /// Incremental grow step. Defaults to `page_size / 4` when unset.
    pub segment_size: Option<usize>,

    pub mode: VisibilityMode,

    /// Initially known viewport size in the scroll axis.
    pub viewport_height: u32,

    /// Size assumed for unknown items until at least one item is measured.
    pub estimated_item_size: u32,

    /// When every item size is given, the window covers `viewport × page_multiplier` pixels
    /// instead of `page_size` items.
    pub page_multiplier: f32,

    /// Load-more trigger offsets, as a fraction of the viewport size.
    pub backward_trigger_coefficient: f32,
    pub forward_trigger_coefficient: f32,
}

impl Default for WindowOptions {
    fn default() -> Self {
        Self {
            page_size: 100,
            segment_size: None,
            mode: VisibilityMode::Remove,
            viewport_height: 0,
            estimated_item_size: 0,
            page_multiplier: 3.0,
            backward_trigger_coefficient: 0.3,
            forward_trigger_coefficient: 0.3,
        }
    }
}

impl WindowOptions {
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size,
            ..Self::default()
        }
    }

    /// The effective segment size (never zero while virtualization is on).
    pub fn segment_size(&self) -> usize {
        self.segment_size
            .unwrap_or(self.page_size / 4)
            .max(usize::from(self.page_size > 0))
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_segment_size(mut self, segment_size: Option<usize>) -> Self {
        self.segment_size = segment_size;
        self
    }

    pub fn with_mode(mut self, mode: VisibilityMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_viewport_height(mut self, viewport_height: u32) -> Self {
        self.viewport_height = viewport_height;
        self
    }

    pub fn with_estimated_item_size(mut self, estimated_item_size: u32) -> Self {
        self.estimated_item_size = estimated_item_size;
        self
    }

    pub fn with_page_multiplier(mut self, page_multiplier: f32) -> Self {
        self.page_multiplier = page_multiplier;
        self
    }

    pub fn with_trigger_coefficients(mut self, backward: f32, forward: f32) -> Self {
        self.backward_trigger_coefficient = backward;
        self.forward_trigger_coefficient = forward;
        self
    }

    /// Replaces out-of-range values with defaults, logging each replacement.
    pub(crate) fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        if !(self.page_multiplier.is_finite() && self.page_multiplier > 0.0) {
            vwarn!(
                page_multiplier = self.page_multiplier,
                "invalid page_multiplier; using default"
            );
            self.page_multiplier = defaults.page_multiplier;
        }
        for coefficient in [
            &mut self.backward_trigger_coefficient,
            &mut self.forward_trigger_coefficient,
        ] {
            if !(coefficient.is_finite() && *coefficient >= 0.0) {
                vwarn!(coefficient = *coefficient, "invalid trigger coefficient; using default");
                *coefficient = defaults.backward_trigger_coefficient;
            }
        }
        if self.segment_size == Some(0) {
            vwarn!("segment_size of 0 would never grow the window; using page_size / 4");
            self.segment_size = None;
        }
        self
    }
}
