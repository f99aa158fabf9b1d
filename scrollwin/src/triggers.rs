use crate::ScrollDirection;

/// Where a load-more trigger sits relative to the range edge.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TriggerOffsetMode {
    /// `viewport × coefficient` inside the range, so loading starts before the edge is reached.
    #[default]
    Offset,
    /// Exactly at the range edge.
    Edge,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TriggerOffsets {
    pub backward: u64,
    pub forward: u64,
}

impl TriggerOffsets {
    pub fn get(&self, direction: ScrollDirection) -> u64 {
        match direction {
            ScrollDirection::Backward => self.backward,
            ScrollDirection::Forward => self.forward,
        }
    }

    pub fn sum(&self) -> u64 {
        self.backward.saturating_add(self.forward)
    }
}

#[derive(Clone, Copy, Debug, Default)]
struct Trigger {
    visible: bool,
    mode: TriggerOffsetMode,
    coefficient: f32,
    offset: u64,
}

impl Trigger {
    fn recompute(&mut self, viewport: u32) {
        self.offset = match self.mode {
            TriggerOffsetMode::Edge => 0,
            TriggerOffsetMode::Offset => (viewport as f32 * self.coefficient) as u64,
        };
    }
}

/// Bookkeeping for the two load-more sensors at the range edges.
///
/// The real intersection mechanics belong to the UI. This type only knows where the triggers
/// are, whether they were last seen visible, and can derive visibility from geometry when the
/// UI does not report it.
#[derive(Clone, Debug)]
pub struct TriggerObserverState {
    backward: Trigger,
    forward: Trigger,
}

impl TriggerObserverState {
    pub fn new(viewport: u32, backward_coefficient: f32, forward_coefficient: f32) -> Self {
        let mut state = Self {
            backward: Trigger {
                coefficient: backward_coefficient,
                ..Trigger::default()
            },
            forward: Trigger {
                coefficient: forward_coefficient,
                ..Trigger::default()
            },
        };
        state.set_viewport(viewport);
        state
    }

    fn trigger(&self, direction: ScrollDirection) -> &Trigger {
        match direction {
            ScrollDirection::Backward => &self.backward,
            ScrollDirection::Forward => &self.forward,
        }
    }

    fn trigger_mut(&mut self, direction: ScrollDirection) -> &mut Trigger {
        match direction {
            ScrollDirection::Backward => &mut self.backward,
            ScrollDirection::Forward => &mut self.forward,
        }
    }

    pub fn set_viewport(&mut self, viewport: u32) {
        self.backward.recompute(viewport);
        self.forward.recompute(viewport);
    }

    pub fn offsets(&self) -> TriggerOffsets {
        TriggerOffsets {
            backward: self.backward.offset,
            forward: self.forward.offset,
        }
    }

    pub fn offset_mode(&self, direction: ScrollDirection) -> TriggerOffsetMode {
        self.trigger(direction).mode
    }

    pub fn set_offset_mode(
        &mut self,
        direction: ScrollDirection,
        mode: TriggerOffsetMode,
        viewport: u32,
    ) {
        let trigger = self.trigger_mut(direction);
        trigger.mode = mode;
        trigger.recompute(viewport);
    }

    pub fn is_visible(&self, direction: ScrollDirection) -> bool {
        self.trigger(direction).visible
    }

    /// Records visibility. Returns `true` on a hidden → visible transition.
    pub fn set_visible(&mut self, direction: ScrollDirection, visible: bool) -> bool {
        let trigger = self.trigger_mut(direction);
        let appeared = visible && !trigger.visible;
        trigger.visible = visible;
        appeared
    }

    /// Forgets visibility (both triggers hidden), e.g. after a reset.
    pub fn reset_visibility(&mut self) {
        self.backward.visible = false;
        self.forward.visible = false;
    }

    /// Computes trigger visibility for a viewport over a materialized block.
    ///
    /// `range_start`/`range_end` are the absolute offsets of the first and one-past-last
    /// materialized pixel.
    pub fn visibility_for(
        &self,
        scroll: u64,
        viewport: u32,
        range_start: u64,
        range_end: u64,
    ) -> (bool, bool) {
        let backward_at = range_start.saturating_add(self.backward.offset);
        let forward_at = range_end.saturating_sub(self.forward.offset);
        let bottom = scroll.saturating_add(viewport as u64);
        (scroll <= backward_at, bottom >= forward_at)
    }
}
