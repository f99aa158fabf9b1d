use scrollwin::{Align, CollectionChange, EdgeItem, ScrollDirection, WindowRange};

use crate::{ScrollCompleter, ScrollOutcome, WindowKey, anchor::remap_edge_item};

/// A scroll action deferred until the UI has committed the next render.
#[derive(Debug)]
pub enum ScheduledScroll<K> {
    /// Put this edge item back where it was.
    RestoreScroll(EdgeItem),
    /// Capture the edge item of the range that is still on screen, right before the render that
    /// replaces it, then restore it.
    CalculateRestoreScrollParams {
        direction: ScrollDirection,
        range: WindowRange,
    },
    /// Ask the UI to bring an item into view.
    ScrollToElement {
        key: K,
        index: usize,
        align: Align,
        force: bool,
        completer: ScrollCompleter,
    },
    /// Scroll to an absolute position.
    ApplyScrollPosition(u64),
}

impl<K> ScheduledScroll<K> {
    fn is_restore(&self) -> bool {
        matches!(
            self,
            Self::RestoreScroll(_) | Self::CalculateRestoreScrollParams { .. }
        )
    }
}

/// Holds at most one pending [`ScheduledScroll`].
///
/// Restores replace restores but never a pending scroll-to-element; anything else replaces
/// whatever is pending. A replaced scroll-to-element resolves as cancelled.
#[derive(Debug)]
pub(crate) struct ScrollSchedule<K> {
    pending: Option<ScheduledScroll<K>>,
}

impl<K> Default for ScrollSchedule<K> {
    fn default() -> Self {
        Self { pending: None }
    }
}

impl<K: WindowKey> ScrollSchedule<K> {
    pub(crate) fn pending(&self) -> Option<&ScheduledScroll<K>> {
        self.pending.as_ref()
    }

    pub(crate) fn schedule(&mut self, next: ScheduledScroll<K>) {
        if next.is_restore()
            && matches!(self.pending, Some(ScheduledScroll::ScrollToElement { .. }))
        {
            vtrace!("restore dropped: scroll-to-element pending");
            return;
        }
        if let Some(ScheduledScroll::ScrollToElement { key: _key, .. }) = self.pending.replace(next)
        {
            vtrace!(key = ?_key, "scroll-to-element superseded");
        }
    }

    pub(crate) fn take(&mut self) -> Option<ScheduledScroll<K>> {
        self.pending.take()
    }

    /// Drops the pending restore-parameter capture and returns its inputs.
    pub(crate) fn take_restore_params(&mut self) -> Option<(ScrollDirection, WindowRange)> {
        match self.pending {
            Some(ScheduledScroll::CalculateRestoreScrollParams {
                direction, range, ..
            }) => {
                self.pending = None;
                Some((direction, range))
            }
            _ => None,
        }
    }

    /// Keeps pending indexes valid across a collection change.
    pub(crate) fn remap(&mut self, change: CollectionChange, total_after: usize) {
        self.pending = match self.pending.take() {
            Some(ScheduledScroll::RestoreScroll(edge)) => {
                remap_edge_item(edge, change, total_after).map(ScheduledScroll::RestoreScroll)
            }
            // The captured range no longer describes the collection.
            Some(ScheduledScroll::CalculateRestoreScrollParams { .. }) => None,
            Some(ScheduledScroll::ScrollToElement {
                key,
                index,
                align,
                force,
                completer,
            }) => match change.remap_index(index) {
                Some(index) => Some(ScheduledScroll::ScrollToElement {
                    key,
                    index,
                    align,
                    force,
                    completer,
                }),
                None => {
                    vwarn!(?key, "scroll target removed before the scroll was issued");
                    completer.resolve(ScrollOutcome::NotFound);
                    None
                }
            },
            other => other,
        };
    }

    /// Drops whatever is pending. A pending scroll-to-element resolves as cancelled.
    pub(crate) fn clear(&mut self) {
        self.pending = None;
    }
}
