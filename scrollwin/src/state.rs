use crate::{Placeholders, WindowRange};

/// A lightweight, serializable snapshot of the window state.
///
/// This is useful for restoring a list across remounts (or sessions) without keeping the
/// calculator alive. With `feature = "serde"`, this type implements `Serialize`/`Deserialize`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WindowSnapshot {
    pub range: WindowRange,
    pub placeholders: Placeholders,
    pub scroll_position: u64,
    pub viewport_size: u32,
    pub content_size: u64,
    pub total_count: usize,
}
