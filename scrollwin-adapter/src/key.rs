use core::fmt::Debug;

/// Item identity used by [`crate::ScrollWindowController::scroll_to_item`].
///
/// Keys are handed back to the UI in scroll-to-element requests and show up in diagnostics, so
/// they only need to be cloneable and printable.
pub trait WindowKey: Clone + Debug {}
impl<T: Clone + Debug> WindowKey for T {}
