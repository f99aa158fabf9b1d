use crate::WindowError;

/// Alignment used when computing a scroll target for an item.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Align {
    Start,
    Center,
    End,
    Auto,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ScrollDirection {
    Forward,
    Backward,
}

impl ScrollDirection {
    pub fn opposite(self) -> Self {
        match self {
            Self::Forward => Self::Backward,
            Self::Backward => Self::Forward,
        }
    }
}

/// What happens to items that leave the materialized range.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum VisibilityMode {
    /// Items are detached; a re-entering item must be measured again.
    #[default]
    Remove,
    /// Items stay mounted but hidden, so their last measurement stays valid.
    Hide,
}

/// The materialized part of the collection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WindowRange {
    pub start_index: usize,
    pub end_index: usize, // exclusive
}

impl WindowRange {
    pub const EMPTY: Self = Self {
        start_index: 0,
        end_index: 0,
    };

    pub fn new(start_index: usize, end_index: usize) -> Self {
        debug_assert!(start_index <= end_index, "inverted range");
        Self {
            start_index,
            end_index,
        }
    }

    pub fn len(&self) -> usize {
        self.end_index.saturating_sub(self.start_index)
    }

    pub fn is_empty(&self) -> bool {
        self.start_index >= self.end_index
    }

    pub fn contains(&self, index: usize) -> bool {
        index >= self.start_index && index < self.end_index
    }
}

/// Pixel extents standing in for the items before and after the range.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Placeholders {
    pub backward: u64,
    pub forward: u64,
}

/// Size and absolute offset of one item in the scroll axis.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ItemSize {
    pub size: u32,
    /// Start offset in virtual content coordinates (includes the backward placeholder).
    pub offset: u64,
}

impl ItemSize {
    pub fn end(&self) -> u64 {
        self.offset.saturating_add(self.size as u64)
    }
}

/// Where a size value came from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SizeSource {
    /// Never measured; the tracker estimates it.
    #[default]
    Unknown,
    Measured,
    /// Measured once, then detached. The old value is still used for offsets.
    Stale,
    /// Supplied up front by the data; never re-measured.
    Given,
}

impl SizeSource {
    pub fn is_known(self) -> bool {
        !matches!(self, Self::Unknown)
    }
}

/// A visual anchor: an item plus the distance between one of its borders and the viewport edge.
///
/// - `border == Forward` means the distance is measured from the viewport top to the item's
///   bottom border.
/// - `border == Backward` means the distance is measured from the item's top border to the
///   viewport bottom.
///
/// `direction` records which side of the viewport the anchor was taken from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EdgeItem {
    pub index: usize,
    pub border: ScrollDirection,
    pub border_distance: u64,
    pub direction: ScrollDirection,
}

/// Whether unmaterialized items exist on each side of the range.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ItemsOutOfRange {
    pub backward: bool,
    pub forward: bool,
}

impl ItemsOutOfRange {
    pub fn get(&self, direction: ScrollDirection) -> bool {
        match direction {
            ScrollDirection::Backward => self.backward,
            ScrollDirection::Forward => self.forward,
        }
    }
}

/// One event of the collection mutation feed.
///
/// For `Move`, `to` is the index of the first moved item in the resulting collection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CollectionChange {
    Add { index: usize, count: usize },
    Remove { index: usize, count: usize },
    Move { from: usize, count: usize, to: usize },
    Reset { total: usize },
}

impl CollectionChange {
    /// Checks the change against a collection of `total` items.
    pub fn validate(&self, total: usize) -> Result<(), WindowError> {
        match *self {
            Self::Add { index, count } => {
                if index > total {
                    return Err(WindowError::AddOutOfBounds {
                        index,
                        count,
                        total,
                    });
                }
            }
            Self::Remove { index, count } => {
                if index.checked_add(count).is_none_or(|end| end > total) {
                    return Err(WindowError::RemoveOutOfBounds {
                        index,
                        count,
                        total,
                    });
                }
            }
            Self::Move { from, count, to } => {
                let src_ok = from.checked_add(count).is_some_and(|end| end <= total);
                if !src_ok || to > total - count {
                    return Err(WindowError::MoveOutOfBounds {
                        from,
                        count,
                        to,
                        total,
                    });
                }
            }
            Self::Reset { .. } => {}
        }
        Ok(())
    }

    /// Collection length after the change has been applied to `total` items.
    pub fn resulting_total(&self, total: usize) -> usize {
        match *self {
            Self::Add { count, .. } => total.saturating_add(count),
            Self::Remove { count, .. } => total.saturating_sub(count),
            Self::Move { .. } => total,
            Self::Reset { total } => total,
        }
    }

    /// Maps an index from before the change to the same item after it.
    ///
    /// Returns `None` when the item no longer exists.
    pub fn remap_index(&self, index: usize) -> Option<usize> {
        match *self {
            Self::Add { index: at, count } => {
                if index >= at {
                    Some(index + count)
                } else {
                    Some(index)
                }
            }
            Self::Remove { index: at, count } => {
                if index < at {
                    Some(index)
                } else if index < at + count {
                    None
                } else {
                    Some(index - count)
                }
            }
            Self::Move { from, count, to } => {
                if index >= from && index < from + count {
                    return Some(to + (index - from));
                }
                let without = if index >= from + count {
                    index - count
                } else {
                    index
                };
                if without >= to {
                    Some(without + count)
                } else {
                    Some(without)
                }
            }
            Self::Reset { .. } => None,
        }
    }
}
