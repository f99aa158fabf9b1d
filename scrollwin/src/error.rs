use thiserror::Error;

/// A collection mutation that does not fit the collection the engine knows about.
///
/// These are caller bugs. The engine validates before touching any state, so after an error the
/// range, sizes and placeholders are exactly what they were before the call.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum WindowError {
    #[error("cannot add {count} items at index {index}: collection has {total} items")]
    AddOutOfBounds {
        index: usize,
        count: usize,
        total: usize,
    },

    #[error("cannot remove {count} items at index {index}: collection has {total} items")]
    RemoveOutOfBounds {
        index: usize,
        count: usize,
        total: usize,
    },

    #[error("cannot move {count} items from {from} to {to}: collection has {total} items")]
    MoveOutOfBounds {
        from: usize,
        count: usize,
        to: usize,
        total: usize,
    },
}
