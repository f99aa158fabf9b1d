//! Headless virtual windowing for very large ordered collections.
//!
//! For adapter-level workflows (anchor restore, deferred scroll requests, loading indicators),
//! see the `scrollwin-adapter` crate.
//!
//! This crate decides *which* items of a collection are materialized and how big the
//! unmaterialized rest is:
//! - a per-index size table with fast offset ↔ index lookup ([`ItemSizeTracker`])
//! - load-more trigger bookkeeping ([`TriggerObserverState`])
//! - the range/placeholder calculation itself ([`WindowRangeCalculator`])
//!
//! It is UI-agnostic. A TUI/GUI layer is expected to provide:
//! - viewport size and scroll position
//! - collection mutations (add/remove/move/reset)
//! - measured item sizes after each render
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

mod calculator;
mod error;
mod fenwick;
mod options;
mod sizes;
mod state;
mod triggers;
mod types;

#[cfg(test)]
mod tests;

pub use calculator::{CalculatorResult, WindowRangeCalculator};
pub use error::WindowError;
pub use options::WindowOptions;
pub use sizes::ItemSizeTracker;
pub use state::WindowSnapshot;
pub use triggers::{TriggerObserverState, TriggerOffsetMode, TriggerOffsets};
pub use types::{
    Align, CollectionChange, EdgeItem, ItemSize, ItemsOutOfRange, Placeholders, ScrollDirection,
    SizeSource, VisibilityMode, WindowRange,
};
