//! Adapter utilities for the `scrollwin` crate.
//!
//! The `scrollwin` crate is UI-agnostic and focuses on the range math and state. This crate
//! provides the framework-neutral workflows an adapter needs around it:
//!
//! - Scroll anchoring (insert above the viewport, shift a range, without visual jumps)
//! - Scroll actions deferred until the next committed render, including scroll-to-item with an
//!   awaitable completion
//! - Delayed loading and portioned-search indicators
//!
//! Time is always supplied by the caller (`now_ms`), so the crate never spawns timers itself.
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

mod anchor;
mod completion;
mod controller;
mod indicators;
mod key;
mod options;
mod scheduled;
mod timer;


pub use anchor::{ScrollAnchorEngine, capture_edge_item, remap_edge_item, restore_position};
pub use completion::{ScrollCompleter, ScrollCompletion, ScrollOutcome};
pub use controller::ScrollWindowController;
pub use indicators::{
    IndicatorCallback, IndicatorDirection, IndicatorOptions, IndicatorState,
    IndicatorStateMachine, SearchState,
};
pub use key::WindowKey;
pub use options::{
    ActiveElementCallback, ControllerOptions, ItemSizeProvider, ItemsOutOfRangeCallback,
    MoreDataNeededCallback, PlaceholdersChangedCallback, RangeChangedCallback,
    ScrollCorrectionCallback, ScrollToElementCallback,
};
pub use scheduled::ScheduledScroll;
