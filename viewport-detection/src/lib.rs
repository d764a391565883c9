//! A headless engine that reports when elements enter or leave a scroll container's
//! visible bounds.
//!
//! For adapter-level utilities (scroll subscriptions, a per-node registry), see the
//! `viewport-detection-adapter` crate.
//!
//! The crate caches each target's rect once, intersects it against the container's
//! (offset-adjusted) bounds on every debounced scroll event, and fires `on_visible` /
//! `on_invisible` on transitions. In non-infinite mode every element fires once and freezes,
//! and the tracker stops listening when all of them have been seen.
//!
//! It is UI-agnostic. A host layer is expected to provide, through [`Host`]:
//! - the container's scroll offsets and size
//! - the target nodes under a root
//! - each target's document rect
//!
//! and to forward scroll events together with a monotonic `now_ms` clock.
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

mod debounce;
mod error;
mod host;
mod options;
mod tracker;
mod types;

#[cfg(test)]
mod tests;

pub use debounce::{Debounce, Debouncer};
pub use error::Error;
pub use host::Host;
pub use options::{
    CHILDREN_SELECTOR, Container, DetectorConfig, DetectorOptions, Handler, Target, TargetFilter,
    VisibilityCallback,
};
pub use tracker::{TrackedElement, VisibilityTracker};
pub use types::{Evaluation, Offset, Rect, ScrollMetrics};
