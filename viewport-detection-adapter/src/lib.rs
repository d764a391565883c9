//! Adapter utilities for the `viewport-detection` crate.
//!
//! The `viewport-detection` crate is UI-agnostic and focuses on geometry and visibility state.
//! This crate provides small, framework-neutral helpers commonly needed by adapters:
//!
//! - A `Controller` that owns a tracker's scroll subscription and releases it on completion,
//!   explicit detach, or drop
//! - A `Registry` keyed by root node identity, so repeated setup is idempotent
//!
//! This crate is intentionally framework-agnostic (no DOM or widget-toolkit bindings).
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

mod controller;
mod key;
mod listener;
mod registry;


pub use controller::Controller;
pub use key::NodeKey;
pub use listener::ScrollListener;
pub use registry::Registry;
