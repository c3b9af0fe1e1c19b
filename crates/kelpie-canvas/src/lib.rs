#![forbid(unsafe_code)]

//! Interaction state for diagram surfaces (headless).
//!
//! Everything here is single-threaded and host-driven: mutations happen in
//! UI event callbacks, animation transitions are deferred steps released by
//! `tick`, and nothing ever reads the wall clock, which keeps every
//! sequence reproducible in tests.

pub mod controller;
pub mod positions;
pub mod scheduler;
pub mod selection;
pub mod viewport;
pub mod visibility;

pub use controller::{
    AnimationOptions, DiagramController, DiagramOptions, NodeView, PositionRecord, Snapshot,
};
pub use positions::PositionStore;
pub use scheduler::{Scheduler, Step};
pub use selection::Selection;
pub use viewport::{PanClamp, Viewport, ViewportOptions, content_bounds};
pub use visibility::{VisibilityMap, VisibilityState};

#[cfg(test)]
mod tests;
