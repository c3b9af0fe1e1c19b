#![forbid(unsafe_code)]

//! `kelpie` is a headless engine for interactive hierarchical diagram
//! surfaces (mindmap-style editors, timelines, network explorers).
//!
//! It owns a mutable rooted forest of visual nodes and keeps positions,
//! visibility/animation state and the pan/zoom viewport consistent while
//! nodes are added, deleted, reparented, dragged or collapsed. Rendering is
//! out of scope: a surface reads [`DiagramController`] views and paints them
//! however it likes.
//!
//! The usual entry point is [`DiagramController::from_records`], fed with
//! the node list produced by the upstream document-analysis service.

pub use kelpie_core::{ContentPatch, Document, Edge, Error, Node, NodeKind, NodeRecord, Result};

pub use kelpie_layout::{
    LayoutOptions, LayoutOrientation, PositionMap, compute_positions, provisional_child_position,
};

pub use kelpie_canvas::{
    AnimationOptions, DiagramController, DiagramOptions, NodeView, PanClamp, PositionRecord,
    PositionStore, Selection, Snapshot, Viewport, ViewportOptions, VisibilityMap, VisibilityState,
};

/// Geometry aliases shared by every kelpie crate.
pub mod geom {
    pub use kelpie_core::geom::*;
}
