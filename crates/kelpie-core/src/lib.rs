#![forbid(unsafe_code)]

//! Node forest + mutation engine for interactive diagram surfaces (headless).
//!
//! Design goals:
//! - deterministic, testable outputs (creation-order iteration everywhere)
//! - no panics on user-controlled input: malformed references degrade via
//!   placeholder synthesis instead of erroring
//! - renderer-agnostic: this crate knows nothing about how a node is painted

pub mod document;
pub mod error;
pub mod geom;
pub mod model;

pub use document::Document;
pub use error::{Error, Result};
pub use model::{ContentPatch, Edge, Node, NodeKind, NodeRecord};

#[cfg(test)]
mod tests;
