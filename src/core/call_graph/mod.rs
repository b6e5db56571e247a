// src/core/call_graph/mod.rs
//! Call graph model and traversal.
//!
//! Nodes are extracted per language, wired together by the name-only
//! [`CallResolver`], rooted by the [`EntryPointDetector`] and frozen into a
//! [`CallGraph`] that the level generator reads from.

mod code_node;
mod call_graph;
mod call_resolver;
mod entry_point_detector;

pub use code_node::{CodeNode, NodeKind, NodeFlags, Location, Parameter};
pub use call_graph::{CallGraph, CallEdge, CallType, METRIC_DEPTH_BOUND};
pub use call_resolver::{CallResolver, CallSite, ResolutionStats};
pub use entry_point_detector::EntryPointDetector;
