//! Graph export: owner-neighborhood graph building and DOT rendering
//!
//! - [`graph`] - builds the node/edge model around a spotlight address
//! - [`dot`] - Graphviz DOT text backend for the [`graph::GraphSink`] boundary

pub mod dot;
pub mod graph;

pub use dot::DotGraph;
pub use graph::{write_image, EdgeSpec, GraphSink, NodeShape, NodeSpec};
