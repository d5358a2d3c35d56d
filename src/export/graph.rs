//! Owner-neighborhood graph construction
//!
//! Builds a directed graph of the records pinning a spotlight address,
//! with edges running from each owner toward its pointee (pointer
//! direction). Owners can point at interior offsets, so the builder scans
//! every address inside an object's contents for reverse edges, not just
//! its base. Rendering goes through the [`GraphSink`] boundary so the
//! builder stays independent of any one layout backend.

use crate::analysis::HeapIndex;
use crate::dump::{pointer_source_for_target, Record};
use crate::format::unitize;
use crate::symbols::SymbolTable;
use log::info;
use std::collections::{HashMap, HashSet};
use std::io::{self, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeShape {
    Plain,
    Ellipse,
    Box,
    DoubleOctagon,
    TripleOctagon,
    House,
}

/// A node handed to the rendering backend.
#[derive(Debug, Clone)]
pub struct NodeSpec {
    pub id: String,
    pub label: String,
    pub shape: NodeShape,
    /// Fill color; a filled style is implied when set.
    pub fill_color: Option<&'static str>,
    pub font_color: Option<&'static str>,
    pub outline_color: Option<&'static str>,
    pub pen_width: Option<u32>,
}

/// An edge handed to the rendering backend.
#[derive(Debug, Clone)]
pub struct EdgeSpec {
    pub from: String,
    pub to: String,
    /// Interior-pointer annotation at the arrow head.
    pub head_label: Option<String>,
    /// Symbol of the pointing location, at the arrow tail.
    pub tail_label: Option<String>,
    pub color: Option<&'static str>,
}

/// Rendering backend boundary: nodes and edges in, image bytes out.
pub trait GraphSink {
    fn add_node(&mut self, node: &NodeSpec);
    fn add_edge(&mut self, edge: &EdgeSpec);
    fn render(&mut self, out: &mut dyn Write) -> io::Result<()>;
}

/// Build the owner neighborhood of `address` and render it through `sink`.
pub fn write_image<W: Write>(
    index: &HeapIndex,
    symbols: &SymbolTable,
    address: u64,
    sink: &mut dyn GraphSink,
    out: &mut W,
) -> io::Result<()> {
    let mut builder = GraphBuilder {
        index,
        symbols,
        nodes: HashMap::new(),
        order: Vec::new(),
        edges: Vec::new(),
        visited: HashSet::new(),
    };
    builder.add_node(address, true);

    info!("rendering graph ({} nodes)", builder.visited.len());
    for addr in &builder.order {
        sink.add_node(&builder.nodes[addr]);
    }
    for edge in &builder.edges {
        sink.add_edge(edge);
    }
    sink.render(out)
}

struct GraphBuilder<'a> {
    index: &'a HeapIndex,
    symbols: &'a SymbolTable,
    nodes: HashMap<u64, NodeSpec>,
    order: Vec<u64>,
    edges: Vec<EdgeSpec>,
    visited: HashSet<u64>,
}

impl GraphBuilder<'_> {
    fn node_id(address: u64) -> String {
        format!("0x{address:x}")
    }

    fn push_node(&mut self, address: u64, node: NodeSpec) {
        self.order.push(address);
        self.nodes.insert(address, node);
    }

    /// Add (or find) the node for `address` and, for objects, its owner
    /// subgraph. Returns the node id.
    fn add_node(&mut self, address: u64, spotlight: bool) -> String {
        let index = self.index;
        let symbols = self.symbols;
        let id = Self::node_id(address);

        let Some(record) = index.record_at(address) else {
            // Dangling pointer target: keep a placeholder node.
            if !self.nodes.contains_key(&address) {
                self.push_node(
                    address,
                    NodeSpec {
                        id: id.clone(),
                        label: format!("???\n0x{address:x}"),
                        shape: NodeShape::Plain,
                        fill_color: spotlight.then_some("yellow"),
                        font_color: None,
                        outline_color: None,
                        pen_width: None,
                    },
                );
            }
            return id;
        };

        if !self.visited.insert(address) {
            return id;
        }

        match record {
            Record::Object(object) => {
                let mut label = format!(
                    "{} ({})\n0x{:x}",
                    object.display_name(),
                    unitize(object.contents.len() as u64),
                    address
                );
                let mut node = NodeSpec {
                    id: id.clone(),
                    label: String::new(),
                    shape: NodeShape::Ellipse,
                    fill_color: None,
                    font_color: object.name.is_some().then_some("#008000"),
                    outline_color: None,
                    pen_width: None,
                };
                if let Some(finalizer) = index.finalizer_for(address) {
                    label.push('\n');
                    label.push_str(finalizer.kind_name());
                    node.outline_color = Some("red");
                    node.pen_width = Some(5);
                }
                node.label = label;
                self.push_node(address, node);

                // Owners may target a sub-field, so every address covered
                // by the contents is a candidate pointee.
                let mut found_owner = false;
                let end = address + object.contents.len() as u64;
                for dest in address..end {
                    for &owner_id in index.owners_of(dest) {
                        let owner = index.record(owner_id);
                        let Some(view) = owner.owner_view() else {
                            continue;
                        };
                        found_owner = true;

                        let owner_node = self.add_node(view.address, false);
                        let mut edge = EdgeSpec {
                            from: owner_node,
                            to: id.clone(),
                            head_label: None,
                            tail_label: None,
                            color: None,
                        };
                        if dest != address {
                            edge.head_label =
                                Some(format!("0x{dest:x}\n(offset = {})", dest - address));
                            edge.color = Some("red");
                        }
                        if let Some(params) = index.params() {
                            let source = pointer_source_for_target(&view, dest, params);
                            if source != 0 {
                                if let Some(name) = symbols.name_for(source) {
                                    edge.tail_label = Some(name.to_owned());
                                }
                            }
                        }
                        self.edges.push(edge);
                    }
                }
                if !found_owner {
                    // Nothing in this view points here.
                    if let Some(node) = self.nodes.get_mut(&address) {
                        node.fill_color = Some("gray");
                    }
                }
            }
            Record::StackFrame(_) => {
                let stack = self.full_stack(address, "\\l");
                self.push_node(
                    address,
                    NodeSpec {
                        id: id.clone(),
                        label: format!("StackFrame @ 0x{address:x}\n{stack}\\l"),
                        shape: NodeShape::Box,
                        fill_color: None,
                        font_color: None,
                        outline_color: None,
                        pen_width: None,
                    },
                );
            }
            Record::BssSegment(_) => {
                self.push_node(
                    address,
                    NodeSpec {
                        id: id.clone(),
                        label: "BssSegment".to_owned(),
                        shape: NodeShape::DoubleOctagon,
                        fill_color: None,
                        font_color: None,
                        outline_color: None,
                        pen_width: None,
                    },
                );
            }
            Record::DataSegment(_) => {
                self.push_node(
                    address,
                    NodeSpec {
                        id: id.clone(),
                        label: "DataSegment".to_owned(),
                        shape: NodeShape::TripleOctagon,
                        fill_color: None,
                        font_color: None,
                        outline_color: None,
                        pen_width: None,
                    },
                );
            }
            other => {
                self.push_node(
                    address,
                    NodeSpec {
                        id: id.clone(),
                        label: format!("{}\n0x{address:x}", other.kind_name()),
                        shape: NodeShape::House,
                        fill_color: None,
                        font_color: None,
                        outline_color: None,
                        pen_width: None,
                    },
                );
            }
        }

        if spotlight {
            if let Some(node) = self.nodes.get_mut(&address) {
                node.fill_color = Some("yellow");
            }
        }

        id
    }

    /// The `[depth] name` lines of the stack starting at `address`, joined
    /// by `separator`; stops at a zero child pointer, a missing frame, or
    /// a frame already listed (corrupt dumps can cycle the chain).
    fn full_stack(&self, address: u64, separator: &str) -> String {
        let mut lines = Vec::new();
        let mut seen = HashSet::new();
        let mut frame_ptr = address;
        while frame_ptr != 0 && seen.insert(frame_ptr) {
            match self.index.record_at(frame_ptr) {
                Some(Record::StackFrame(frame)) => {
                    lines.push(format!("[{}] {}", frame.depth, frame.name));
                    frame_ptr = frame.child_pointer;
                }
                _ => break,
            }
        }
        lines.join(separator)
    }
}
