//! Graphviz DOT backend for the graph sink
//!
//! Emits plain DOT source; rasterization is the operator's `dot`
//! invocation, not this tool's concern.

use crate::export::graph::{EdgeSpec, GraphSink, NodeShape, NodeSpec};
use std::io::{self, Write};

/// Buffers nodes and edges, then renders them as a `digraph`.
#[derive(Debug, Default)]
pub struct DotGraph {
    statements: Vec<String>,
}

impl DotGraph {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn shape_name(shape: NodeShape) -> &'static str {
    match shape {
        NodeShape::Plain => "plain",
        NodeShape::Ellipse => "ellipse",
        NodeShape::Box => "box",
        NodeShape::DoubleOctagon => "doubleoctagon",
        NodeShape::TripleOctagon => "tripleoctagon",
        NodeShape::House => "house",
    }
}

/// Escape a label for a double-quoted DOT string. Newlines become the
/// centered `\n` escape; backslashes pass through so `\l` left-align
/// sequences survive.
fn escape(label: &str) -> String {
    label.replace('"', "\\\"").replace('\n', "\\n")
}

impl GraphSink for DotGraph {
    fn add_node(&mut self, node: &NodeSpec) {
        let mut attrs = vec![
            format!("shape={}", shape_name(node.shape)),
            format!("label=\"{}\"", escape(&node.label)),
        ];
        if let Some(color) = node.fill_color {
            attrs.push("style=filled".to_owned());
            attrs.push(format!("fillcolor={color}"));
        }
        if let Some(color) = node.font_color {
            attrs.push(format!("fontcolor=\"{color}\""));
        }
        if let Some(color) = node.outline_color {
            attrs.push(format!("color={color}"));
        }
        if let Some(width) = node.pen_width {
            attrs.push(format!("penwidth={width}"));
        }
        self.statements
            .push(format!("  \"{}\" [{}];", node.id, attrs.join(", ")));
    }

    fn add_edge(&mut self, edge: &EdgeSpec) {
        let mut attrs = Vec::new();
        if let Some(label) = &edge.head_label {
            attrs.push(format!("headlabel=\"{}\"", escape(label)));
        }
        if let Some(label) = &edge.tail_label {
            attrs.push(format!("taillabel=\"{}\"", escape(label)));
        }
        if let Some(color) = edge.color {
            attrs.push(format!("color={color}"));
        }
        let attrs = if attrs.is_empty() {
            String::new()
        } else {
            format!(" [{}]", attrs.join(", "))
        };
        self.statements
            .push(format!("  \"{}\" -> \"{}\"{};", edge.from, edge.to, attrs));
    }

    fn render(&mut self, out: &mut dyn Write) -> io::Result<()> {
        writeln!(out, "digraph heap {{")?;
        for statement in &self.statements {
            writeln!(out, "{statement}")?;
        }
        writeln!(out, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_quotes_and_newlines() {
        assert_eq!(escape("a\nb"), "a\\nb");
        assert_eq!(escape("say \"hi\""), "say \\\"hi\\\"");
        // Left-align terminators pass through untouched
        assert_eq!(escape("[0] main\\l[1] run\\l"), "[0] main\\l[1] run\\l");
    }

    #[test]
    fn test_render_emits_digraph() {
        let mut dot = DotGraph::new();
        dot.add_node(&NodeSpec {
            id: "0x1000".to_owned(),
            label: "Object (8 B)\n0x1000".to_owned(),
            shape: NodeShape::Ellipse,
            fill_color: Some("yellow"),
            font_color: None,
            outline_color: None,
            pen_width: None,
        });
        dot.add_edge(&EdgeSpec {
            from: "0x2000".to_owned(),
            to: "0x1000".to_owned(),
            head_label: None,
            tail_label: None,
            color: None,
        });

        let mut out = Vec::new();
        dot.render(&mut out).unwrap();
        let rendered = String::from_utf8(out).unwrap();
        assert_eq!(
            rendered,
            "digraph heap {\n  \"0x1000\" [shape=ellipse, label=\"Object (8 B)\\n0x1000\", \
             style=filled, fillcolor=yellow];\n  \"0x2000\" -> \"0x1000\";\n}\n"
        );
    }
}
