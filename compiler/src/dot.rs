// dot.rs — Graphviz DOT output for frozen graphs
//
// Transforms a FrozenGraph into DOT format suitable for rendering with
// `dot`. Edges carry tensor names, annotated with their registry index when
// a registry is supplied, so a generated header can be checked against the
// picture of the graph it came from.
//
// Preconditions: `graph` is a loaded (and optionally pruned) FrozenGraph.
// Postconditions: returns a DOT string; op order follows the graph.
// Failure modes: none (pure string formatting).
// Side effects: none.

use std::collections::HashSet;
use std::fmt::Write;

use crate::graph::FrozenGraph;
use crate::registry::TensorRegistry;

/// Emit the graph as a Graphviz DOT string.
pub fn emit_dot(graph: &FrozenGraph, registry: Option<&TensorRegistry>) -> String {
    let mut buf = String::new();
    let _ = writeln!(buf, "digraph frozen {{");
    let _ = writeln!(buf, "    rankdir=TB;");
    let _ = writeln!(buf, "    node [fontname=\"Helvetica\", fontsize=10];");
    let _ = writeln!(buf, "    edge [fontname=\"Helvetica\", fontsize=9];");

    let outputs: HashSet<&str> = graph.output_nodes.iter().map(String::as_str).collect();
    let producers = graph.producers();

    // Ops
    if !graph.ops.is_empty() {
        let _ = writeln!(buf);
    }
    for op in &graph.ops {
        let shape = if outputs.contains(op.name.as_str()) {
            "doubleoctagon"
        } else {
            "box"
        };
        let label = if op.op_type.is_empty() {
            escape(&op.name)
        } else {
            format!("{}\\n{}", escape(&op.name), escape(&op.op_type))
        };
        let _ = writeln!(
            buf,
            "    \"{}\" [label=\"{}\", shape={}];",
            escape(&op.name),
            label,
            shape
        );
    }

    // Placeholder inputs (tensors no op produces)
    let mut externals: Vec<&str> = Vec::new();
    for op in &graph.ops {
        for input in &op.inputs {
            if !producers.contains_key(input.as_str()) && !externals.contains(&input.as_str()) {
                externals.push(input.as_str());
            }
        }
    }
    if !externals.is_empty() {
        let _ = writeln!(buf);
    }
    for ext in &externals {
        let _ = writeln!(
            buf,
            "    \"ext:{}\" [label=\"{}\", shape=ellipse, style=dashed];",
            escape(ext),
            escape(ext)
        );
    }

    // Edges
    let mut first_edge = true;
    for op in &graph.ops {
        for input in &op.inputs {
            if first_edge {
                let _ = writeln!(buf);
                first_edge = false;
            }
            let from = match producers.get(input.as_str()) {
                Some(producer) => escape(producer),
                None => format!("ext:{}", escape(input)),
            };
            let label = match registry.and_then(|r| r.index_of(input)) {
                Some(idx) => format!("{} [{}]", escape(input), idx),
                None => escape(input),
            };
            let _ = writeln!(
                buf,
                "    \"{}\" -> \"{}\" [label=\"{}\"];",
                from,
                escape(&op.name),
                label
            );
        }
    }

    let _ = writeln!(buf, "}}");
    buf
}

fn escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}
