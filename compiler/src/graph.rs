// graph.rs — Frozen graph IR
//
// The input boundary of the compiler: an immutable computation graph whose
// variables have already been baked into constants by an external export
// step. The compiler only needs the ordered list of tensors it produces; op
// edges are kept so the graph can be pruned to its output nodes and drawn.
//
// Preconditions: none.
// Postconditions: op names are unique; tensor order is ops in declaration
//                 order, each op's outputs in order.
// Failure modes: malformed JSON, duplicate op names, unknown output nodes.
// Side effects: none (callers read the source text).

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::diag::{codes, Diagnostic};

// ── Data types ──────────────────────────────────────────────────────────────

/// One tensor produced by an op.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TensorInfo {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dtype: Option<String>,
    /// `None` for unknown rank; `None` entries for unknown dimensions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shape: Option<Vec<Option<u64>>>,
}

impl TensorInfo {
    pub fn named(name: impl Into<String>) -> Self {
        TensorInfo {
            name: name.into(),
            dtype: None,
            shape: None,
        }
    }
}

/// One node of the frozen graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpInfo {
    pub name: String,
    #[serde(default)]
    pub op_type: String,
    /// Names of the tensors this op consumes.
    #[serde(default)]
    pub inputs: Vec<String>,
    #[serde(default)]
    pub outputs: Vec<TensorInfo>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrozenGraph {
    #[serde(default)]
    pub output_nodes: Vec<String>,
    #[serde(default)]
    pub ops: Vec<OpInfo>,
}

/// On-disk representation of a frozen graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphFormat {
    /// Full graph as JSON (ops, edges, output nodes).
    Json,
    /// One tensor name per line; `#` starts a comment line.
    Names,
}

impl GraphFormat {
    /// Guess the format from a file extension (`.json` is JSON).
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => GraphFormat::Json,
            _ => GraphFormat::Names,
        }
    }

    /// Only the JSON format carries the edges `prune_to` walks.
    pub fn supports_pruning(self) -> bool {
        self == GraphFormat::Json
    }
}

// ── Errors ──────────────────────────────────────────────────────────────────

#[derive(Debug)]
pub enum GraphError {
    Json(serde_json::Error),
    DuplicateOp { name: String },
    UnknownOutputNode { name: String },
    /// Output nodes requested for an input format with no edges to prune along.
    PruneWithoutEdges { output_nodes: Vec<String> },
}

impl fmt::Display for GraphError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GraphError::Json(e) => write!(f, "malformed graph JSON: {}", e),
            GraphError::DuplicateOp { name } => write!(f, "duplicate op '{}' in graph", name),
            GraphError::UnknownOutputNode { name } => {
                write!(f, "output node '{}' is not an op of the graph", name)
            }
            GraphError::PruneWithoutEdges { output_nodes } => write!(
                f,
                "cannot prune to output node(s) {}: a tensor-name list has no edges",
                output_nodes.join(", ")
            ),
        }
    }
}

impl std::error::Error for GraphError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GraphError::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for GraphError {
    fn from(e: serde_json::Error) -> Self {
        GraphError::Json(e)
    }
}

impl GraphError {
    pub fn to_diagnostic(&self) -> Diagnostic {
        let code = match self {
            GraphError::Json(_) => codes::E0200,
            GraphError::DuplicateOp { .. } => codes::E0201,
            GraphError::UnknownOutputNode { .. } => codes::E0202,
            GraphError::PruneWithoutEdges { .. } => {
                return Diagnostic::error(self.to_string())
                    .with_code(codes::E0203)
                    .with_hint("pass a JSON graph, or drop --output-node");
            }
        };
        Diagnostic::error(self.to_string()).with_code(code)
    }
}

// ── Loading ─────────────────────────────────────────────────────────────────

impl FrozenGraph {
    /// Parse a graph from source text in the given format.
    pub fn parse(source: &str, format: GraphFormat) -> Result<Self, GraphError> {
        match format {
            GraphFormat::Json => Self::from_json(source),
            GraphFormat::Names => Ok(Self::from_names(source)),
        }
    }

    pub fn from_json(source: &str) -> Result<Self, GraphError> {
        let graph: FrozenGraph = serde_json::from_str(source)?;
        graph.check_unique_ops()?;
        Ok(graph)
    }

    /// Build an edge-less graph from a tensor-name list: one `Const` op per
    /// name, each producing a tensor of the same name.
    pub fn from_names(source: &str) -> Self {
        let ops = source
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(|name| OpInfo {
                name: name.to_string(),
                op_type: "Const".to_string(),
                inputs: Vec::new(),
                outputs: vec![TensorInfo::named(name)],
            })
            .collect();
        FrozenGraph {
            output_nodes: Vec::new(),
            ops,
        }
    }

    fn check_unique_ops(&self) -> Result<(), GraphError> {
        let mut seen = HashSet::new();
        for op in &self.ops {
            if !seen.insert(op.name.as_str()) {
                return Err(GraphError::DuplicateOp {
                    name: op.name.clone(),
                });
            }
        }
        Ok(())
    }

    // ── Queries ─────────────────────────────────────────────────────────

    /// All output tensors, ops in declaration order.
    pub fn tensors(&self) -> impl Iterator<Item = &TensorInfo> {
        self.ops.iter().flat_map(|op| op.outputs.iter())
    }

    pub fn tensor_count(&self) -> usize {
        self.ops.iter().map(|op| op.outputs.len()).sum()
    }

    pub fn op(&self, name: &str) -> Option<&OpInfo> {
        self.ops.iter().find(|op| op.name == name)
    }

    /// Map tensor name → name of the op producing it.
    pub fn producers(&self) -> HashMap<&str, &str> {
        let mut map = HashMap::new();
        for op in &self.ops {
            for t in &op.outputs {
                map.entry(t.name.as_str()).or_insert(op.name.as_str());
            }
        }
        map
    }

    // ── Pruning ─────────────────────────────────────────────────────────

    /// Keep only ops that the given output nodes (transitively) depend on.
    ///
    /// Declaration order of surviving ops is preserved, so indices stay
    /// stable relative to the unpruned graph. Inputs naming tensors no op
    /// produces (graph placeholders) are ignored.
    pub fn prune_to(&self, outputs: &[String]) -> Result<FrozenGraph, GraphError> {
        let by_name: HashMap<&str, &OpInfo> =
            self.ops.iter().map(|op| (op.name.as_str(), op)).collect();
        for name in outputs {
            if !by_name.contains_key(name.as_str()) {
                return Err(GraphError::UnknownOutputNode { name: name.clone() });
            }
        }

        let producers = self.producers();
        let mut live: HashSet<&str> = HashSet::new();
        let mut stack: Vec<&str> = outputs.iter().map(String::as_str).collect();
        while let Some(name) = stack.pop() {
            if !live.insert(name) {
                continue;
            }
            let Some(op) = by_name.get(name) else {
                continue;
            };
            for input in &op.inputs {
                if let Some(&producer) = producers.get(input.as_str()) {
                    stack.push(producer);
                }
            }
        }

        Ok(FrozenGraph {
            output_nodes: outputs.to_vec(),
            ops: self
                .ops
                .iter()
                .filter(|op| live.contains(op.name.as_str()))
                .cloned()
                .collect(),
        })
    }
}
