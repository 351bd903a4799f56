// pass.rs — Pass descriptor module: metadata, dependency resolution, artifact IDs
//
// Declares the compiler's 4 passes (graph loading and pruning are outside the
// runner), their dependency edges, and the artifacts they produce. Used by the
// pipeline runner to compute minimal pass subsets for each --emit target.

use std::collections::HashSet;

// ── Pass and Artifact identifiers ──────────────────────────────────────────

/// Identifies each compiler pass (graph loading excluded — handled before the runner).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PassId {
    BuildRegistry,
    SelectWidth,
    DeriveNames,
    Render,
}

/// Machine-readable artifact identifiers. Each maps to a concrete type
/// in the compilation state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactId {
    Registry, // TensorRegistry
    Width,    // Width
    Macros,   // MacroTable
    Header,   // String
}

// ── Pass descriptor ────────────────────────────────────────────────────────

/// Static metadata about a compiler pass.
pub struct PassDescriptor {
    /// Human-readable name for diagnostics/verbose output.
    pub name: &'static str,
    /// Pass dependencies (other passes whose outputs this pass consumes).
    pub inputs: &'static [PassId],
    /// Artifacts this pass produces.
    pub outputs: &'static [ArtifactId],
    /// Postconditions, reported under --verbose.
    pub invariants: &'static str,
}

impl PassDescriptor {
    /// One-line summary for verbose output: `produces Registry; <invariants>`.
    pub fn summary(&self) -> String {
        let outputs: Vec<String> = self.outputs.iter().map(|a| format!("{:?}", a)).collect();
        format!("produces {}; {}", outputs.join(", "), self.invariants)
    }
}

/// Return the static descriptor for a given pass.
pub fn descriptor(id: PassId) -> PassDescriptor {
    match id {
        PassId::BuildRegistry => PassDescriptor {
            name: "build_registry",
            inputs: &[],
            outputs: &[ArtifactId::Registry],
            invariants: "tensor names unique, indices dense in graph order",
        },
        PassId::SelectWidth => PassDescriptor {
            name: "select_width",
            inputs: &[PassId::BuildRegistry],
            outputs: &[ArtifactId::Width],
            invariants: "every index fits the selected width",
        },
        PassId::DeriveNames => PassDescriptor {
            name: "derive_names",
            inputs: &[PassId::BuildRegistry],
            outputs: &[ArtifactId::Macros],
            invariants: "macro names are valid identifiers and injective",
        },
        PassId::Render => PassDescriptor {
            name: "render",
            inputs: &[PassId::SelectWidth, PassId::DeriveNames],
            outputs: &[ArtifactId::Header],
            invariants: "guarded header emitted, byte-identical for identical inputs",
        },
    }
}

// ── Dependency resolution ──────────────────────────────────────────────────

/// All pass IDs in declaration order (used for iteration).
pub const ALL_PASSES: [PassId; 4] = [
    PassId::BuildRegistry,
    PassId::SelectWidth,
    PassId::DeriveNames,
    PassId::Render,
];

/// Compute the minimal ordered set of passes needed to produce `terminal`.
/// Returns passes in topological (execution) order.
pub fn required_passes(terminal: PassId) -> Vec<PassId> {
    let mut visited = HashSet::new();
    let mut order = Vec::new();
    visit(terminal, &mut visited, &mut order);
    order
}

fn visit(id: PassId, visited: &mut HashSet<PassId>, order: &mut Vec<PassId>) {
    if !visited.insert(id) {
        return;
    }
    for &dep in descriptor(id).inputs {
        visit(dep, visited, order);
    }
    order.push(id);
}

// ── Tests ──────────────────────────────────────────────────────────────────
