// pipeline.rs — Compilation state and pass orchestration
//
// Holds all pass artifacts and runs the minimal set of passes for a given
// terminal PassId.
//
// Preconditions: the frozen graph is loaded (and pruned, if requested).
// Postconditions: all artifacts for required passes are populated, or has_error is set.
// Failure modes: any pass emitting error-level diagnostics.
// Side effects: calls on_pass_complete callback after each pass for immediate display.

use std::fmt;
use std::time::Instant;

use serde::Serialize;

use crate::codegen::{render_table, HeaderOptions, RenderError};
use crate::diag::{codes, Diagnostic};
use crate::graph::{FrozenGraph, GraphError};
use crate::naming::{guard_is_rewritten, guard_symbol, MacroTable, NamingError};
use crate::pass::{descriptor, required_passes, PassId};
use crate::registry::{RegistryError, TensorRegistry};
use crate::width::{select_width, Width};

// ── Errors ─────────────────────────────────────────────────────────────────

/// Any failure of a one-shot compilation (see [`compile`]).
#[derive(Debug)]
pub enum CompileError {
    Graph(GraphError),
    Registry(RegistryError),
    Render(RenderError),
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompileError::Graph(e) => write!(f, "{}", e),
            CompileError::Registry(e) => write!(f, "{}", e),
            CompileError::Render(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for CompileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CompileError::Graph(e) => Some(e),
            CompileError::Registry(e) => Some(e),
            CompileError::Render(e) => Some(e),
        }
    }
}

impl From<GraphError> for CompileError {
    fn from(e: GraphError) -> Self {
        CompileError::Graph(e)
    }
}

impl From<RegistryError> for CompileError {
    fn from(e: RegistryError) -> Self {
        CompileError::Registry(e)
    }
}

impl From<RenderError> for CompileError {
    fn from(e: RenderError) -> Self {
        CompileError::Render(e)
    }
}

impl From<NamingError> for CompileError {
    fn from(e: NamingError) -> Self {
        CompileError::Render(RenderError::Naming(e))
    }
}

impl CompileError {
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            CompileError::Graph(e) => e.to_diagnostic(),
            CompileError::Registry(e) => e.to_diagnostic(),
            CompileError::Render(e) => e.to_diagnostic(),
        }
    }
}

/// Compile a frozen graph straight to header text.
///
/// Library shorthand for the full pass chain without diagnostics collection.
pub fn compile(graph: &FrozenGraph, options: &HeaderOptions) -> Result<String, CompileError> {
    let registry = TensorRegistry::from_graph(graph)?;
    let width = select_width(registry.len());
    let table = MacroTable::build(&registry)?;
    Ok(render_table(&table, width, options)?)
}

// ── Provenance ─────────────────────────────────────────────────────────────

/// Provenance metadata for hermetic builds (`--emit build-info`).
///
/// `source_hash`: SHA-256 of the raw graph source text.
/// `header_hash`: SHA-256 of the rendered header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Provenance {
    pub source_hash: String,
    pub header_hash: String,
    pub tensor_count: usize,
    pub width: String,
    pub guard: String,
    pub compiler_version: &'static str,
}

impl Provenance {
    /// Serialize as pretty JSON with a trailing newline.
    pub fn to_json(&self) -> serde_json::Result<String> {
        let mut s = serde_json::to_string_pretty(self)?;
        s.push('\n');
        Ok(s)
    }
}

fn sha256_hex(bytes: &[u8]) -> String {
    use sha2::{Digest, Sha256};
    use std::fmt::Write;

    let digest = Sha256::digest(bytes);
    let mut s = String::with_capacity(64);
    for b in digest.iter() {
        let _ = write!(s, "{:02x}", b);
    }
    s
}

/// Compute provenance from the graph source text and a completed state.
///
/// Returns `None` unless the render pass has produced a header.
pub fn compute_provenance(source: &str, state: &CompilationState) -> Option<Provenance> {
    let header = state.header.as_ref()?;
    let registry = state.registry.as_ref()?;
    let width = state.width?;
    let guard = guard_symbol(&state.options.guard).ok()?;
    Some(Provenance {
        source_hash: sha256_hex(source.as_bytes()),
        header_hash: sha256_hex(header.as_bytes()),
        tensor_count: registry.len(),
        width: width.to_string(),
        guard,
        compiler_version: env!("CARGO_PKG_VERSION"),
    })
}

// ── Compilation state ──────────────────────────────────────────────────────

/// Holds all compilation artifacts and accumulated diagnostics.
pub struct CompilationState {
    pub graph: FrozenGraph,
    pub options: HeaderOptions,
    pub registry: Option<TensorRegistry>,
    pub width: Option<Width>,
    pub macros: Option<MacroTable>,
    pub header: Option<String>,
    pub diagnostics: Vec<Diagnostic>,
    pub has_error: bool,
}

impl CompilationState {
    pub fn new(graph: FrozenGraph, options: HeaderOptions) -> Self {
        Self {
            graph,
            options,
            registry: None,
            width: None,
            macros: None,
            header: None,
            diagnostics: Vec::new(),
            has_error: false,
        }
    }
}

/// Pipeline execution failed due to error-level diagnostics in a pass.
/// The specific diagnostics are available in `CompilationState.diagnostics`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineError {
    /// The pass that produced the error.
    pub failing_pass: PassId,
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pass '{}' failed", descriptor(self.failing_pass).name)
    }
}

impl std::error::Error for PipelineError {}

/// Per-pass post-processing: callback, accumulate, verbose, error check.
fn finish_pass(
    state: &mut CompilationState,
    pass_id: PassId,
    diags: Vec<Diagnostic>,
    elapsed: std::time::Duration,
    verbose: bool,
    on_pass_complete: &mut impl FnMut(PassId, &[Diagnostic]),
) -> Result<(), PipelineError> {
    on_pass_complete(pass_id, &diags);
    let is_err = diags.iter().any(Diagnostic::is_error);
    state.diagnostics.extend(diags);
    if verbose {
        let desc = descriptor(pass_id);
        eprintln!(
            "tnc: {} complete, {:.1}ms",
            desc.name,
            elapsed.as_secs_f64() * 1000.0
        );
        eprintln!("tnc:   {}", desc.summary());
    }
    if is_err {
        state.has_error = true;
        return Err(PipelineError {
            failing_pass: pass_id,
        });
    }
    Ok(())
}

// ── Pipeline runner ────────────────────────────────────────────────────────

/// Run the minimal set of passes to produce `terminal`.
///
/// Per-pass sequence: execute → on_pass_complete(callback) → verbose → error check.
pub fn run_pipeline(
    state: &mut CompilationState,
    terminal: PassId,
    verbose: bool,
    mut on_pass_complete: impl FnMut(PassId, &[Diagnostic]),
) -> Result<(), PipelineError> {
    for pass_id in required_passes(terminal) {
        let t = Instant::now();
        let mut diags = Vec::new();
        match pass_id {
            PassId::BuildRegistry => match TensorRegistry::from_graph(&state.graph) {
                Ok(registry) => {
                    if verbose {
                        eprintln!("tnc: registered {} tensors", registry.len());
                    }
                    state.registry = Some(registry);
                }
                Err(e) => diags.push(e.to_diagnostic()),
            },
            PassId::SelectWidth => {
                let n = state.registry.as_ref().map_or(0, TensorRegistry::len);
                let width = select_width(n);
                if verbose {
                    eprintln!("tnc: {} tensors -> {} identifiers", n, width);
                }
                state.width = Some(width);
            }
            PassId::DeriveNames => {
                if let Some(registry) = state.registry.as_ref() {
                    match MacroTable::build(registry) {
                        Ok(table) => state.macros = Some(table),
                        Err(e) => diags.push(e.to_diagnostic()),
                    }
                }
            }
            PassId::Render => {
                if guard_is_rewritten(&state.options.guard) {
                    if let Ok(symbol) = guard_symbol(&state.options.guard) {
                        diags.push(
                            Diagnostic::warning(format!(
                                "header guard '{}' normalized to '{}'",
                                state.options.guard, symbol
                            ))
                            .with_code(codes::W0001),
                        );
                    }
                }
                if let (Some(table), Some(width)) = (state.macros.as_ref(), state.width) {
                    match render_table(table, width, &state.options) {
                        Ok(text) => state.header = Some(text),
                        Err(e) => diags.push(e.to_diagnostic()),
                    }
                }
            }
        }
        finish_pass(
            state,
            pass_id,
            diags,
            t.elapsed(),
            verbose,
            &mut on_pass_complete,
        )?;
    }
    Ok(())
}
