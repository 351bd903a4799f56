use clap::Parser;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use tnc::codegen::HeaderOptions;
use tnc::graph::{FrozenGraph, GraphError, GraphFormat};
use tnc::pass::PassId;
use tnc::pipeline::{compute_provenance, run_pipeline, CompilationState};
use tnc::registry::TensorRegistry;

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum EmitStage {
    Header,
    Tensors,
    Dot,
    BuildInfo,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum InputFormat {
    Json,
    Names,
}

impl From<InputFormat> for GraphFormat {
    fn from(f: InputFormat) -> Self {
        match f {
            InputFormat::Json => GraphFormat::Json,
            InputFormat::Names => GraphFormat::Names,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "tnc",
    version,
    about = "Tensor Name Compiler — compiles frozen computation graphs to tensor index headers"
)]
struct Cli {
    /// Input frozen graph (.json graph or tensor-name list)
    graph: PathBuf,

    /// Header guard token (uppercased, prefixed with `_`)
    #[arg(short, long)]
    guard: String,

    /// Output file path (`-` for stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Input format (default: by file extension)
    #[arg(long, value_enum)]
    format: Option<InputFormat>,

    /// Prune the graph to the ops these output nodes depend on (repeatable)
    #[arg(long = "output-node")]
    output_nodes: Vec<String>,

    /// Output stage
    #[arg(long, value_enum, default_value_t = EmitStage::Header)]
    emit: EmitStage,

    /// Print compiler passes and timing
    #[arg(long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    if cli.verbose {
        eprintln!("tnc: graph  = {}", cli.graph.display());
        eprintln!("tnc: guard  = {}", cli.guard);
        eprintln!("tnc: emit   = {:?}", cli.emit);
    }

    // ── Load graph ──
    let source = match std::fs::read_to_string(&cli.graph) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("tnc: error: {}: {}", cli.graph.display(), e);
            std::process::exit(2);
        }
    };

    let format = cli
        .format
        .map(GraphFormat::from)
        .unwrap_or_else(|| GraphFormat::from_path(&cli.graph));
    let mut graph = match FrozenGraph::parse(&source, format) {
        Ok(g) => g,
        Err(e) => {
            eprintln!("tnc: {}", e.to_diagnostic());
            std::process::exit(1);
        }
    };

    if !cli.output_nodes.is_empty() {
        if !format.supports_pruning() {
            let e = GraphError::PruneWithoutEdges {
                output_nodes: cli.output_nodes.clone(),
            };
            eprintln!("tnc: {}", e.to_diagnostic());
            std::process::exit(1);
        }
        graph = match graph.prune_to(&cli.output_nodes) {
            Ok(g) => g,
            Err(e) => {
                eprintln!("tnc: {}", e.to_diagnostic());
                std::process::exit(1);
            }
        };
    }

    if cli.verbose {
        eprintln!(
            "tnc: loaded {} ops, {} tensors",
            graph.ops.len(),
            graph.tensor_count()
        );
    }

    // ── Emit ──
    let text = match cli.emit {
        EmitStage::Dot => match TensorRegistry::from_graph(&graph) {
            Ok(registry) => tnc::dot::emit_dot(&graph, Some(&registry)),
            Err(e) => {
                eprintln!("tnc: {}", e.to_diagnostic());
                std::process::exit(1);
            }
        },
        EmitStage::Header => {
            let state = run_passes(graph, &cli.guard, PassId::Render, cli.verbose);
            state.header.unwrap_or_default()
        }
        EmitStage::Tensors => {
            let state = run_passes(graph, &cli.guard, PassId::DeriveNames, cli.verbose);
            tensor_table(&state)
        }
        EmitStage::BuildInfo => {
            let state = run_passes(graph, &cli.guard, PassId::Render, cli.verbose);
            match compute_provenance(&source, &state).map(|p| p.to_json()) {
                Some(Ok(json)) => json,
                Some(Err(e)) => {
                    eprintln!("tnc: error: build-info: {}", e);
                    std::process::exit(2);
                }
                None => {
                    eprintln!("tnc: error: build-info unavailable");
                    std::process::exit(1);
                }
            }
        }
    };
    write_output(cli.output.as_deref(), &text);
}

/// Run passes up to `terminal`, printing diagnostics as each pass completes.
/// Exits with status 1 if any pass reports an error.
fn run_passes(
    graph: FrozenGraph,
    guard: &str,
    terminal: PassId,
    verbose: bool,
) -> CompilationState {
    let mut state = CompilationState::new(graph, HeaderOptions::new(guard));
    let result = run_pipeline(&mut state, terminal, verbose, |_, diags| {
        for d in diags {
            eprintln!("tnc: {}", d);
        }
    });
    if result.is_err() {
        std::process::exit(1);
    }
    state
}

/// `index\tmacro\tname` per tensor, in registry order.
fn tensor_table(state: &CompilationState) -> String {
    let mut out = String::new();
    if let Some(macros) = state.macros.as_ref() {
        for decl in macros.decls() {
            let _ = writeln!(out, "{}\t{}\t{}", decl.index, decl.macro_name, decl.tensor);
        }
    }
    out
}

fn write_output(path: Option<&Path>, text: &str) {
    match path {
        Some(p) if p != Path::new("-") => {
            if let Err(e) = std::fs::write(p, text) {
                eprintln!("tnc: error: {}: {}", p.display(), e);
                std::process::exit(2);
            }
        }
        _ => print!("{}", text),
    }
}
