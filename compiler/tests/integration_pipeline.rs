// Integration tests for the `tnc` command-line driver.
//
// These tests spawn the built binary and verify:
// - each --emit target produces its artifact
// - compile errors exit with status 1 and print coded diagnostics
// - --output-node prunes the graph before indices are assigned

use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::sync::atomic::{AtomicUsize, Ordering};

fn tnc_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_tnc"))
}

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Unique counter for temp file names (avoids collisions in parallel tests).
static COUNTER: AtomicUsize = AtomicUsize::new(0);

fn run_tnc(args: &[&str]) -> Output {
    Command::new(tnc_binary())
        .args(args)
        .output()
        .expect("failed to run tnc")
}

fn stdout_of(output: &Output) -> String {
    assert!(
        output.status.success(),
        "tnc failed\nstderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout.clone()).expect("non-UTF8 output")
}

#[test]
fn emit_header_from_name_list() {
    let model = fixture("model.txt");
    let out = run_tnc(&[model.to_str().unwrap(), "--guard", "MODEL_H"]);
    assert_eq!(
        stdout_of(&out),
        "#ifndef _MODEL_H\n\
         #define _MODEL_H\n\
         //typedef uchar TName;\n\
         #define conv1_weight 0\n\
         #define conv1_bias 1\n\
         #define fc_logits 2\n\
         #endif // _MODEL_H\n"
    );
}

#[test]
fn emit_header_to_file() {
    let model = fixture("model.txt");
    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
    let path = std::env::temp_dir().join(format!("tnc_header_{}_{}.hpp", std::process::id(), n));
    let out = run_tnc(&[
        model.to_str().unwrap(),
        "--guard",
        "MODEL_H",
        "-o",
        path.to_str().unwrap(),
    ]);
    assert!(out.status.success());
    assert!(out.stdout.is_empty(), "header should not go to stdout");
    let written = std::fs::read_to_string(&path).expect("header written");
    let _ = std::fs::remove_file(&path);
    assert!(written.contains("#define fc_logits 2\n"));
}

#[test]
fn empty_name_list_gives_guard_only_header() {
    let empty = fixture("empty.txt");
    let text = stdout_of(&run_tnc(&[empty.to_str().unwrap(), "--guard", "EMPTY_H"]));
    assert_eq!(text.matches("#define").count(), 1);
    assert!(text.ends_with("#endif // _EMPTY_H\n"));
}

#[test]
fn collision_exits_with_diagnostic() {
    let collision = fixture("collision.txt");
    let out = run_tnc(&[collision.to_str().unwrap(), "--guard", "G"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(out.stdout.is_empty(), "no partial header on failure");
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("error[E0100]"), "stderr: {}", stderr);
    assert!(stderr.contains("a/b") && stderr.contains("a:b"), "stderr: {}", stderr);
}

#[test]
fn empty_guard_exits_with_diagnostic() {
    let model = fixture("model.txt");
    let out = run_tnc(&[model.to_str().unwrap(), "--guard", ""]);
    assert_eq!(out.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("error[E0003]"), "stderr: {}", stderr);
}

#[test]
fn rewritten_guard_warns() {
    let model = fixture("model.txt");
    let out = run_tnc(&[model.to_str().unwrap(), "--guard", "model.h"]);
    let text = stdout_of(&out);
    assert!(text.starts_with("#ifndef _MODEL_H\n"));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("warning[W0001]"), "stderr: {}", stderr);
}

#[test]
fn missing_input_exits_2() {
    let out = run_tnc(&["/nonexistent/graph.json", "--guard", "G"]);
    assert_eq!(out.status.code(), Some(2));
}

#[test]
fn json_graph_with_output_node_is_pruned() {
    let mnist = fixture("mnist.json");
    let mnist = mnist.to_str().unwrap();
    let full = stdout_of(&run_tnc(&[mnist, "--guard", "MNIST_H"]));
    let pruned = stdout_of(&run_tnc(&[
        mnist,
        "--guard",
        "MNIST_H",
        "--output-node",
        "fc/logits",
    ]));
    assert!(full.contains("summary_histogram_0"));
    assert!(!pruned.contains("summary_histogram_0"));
    assert!(pruned.contains("#define fc_logits_0 6\n"));
}

#[test]
fn unknown_output_node_is_error() {
    let mnist = fixture("mnist.json");
    let out = run_tnc(&[
        mnist.to_str().unwrap(),
        "--guard",
        "G",
        "--output-node",
        "nope",
    ]);
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("error[E0202]"));
}

#[test]
fn output_node_rejected_for_name_list() {
    let model = fixture("model.txt");
    let out = run_tnc(&[
        model.to_str().unwrap(),
        "--guard",
        "G",
        "--output-node",
        "conv1/bias",
    ]);
    assert_eq!(out.status.code(), Some(1));
    assert!(out.stdout.is_empty(), "no header when pruning is impossible");
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("error[E0203]"), "stderr: {}", stderr);
}

#[test]
fn format_flag_overrides_extension() {
    let model = fixture("model.txt");
    let out = run_tnc(&[model.to_str().unwrap(), "--guard", "G", "--format", "json"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("error[E0200]"));
}

#[test]
fn emit_tensors_lists_index_macro_and_name() {
    let model = fixture("model.txt");
    let text = stdout_of(&run_tnc(&[
        model.to_str().unwrap(),
        "--guard",
        "G",
        "--emit",
        "tensors",
    ]));
    assert_eq!(
        text,
        "0\tconv1_weight\tconv1/weight\n1\tconv1_bias\tconv1/bias\n2\tfc_logits\tfc/logits\n"
    );
}

#[test]
fn emit_dot_draws_graph() {
    let mnist = fixture("mnist.json");
    let text = stdout_of(&run_tnc(&[
        mnist.to_str().unwrap(),
        "--guard",
        "G",
        "--emit",
        "dot",
    ]));
    assert!(text.starts_with("digraph frozen {\n"));
    assert!(text.contains("\"fc/weight\" -> \"fc/logits\" [label=\"fc/weight:0 [6]\"];"));
}

#[test]
fn emit_dot_reports_duplicate_tensor() {
    let dup = fixture("duplicate_tensor.json");
    let out = run_tnc(&[dup.to_str().unwrap(), "--guard", "G", "--emit", "dot"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(out.stdout.is_empty(), "no graph drawn for an invalid registry");
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("error[E0001]"), "stderr: {}", stderr);
    assert!(stderr.contains("'t'"), "stderr: {}", stderr);
}

#[test]
fn emit_build_info_is_json() {
    let model = fixture("model.txt");
    let text = stdout_of(&run_tnc(&[
        model.to_str().unwrap(),
        "--guard",
        "MODEL_H",
        "--emit",
        "build-info",
    ]));
    let info: serde_json::Value = serde_json::from_str(&text).expect("valid JSON");
    assert_eq!(info["tensor_count"], 3);
    assert_eq!(info["width"], "u8");
    assert_eq!(info["guard"], "_MODEL_H");
    assert_eq!(info["source_hash"].as_str().map(str::len), Some(64));
}

#[test]
fn verbose_reports_pass_timing() {
    let model = fixture("model.txt");
    let out = run_tnc(&[model.to_str().unwrap(), "--guard", "G", "--verbose"]);
    assert!(out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    for pass in ["build_registry", "select_width", "derive_names", "render"] {
        assert!(
            stderr.contains(&format!("tnc: {} complete", pass)),
            "missing {} in stderr: {}",
            pass,
            stderr
        );
    }
    assert!(
        stderr.contains("tnc:   produces Macros; macro names are valid identifiers and injective"),
        "missing pass summary in stderr: {}",
        stderr
    );
}
