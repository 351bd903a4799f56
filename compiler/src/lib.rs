// tnc — Tensor Name Compiler
//
// Library root. Passes run leaf-first: registry → width → naming → codegen.

pub mod codegen;
pub mod diag;
pub mod dot;
pub mod graph;
pub mod id;
pub mod naming;
pub mod pass;
pub mod pipeline;
pub mod registry;
pub mod width;

pub use codegen::{render, HeaderOptions, RenderError};
pub use naming::derive;
pub use registry::TensorRegistry;
pub use width::{select_width, Width};
