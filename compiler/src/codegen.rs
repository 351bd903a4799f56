// codegen.rs — Tensor name header generation
//
// Serializes a registry, its selected identifier width, and a header guard
// into include-guarded preprocessor declarations:
//
//     #ifndef _<GUARD>
//     #define _<GUARD>
//     //typedef uchar TName;
//     #define <MACRO_0> 0
//     ...
//     #endif // _<GUARD>
//
// Preconditions: registry built successfully; width selected for it.
// Postconditions: returns the complete header text, byte-identical for
//                 identical inputs. Nothing is returned on failure.
// Failure modes: empty guard token, macro collisions, a macro shadowing the
//                guard symbol.
// Side effects: none.

use std::fmt;
use std::fmt::Write as _;

use crate::diag::{codes, Diagnostic};
use crate::naming::{guard_symbol, MacroTable, NamingError};
use crate::registry::TensorRegistry;
use crate::width::Width;

// ── Public types ────────────────────────────────────────────────────────────

/// Caller-supplied header configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderOptions {
    /// Guard token; normalized and prefixed with `_`.
    pub guard: String,
}

impl HeaderOptions {
    pub fn new(guard: impl Into<String>) -> Self {
        HeaderOptions {
            guard: guard.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    Naming(NamingError),
    GuardShadowed { guard: String, tensor: String },
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::Naming(e) => write!(f, "{}", e),
            RenderError::GuardShadowed { guard, tensor } => write!(
                f,
                "tensor '{}' derives macro name '{}', which is the header guard symbol",
                tensor, guard
            ),
        }
    }
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RenderError::Naming(e) => Some(e),
            RenderError::GuardShadowed { .. } => None,
        }
    }
}

impl From<NamingError> for RenderError {
    fn from(e: NamingError) -> Self {
        RenderError::Naming(e)
    }
}

impl RenderError {
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            RenderError::Naming(e) => e.to_diagnostic(),
            RenderError::GuardShadowed { .. } => Diagnostic::error(self.to_string())
                .with_code(codes::E0101)
                .with_hint("choose a different --guard token"),
        }
    }
}

// ── Public entry points ─────────────────────────────────────────────────────

/// Render the header for `registry`.
///
/// Derives the macro table itself; collisions surface as
/// [`RenderError::Naming`].
pub fn render(
    registry: &TensorRegistry,
    width: Width,
    header_guard: &str,
) -> Result<String, RenderError> {
    let guard = guard_symbol(header_guard)?;
    let table = MacroTable::build(registry)?;
    render_symbol(&table, width, &guard)
}

/// Render from an already-derived macro table.
pub fn render_table(
    table: &MacroTable,
    width: Width,
    options: &HeaderOptions,
) -> Result<String, RenderError> {
    let guard = guard_symbol(&options.guard)?;
    render_symbol(table, width, &guard)
}

fn render_symbol(table: &MacroTable, width: Width, guard: &str) -> Result<String, RenderError> {
    if let Some(decl) = table.decls().iter().find(|d| d.macro_name == guard) {
        return Err(RenderError::GuardShadowed {
            guard: guard.to_string(),
            tensor: decl.tensor.clone(),
        });
    }

    let mut out = String::new();
    let _ = writeln!(out, "#ifndef {}", guard);
    let _ = writeln!(out, "#define {}", guard);
    let _ = writeln!(out, "//typedef {} TName;", width.c_type());
    for decl in table.decls() {
        let _ = writeln!(out, "#define {} {}", decl.macro_name, decl.index);
    }
    let _ = writeln!(out, "#endif // {}", guard);
    Ok(out)
}
