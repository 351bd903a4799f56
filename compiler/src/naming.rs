// naming.rs — Macro name derivation
//
// Maps free-form graph tensor names (`conv1/weight:0`) onto preprocessor
// identifiers, and header-guard tokens onto guard symbols. Both use the same
// character rule: anything outside [A-Za-z0-9_] becomes '_'.
//
// Preconditions: registry built successfully.
// Postconditions: every derived name matches ^[A-Za-z_][A-Za-z0-9_]*$ and the
//                 table is injective over the registry.
// Failure modes: two tensors deriving the same macro name; empty guard token.
// Side effects: none.

use std::collections::HashMap;
use std::fmt;

use crate::diag::{codes, Diagnostic};
use crate::id::TensorIndex;
use crate::registry::TensorRegistry;

/// Prefix applied when a derived name would otherwise start with a digit.
pub const DIGIT_PREFIX: &str = "T_";

/// Prefix applied to every header guard symbol.
pub const GUARD_PREFIX: &str = "_";

// ── Errors ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NamingError {
    /// Two distinct tensors normalize to the same macro name.
    Collision {
        macro_name: String,
        first: String,
        second: String,
    },
    EmptyGuard,
}

impl fmt::Display for NamingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NamingError::Collision {
                macro_name,
                first,
                second,
            } => write!(
                f,
                "tensors '{}' and '{}' both derive macro name '{}'",
                first, second, macro_name
            ),
            NamingError::EmptyGuard => write!(f, "header guard token is empty"),
        }
    }
}

impl std::error::Error for NamingError {}

impl NamingError {
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            NamingError::Collision { first, second, .. } => Diagnostic::error(self.to_string())
                .with_code(codes::E0100)
                .with_note(format!("first tensor: {}", first))
                .with_note(format!("second tensor: {}", second))
                .with_hint("rename one of the tensors in the upstream graph"),
            NamingError::EmptyGuard => Diagnostic::error(self.to_string())
                .with_code(codes::E0003)
                .with_hint("pass a non-empty token with --guard"),
        }
    }
}

// ── Derivation ──────────────────────────────────────────────────────────────

fn sanitize(raw: &str) -> String {
    raw.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Derive the macro name for a symbolic tensor name.
///
/// Pure and total: case is preserved, each illegal character (including each
/// non-ASCII character) becomes one underscore, and names that would start
/// with a digit or be empty get [`DIGIT_PREFIX`].
pub fn derive(symbolic_name: &str) -> String {
    let body = sanitize(symbolic_name);
    match body.chars().next() {
        Some(c) if !c.is_ascii_digit() => body,
        _ => format!("{}{}", DIGIT_PREFIX, body),
    }
}

/// Normalize a header guard token into its guard symbol (`_<TOKEN>`).
///
/// Uses the same character rule as [`derive`], then uppercases. The leading
/// underscore keeps the symbol valid even when the token starts with a digit.
pub fn guard_symbol(token: &str) -> Result<String, NamingError> {
    if token.is_empty() {
        return Err(NamingError::EmptyGuard);
    }
    Ok(format!(
        "{}{}",
        GUARD_PREFIX,
        sanitize(token).to_ascii_uppercase()
    ))
}

/// Returns true when `guard_symbol(token)` differs from `_` + `token`.
pub fn guard_is_rewritten(token: &str) -> bool {
    sanitize(token).to_ascii_uppercase() != token
}

// ── Macro table ─────────────────────────────────────────────────────────────

/// One `#define` line: derived macro name bound to its tensor index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MacroDecl {
    pub macro_name: String,
    pub index: TensorIndex,
    /// Symbolic tensor name the macro was derived from.
    pub tensor: String,
}

/// Derived macro names for a whole registry, in registry order.
#[derive(Debug, Clone)]
pub struct MacroTable {
    decls: Vec<MacroDecl>,
}

impl MacroTable {
    /// Derive every macro name of `registry`, rejecting collisions.
    pub fn build(registry: &TensorRegistry) -> Result<Self, NamingError> {
        let mut owners: HashMap<String, &str> = HashMap::with_capacity(registry.len());
        let mut decls = Vec::with_capacity(registry.len());

        for (index, name) in registry.iter() {
            let macro_name = derive(name);
            if let Some(first) = owners.get(&macro_name) {
                return Err(NamingError::Collision {
                    macro_name,
                    first: first.to_string(),
                    second: name.to_string(),
                });
            }
            owners.insert(macro_name.clone(), name);
            decls.push(MacroDecl {
                macro_name,
                index,
                tensor: name.to_string(),
            });
        }

        Ok(MacroTable { decls })
    }

    pub fn decls(&self) -> &[MacroDecl] {
        &self.decls
    }

    pub fn len(&self) -> usize {
        self.decls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }
}
