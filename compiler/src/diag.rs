// diag.rs — Unified diagnostics model
//
// Provides the shared diagnostic type every compiler pass reports through,
// plus the table of stable diagnostic codes.
//
// Preconditions: none (types only).
// Postconditions: none (types only).
// Failure modes: none.
// Side effects: none.

use std::fmt;

// ── Diagnostic code ──────────────────────────────────────────────────────

/// A stable diagnostic code (e.g., `E0001`, `W0001`).
///
/// Once assigned, a code must never be reassigned to a different semantic
/// meaning: build scripts grep for them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DiagCode(pub &'static str);

impl fmt::Display for DiagCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub mod codes {
    use super::DiagCode;

    // Input contract
    pub const E0001: DiagCode = DiagCode("E0001"); // duplicate tensor name
    pub const E0002: DiagCode = DiagCode("E0002"); // empty tensor name
    pub const E0003: DiagCode = DiagCode("E0003"); // empty header guard

    // Name derivation
    pub const E0100: DiagCode = DiagCode("E0100"); // macro name collision
    pub const E0101: DiagCode = DiagCode("E0101"); // macro name shadows guard symbol

    // Graph loading
    pub const E0200: DiagCode = DiagCode("E0200"); // malformed graph input
    pub const E0201: DiagCode = DiagCode("E0201"); // duplicate op name
    pub const E0202: DiagCode = DiagCode("E0202"); // unknown output node
    pub const E0203: DiagCode = DiagCode("E0203"); // output nodes given for a name list

    // Warnings
    pub const W0001: DiagCode = DiagCode("W0001"); // header guard rewritten
}

// ── Severity level ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagLevel {
    Error,
    Warning,
}

// ── Diagnostic ───────────────────────────────────────────────────────────

/// A compiler diagnostic emitted by any pass.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub code: Option<DiagCode>,
    pub level: DiagLevel,
    pub message: String,
    pub hint: Option<String>,
    /// Secondary context lines, e.g. the other tensor involved in a clash.
    pub notes: Vec<String>,
}

impl Diagnostic {
    /// Create a new diagnostic with no code, hint, or notes.
    pub fn new(level: DiagLevel, message: impl Into<String>) -> Self {
        Self {
            code: None,
            level,
            message: message.into(),
            hint: None,
            notes: Vec::new(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(DiagLevel::Error, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(DiagLevel::Warning, message)
    }

    /// Attach a stable diagnostic code.
    pub fn with_code(mut self, code: DiagCode) -> Self {
        self.code = Some(code);
        self
    }

    /// Attach a remediation hint.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    /// Attach a context note.
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.level == DiagLevel::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.level {
            DiagLevel::Error => "error",
            DiagLevel::Warning => "warning",
        };
        if let Some(code) = &self.code {
            write!(f, "{}[{}]: {}", level, code, self.message)?;
        } else {
            write!(f, "{}: {}", level, self.message)?;
        }
        for note in &self.notes {
            write!(f, "\n  note: {}", note)?;
        }
        if let Some(hint) = &self.hint {
            write!(f, "\n  hint: {}", hint)?;
        }
        Ok(())
    }
}
