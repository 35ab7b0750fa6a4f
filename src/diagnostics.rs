//! Non-fatal synthesis diagnostics.
//!
//! Resolution errors, parse errors, infeasible atoms, type mismatches, and
//! solver timeouts never abort a run; each is recorded here and the
//! enclosing decision or atom is simply skipped.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of non-fatal failure encountered during synthesis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiagnosticKind {
    /// An identifier in a decision matched neither a Catalog entry nor a
    /// module input/output.
    UnresolvedIdentifier,
    /// A decision's text could not be parsed (malformed syntax or
    /// unbalanced brackets).
    ParseError,
    /// Either leg of an atom's independence-pair solve returned unsat
    /// (includes solver timeout/unknown).
    InfeasibleAtom,
    /// An atom compared operands of incompatible types (e.g. bool vs
    /// real).
    TypeMismatch,
    /// An atom compares only constants and is excluded as a flip
    /// candidate (not an error, but reported for visibility).
    ConstantAtom,
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DiagnosticKind::UnresolvedIdentifier => "unresolved identifier",
            DiagnosticKind::ParseError => "parse error",
            DiagnosticKind::InfeasibleAtom => "infeasible atom",
            DiagnosticKind::TypeMismatch => "type mismatch",
            DiagnosticKind::ConstantAtom => "constant atom",
        };
        write!(f, "{s}")
    }
}

/// One non-fatal event raised during synthesis of a module.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub module_id: String,
    /// Index of the decision within the module's formula, in extraction
    /// order. `None` when the diagnostic precedes decision extraction.
    pub decision_index: Option<usize>,
    pub detail: String,
}

impl Diagnostic {
    pub fn new(
        kind: DiagnosticKind,
        module_id: impl Into<String>,
        decision_index: Option<usize>,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            module_id: module_id.into(),
            decision_index,
            detail: detail.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.decision_index {
            Some(idx) => write!(
                f,
                "[{}] decision #{idx}: {} - {}",
                self.module_id, self.kind, self.detail
            ),
            None => write!(f, "[{}]: {} - {}", self.module_id, self.kind, self.detail),
        }
    }
}
