// Production-quality lints
#![warn(
    clippy::todo,
    clippy::unimplemented,
    clippy::dbg_macro,
    clippy::print_stdout,
    clippy::print_stderr
)]
// Deny truly dangerous patterns
#![deny(clippy::mem_forget)]
// Allow common patterns in library code
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]

//! # mcdc_synth — MCDC test-case synthesizer
//!
//! Ingests a module's conditional pseudo-code (an `if (C) { T } else { F }`
//! formula) and a catalog of typed input/output variables, then
//! synthesizes a test-case suite satisfying Modified Condition/Decision
//! Coverage (MCDC) for every decision `C`. For each atomic condition
//! inside `C` it produces a pair of concrete variable assignments that
//! (a) differ only in that atom's truth value and (b) flip the overall
//! decision — an *independence pair*.
//!
//! ## Pipeline
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │  Catalog (C1)         Module (inputs/outputs/formula text)       │
//! │      │                        │                                  │
//! │      │                        ▼                                  │
//! │      │                 extract (C5) ── splits "if (C) {T} else {F}"
//! │      │                        │
//! │      │                        ▼
//! │      │                 normalize (C2) ── canonical operator text
//! │      │                        │
//! │      │                        ▼
//! │      │                 parse (C3) ── typed BoolExpr/ArithExpr AST
//! │      │                        │
//! │      ▼                        ▼
//! │   resolve (C4) ── binds AST identifiers to Catalog entries
//! │      │
//! │      ▼
//! │   synthesize (C6) ── Z3 independence-pair search, per atom
//! │      │
//! │      ▼
//! │   encode (C7) ── renders witnesses + expected True/False
//! │      │
//! │      ▼
//! │   emit (C8) ── TestRecord accumulation, per-module order
//! │      │
//! │      ▼
//! │   report ── CSV rendering (stand-in for the Excel Report Writer)
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Out of scope
//!
//! Ingest from office documents/spreadsheets and Excel rendering of the
//! final matrix are external collaborators in the real system; this
//! crate's [`catalog::load_catalog`]/[`module::load_modules`] and
//! [`report::write_report`] stand in for them over JSON/CSV so the
//! pipeline is runnable end to end without those dependencies. The core
//! itself — extraction through emission — never depends on them.
//!
//! ## Determinism
//!
//! Synthesis is single-threaded: one module, then one decision, then one
//! atom at a time. A fixed input always yields the same output bytes —
//! see [`synth`]'s midpoint-tightening pass for how unconstrained
//! variables are pinned deterministically rather than left to whatever
//! value the solver's internal search happens to settle on.

pub mod ast;
pub mod catalog;
pub mod config;
pub mod diagnostics;
pub mod emit;
pub mod encode;
pub mod error;
pub mod extract;
pub mod lexer;
pub mod module;
pub mod parser;
pub mod pipeline;
pub mod report;
pub mod resolve;
pub mod synth;

pub use ast::{ArithExpr, ArithOp, BoolExpr, CmpOp, Rational};
pub use catalog::{load_catalog, Catalog, Constant, VarType, Variable, VariableRow};
pub use config::SynthesisConfig;
pub use diagnostics::{Diagnostic, DiagnosticKind};
pub use emit::{Emitter, TestRecord};
pub use error::{Error, Result};
pub use module::{load_modules, Module};
pub use pipeline::{run_all, run_module};
pub use report::write_report;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
