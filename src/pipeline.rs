//! Wires the pipeline stages together: `(Module, Catalog) -> extract ->
//! normalize -> parse -> resolve -> synthesize -> encode -> emit`.
//!
//! This is the only module that knows about every stage; each stage
//! above stays independently testable and ignorant of its neighbors.

use crate::catalog::Catalog;
use crate::config::SynthesisConfig;
use crate::diagnostics::Diagnostic;
use crate::emit::{Emitter, TestRecord};
use crate::encode::{encode_assignment, encode_expected_result};
use crate::extract;
use crate::lexer::normalize;
use crate::module::Module;
use crate::parser::parse_decision;
use crate::resolve::resolve;
use crate::synth::synthesize;

/// Run the full pipeline over one module, returning every test record it
/// produced plus every non-fatal diagnostic raised along the way.
pub fn run_module(module: &Module, catalog: &Catalog, config: &SynthesisConfig) -> (Vec<TestRecord>, Vec<Diagnostic>) {
    let mut emitter = Emitter::new();
    let mut diagnostics = Vec::new();

    let (decisions, extract_diags) = extract::extract_decisions(&module.formula, &module.id);
    diagnostics.extend(extract_diags);

    for (decision_index, decision) in decisions.iter().enumerate() {
        let canonical = normalize(&decision.raw_text);

        let ast = match parse_decision(&canonical) {
            Ok(ast) => ast,
            Err(e) => {
                diagnostics.push(Diagnostic::new(
                    crate::diagnostics::DiagnosticKind::ParseError,
                    module.id.clone(),
                    Some(decision_index),
                    e.to_string(),
                ));
                continue;
            }
        };

        let resolved = match resolve(&ast, catalog, &module.id, decision_index) {
            Ok(resolved) => resolved,
            Err(diag) => {
                diagnostics.push(diag);
                continue;
            }
        };

        let (pairs, synth_diags) = synthesize(&ast, &resolved, config, &module.id, decision_index);
        diagnostics.extend(synth_diags);

        for pair in &pairs {
            for witness in [&pair.witness_true, &pair.witness_false] {
                let assignment = encode_assignment(witness, &resolved, config.real_precision);
                let expected_result = encode_expected_result(&ast, witness).unwrap_or("False").to_string();
                emitter.push(TestRecord {
                    requirement_id: module.id.clone(),
                    module_name: module.name.clone(),
                    precondition: module.precondition.clone(),
                    decision_text: decision.raw_text.clone(),
                    assignment,
                    expected_result,
                    then_block: decision.then_block.clone(),
                    else_block: decision.else_block.clone(),
                });
            }
        }
    }

    (emitter.into_records(), diagnostics)
}

/// Run the pipeline over every module in the catalog's run, concatenating
/// records and diagnostics in module order.
pub fn run_all(modules: &[Module], catalog: &Catalog, config: &SynthesisConfig) -> (Vec<TestRecord>, Vec<Diagnostic>) {
    let mut records = Vec::new();
    let mut diagnostics = Vec::new();
    for module in modules {
        let (module_records, module_diags) = run_module(module, catalog, config);
        records.extend(module_records);
        diagnostics.extend(module_diags);
    }
    (records, diagnostics)
}
