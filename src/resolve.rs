//! The Resolver (C4) -- binds AST identifiers to Catalog entries and
//! decides what kind of SMT symbolic each one needs.
//!
//! This stage does not touch the solver itself; it only classifies each
//! identifier so [`crate::synth`] knows what to declare.

use crate::ast::{ArithExpr, BoolExpr};
use crate::catalog::{Catalog, VarType};
use crate::diagnostics::{Diagnostic, DiagnosticKind};
use std::collections::BTreeMap;

/// The SMT sort a resolved identifier needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolicType {
    Int,
    Real,
    Bool,
}

fn from_var_type(t: VarType) -> SymbolicType {
    match t {
        VarType::Int => SymbolicType::Int,
        VarType::Real => SymbolicType::Real,
        VarType::Bool => SymbolicType::Bool,
    }
}

/// One identifier's resolution: either a variable (ranged, solved-for) or
/// a constant (fixed value, still declared so comparisons type-check).
#[derive(Debug, Clone)]
pub struct ResolvedSymbol {
    pub symbol_type: SymbolicType,
    pub range: Option<(f64, f64)>,
    pub fixed: Option<f64>,
    /// `Some(x)` when this symbol is the `_x_` alias produced by folding
    /// `last(x)` -- rendered back as `last(x)` by the encoder.
    pub alias_of: Option<String>,
}

impl ResolvedSymbol {
    pub fn is_constant(&self) -> bool {
        self.fixed.is_some()
    }
}

/// Every identifier referenced by one decision, resolved against the
/// Catalog.
#[derive(Debug, Clone, Default)]
pub struct ResolvedDecision {
    pub symbols: BTreeMap<String, ResolvedSymbol>,
}

/// Resolve every identifier in `decision` against `catalog`.
///
/// Fails the whole decision on the first unresolved identifier -- an
/// incompletely-resolved decision cannot be handed to the synthesizer.
pub fn resolve(
    decision: &BoolExpr,
    catalog: &Catalog,
    module_id: &str,
    decision_index: usize,
) -> Result<ResolvedDecision, Diagnostic> {
    let mut ids = std::collections::BTreeSet::new();
    decision.collect_identifiers(&mut ids);

    let mut symbols = BTreeMap::new();
    for id in ids {
        let resolved = resolve_one(&id, catalog).ok_or_else(|| {
            Diagnostic::new(
                DiagnosticKind::UnresolvedIdentifier,
                module_id,
                Some(decision_index),
                format!("identifier '{id}' is not declared in the catalog"),
            )
        })?;
        symbols.insert(id, resolved);
    }

    for (atom_index, atom) in decision.atoms().into_iter().enumerate() {
        if let BoolExpr::Atom(lhs, _, rhs) = atom {
            if atom_type_mismatch(lhs, rhs, &symbols) {
                return Err(Diagnostic::new(
                    DiagnosticKind::TypeMismatch,
                    module_id,
                    Some(decision_index),
                    format!("atom #{atom_index} compares a boolean operand against a numeric one"),
                ));
            }
        }
    }

    Ok(ResolvedDecision { symbols })
}

/// A side's type for atom compatibility checking: `None` means a boolean
/// identifier was used inside an arithmetic combination (`+ - * /`),
/// which is itself invalid since booleans are not arithmetic. A bare
/// boolean identifier resolves to `Some(Bool)`; anything else (numeric
/// identifiers, literals, `abs`/unary-minus over them) resolves to a
/// generic numeric type -- `Int` vs `Real` are compatible via the
/// division-promotes-to-real rule (§4.5), so only `Bool` vs
/// non-`Bool` is flagged as a mismatch.
fn side_type(expr: &ArithExpr, symbols: &BTreeMap<String, ResolvedSymbol>) -> Option<SymbolicType> {
    if let ArithExpr::Ident(name) = expr {
        return symbols.get(name).map(|s| s.symbol_type);
    }
    let mut ids = std::collections::BTreeSet::new();
    expr.collect_identifiers(&mut ids);
    let has_bool = ids
        .iter()
        .any(|id| symbols.get(id).map(|s| s.symbol_type) == Some(SymbolicType::Bool));
    if has_bool {
        None
    } else {
        Some(SymbolicType::Real)
    }
}

/// True iff `lhs`/`rhs` cannot be compared: either side mixes a boolean
/// identifier into arithmetic, or one side is a bare boolean and the
/// other is numeric.
fn atom_type_mismatch(lhs: &ArithExpr, rhs: &ArithExpr, symbols: &BTreeMap<String, ResolvedSymbol>) -> bool {
    match (side_type(lhs, symbols), side_type(rhs, symbols)) {
        (None, _) | (_, None) => true,
        (Some(SymbolicType::Bool), Some(t)) => t != SymbolicType::Bool,
        (Some(t), Some(SymbolicType::Bool)) => t != SymbolicType::Bool,
        _ => false,
    }
}

fn resolve_one(id: &str, catalog: &Catalog) -> Option<ResolvedSymbol> {
    if let Some(c) = catalog.constant(id) {
        return Some(ResolvedSymbol {
            symbol_type: from_var_type(c.var_type),
            range: None,
            fixed: Some(c.value),
            alias_of: None,
        });
    }
    if let Some(v) = catalog.variable(id) {
        return Some(ResolvedSymbol {
            symbol_type: from_var_type(v.var_type),
            range: v.range,
            fixed: None,
            alias_of: None,
        });
    }
    if id.len() > 2 && id.starts_with('_') && id.ends_with('_') {
        let inner = &id[1..id.len() - 1];
        if let Some(v) = catalog.variable(inner) {
            return Some(ResolvedSymbol {
                symbol_type: from_var_type(v.var_type),
                range: v.range,
                fixed: None,
                alias_of: Some(inner.to_string()),
            });
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{ArithExpr, CmpOp};
    use crate::catalog::{Catalog, VarType, VariableRow};

    fn test_catalog() -> Catalog {
        Catalog::ingest(vec![
            VariableRow {
                name: "A".into(),
                symbol: "A".into(),
                var_type: VarType::Int,
                type_desc: String::new(),
                initial: None,
                comment: String::new(),
                flag: String::new(),
                min: Some(0.0),
                max: Some(10.0),
            },
            VariableRow {
                name: "H".into(),
                symbol: "H".into(),
                var_type: VarType::Real,
                type_desc: String::new(),
                initial: None,
                comment: String::new(),
                flag: String::new(),
                min: Some(0.0),
                max: Some(100.0),
            },
            VariableRow {
                name: "K".into(),
                symbol: "K".into(),
                var_type: VarType::Real,
                type_desc: String::new(),
                initial: Some(0.5),
                comment: String::new(),
                flag: String::new(),
                min: None,
                max: None,
            },
        ])
        .unwrap()
    }

    #[test]
    fn resolves_plain_variable() {
        let catalog = test_catalog();
        let decision = BoolExpr::Atom(ArithExpr::Ident("A".into()), CmpOp::Gt, ArithExpr::Number(3.0));
        let resolved = resolve(&decision, &catalog, "M1", 0).unwrap();
        let a = &resolved.symbols["A"];
        assert_eq!(a.symbol_type, SymbolicType::Int);
        assert_eq!(a.range, Some((0.0, 10.0)));
        assert!(!a.is_constant());
    }

    #[test]
    fn resolves_promoted_constant() {
        let catalog = test_catalog();
        let decision = BoolExpr::Atom(ArithExpr::Ident("K".into()), CmpOp::Ge, ArithExpr::Number(0.1));
        let resolved = resolve(&decision, &catalog, "M1", 0).unwrap();
        let k = &resolved.symbols["K"];
        assert!(k.is_constant());
        assert_eq!(k.fixed, Some(0.5));
    }

    #[test]
    fn resolves_last_alias_reusing_range() {
        let catalog = test_catalog();
        let decision = BoolExpr::Atom(
            ArithExpr::Bin(
                crate::ast::ArithOp::Sub,
                Box::new(ArithExpr::Ident("_H_".into())),
                Box::new(ArithExpr::Ident("H".into())),
            ),
            CmpOp::Gt,
            ArithExpr::Number(2.0),
        );
        let resolved = resolve(&decision, &catalog, "M1", 0).unwrap();
        let alias = &resolved.symbols["_H_"];
        assert_eq!(alias.alias_of.as_deref(), Some("H"));
        assert_eq!(alias.range, Some((0.0, 100.0)));
    }

    #[test]
    fn unresolved_identifier_is_an_error() {
        let catalog = test_catalog();
        let decision = BoolExpr::Atom(ArithExpr::Ident("UNKNOWN".into()), CmpOp::Gt, ArithExpr::Number(0.0));
        assert!(resolve(&decision, &catalog, "M1", 0).is_err());
    }

    #[test]
    fn bool_compared_against_numeric_is_a_type_mismatch() {
        let catalog = Catalog::ingest(vec![VariableRow {
            name: "FLAG".into(),
            symbol: "FLAG".into(),
            var_type: VarType::Bool,
            type_desc: String::new(),
            initial: None,
            comment: String::new(),
            flag: String::new(),
            min: None,
            max: None,
        }])
        .unwrap();
        let decision = BoolExpr::Atom(ArithExpr::Ident("FLAG".into()), CmpOp::Gt, ArithExpr::Number(3.0));
        let err = resolve(&decision, &catalog, "M1", 0).unwrap_err();
        assert_eq!(err.kind, DiagnosticKind::TypeMismatch);
    }

    #[test]
    fn bool_compared_against_bool_is_not_a_mismatch() {
        let catalog = Catalog::ingest(vec![
            VariableRow {
                name: "A".into(),
                symbol: "A".into(),
                var_type: VarType::Bool,
                type_desc: String::new(),
                initial: None,
                comment: String::new(),
                flag: String::new(),
                min: None,
                max: None,
            },
            VariableRow {
                name: "B".into(),
                symbol: "B".into(),
                var_type: VarType::Bool,
                type_desc: String::new(),
                initial: None,
                comment: String::new(),
                flag: String::new(),
                min: None,
                max: None,
            },
        ])
        .unwrap();
        let decision = BoolExpr::Atom(ArithExpr::Ident("A".into()), CmpOp::Eq, ArithExpr::Ident("B".into()));
        assert!(resolve(&decision, &catalog, "M1", 0).is_ok());
    }
}
