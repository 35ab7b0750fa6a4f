//! The MCDC Synthesizer (C6) -- the heart of the system.
//!
//! For each atom `a_i` in a decision `D`, this drives Z3 through the
//! two-step "freeze the others from the first model" procedure:
//!
//! 1. Assert `a_i`, `D`. Solve -> witness `M+`.
//! 2. Assert `!a_i`, every other atom's truth frozen to its value under
//!    `M+`, `!D`. Solve -> witness `M-`.
//!
//! Freezing the other atoms' truth (not their raw variable values) from
//! the *first* model, rather than asserting a single combined formula, is
//! what gives the pair the unique-cause property: `M+` and `M-` are
//! guaranteed to disagree on every other atom by construction, not by
//! chance.
//!
//! One [`Context`]/[`Solver`] pair is built per decision and reused
//! across all of its atoms with `push`/`pop` scoping, following
//! `VerificationContext::check_valid`'s push-assert-check-pop idiom
//! (`logicaffeine_verify::solver`). Range constraints are asserted
//! once, globally, before the atom loop starts; everything else is
//! scoped to the current atom's `push` level.
//!
//! Step 2's "read each other atom's truth off `M+`" re-evaluation uses
//! [`BoolExpr::eval_exact`] over `M+`'s exact [`Rational`] witness, not
//! `f64` -- a witness produced by the midpoint-tightening pass below can
//! sit exactly on a comparison boundary, and rounding it through `f64`
//! before re-evaluating the other atoms could assert the wrong polarity
//! back into the solver.

use crate::ast::{ArithExpr, ArithOp, BoolExpr, CmpOp, Rational};
use crate::config::SynthesisConfig;
use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::resolve::{ResolvedDecision, ResolvedSymbol, SymbolicType};
use std::collections::{BTreeMap, HashMap};
use z3::ast::{Ast, Bool, Dynamic, Int, Real};
use z3::{Config, Context, SatResult, Solver};

/// One concrete numeric/boolean value from a witness model, kept exact
/// rather than collapsed to `f64` so the encoder can render reals to
/// decimal without the precision loss a string-sliced approximation
/// would introduce.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WitnessValue {
    Int(i64),
    /// Exact rational, `numerator / denominator`, `denominator > 0`.
    Real(i64, i64),
    Bool(bool),
}

impl WitnessValue {
    pub fn as_f64(&self) -> f64 {
        match *self {
            WitnessValue::Int(i) => i as f64,
            WitnessValue::Real(n, d) => n as f64 / d as f64,
            WitnessValue::Bool(b) => {
                if b {
                    1.0
                } else {
                    0.0
                }
            }
        }
    }

    /// The same value as an exact [`Rational`], never rounded through
    /// `f64` -- what [`BoolExpr::eval_exact`] must be fed wherever a
    /// witness's truth value has to be computed correctly.
    pub fn as_rational(&self) -> Rational {
        match *self {
            WitnessValue::Int(i) => Rational::from_int(i),
            WitnessValue::Real(n, d) => Rational::new(n, d),
            WitnessValue::Bool(b) => Rational::from_int(if b { 1 } else { 0 }),
        }
    }
}

pub type Witness = BTreeMap<String, WitnessValue>;

/// An independence pair for one atom.
#[derive(Debug, Clone)]
pub struct IndependencePair {
    pub atom_index: usize,
    pub witness_true: Witness,
    pub witness_false: Witness,
}

/// Run the MCDC synthesis procedure over every candidate atom of
/// `decision`.
pub fn synthesize(
    decision: &BoolExpr,
    resolved: &ResolvedDecision,
    config: &SynthesisConfig,
    module_id: &str,
    decision_index: usize,
) -> (Vec<IndependencePair>, Vec<Diagnostic>) {
    let atoms = decision.atoms();
    let mut pairs = Vec::new();
    let mut diagnostics = Vec::new();

    let mut cfg = Config::new();
    cfg.set_param_value("timeout", &config.solver_timeout_ms.to_string());
    let ctx = Context::new(&cfg);
    let solver = Solver::new(&ctx);

    let mut vars: HashMap<String, Dynamic> = HashMap::new();
    for (name, sym) in &resolved.symbols {
        vars.insert(name.clone(), declare_symbol(&ctx, name, sym));
    }
    for (name, sym) in &resolved.symbols {
        if let Some(range_constraint) = range_bound(&ctx, &vars, name, sym) {
            solver.assert(&range_constraint);
        }
    }

    let decision_bool = encode_bool(&ctx, decision, &vars, &resolved.symbols);

    for (i, atom) in atoms.iter().enumerate() {
        if atom.is_constant_atom() {
            diagnostics.push(Diagnostic::new(
                DiagnosticKind::ConstantAtom,
                module_id,
                Some(decision_index),
                format!("atom #{i} compares only constants and cannot be flipped"),
            ));
            continue;
        }

        let atom_bool = encode_bool(&ctx, atom, &vars, &resolved.symbols);

        solver.push();
        solver.assert(&atom_bool);
        solver.assert(&decision_bool);
        let witness_true = if solver.check() == SatResult::Sat {
            Some(tighten_and_extract(&ctx, &solver, &vars, &resolved.symbols, config))
        } else {
            None
        };
        solver.pop(1);

        let Some(witness_true) = witness_true else {
            diagnostics.push(Diagnostic::new(
                DiagnosticKind::InfeasibleAtom,
                module_id,
                Some(decision_index),
                format!("atom #{i}: no model makes the atom and the decision both true"),
            ));
            continue;
        };

        let witness_true_exact: HashMap<String, Rational> = witness_true
            .iter()
            .map(|(k, v)| (k.clone(), v.as_rational()))
            .collect();

        solver.push();
        solver.assert(&atom_bool.not());
        for (j, other) in atoms.iter().enumerate() {
            if j == i {
                continue;
            }
            let other_bool = encode_bool(&ctx, other, &vars, &resolved.symbols);
            match other.eval_exact(&witness_true_exact) {
                Some(true) => solver.assert(&other_bool),
                Some(false) => solver.assert(&other_bool.not()),
                None => {}
            }
        }
        solver.assert(&decision_bool.not());
        let witness_false = if solver.check() == SatResult::Sat {
            Some(tighten_and_extract(&ctx, &solver, &vars, &resolved.symbols, config))
        } else {
            None
        };
        solver.pop(1);

        match witness_false {
            Some(witness_false) => pairs.push(IndependencePair {
                atom_index: i,
                witness_true,
                witness_false,
            }),
            None => diagnostics.push(Diagnostic::new(
                DiagnosticKind::InfeasibleAtom,
                module_id,
                Some(decision_index),
                format!("atom #{i} is masked under this decision"),
            )),
        }
    }

    (pairs, diagnostics)
}

fn declare_symbol<'ctx>(ctx: &'ctx Context, name: &str, sym: &ResolvedSymbol) -> Dynamic<'ctx> {
    match sym.symbol_type {
        SymbolicType::Int => Dynamic::from_ast(&Int::new_const(ctx, name)),
        SymbolicType::Real => Dynamic::from_ast(&Real::new_const(ctx, name)),
        SymbolicType::Bool => Dynamic::from_ast(&Bool::new_const(ctx, name)),
    }
}

fn range_bound<'ctx>(
    ctx: &'ctx Context,
    vars: &HashMap<String, Dynamic<'ctx>>,
    name: &str,
    sym: &ResolvedSymbol,
) -> Option<Bool<'ctx>> {
    if let Some(value) = sym.fixed {
        return Some(fixed_equals(ctx, &vars[name], sym.symbol_type, value));
    }
    let (lo, hi) = sym.range?;
    let v = to_real(ctx, &vars[name], sym.symbol_type);
    let lo_r = f64_to_real(ctx, lo);
    let hi_r = f64_to_real(ctx, hi);
    Some(Bool::and(ctx, &[&v.ge(&lo_r), &v.le(&hi_r)]))
}

fn fixed_equals<'ctx>(ctx: &'ctx Context, d: &Dynamic<'ctx>, ty: SymbolicType, value: f64) -> Bool<'ctx> {
    match ty {
        SymbolicType::Int => d.as_int().unwrap()._eq(&Int::from_i64(ctx, value.round() as i64)),
        SymbolicType::Real => d.as_real().unwrap()._eq(&f64_to_real(ctx, value)),
        SymbolicType::Bool => d.as_bool().unwrap()._eq(&Bool::from_bool(ctx, value != 0.0)),
    }
}

fn to_real<'ctx>(ctx: &'ctx Context, d: &Dynamic<'ctx>, ty: SymbolicType) -> Real<'ctx> {
    match ty {
        SymbolicType::Real => d.as_real().unwrap(),
        SymbolicType::Int => Real::from_int(&d.as_int().unwrap()),
        SymbolicType::Bool => {
            let b = d.as_bool().unwrap();
            b.ite(&f64_to_real(ctx, 1.0), &f64_to_real(ctx, 0.0))
        }
    }
}

/// Convert an `f64` into an exact-enough Z3 rational literal. Catalog
/// bounds and literals in decision text carry at most a handful of
/// decimal digits, so scaling by `10^5` and reducing is exact for every
/// value this crate actually sees.
fn f64_to_real<'ctx>(ctx: &'ctx Context, value: f64) -> Real<'ctx> {
    let (num, den) = rationalize(value);
    Real::from_real(ctx, num as i32, den as i32)
}

fn rationalize(value: f64) -> (i64, i64) {
    const SCALE: i64 = 100_000;
    let scaled = (value * SCALE as f64).round() as i64;
    let g = gcd(scaled.abs(), SCALE);
    if g == 0 {
        (0, 1)
    } else {
        (scaled / g, SCALE / g)
    }
}

fn gcd(a: i64, b: i64) -> i64 {
    if b == 0 {
        a
    } else {
        gcd(b, a % b)
    }
}

fn encode_arith<'ctx>(
    ctx: &'ctx Context,
    expr: &ArithExpr,
    vars: &HashMap<String, Dynamic<'ctx>>,
    symbols: &BTreeMap<String, ResolvedSymbol>,
) -> Real<'ctx> {
    match expr {
        ArithExpr::Ident(name) => {
            let sym = &symbols[name];
            to_real(ctx, &vars[name], sym.symbol_type)
        }
        ArithExpr::Number(n) => f64_to_real(ctx, *n),
        ArithExpr::Neg(inner) => {
            let v = encode_arith(ctx, inner, vars, symbols);
            let zero = Real::from_real(ctx, 0, 1);
            &zero - &v
        }
        ArithExpr::Abs(inner) => {
            let v = encode_arith(ctx, inner, vars, symbols);
            let zero = Real::from_real(ctx, 0, 1);
            let neg = &zero - &v;
            v.ge(&zero).ite(&v, &neg)
        }
        ArithExpr::Bin(op, l, r) => {
            let lv = encode_arith(ctx, l, vars, symbols);
            let rv = encode_arith(ctx, r, vars, symbols);
            match op {
                ArithOp::Add => &lv + &rv,
                ArithOp::Sub => &lv - &rv,
                ArithOp::Mul => &lv * &rv,
                ArithOp::Div => &lv / &rv,
            }
        }
    }
}

fn encode_bool<'ctx>(
    ctx: &'ctx Context,
    expr: &BoolExpr,
    vars: &HashMap<String, Dynamic<'ctx>>,
    symbols: &BTreeMap<String, ResolvedSymbol>,
) -> Bool<'ctx> {
    match expr {
        BoolExpr::BoolLit(b) => Bool::from_bool(ctx, *b),
        BoolExpr::Not(inner) => encode_bool(ctx, inner, vars, symbols).not(),
        BoolExpr::And(children) => {
            let parts: Vec<Bool> = children.iter().map(|c| encode_bool(ctx, c, vars, symbols)).collect();
            let refs: Vec<&Bool> = parts.iter().collect();
            Bool::and(ctx, &refs)
        }
        BoolExpr::Or(children) => {
            let parts: Vec<Bool> = children.iter().map(|c| encode_bool(ctx, c, vars, symbols)).collect();
            let refs: Vec<&Bool> = parts.iter().collect();
            Bool::or(ctx, &refs)
        }
        BoolExpr::Atom(lhs, op, rhs) => {
            let l = encode_arith(ctx, lhs, vars, symbols);
            let r = encode_arith(ctx, rhs, vars, symbols);
            match op {
                CmpOp::Eq => l._eq(&r),
                CmpOp::Ne => l._eq(&r).not(),
                CmpOp::Lt => l.lt(&r),
                CmpOp::Le => l.le(&r),
                CmpOp::Gt => l.gt(&r),
                CmpOp::Ge => l.ge(&r),
            }
        }
    }
}

/// Midpoint of `[lo, hi]`, rounded to the nearest integer for
/// integer-typed variables.
fn midpoint(lo: f64, hi: f64, ty: SymbolicType) -> f64 {
    let mid = (lo + hi) / 2.0;
    match ty {
        SymbolicType::Int => mid.round(),
        _ => mid,
    }
}

/// After a satisfying check, try to pin every free (non-constant,
/// ranged) variable to its range midpoint, one at a time, keeping the
/// pin only when it stays satisfiable. This is what makes the witness
/// deterministic across runs instead of depending on whatever value Z3's
/// internal search happens to produce for an unconstrained variable.
fn tighten_and_extract<'ctx>(
    ctx: &'ctx Context,
    solver: &Solver<'ctx>,
    vars: &HashMap<String, Dynamic<'ctx>>,
    symbols: &BTreeMap<String, ResolvedSymbol>,
    _config: &SynthesisConfig,
) -> Witness {
    let mut pushes = 0;
    for (name, sym) in symbols {
        if sym.is_constant() {
            continue;
        }
        if let Some((lo, hi)) = sym.range {
            let mid = midpoint(lo, hi, sym.symbol_type);
            let eq = fixed_equals(ctx, &vars[name], sym.symbol_type, mid);
            solver.push();
            pushes += 1;
            solver.assert(&eq);
            if solver.check() != SatResult::Sat {
                solver.pop(1);
                pushes -= 1;
            }
        }
    }
    solver.check();
    let model = solver.get_model().expect("solver reported sat just before model extraction");
    let mut witness = Witness::new();
    for (name, sym) in symbols {
        let value = model
            .eval(&vars[name], true)
            .expect("model completion guarantees a value for every declared constant");
        witness.insert(name.clone(), dynamic_to_witness(&value, sym.symbol_type));
    }
    solver.pop(pushes);
    witness
}

fn dynamic_to_witness(d: &Dynamic, ty: SymbolicType) -> WitnessValue {
    match ty {
        SymbolicType::Int => WitnessValue::Int(d.as_int().and_then(|i| i.as_i64()).unwrap_or(0)),
        SymbolicType::Real => {
            let (n, dd) = d.as_real().and_then(|r| r.as_real()).unwrap_or((0, 1));
            WitnessValue::Real(n, dd)
        }
        SymbolicType::Bool => WitnessValue::Bool(d.as_bool().and_then(|b| b.as_bool()).unwrap_or(false)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{ArithExpr, CmpOp};
    use crate::resolve::ResolvedSymbol;

    fn int_symbol(lo: f64, hi: f64) -> ResolvedSymbol {
        ResolvedSymbol {
            symbol_type: SymbolicType::Int,
            range: Some((lo, hi)),
            fixed: None,
            alias_of: None,
        }
    }

    #[test]
    fn synthesizes_independence_pair_for_conjunction() {
        let decision = BoolExpr::And(vec![
            BoolExpr::Atom(ArithExpr::Ident("A".into()), CmpOp::Gt, ArithExpr::Number(3.0)),
            BoolExpr::Atom(ArithExpr::Ident("B".into()), CmpOp::Lt, ArithExpr::Number(7.0)),
        ]);
        let mut symbols = BTreeMap::new();
        symbols.insert("A".to_string(), int_symbol(0.0, 10.0));
        symbols.insert("B".to_string(), int_symbol(0.0, 10.0));
        let resolved = ResolvedDecision { symbols };

        let (pairs, diagnostics) =
            synthesize(&decision, &resolved, &SynthesisConfig::default(), "M1", 0);

        assert!(diagnostics.is_empty());
        assert_eq!(pairs.len(), 2);

        for pair in &pairs {
            let wt: HashMap<String, f64> = pair
                .witness_true
                .iter()
                .map(|(k, v)| (k.clone(), v.as_f64()))
                .collect();
            let wf: HashMap<String, f64> = pair
                .witness_false
                .iter()
                .map(|(k, v)| (k.clone(), v.as_f64()))
                .collect();
            assert_eq!(decision.eval(&wt), Some(true));
            assert_eq!(decision.eval(&wf), Some(false));
        }
    }

    #[test]
    fn masked_atom_under_tautology_produces_diagnostic() {
        // `A > 3 || true` always holds regardless of `A`, so the `A>3`
        // atom can never flip the decision: it is masked.
        let decision = BoolExpr::Or(vec![
            BoolExpr::Atom(ArithExpr::Ident("A".into()), CmpOp::Gt, ArithExpr::Number(3.0)),
            BoolExpr::BoolLit(true),
        ]);
        let mut symbols = BTreeMap::new();
        symbols.insert("A".to_string(), int_symbol(0.0, 10.0));
        let resolved = ResolvedDecision { symbols };

        let (pairs, diagnostics) =
            synthesize(&decision, &resolved, &SynthesisConfig::default(), "M1", 0);

        assert!(pairs.is_empty());
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].kind, DiagnosticKind::InfeasibleAtom);
    }

    #[test]
    fn constant_atom_is_reported_and_skipped() {
        let decision = BoolExpr::Atom(ArithExpr::Number(3.14159), CmpOp::Lt, ArithExpr::Number(4.0));
        let resolved = ResolvedDecision::default();

        let (pairs, diagnostics) =
            synthesize(&decision, &resolved, &SynthesisConfig::default(), "M1", 0);

        assert!(pairs.is_empty());
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].kind, DiagnosticKind::ConstantAtom);
    }
}
