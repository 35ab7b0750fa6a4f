//! The Outcome Encoder (C7) -- renders a witness model and the
//! decision's expected result as the text fields of a test record.

use crate::ast::{BoolExpr, Rational};
use crate::resolve::ResolvedDecision;
use crate::synth::{Witness, WitnessValue};
use std::collections::HashMap;

/// Render one witness as `sym=value, sym=value, ...`, symbols sorted
/// lexicographically for stability. A `_X_` alias symbol (from folding
/// `last(X)`) is rendered back as `last(X)`.
pub fn encode_assignment(witness: &Witness, resolved: &ResolvedDecision, real_precision: u32) -> String {
    witness
        .iter()
        .map(|(symbol, value)| {
            let label = resolved
                .symbols
                .get(symbol)
                .and_then(|s| s.alias_of.as_ref())
                .map(|inner| format!("last({inner})"))
                .unwrap_or_else(|| symbol.clone());
            format!("{label}={}", render_value(value, real_precision))
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn render_value(value: &WitnessValue, real_precision: u32) -> String {
    match *value {
        WitnessValue::Int(i) => i.to_string(),
        WitnessValue::Bool(b) => if b { "True" } else { "False" }.to_string(),
        WitnessValue::Real(num, den) => render_rational(num, den, real_precision),
    }
}

/// Exact decimal expansion of `num/den` to at least `sig_digits`
/// significant digits, computed by long division rather than through
/// `f64` -- the precision the source's `as_decimal(10)` + `?`-stripping
/// approximated, done here without the approximation.
fn render_rational(num: i64, den: i64, sig_digits: u32) -> String {
    if den == 0 {
        return "0".to_string();
    }
    let negative = (num < 0) != (den < 0);
    let num = num.unsigned_abs();
    let den = den.unsigned_abs();

    let int_part = num / den;
    let mut remainder = num % den;

    let int_digits = if int_part == 0 { 1 } else { digit_count(int_part) };
    let frac_digits_needed = sig_digits.saturating_sub(int_digits as u32).max(1);

    let mut frac = String::new();
    for _ in 0..frac_digits_needed {
        remainder *= 10;
        frac.push(char::from_digit((remainder / den) as u32, 10).unwrap());
        remainder %= den;
        if remainder == 0 {
            break;
        }
    }

    let mut out = String::new();
    if negative && (int_part != 0 || !frac.is_empty()) {
        out.push('-');
    }
    out.push_str(&int_part.to_string());
    if !frac.is_empty() {
        out.push('.');
        out.push_str(&frac);
    }
    out
}

fn digit_count(mut n: u64) -> usize {
    if n == 0 {
        return 1;
    }
    let mut count = 0;
    while n > 0 {
        count += 1;
        n /= 10;
    }
    count
}

/// Evaluate `decision` against `witness` and render the literal
/// `"True"`/`"False"` expected-result field.
///
/// Uses [`BoolExpr::eval_exact`] over the witness's exact rational
/// values rather than `f64` -- the same numeric kind the solver used to
/// produce the witness, never re-derived via floating-point rounding.
pub fn encode_expected_result(decision: &BoolExpr, witness: &Witness) -> Option<&'static str> {
    let bindings: HashMap<String, Rational> = witness.iter().map(|(k, v)| (k.clone(), v.as_rational())).collect();
    decision.eval_exact(&bindings).map(|b| if b { "True" } else { "False" })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::{ResolvedSymbol, SymbolicType};
    use std::collections::BTreeMap;

    #[test]
    fn renders_sorted_integer_assignment() {
        let mut witness = Witness::new();
        witness.insert("B".to_string(), WitnessValue::Int(0));
        witness.insert("A".to_string(), WitnessValue::Int(4));
        let resolved = ResolvedDecision::default();
        assert_eq!(encode_assignment(&witness, &resolved, 10), "A=4, B=0");
    }

    #[test]
    fn renders_last_alias_symbol_name() {
        let mut witness = Witness::new();
        witness.insert("_H_".to_string(), WitnessValue::Int(5));
        let mut symbols = BTreeMap::new();
        symbols.insert(
            "_H_".to_string(),
            ResolvedSymbol {
                symbol_type: SymbolicType::Int,
                range: Some((0.0, 100.0)),
                fixed: None,
                alias_of: Some("H".to_string()),
            },
        );
        let resolved = ResolvedDecision { symbols };
        assert_eq!(encode_assignment(&witness, &resolved, 10), "last(H)=5");
    }

    #[test]
    fn renders_exact_rational_to_requested_precision() {
        assert_eq!(render_rational(1, 3, 10), "0.333333333");
        assert_eq!(render_rational(1, 2, 10), "0.5");
        assert_eq!(render_rational(-3, 4, 10), "-0.75");
    }

    #[test]
    fn expected_result_is_capitalized_literal() {
        let decision = BoolExpr::BoolLit(true);
        let witness = Witness::new();
        assert_eq!(encode_expected_result(&decision, &witness), Some("True"));
    }
}
