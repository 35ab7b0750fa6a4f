//! The decision AST.
//!
//! `BoolExpr` is the typed boolean-expression tree a [`crate::parser`]
//! builds from a canonicalized decision string. No string `eval` -- every
//! downstream stage (resolver, synthesizer, encoder) walks this tree
//! directly.

use std::collections::{BTreeSet, HashMap};

/// An exact rational, `numerator / denominator` with `denominator > 0`,
/// always kept reduced. This is the numeric kind decision re-evaluation
/// uses instead of `f64`: a witness produced by the solver can sit
/// exactly on a comparison boundary (the midpoint-tightening pass in
/// [`crate::synth`] produces exactly this kind of value), and rounding it
/// through `f64` before comparing can flip which side of `<`/`<=` it
/// lands on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rational {
    pub num: i64,
    pub den: i64,
}

impl Rational {
    pub fn new(num: i64, den: i64) -> Self {
        assert!(den != 0, "rational denominator must not be zero");
        let sign = if den < 0 { -1 } else { 1 };
        let (num, den) = (num * sign, den * sign);
        let g = gcd(num.unsigned_abs(), den.unsigned_abs()).max(1);
        Rational {
            num: num / g as i64,
            den: den / g as i64,
        }
    }

    pub fn from_int(n: i64) -> Self {
        Rational { num: n, den: 1 }
    }

    pub fn as_f64(&self) -> f64 {
        self.num as f64 / self.den as f64
    }

    fn add(self, other: Self) -> Self {
        Rational::new(
            self.num * other.den + other.num * self.den,
            self.den * other.den,
        )
    }

    fn sub(self, other: Self) -> Self {
        self.add(Rational::new(-other.num, other.den))
    }

    fn mul(self, other: Self) -> Self {
        Rational::new(self.num * other.num, self.den * other.den)
    }

    fn div(self, other: Self) -> Self {
        Rational::new(self.num * other.den, self.den * other.num)
    }

    fn neg(self) -> Self {
        Rational::new(-self.num, self.den)
    }

    fn abs(self) -> Self {
        Rational::new(self.num.abs(), self.den)
    }
}

impl PartialOrd for Rational {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Rational {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // `den > 0` is an invariant of `new`, so cross-multiplication
        // preserves order without needing a common denominator.
        (self.num * other.den).cmp(&(other.num * self.den))
    }
}

fn gcd(a: u64, b: u64) -> u64 {
    if b == 0 {
        a
    } else {
        gcd(b, a % b)
    }
}

/// Comparison operators an [`Atom`] may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

/// Arithmetic operators for [`ArithExpr::Bin`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
}

/// A small `+ - * /` expression over identifiers and numeric literals --
/// each side of an [`Atom`] comparison is one of these.
#[derive(Debug, Clone, PartialEq)]
pub enum ArithExpr {
    Ident(String),
    Number(f64),
    Neg(Box<ArithExpr>),
    Bin(ArithOp, Box<ArithExpr>, Box<ArithExpr>),
    /// `abs(E)`, folded at the AST level rather than by string rewriting.
    /// Lowered to `ite(E >= 0, E, -E)` by the synthesizer.
    Abs(Box<ArithExpr>),
}

impl ArithExpr {
    /// Collect every identifier referenced by this expression into `out`.
    pub fn collect_identifiers(&self, out: &mut BTreeSet<String>) {
        match self {
            ArithExpr::Ident(name) => {
                out.insert(name.clone());
            }
            ArithExpr::Number(_) => {}
            ArithExpr::Neg(inner) | ArithExpr::Abs(inner) => inner.collect_identifiers(out),
            ArithExpr::Bin(_, l, r) => {
                l.collect_identifiers(out);
                r.collect_identifiers(out);
            }
        }
    }

    /// True if this side is a numeric literal with no identifiers at all
    /// -- used by [`BoolExpr::is_constant_atom`].
    pub fn is_pure_constant(&self) -> bool {
        let mut ids = BTreeSet::new();
        self.collect_identifiers(&mut ids);
        ids.is_empty()
    }
}

/// A boolean-expression node.
///
/// `And`/`Or` are n-ary; child order is significant only for reporting,
/// not semantics.
#[derive(Debug, Clone, PartialEq)]
pub enum BoolExpr {
    And(Vec<BoolExpr>),
    Or(Vec<BoolExpr>),
    Not(Box<BoolExpr>),
    Atom(ArithExpr, CmpOp, ArithExpr),
    /// Produced by folding temporal placeholders (`duration(...)`) to a
    /// literal.
    BoolLit(bool),
}

impl BoolExpr {
    /// Evaluate this decision against an `f64` witness. This is a
    /// display/convenience path only -- floating-point rounding can flip
    /// a comparison for a witness that sits exactly on a boundary (which
    /// [`crate::synth`]'s midpoint-tightening pass can produce). Anywhere
    /// the synthesizer's MCDC guarantee depends on the *correct* truth
    /// value of a decision or atom (the freeze step, the expected-result
    /// field) must use [`BoolExpr::eval_exact`] instead.
    ///
    /// Booleans are encoded as 1.0/0.0 in `bindings`; comparisons other
    /// than `==`/`!=` on a boolean identifier are not constructed by the
    /// parser, so ordinary float comparison is safe here.
    pub fn eval(&self, bindings: &std::collections::HashMap<String, f64>) -> Option<bool> {
        match self {
            BoolExpr::BoolLit(b) => Some(*b),
            BoolExpr::Not(inner) => inner.eval(bindings).map(|b| !b),
            BoolExpr::And(children) => {
                let mut acc = true;
                for child in children {
                    acc &= child.eval(bindings)?;
                }
                Some(acc)
            }
            BoolExpr::Or(children) => {
                let mut acc = false;
                for child in children {
                    acc |= child.eval(bindings)?;
                }
                Some(acc)
            }
            BoolExpr::Atom(lhs, op, rhs) => {
                let l = eval_arith(lhs, bindings)?;
                let r = eval_arith(rhs, bindings)?;
                Some(match op {
                    CmpOp::Eq => l == r,
                    CmpOp::Ne => l != r,
                    CmpOp::Lt => l < r,
                    CmpOp::Le => l <= r,
                    CmpOp::Gt => l > r,
                    CmpOp::Ge => l >= r,
                })
            }
        }
    }

    /// Evaluate this decision against a witness of identifier -> exact
    /// [`Rational`] bindings, the same numeric kind the solver's witness
    /// carries -- no `f64` round-trip, so a value sitting exactly on a
    /// comparison boundary compares correctly every time. This is the
    /// numeric semantics the synthesizer's freeze step and the
    /// expected-result field must use.
    pub fn eval_exact(&self, bindings: &HashMap<String, Rational>) -> Option<bool> {
        match self {
            BoolExpr::BoolLit(b) => Some(*b),
            BoolExpr::Not(inner) => inner.eval_exact(bindings).map(|b| !b),
            BoolExpr::And(children) => {
                let mut acc = true;
                for child in children {
                    acc &= child.eval_exact(bindings)?;
                }
                Some(acc)
            }
            BoolExpr::Or(children) => {
                let mut acc = false;
                for child in children {
                    acc |= child.eval_exact(bindings)?;
                }
                Some(acc)
            }
            BoolExpr::Atom(lhs, op, rhs) => {
                let l = eval_arith_exact(lhs, bindings)?;
                let r = eval_arith_exact(rhs, bindings)?;
                Some(match op {
                    CmpOp::Eq => l == r,
                    CmpOp::Ne => l != r,
                    CmpOp::Lt => l < r,
                    CmpOp::Le => l <= r,
                    CmpOp::Gt => l > r,
                    CmpOp::Ge => l >= r,
                })
            }
        }
    }

    /// Every `Atom` node in source order (pre-order, left to right) --
    /// the candidate set the MCDC synthesizer iterates, in the order
    /// emitted test cases are expected to preserve.
    pub fn atoms(&self) -> Vec<&BoolExpr> {
        let mut out = Vec::new();
        self.collect_atoms(&mut out);
        out
    }

    fn collect_atoms<'a>(&'a self, out: &mut Vec<&'a BoolExpr>) {
        match self {
            BoolExpr::Atom(..) => out.push(self),
            BoolExpr::Not(inner) => inner.collect_atoms(out),
            BoolExpr::And(children) | BoolExpr::Or(children) => {
                for child in children {
                    child.collect_atoms(out);
                }
            }
            BoolExpr::BoolLit(_) => {}
        }
    }

    /// True iff this atom compares only constants -- excluded as a flip
    /// candidate since no witness model can change its truth value.
    pub fn is_constant_atom(&self) -> bool {
        match self {
            BoolExpr::Atom(lhs, _, rhs) => lhs.is_pure_constant() && rhs.is_pure_constant(),
            _ => false,
        }
    }

    /// Collect every identifier anywhere in this decision -- every
    /// generated test-case record carries values for all of them, not
    /// just the ones in the flipped atom.
    pub fn collect_identifiers(&self, out: &mut BTreeSet<String>) {
        match self {
            BoolExpr::BoolLit(_) => {}
            BoolExpr::Not(inner) => inner.collect_identifiers(out),
            BoolExpr::And(children) | BoolExpr::Or(children) => {
                for child in children {
                    child.collect_identifiers(out);
                }
            }
            BoolExpr::Atom(lhs, _, rhs) => {
                lhs.collect_identifiers(out);
                rhs.collect_identifiers(out);
            }
        }
    }
}

fn eval_arith(expr: &ArithExpr, bindings: &std::collections::HashMap<String, f64>) -> Option<f64> {
    match expr {
        ArithExpr::Ident(name) => bindings.get(name).copied(),
        ArithExpr::Number(n) => Some(*n),
        ArithExpr::Neg(inner) => eval_arith(inner, bindings).map(|v| -v),
        ArithExpr::Abs(inner) => eval_arith(inner, bindings).map(f64::abs),
        ArithExpr::Bin(op, l, r) => {
            let l = eval_arith(l, bindings)?;
            let r = eval_arith(r, bindings)?;
            Some(match op {
                ArithOp::Add => l + r,
                ArithOp::Sub => l - r,
                ArithOp::Mul => l * r,
                ArithOp::Div => l / r,
            })
        }
    }
}

fn eval_arith_exact(expr: &ArithExpr, bindings: &HashMap<String, Rational>) -> Option<Rational> {
    match expr {
        ArithExpr::Ident(name) => bindings.get(name).copied(),
        ArithExpr::Number(n) => Some(number_to_rational(*n)),
        ArithExpr::Neg(inner) => eval_arith_exact(inner, bindings).map(Rational::neg),
        ArithExpr::Abs(inner) => eval_arith_exact(inner, bindings).map(Rational::abs),
        ArithExpr::Bin(op, l, r) => {
            let l = eval_arith_exact(l, bindings)?;
            let r = eval_arith_exact(r, bindings)?;
            Some(match op {
                ArithOp::Add => l.add(r),
                ArithOp::Sub => l.sub(r),
                ArithOp::Mul => l.mul(r),
                ArithOp::Div => l.div(r),
            })
        }
    }
}

/// Convert a literal from the AST (parsed as `f64`) to an exact
/// `Rational`, scaling by the same `10^5` the rest of this crate uses for
/// decimal literals (see `crate::synth::rationalize`) -- decision text
/// carries at most a handful of decimal digits, so this is exact for
/// every literal this crate actually sees.
fn number_to_rational(value: f64) -> Rational {
    const SCALE: i64 = 100_000;
    let scaled = (value * SCALE as f64).round() as i64;
    Rational::new(scaled, SCALE)
}
