//! The Lexer/Normalizer (C2) -- canonicalizes raw decision text before
//! parsing.
//!
//! Each transformation is idempotent on already-canonical input, and the
//! order below matters: later passes (the lone `=`/`>`/`<`/`!` rewrites)
//! must run after `==`/`!=`/`<=`/`>=` have already been given surrounding
//! spaces, or they would mis-split a two-character operator into one
//! (grounded in `original_source/test_case_generator.py::_parse_condition`,
//! which hits exactly this ordering bug and fixes it by running the
//! multi-character passes first).
//!
//! `abs(E)` folding happens at the AST level, in [`crate::parser`], not
//! here -- there is no string `eval`/rewrite for control structure
//! anywhere in this crate. The lexer only normalizes punctuation and
//! whitespace around the `abs(` call so the parser sees a clean token
//! stream.

use regex::Regex;

/// Canonicalize a raw decision string.
///
/// Output operators are exactly `==, !=, <, <=, >, >=, &&, ||, !`, single-
/// space separated, with parenthesized sub-expressions preserved.
pub fn normalize(input: &str) -> String {
    let mut s = input.to_string();

    s = strip_dashes(&s);
    s = fold_last(&s);
    s = fold_duration(&s);
    s = strip_unit_annotations(&s);
    s = space_operators(&s);

    s
}

/// Step 1: Unicode en-dash/em-dash -> ASCII minus.
fn strip_dashes(s: &str) -> String {
    s.replace(['\u{2013}', '\u{2014}'], "-")
}

/// Step 2: `last(X)` -> synthetic identifier `_X_`.
fn fold_last(s: &str) -> String {
    let re = Regex::new(r"last\s*\(\s*([A-Za-z_][A-Za-z0-9_]*)\s*\)").unwrap();
    re.replace_all(s, "_$1_").into_owned()
}

/// Step 4: `duration(...)` -> boolean literal `true` (temporal operators
/// are out of scope). Uses balanced-paren matching because the argument
/// list may itself contain parenthesized sub-expressions or commas.
fn fold_duration(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let bytes: Vec<char> = s.chars().collect();
    let mut i = 0;
    while i < bytes.len() {
        if s[byte_index(&bytes, i)..].starts_with("duration") {
            let after = i + "duration".len();
            let paren_start = skip_whitespace(&bytes, after);
            if paren_start < bytes.len() && bytes[paren_start] == '(' {
                if let Some(close) = crate::extract::match_balanced(&bytes, paren_start, '(', ')') {
                    out.push_str("true");
                    i = close + 1;
                    continue;
                }
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    out
}

fn skip_whitespace(chars: &[char], mut i: usize) -> usize {
    while i < chars.len() && chars[i].is_whitespace() {
        i += 1;
    }
    i
}

fn byte_index(chars: &[char], char_idx: usize) -> usize {
    chars[..char_idx].iter().map(|c| c.len_utf8()).sum()
}

/// Step 5: strip stray `, ms ,` unit annotations introduced by the
/// source format.
fn strip_unit_annotations(s: &str) -> String {
    let re = Regex::new(r",\s*ms\s*,").unwrap();
    re.replace_all(s, ",").into_owned()
}

/// Step 6: collapse whitespace and space out every comparison/boolean
/// operator, applying the lone `=`/`>`/`<`/`!` rewrites only where they
/// are not part of a multi-character operator. A lone `=` becomes `==`;
/// a lone `!` is its own NOT token, rendered as ASCII `!` since the
/// parser's grammar is defined over ASCII tokens throughout.
fn space_operators(s: &str) -> String {
    let le = Regex::new(r"<=").unwrap();
    let ge = Regex::new(r">=").unwrap();
    let eq = Regex::new(r"==").unwrap();
    let ne = Regex::new(r"!=").unwrap();
    let and = Regex::new(r"&&").unwrap();
    let or = Regex::new(r"\|\|").unwrap();

    let mut out = s.to_string();
    out = le.replace_all(&out, " <= ").into_owned();
    out = ge.replace_all(&out, " >= ").into_owned();
    out = eq.replace_all(&out, " == ").into_owned();
    out = ne.replace_all(&out, " != ").into_owned();
    out = and.replace_all(&out, " && ").into_owned();
    out = or.replace_all(&out, " || ").into_owned();

    // Lone `=` not already part of ==, !=, <=, >= (those are spaced with
    // `==`/`!=`/`<=`/`>=` tokens above, so a surviving standalone `=` has
    // no adjacent `=`, `<`, `>`, or `!`).
    let lone_eq = Regex::new(r"(?:[^=!<>]|^)=(?:[^=]|$)").unwrap();
    out = rewrite_lone(&out, &lone_eq, '=', "==");

    let lone_gt = Regex::new(r"(?:[^<>]|^)>(?:[^=]|$)").unwrap();
    out = rewrite_lone(&out, &lone_gt, '>', ">");
    let lone_lt = Regex::new(r"(?:[^<>]|^)<(?:[^=]|$)").unwrap();
    out = rewrite_lone(&out, &lone_lt, '<', "<");
    let lone_not = Regex::new(r"!(?:[^=]|$)").unwrap();
    out = rewrite_lone(&out, &lone_not, '!', "!");

    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Replace every occurrence of `target` that is not already part of a
/// wider operator with `" {replacement} "`, leaving any surrounding
/// context characters untouched.
fn rewrite_lone(s: &str, finder: &Regex, target: char, replacement: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut last = 0;
    for m in finder.find_iter(s) {
        let matched = m.as_str();
        if let Some(pos) = matched.find(target) {
            let abs_pos = m.start() + pos;
            if abs_pos < last {
                continue;
            }
            out.push_str(&s[last..abs_pos]);
            out.push_str(&format!(" {replacement} "));
            last = abs_pos + target.len_utf8();
        }
    }
    out.push_str(&s[last..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spaces_two_char_operators() {
        assert_eq!(normalize("A>3&&B<7"), "A > 3 && B < 7");
    }

    #[test]
    fn lone_equals_becomes_double() {
        assert_eq!(normalize("A=3"), "A == 3");
    }

    #[test]
    fn does_not_split_existing_double_equals() {
        assert_eq!(normalize("A==3"), "A == 3");
        assert_eq!(normalize("A!=3"), "A != 3");
        assert_eq!(normalize("A<=3"), "A <= 3");
        assert_eq!(normalize("A>=3"), "A >= 3");
    }

    #[test]
    fn lone_bang_becomes_not() {
        assert_eq!(normalize("!A"), "! A");
    }

    #[test]
    fn folds_last_to_synthetic_identifier() {
        assert_eq!(normalize("last(H) - H > 2"), "_H_ - H > 2");
    }

    #[test]
    fn folds_duration_to_true_literal() {
        assert_eq!(normalize("duration(X > 1, 500)"), "true");
    }

    #[test]
    fn strips_ms_unit_annotation() {
        assert_eq!(normalize("f(X, ms ,Y)"), "f(X,Y)");
    }

    #[test]
    fn replaces_en_and_em_dash() {
        assert_eq!(normalize("H \u{2013} H_TO > 2"), "H - H_TO > 2");
        assert_eq!(normalize("H \u{2014} H_TO > 2"), "H - H_TO > 2");
    }

    #[test]
    fn idempotent_on_already_canonical_input() {
        let once = normalize("A > 3 && B < 7");
        let twice = normalize(&once);
        assert_eq!(once, twice);
    }
}
