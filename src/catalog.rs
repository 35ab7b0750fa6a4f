//! The Catalog (C1) -- typed variables and constants, keyed by symbol.
//!
//! A `Catalog` is populated once at start-of-run and is read-only for the
//! rest of the pipeline. Everything downstream only ever sees `&Catalog`.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::Read;

/// A variable's declared type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VarType {
    Int,
    Real,
    Bool,
}

/// A row from the Catalog document.
///
/// `min`/`max`/`initial` are optional on the wire because bool variables
/// and not-yet-ranged reals may omit them; [`Catalog::ingest`] is the
/// only place that interprets their absence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariableRow {
    pub name: String,
    pub symbol: String,
    #[serde(rename = "type")]
    pub var_type: VarType,
    #[serde(default)]
    pub type_desc: String,
    #[serde(default)]
    pub initial: Option<f64>,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub flag: String,
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
}

/// A declared, ranged variable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Variable {
    pub name: String,
    pub symbol: String,
    pub var_type: VarType,
    pub type_desc: String,
    pub comment: String,
    /// Inclusive range. `None` for `Bool` -- bool variables get no
    /// numeric range.
    pub range: Option<(f64, f64)>,
}

/// An immutable named numeric value.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Constant {
    pub symbol: String,
    pub var_type: VarType,
    pub value: f64,
}

/// The populated, read-only Catalog.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    variables: HashMap<String, Variable>,
    constants: HashMap<String, Constant>,
}

impl Catalog {
    /// Build a Catalog from raw document rows, promoting any row whose
    /// range collapses to a point to a Constant: a variable with
    /// `min == max` (or only `initial` given) is promoted to a Constant
    /// during ingestion.
    ///
    /// Errors if a symbol is reused between rows -- symbol names are
    /// unique globally across both maps.
    pub fn ingest(rows: Vec<VariableRow>) -> Result<Self> {
        let mut catalog = Catalog::default();
        for row in rows {
            if catalog.variables.contains_key(&row.symbol) || catalog.constants.contains_key(&row.symbol) {
                return Err(Error::DuplicateSymbol(row.symbol));
            }

            // A collapsed range only promotes to a Constant when `initial`
            // (if given) agrees with the collapsed value -- a row with
            // `min == max == 5` but `initial == 3` stays a ranged Variable
            // rather than silently discarding the stated `initial`,
            // mirroring `parse_data_doc`'s `if min_val == initial_val:
            // is_constant = True`.
            let pinned = match (row.min, row.max, row.initial) {
                (Some(min), Some(max), Some(initial)) if min == max && initial == min => Some(min),
                (Some(min), Some(max), None) if min == max => Some(min),
                (None, None, Some(initial)) => Some(initial),
                _ => None,
            };

            if let Some(value) = pinned {
                catalog.constants.insert(
                    row.symbol.clone(),
                    Constant {
                        symbol: row.symbol,
                        var_type: row.var_type,
                        value,
                    },
                );
                continue;
            }

            let range = match row.var_type {
                VarType::Bool => None,
                _ => Some((row.min.unwrap_or(0.0), row.max.unwrap_or(0.0))),
            };

            catalog.variables.insert(
                row.symbol.clone(),
                Variable {
                    name: row.name,
                    symbol: row.symbol,
                    var_type: row.var_type,
                    type_desc: row.type_desc,
                    comment: row.comment,
                    range,
                },
            );
        }
        Ok(catalog)
    }

    /// Exact-match lookup across the variable map.
    pub fn variable(&self, symbol: &str) -> Option<&Variable> {
        self.variables.get(symbol)
    }

    /// Exact-match lookup across the constant map.
    pub fn constant(&self, symbol: &str) -> Option<&Constant> {
        self.constants.get(symbol)
    }

    pub fn variables(&self) -> impl Iterator<Item = &Variable> {
        self.variables.values()
    }

    pub fn constants(&self) -> impl Iterator<Item = &Constant> {
        self.constants.values()
    }
}

/// Load a Catalog document from a JSON reader.
///
/// Stands in for the out-of-scope `.xlsx` Catalog Loader: the core only
/// ever consumes `Vec<VariableRow>`, regardless of which upstream format
/// produced it.
pub fn load_catalog<R: Read>(reader: R) -> Result<Catalog> {
    let rows: Vec<VariableRow> = serde_json::from_reader(reader)?;
    Catalog::ingest(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(symbol: &str, var_type: VarType, min: Option<f64>, max: Option<f64>, initial: Option<f64>) -> VariableRow {
        VariableRow {
            name: symbol.to_string(),
            symbol: symbol.to_string(),
            var_type,
            type_desc: String::new(),
            initial,
            comment: String::new(),
            flag: String::new(),
            min,
            max,
        }
    }

    #[test]
    fn promotes_pinned_range_to_constant() {
        let catalog = Catalog::ingest(vec![row("PI", VarType::Real, Some(3.14), Some(3.14), None)]).unwrap();
        assert!(catalog.variable("PI").is_none());
        assert_eq!(catalog.constant("PI").unwrap().value, 3.14);
    }

    #[test]
    fn promotes_initial_only_to_constant() {
        let catalog = Catalog::ingest(vec![row("K", VarType::Real, None, None, Some(0.5))]).unwrap();
        assert_eq!(catalog.constant("K").unwrap().value, 0.5);
    }

    #[test]
    fn conflicting_initial_keeps_collapsed_range_as_variable() {
        let catalog = Catalog::ingest(vec![row("X", VarType::Real, Some(5.0), Some(5.0), Some(3.0))]).unwrap();
        assert!(catalog.constant("X").is_none());
        let x = catalog.variable("X").unwrap();
        assert_eq!(x.range, Some((5.0, 5.0)));
    }

    #[test]
    fn keeps_ranged_variable_as_variable() {
        let catalog = Catalog::ingest(vec![row("A", VarType::Int, Some(0.0), Some(10.0), None)]).unwrap();
        let a = catalog.variable("A").unwrap();
        assert_eq!(a.range, Some((0.0, 10.0)));
    }

    #[test]
    fn bool_variable_has_no_range() {
        let catalog = Catalog::ingest(vec![row("FLAG", VarType::Bool, None, None, None)]).unwrap();
        assert_eq!(catalog.variable("FLAG").unwrap().range, None);
    }

    #[test]
    fn duplicate_symbol_is_rejected() {
        let rows = vec![
            row("A", VarType::Int, Some(0.0), Some(10.0), None),
            row("A", VarType::Int, Some(0.0), Some(5.0), None),
        ];
        assert!(Catalog::ingest(rows).is_err());
    }

    #[test]
    fn round_trips_through_json() {
        let rows = vec![row("A", VarType::Int, Some(0.0), Some(10.0), None)];
        let json = serde_json::to_string(&rows).unwrap();
        let catalog = load_catalog(json.as_bytes()).unwrap();
        assert!(catalog.variable("A").is_some());
    }
}
