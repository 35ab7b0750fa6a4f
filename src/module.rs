//! The Module document.
//!
//! A module carries the formula text the Decision Extractor (C5) scans,
//! plus the bookkeeping fields (`id`, `name`, `function`, `precondition`)
//! that ride along with it. `function` is preserved on ingestion but, per
//! the emitted-record field list, never threaded into a `TestRecord`.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::io::Read;

/// `(id, name, function, precondition, inputs, outputs, formula)`.
///
/// Field names mirror the labelled-line document (任务名称/编号/功能/
/// 前置条件/输入/输出/公式) the real Module Loader reads; this crate's
/// loader consumes the same data pre-parsed into JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Module {
    /// 编号
    pub id: String,
    /// 任务名称
    pub name: String,
    /// 功能
    #[serde(default)]
    pub function: String,
    /// 前置条件
    #[serde(default)]
    pub precondition: String,
    /// 输入
    #[serde(default)]
    pub inputs: Vec<String>,
    /// 输出
    #[serde(default)]
    pub outputs: Vec<String>,
    /// 公式 -- already concatenated and whitespace-stripped across
    /// paragraphs by the upstream loader.
    pub formula: String,
}

/// Load a sequence of Module documents from a JSON reader.
///
/// Stands in for the out-of-scope `.docx` Module Loader.
pub fn load_modules<R: Read>(reader: R) -> Result<Vec<Module>> {
    Ok(serde_json::from_reader(reader)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_module_from_json() {
        let json = r#"[{
            "id": "M1",
            "name": "Login Check",
            "function": "gates login on session state",
            "precondition": "system armed",
            "inputs": ["A", "B"],
            "outputs": ["y"],
            "formula": "if (A > 3 && B < 7) { y = 1 } else { y = 0 }"
        }]"#;
        let modules = load_modules(json.as_bytes()).unwrap();
        assert_eq!(modules.len(), 1);
        assert_eq!(modules[0].id, "M1");
        assert_eq!(modules[0].function, "gates login on session state");
        assert_eq!(modules[0].inputs, vec!["A", "B"]);
    }

    #[test]
    fn function_defaults_to_empty_when_absent() {
        let json = r#"[{"id": "M2", "name": "X", "formula": "if (true) { y = 1 }"}]"#;
        let modules = load_modules(json.as_bytes()).unwrap();
        assert_eq!(modules[0].function, "");
    }
}
