//! The Emitter (C8) -- accumulates test records in stable per-module
//! order and hands them to the Report Writer.

use serde::{Deserialize, Serialize};

/// One emitted MCDC test case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestRecord {
    pub requirement_id: String,
    pub module_name: String,
    pub precondition: String,
    pub decision_text: String,
    pub assignment: String,
    pub expected_result: String,
    pub then_block: String,
    pub else_block: String,
}

/// Accumulates records across a synthesis run, preserving
/// (module-insertion-order, decision-text-order, atom-source-order,
/// `v+` before `v-`).
#[derive(Debug, Default)]
pub struct Emitter {
    records: Vec<TestRecord>,
}

impl Emitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: TestRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[TestRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<TestRecord> {
        self.records
    }
}
