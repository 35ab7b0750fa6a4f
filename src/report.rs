//! The Report Writer -- a CSV stand-in for the out-of-scope Excel
//! renderer. The core only produces [`crate::emit::TestRecord`] values;
//! this module is the one concrete collaborator this crate ships so the
//! pipeline is runnable end to end.

use crate::emit::TestRecord;
use crate::error::Result;
use std::io::Write;

/// Write every record to `writer` as a CSV table with a header row.
pub fn write_report<W: Write>(writer: W, records: &[TestRecord]) -> Result<()> {
    let mut w = csv::Writer::from_writer(writer);
    w.write_record([
        "requirement_id",
        "module_name",
        "precondition",
        "decision_text",
        "assignment",
        "expected_result",
        "then_block",
        "else_block",
    ])?;
    for record in records {
        w.write_record([
            &record.requirement_id,
            &record.module_name,
            &record.precondition,
            &record.decision_text,
            &record.assignment,
            &record.expected_result,
            &record.then_block,
            &record.else_block,
        ])?;
    }
    w.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_header_and_rows() {
        let records = vec![TestRecord {
            requirement_id: "M1".to_string(),
            module_name: "Login Check".to_string(),
            precondition: String::new(),
            decision_text: "A > 3 && B < 7".to_string(),
            assignment: "A=4, B=0".to_string(),
            expected_result: "True".to_string(),
            then_block: "y = 1".to_string(),
            else_block: "y = 0".to_string(),
        }];

        let mut buf = Vec::new();
        write_report(&mut buf, &records).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with("requirement_id,module_name"));
        assert!(text.contains("Login Check"));
        assert!(text.contains("A=4, B=0"));
    }
}
