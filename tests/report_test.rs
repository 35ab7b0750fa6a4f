//! End-to-end smoke test: JSON catalog + module ingestion through to a
//! CSV report on disk.

use mcdc_synth::catalog::load_catalog;
use mcdc_synth::config::SynthesisConfig;
use mcdc_synth::module::load_modules;
use mcdc_synth::pipeline::run_all;
use mcdc_synth::report::write_report;
use std::fs::File;
use std::io::Read;

#[test]
fn ingests_json_and_writes_a_csv_report() {
    let catalog_json = r#"[
        {"name": "A", "symbol": "A", "type": "int", "min": 0, "max": 10},
        {"name": "B", "symbol": "B", "type": "int", "min": 0, "max": 10}
    ]"#;
    let module_json = r#"[{
        "id": "M1",
        "name": "Gate",
        "precondition": "armed",
        "inputs": ["A", "B"],
        "outputs": ["y"],
        "formula": "if (A > 3 && B < 7) { y = 1 } else { y = 0 }"
    }]"#;

    let catalog = load_catalog(catalog_json.as_bytes()).unwrap();
    let modules = load_modules(module_json.as_bytes()).unwrap();

    let (records, diagnostics) = run_all(&modules, &catalog, &SynthesisConfig::default());
    assert!(diagnostics.is_empty());
    assert_eq!(records.len(), 4);

    let dir = tempfile::tempdir().unwrap();
    let report_path = dir.path().join("report.csv");
    let file = File::create(&report_path).unwrap();
    write_report(file, &records).unwrap();

    let mut contents = String::new();
    File::open(&report_path).unwrap().read_to_string(&mut contents).unwrap();
    assert!(contents.starts_with("requirement_id,module_name"));
    assert_eq!(contents.lines().count(), 5); // header + 4 records
}
