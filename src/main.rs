//! mcdc_synth CLI - Command-line interface
//!
//! Commands:
//!   synth    - Run the MCDC synthesizer over a catalog + module set
//!   version  - Print the crate version

use mcdc_synth::*;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::process::ExitCode;

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        return ExitCode::from(1);
    }

    let result = match args[1].as_str() {
        "synth" => cmd_synth(&args[2..]),
        "version" | "--version" | "-v" => {
            println!("mcdc_synth {}", VERSION);
            Ok(())
        }
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        cmd => {
            eprintln!("Unknown command: {}", cmd);
            print_usage();
            Err("Unknown command".into())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(1)
        }
    }
}

fn print_usage() {
    println!(
        r#"
mcdc_synth - MCDC test-case synthesizer

USAGE:
    mcdc_synth <COMMAND> [OPTIONS]

COMMANDS:
    synth <catalog.json> <modules.json>   Synthesize MCDC test cases
    version                               Print the crate version

OPTIONS:
    --output <file>        Write the CSV report here (default: stdout)
    --timeout-ms <n>       Per-atom solver timeout in milliseconds (default: 10000)
    --real-precision <n>   Significant digits for rendered real witnesses (default: 10)

EXAMPLES:
    mcdc_synth synth catalog.json modules.json --output report.csv
"#
    );
}

fn cmd_synth(args: &[String]) -> Result<()> {
    if args.len() < 2 {
        return Err("Usage: mcdc_synth synth <catalog.json> <modules.json> [--output file]".into());
    }

    let catalog_path = &args[0];
    let modules_path = &args[1];
    let output = parse_output_arg(args);
    let config = parse_config_args(args);

    let catalog_file = File::open(catalog_path).map_err(Error::Io)?;
    let catalog = load_catalog(BufReader::new(catalog_file))?;

    let modules_file = File::open(modules_path).map_err(Error::Io)?;
    let modules = load_modules(BufReader::new(modules_file))?;

    let (records, diagnostics) = run_all(&modules, &catalog, &config);

    for diagnostic in &diagnostics {
        eprintln!("{diagnostic}");
    }

    match output {
        Some(path) => {
            let file = File::create(&path).map_err(Error::Io)?;
            write_report(file, &records)?;
            eprintln!("Written to: {}", path.display());
        }
        None => {
            let mut buf = Vec::new();
            write_report(&mut buf, &records)?;
            print!("{}", String::from_utf8_lossy(&buf));
        }
    }

    eprintln!(
        "{} test case(s) from {} diagnostic(s)",
        records.len(),
        diagnostics.len()
    );

    Ok(())
}

fn parse_output_arg(args: &[String]) -> Option<PathBuf> {
    for (i, arg) in args.iter().enumerate() {
        if arg == "--output" || arg == "-o" {
            if let Some(path) = args.get(i + 1) {
                return Some(PathBuf::from(path));
            }
        }
    }
    None
}

fn parse_config_args(args: &[String]) -> SynthesisConfig {
    let mut config = SynthesisConfig::default();
    for (i, arg) in args.iter().enumerate() {
        match arg.as_str() {
            "--timeout-ms" => {
                if let Some(v) = args.get(i + 1).and_then(|v| v.parse().ok()) {
                    config.solver_timeout_ms = v;
                }
            }
            "--real-precision" => {
                if let Some(v) = args.get(i + 1).and_then(|v| v.parse().ok()) {
                    config.real_precision = v;
                }
            }
            _ => {}
        }
    }
    config
}
