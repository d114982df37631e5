use std::{env::args_os, process::ExitCode};

use colony_phenotyper::{analyze_plates, CLIParser};

fn main() -> ExitCode {
    let mut cli_parser = CLIParser::default();
    let arguments = cli_parser.parse(args_os());
    match analyze_plates(&arguments) {
        Ok(summary) if summary.failed == 0 => {
            println!("Analyzed {} plates", summary.analyzed);
            ExitCode::SUCCESS
        }
        Ok(summary) => {
            eprintln!(
                "Analyzed {} plates, {} failed",
                summary.analyzed, summary.failed
            );
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("Analysis failed because of: {}", e);
            ExitCode::FAILURE
        }
    }
}
