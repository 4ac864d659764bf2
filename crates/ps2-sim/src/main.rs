//! CLI entry point for the PS/2 receiver simulator binary.

use std::env;
use std::ffi::OsString;
use std::path::PathBuf;

use ps2_core::CoreConfig;
use ps2_sim::{load_config, run_script_file, SimError};
use serde_json as _;
#[cfg(test)]
use tempfile as _;
use thiserror as _;
use tracing::Level;

const USAGE_TEXT: &str = "\
Usage: ps2-sim <command> [options]

Commands:
  run <script> [--config <file>] [--verbose]  Run a stimulus script

Options:
  -c, --config <file>  JSON core configuration (missing fields use defaults)
  -v, --verbose        Log core events to stderr
  -h, --help           Show this help message

Script commands:
  idle <ticks>
  rate <hz>
  send <byte> [bad-parity|bad-start|bad-stop|no-stop]
  partial <byte> <bits>
  read [ticks]
  clear
  reset
  expect <byte>

Examples:
  ps2-sim run keyboard.ps2
  ps2-sim run keyboard.ps2 --config fast.json --verbose
";

#[derive(Debug, PartialEq, Eq)]
struct RunArgs {
    script: PathBuf,
    config: Option<PathBuf>,
    verbose: bool,
}

#[derive(Debug)]
enum ParseResult {
    Run(RunArgs),
    Help,
}

fn parse_args(mut args: impl Iterator<Item = OsString>) -> Result<ParseResult, String> {
    let first = args.next().ok_or_else(|| "missing command".to_string())?;

    if first == "--help" || first == "-h" {
        return Ok(ParseResult::Help);
    }

    let command_str = first.to_string_lossy().to_string();

    match command_str.as_str() {
        "run" => parse_run_args(args).map(ParseResult::Run),
        other => Err(format!("unknown command: {other}")),
    }
}

#[allow(clippy::while_let_on_iterator)]
fn parse_run_args(mut args: impl Iterator<Item = OsString>) -> Result<RunArgs, String> {
    let mut script: Option<PathBuf> = None;
    let mut config: Option<PathBuf> = None;
    let mut verbose = false;

    while let Some(arg) = args.next() {
        if arg == "--help" || arg == "-h" {
            return Err(USAGE_TEXT.to_string());
        }

        if arg == "--verbose" || arg == "-v" {
            verbose = true;
            continue;
        }

        if arg == "-c" || arg == "--config" {
            let value = args
                .next()
                .ok_or_else(|| "missing value for --config".to_string())?;
            config = Some(PathBuf::from(value));
            continue;
        }

        if arg.to_string_lossy().starts_with('-') {
            return Err(format!("unknown option: {}", arg.to_string_lossy()));
        }

        if script.is_some() {
            return Err("multiple script paths provided".to_string());
        }
        script = Some(PathBuf::from(arg));
    }

    let script = script.ok_or_else(|| "missing script path".to_string())?;
    Ok(RunArgs {
        script,
        config,
        verbose,
    })
}

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(args: &RunArgs) -> Result<(), i32> {
    init_logging(args.verbose);

    let config = match &args.config {
        Some(path) => load_config(path).map_err(|e| report_error(&e))?,
        None => CoreConfig::default(),
    };

    let report = run_script_file(&args.script, config).map_err(|e| report_error(&e))?;

    for line in &report.lines {
        println!("{line}");
    }

    if report.passed() {
        Ok(())
    } else {
        eprintln!(
            "error: {} expectation(s) failed in {}",
            report.expect_failures,
            args.script.display()
        );
        Err(1)
    }
}

fn report_error(error: &SimError) -> i32 {
    eprintln!("error: {error}");
    1
}

fn main() {
    let exit_code = match parse_args(env::args_os().skip(1)) {
        Ok(ParseResult::Help) => {
            println!("{USAGE_TEXT}");
            0
        }
        Ok(ParseResult::Run(args)) => match run(&args) {
            Ok(()) => 0,
            Err(code) => code,
        },
        Err(error) => {
            if error.starts_with("Usage:") {
                println!("{error}");
            } else {
                eprintln!("error: {error}");
                eprintln!("{USAGE_TEXT}");
            }
            1
        }
    };

    std::process::exit(exit_code);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;
    use std::path::PathBuf;

    #[test]
    fn parses_run_command() {
        let result = parse_run_args(
            [
                OsString::from("demo.ps2"),
                OsString::from("--config"),
                OsString::from("fast.json"),
                OsString::from("-v"),
            ]
            .into_iter(),
        )
        .expect("valid run args should parse");

        assert_eq!(
            result,
            RunArgs {
                script: PathBuf::from("demo.ps2"),
                config: Some(PathBuf::from("fast.json")),
                verbose: true,
            }
        );
    }

    #[test]
    fn parses_help_flag() {
        let result = parse_args([OsString::from("-h")].into_iter())
            .expect("help should parse without error");
        assert!(matches!(result, ParseResult::Help));
    }

    #[test]
    fn rejects_unknown_command() {
        let error = parse_args([OsString::from("replay")].into_iter())
            .expect_err("unknown command should fail parse");
        assert!(error.contains("unknown command"));
    }

    #[test]
    fn run_requires_a_script() {
        let error = parse_run_args(std::iter::empty()).expect_err("missing script should fail");
        assert!(error.contains("missing script"));
    }

    #[test]
    fn config_flag_needs_a_value() {
        let error = parse_run_args([OsString::from("demo.ps2"), OsString::from("-c")].into_iter())
            .expect_err("dangling config flag should fail");
        assert!(error.contains("missing value"));
    }

    #[test]
    fn rejects_second_script() {
        let error = parse_run_args([OsString::from("a.ps2"), OsString::from("b.ps2")].into_iter())
            .expect_err("two scripts should fail");
        assert!(error.contains("multiple script paths"));
    }
}
