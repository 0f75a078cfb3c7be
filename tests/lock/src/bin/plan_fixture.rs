//! Binary that runs every fixture domain through the harness and prints
//! deterministic `key=value` lines for cross-process verification.
//!
//! Usage: `plan_fixture [verbosity]`
//!
//! `verbosity` (0-3, default 0) controls planner events. Events go to
//! stderr through a `tracing-subscriber` fmt layer filtered by `RUST_LOG`;
//! stdout carries only the report lines, one blank line between reports.

use std::process::ExitCode;

use hopper_search::policy::Verbosity;
use lock_tests::fixtures::{fixture_reports, report_lines};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let level = match std::env::args().nth(1).map(|arg| arg.parse::<u8>()) {
        None => 0,
        Some(Ok(level)) => level,
        Some(Err(e)) => {
            eprintln!("usage: plan_fixture [verbosity]: {e}");
            return ExitCode::from(2);
        }
    };
    let verbosity = match Verbosity::new(level) {
        Ok(v) => v,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::from(2);
        }
    };

    let reports = match fixture_reports(verbosity) {
        Ok(reports) => reports,
        Err(e) => {
            eprintln!("fixture run failed: {e}");
            return ExitCode::FAILURE;
        }
    };
    let blocks: Vec<String> = reports
        .iter()
        .map(|report| report_lines(report).join("\n"))
        .collect();
    println!("{}", blocks.join("\n\n"));
    ExitCode::SUCCESS
}
