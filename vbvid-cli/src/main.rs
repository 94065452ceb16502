// ============================================================================
// vbvid-cli/src/main.rs
// ============================================================================
//
// MAIN ENTRY POINT: vbvid command-line application
//
// Parses arguments, resolves the target directory, sets up file logging and
// the progress reporter, then runs the stage the directory is in. Exits with
// status 1 when the run fails outright or any item fails.

use console::style;
use log::LevelFilter;
use std::path::{Path, PathBuf};
use std::process;

use vbvid::error::{CliErrorContext, CliResult};
use vbvid::logging::run_log_path;
use vbvid::{Cli, RunOutcome, parse_cli, run_command};
use vbvid_core::CoreError;
use vbvid_core::file_logging::setup_file_logging;
use vbvid_core::reporting::{JsonReporter, Reporter, TerminalReporter};

fn main() {
    let args = parse_cli();

    match run(args) {
        Ok(outcome) if outcome.has_failures() => process::exit(1),
        Ok(_) => {}
        Err(e) => {
            log::error!("{e}");
            eprintln!("{} {}", style("ERROR").red().bold(), e);
            process::exit(1);
        }
    }
}

fn run(args: Cli) -> CliResult<RunOutcome> {
    let target_dir = resolve_target_dir(&args.target_dir)?;

    let log_level = if args.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    // A dry run leaves the target untouched unless a log directory was named.
    let log_dir = match (&args.log_dir, args.no_log, args.dry_run) {
        (_, true, _) => None,
        (Some(dir), false, _) => Some(dir.clone()),
        (None, false, true) => None,
        (None, false, false) => Some(target_dir.join(".logs")),
    };

    if let Some(log_dir) = log_dir {
        std::fs::create_dir_all(&log_dir).cli_context(format!(
            "Failed to create log directory {}",
            log_dir.display()
        ))?;
        let log_path = run_log_path(&log_dir);
        setup_file_logging(&log_path, log_level)
            .cli_context("Failed to initialize file logging")?;
        log::info!("Log file: {}", log_path.display());
    }

    log::info!("vbvid {} started on {}", env!("CARGO_PKG_VERSION"), target_dir.display());

    let reporter: Box<dyn Reporter> = if args.progress_json {
        Box::new(JsonReporter::new())
    } else {
        Box::new(TerminalReporter::new())
    };

    run_command(&args, target_dir, reporter.as_ref())
}

fn resolve_target_dir(path: &Path) -> CliResult<PathBuf> {
    let resolved = path.canonicalize().map_err(|e| {
        CoreError::PathError(format!("Invalid target directory {}: {}", path.display(), e))
    })?;
    if !resolved.is_dir() {
        return Err(CoreError::PathError(format!(
            "Target is not a directory: {}",
            resolved.display()
        )));
    }
    Ok(resolved)
}
