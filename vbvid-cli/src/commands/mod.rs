// ============================================================================
// vbvid-cli/src/commands/mod.rs
// ============================================================================
//
// COMMAND HANDLERS: Implementation of CLI entry points
//
// vbvid has a single command; its mode (normal run, recode-only or dry run)
// is picked from flags in `run::run_command`.

pub mod run;

pub use run::{RunOutcome, build_core_config, run_command};
