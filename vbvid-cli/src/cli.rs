// vbvid-cli/src/cli.rs
//
// Defines the command-line argument structure using clap.

use clap::Parser;
use std::path::PathBuf;
use vbvid_core::config::MAX_QUALITY;

// --- CLI Argument Definition ---

#[derive(Parser, Debug, Clone)]
#[command(
    author,
    version, // Reads from Cargo.toml via "cargo" feature in clap
    about = "vbvid: group, join and recode camera clips",
    long_about = "Groups a directory of camera clips into recording sessions, joins each \
                  session into one file and recodes it to HEVC. Each run performs the next \
                  stage the directory is in; use --all to go through every stage at once."
)]
pub struct Cli {
    /// Directory containing the clips
    #[arg(required = true, value_name = "TARGET_DIR")]
    pub target_dir: PathBuf,

    /// Only recode the clips in TARGET_DIR, skipping grouping and joining
    #[arg(long, conflicts_with = "all")]
    pub recode_only: bool,

    /// Destination for --recode-only (defaults to TARGET_DIR/.recoded)
    #[arg(long, value_name = "DIR", requires = "recode_only")]
    pub dest: Option<PathBuf>,

    /// Continue through joining and recoding right after grouping
    #[arg(short = 'a', long)]
    pub all: bool,

    /// Show the detected stage and the grouping preview without changing anything
    #[arg(long, conflicts_with = "recode_only")]
    pub dry_run: bool,

    // --- Quality Overrides ---
    /// CRF for sources up to 3000 pixels wide
    #[arg(
        long,
        value_name = "CRF",
        env = "VBVID_QUALITY_STANDARD",
        value_parser = clap::value_parser!(u8).range(0..=MAX_QUALITY as i64)
    )]
    pub quality_standard: Option<u8>,

    /// CRF for sources wider than 3000 pixels
    #[arg(
        long,
        value_name = "CRF",
        env = "VBVID_QUALITY_HIGH_RES",
        value_parser = clap::value_parser!(u8).range(0..=MAX_QUALITY as i64)
    )]
    pub quality_high_res: Option<u8>,

    // --- Output and Logging ---
    /// Emit progress as JSON lines on stdout instead of the terminal UI
    #[arg(long)]
    pub progress_json: bool,

    /// Directory for log files (defaults to TARGET_DIR/.logs)
    #[arg(short, long, value_name = "LOG_DIR")]
    pub log_dir: Option<PathBuf>,

    /// Do not write a log file
    #[arg(long)]
    pub no_log: bool,

    /// Enable debug-level logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// Parses the process arguments, exiting with usage on error.
pub fn parse_cli() -> Cli {
    Cli::parse()
}

/// Parses an explicit argument list.
pub fn parse_cli_from<I, T>(args: I) -> Result<Cli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    Cli::try_parse_from(args)
}
