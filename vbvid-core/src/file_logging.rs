//! File logging via log4rs.
//!
//! The log file gets every record at the requested level. Terminal output is
//! the reporter's job, so no console appender is configured.

use anyhow::Result;
use log::LevelFilter;
use log4rs::{
    append::file::FileAppender,
    config::{Appender, Config, Logger, Root},
    encode::pattern::PatternEncoder,
};
use std::path::Path;

/// Installs the global logger, writing to `log_file`. Creates the parent
/// directory when missing. Can only succeed once per process.
pub fn setup_file_logging(log_file: &Path, log_level: LevelFilter) -> Result<()> {
    if let Some(parent) = log_file.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file_appender = FileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(
            "{d(%Y-%m-%d %H:%M:%S)} [{l}] {m}{n}",
        )))
        .build(log_file)?;

    // ffmpeg's own log lines stay at warn unless running verbose.
    let ffmpeg_level = if log_level >= LevelFilter::Debug {
        log_level
    } else {
        LevelFilter::Warn
    };

    let config = Config::builder()
        .appender(Appender::builder().build("file", Box::new(file_appender)))
        .logger(Logger::builder().build("ffmpeg_log", ffmpeg_level))
        .build(Root::builder().appender("file").build(log_level))?;

    log4rs::init_config(config)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_setup_creates_log_file() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let log_file = dir.path().join("logs").join("vbvid_run.log");

        setup_file_logging(&log_file, LevelFilter::Info)?;
        log::info!("hello from the test");

        assert!(log_file.is_file());
        Ok(())
    }
}
