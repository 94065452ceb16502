//! Error types for the vbvid-core library.
//!
//! Every fallible operation in the core returns [`CoreResult`]. External tool
//! failures keep the exit code and the captured stderr so a failed item can be
//! reported without re-running it.

use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Path error: {0}")]
    PathError(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Failed to start {0}: {1}")]
    CommandStart(String, #[source] io::Error),

    #[error("Failed waiting for {0}: {1}")]
    CommandWait(String, #[source] io::Error),

    #[error("{tool} failed (exit code {}): {stderr}", format_exit_code(.exit_code))]
    ExternalToolFailure {
        tool: String,
        exit_code: Option<i32>,
        stderr: String,
    },

    #[error("JSON parse error: {0}")]
    JsonParseError(String),

    #[error("Video stream information unavailable: {0}")]
    VideoInfoError(String),

    #[error("Destination already exists: {}", .0.display())]
    DestinationAlreadyExists(PathBuf),

    #[error("Required external command not found: {0}")]
    DependencyNotFound(String),

    #[error("Operation failed: {0}")]
    OperationFailed(String),
}

pub type CoreResult<T> = Result<T, CoreError>;

fn format_exit_code(code: &Option<i32>) -> String {
    code.map_or_else(|| "none".to_string(), |c| c.to_string())
}

/// Error for a command that could not be spawned.
pub fn command_start_error(tool: impl Into<String>, err: io::Error) -> CoreError {
    CoreError::CommandStart(tool.into(), err)
}

/// Error for a spawned command whose completion could not be awaited.
pub fn command_wait_error(tool: impl Into<String>, err: io::Error) -> CoreError {
    CoreError::CommandWait(tool.into(), err)
}

/// Error for a command that ran but exited unsuccessfully.
pub fn command_failed_error(
    tool: impl Into<String>,
    status: ExitStatus,
    stderr: impl Into<String>,
) -> CoreError {
    CoreError::ExternalToolFailure {
        tool: tool.into(),
        exit_code: status.code(),
        stderr: stderr.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_external_tool_failure_message_includes_exit_code_and_stderr() {
        let err = CoreError::ExternalToolFailure {
            tool: "ffmpeg (concat)".to_string(),
            exit_code: Some(1),
            stderr: "Invalid data found when processing input".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("ffmpeg (concat)"));
        assert!(msg.contains("exit code 1"));
        assert!(msg.contains("Invalid data found"));
    }

    #[test]
    fn test_missing_exit_code_is_rendered() {
        let err = CoreError::ExternalToolFailure {
            tool: "ffmpeg".to_string(),
            exit_code: None,
            stderr: String::new(),
        };
        assert!(err.to_string().contains("exit code none"));
    }
}
