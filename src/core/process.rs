//! Process execution utilities with timeout support
//!
//! Provides helpers for running external processes (yt-dlp, ffmpeg)
//! with configurable timeouts so a hung process cannot stall a request.

use std::process::Output;
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;

/// Default timeout for ffmpeg operations (2 minutes)
pub const FFMPEG_TIMEOUT: Duration = Duration::from_secs(120);

/// Failure modes of [`run_with_timeout`], mapped to a pipeline error by the caller
#[derive(Error, Debug)]
pub enum ProcessError {
    /// The binary could not be started
    #[error("failed to start process: {0}")]
    Spawn(#[source] std::io::Error),
    /// The process ran longer than allowed and was killed
    #[error("process timed out after {}s", .0.as_secs())]
    TimedOut(Duration),
}

/// Run an async Command with a timeout.
///
/// The child is killed when the timeout fires or the future is dropped.
pub async fn run_with_timeout(cmd: &mut Command, timeout: Duration) -> Result<Output, ProcessError> {
    cmd.kill_on_drop(true);
    match tokio::time::timeout(timeout, cmd.output()).await {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(e)) => Err(ProcessError::Spawn(e)),
        Err(_) => Err(ProcessError::TimedOut(timeout)),
    }
}

/// Last `max_chars` characters of a process stream, for log lines and error messages
pub fn stderr_tail(bytes: &[u8], max_chars: usize) -> String {
    let text = String::from_utf8_lossy(bytes);
    let trimmed = text.trim();
    let count = trimmed.chars().count();
    if count <= max_chars {
        return trimmed.to_string();
    }
    trimmed.chars().skip(count - max_chars).collect()
}
