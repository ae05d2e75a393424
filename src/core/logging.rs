//! Logging initialization and configuration checking
//!
//! This module provides:
//! - Logger initialization (console + file), called once by `main`
//! - Cookies configuration validation and logging

use anyhow::Result;
use simplelog::*;
use std::fs::File;

use crate::core::config::DownloadConfig;

/// Initialize logger for both console and file output
///
/// # Arguments
/// * `log_file_path` - Path to the log file
///
/// # Returns
/// * `Ok(())` - Logger initialized successfully
/// * `Err(anyhow::Error)` - Failed to create the file or a logger was already set
pub fn init_logger(log_file_path: &str) -> Result<()> {
    let log_file = File::create(log_file_path).map_err(|e| anyhow::anyhow!("Failed to create log file: {}", e))?;

    CombinedLogger::init(vec![
        TermLogger::new(
            LevelFilter::Info,
            Config::default(),
            TerminalMode::Mixed,
            ColorChoice::Auto,
        ),
        WriteLogger::new(LevelFilter::Info, Config::default(), log_file),
    ])
    .map_err(|e| anyhow::anyhow!("Failed to initialize logger: {}", e))?;

    Ok(())
}

/// Logs the yt-dlp cookies configuration at application startup
pub fn log_cookies_configuration(config: &DownloadConfig) {
    match &config.cookies_file {
        Some(path) if path.exists() => {
            let shown = path.canonicalize().unwrap_or_else(|_| path.clone());
            log::info!("✅ COOKIE_FILE: {}", shown.display());
            log::info!("   File exists and will be passed to yt-dlp");
        }
        Some(path) => {
            log::error!("❌ COOKIE_FILE: {} (FILE NOT FOUND!)", path.display());
            log::error!("   Current directory: {:?}", std::env::current_dir());
            log::error!("   Continuing without cookies, age-gated videos will fail");
        }
        None => {
            log::warn!("⚠️  COOKIE_FILE: not set, yt-dlp runs without cookies");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use tempfile::NamedTempFile;

    #[test]
    fn test_init_logger_creates_log_file() {
        let temp_file = NamedTempFile::new().unwrap();
        let path = temp_file.path().to_str().unwrap();

        // A logger may already be installed by another test in this binary;
        // the file must be created either way.
        let _ = init_logger(path);
        assert!(temp_file.path().exists());
    }

    #[test]
    fn test_log_cookies_configuration_handles_all_states() {
        let mut config = DownloadConfig::with_temp_dir("tmp");
        log_cookies_configuration(&config);

        config.cookies_file = Some("/no/such/cookies.txt".into());
        log_cookies_configuration(&config);

        let file = NamedTempFile::new().unwrap();
        config.cookies_file = Some(file.path().to_path_buf());
        log_cookies_configuration(&config);
    }
}
