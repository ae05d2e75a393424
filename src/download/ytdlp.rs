//! yt-dlp backed `AudioSource`, the one used in production.
//!
//! Metadata comes from `--dump-single-json`; audio is fetched with
//! `bestaudio/best` and transcoded to MP3 by yt-dlp's ffmpeg post-processor.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::process::Command;

use crate::core::config::{self, DownloadConfig};
use crate::core::error::AppError;
use crate::core::process::{run_with_timeout, stderr_tail};
use crate::download::metadata::{extract_metadata, AudioMetadata};
use crate::download::source::AudioSource;

/// Download source backed by the yt-dlp binary.
///
/// Holds its own copy of the download configuration, so each call sees the
/// same immutable options.
pub struct YtDlpSource {
    config: DownloadConfig,
}

impl YtDlpSource {
    pub fn new(config: DownloadConfig) -> Self {
        Self { config }
    }
}

/// yt-dlp output template for `dest`: same stem, extension filled in by yt-dlp.
///
/// `-x --audio-format mp3` rewrites the extension, so `<stem>.%(ext)s` ends
/// up as `<stem>.mp3`.
pub fn output_template(dest: &Path) -> PathBuf {
    dest.with_extension("%(ext)s")
}

/// Builds the yt-dlp argument list for an audio download into `dest`.
pub fn audio_args(config: &DownloadConfig, url: &str, dest: &Path) -> Vec<String> {
    let mut args: Vec<String> = vec![
        "--format".into(),
        "bestaudio/best".into(),
        "--extract-audio".into(),
        "--audio-format".into(),
        "mp3".into(),
        "--audio-quality".into(),
        format!("{}K", config::download::AUDIO_BITRATE_KBPS),
        "--no-playlist".into(),
        "--no-progress".into(),
        "--quiet".into(),
        "--output".into(),
        output_template(dest).display().to_string(),
    ];
    if let Some(cookies) = config.usable_cookies_file() {
        args.push("--cookies".into());
        args.push(cookies.display().to_string());
    }
    args.push(url.to_string());
    args
}

#[async_trait]
impl AudioSource for YtDlpSource {
    fn name(&self) -> &str {
        "yt-dlp"
    }

    async fn get_audio_details(&self, url: &str) -> Result<AudioMetadata, AppError> {
        extract_metadata(&self.config, url).await
    }

    async fn download_audio(&self, url: &str, dest: &Path) -> Result<(), AppError> {
        log::info!("Downloading audio to {}", dest.display());
        let args = audio_args(&self.config, url, dest);
        log::debug!("yt-dlp command for audio: {} {}", self.config.ytdl_bin, args.join(" "));

        let output = run_with_timeout(
            Command::new(&self.config.ytdl_bin).args(&args),
            config::download::audio_timeout(),
        )
        .await
        .map_err(|e| {
            log::error!("Audio download failed: {}", e);
            AppError::Fetch(e.to_string())
        })?;

        if !output.status.success() {
            let stderr = stderr_tail(&output.stderr, 500);
            log::error!("yt-dlp audio download failed ({}): {}", output.status, stderr);
            return Err(AppError::Fetch(format!("yt-dlp exited with {}: {}", output.status, stderr)));
        }

        if !tokio::fs::try_exists(dest).await.unwrap_or(false) {
            return Err(AppError::Fetch(format!(
                "yt-dlp finished but produced no audio at {}",
                dest.display()
            )));
        }

        log::info!("Audio downloaded to {}", dest.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_template_keeps_stem() {
        let tpl = output_template(Path::new("/tmp/relay/3f2a.mp3"));
        assert_eq!(tpl, PathBuf::from("/tmp/relay/3f2a.%(ext)s"));
    }

    #[test]
    fn test_audio_args_fixed_codec_and_bitrate() {
        let config = DownloadConfig::with_temp_dir("tmp");
        let args = audio_args(&config, "https://youtu.be/abc123", Path::new("tmp/x.mp3"));

        let pos = args.iter().position(|a| a == "--audio-format").unwrap();
        assert_eq!(args[pos + 1], "mp3");
        let pos = args.iter().position(|a| a == "--audio-quality").unwrap();
        assert_eq!(args[pos + 1], "192K");
        let pos = args.iter().position(|a| a == "--format").unwrap();
        assert_eq!(args[pos + 1], "bestaudio/best");
        assert_eq!(args.last().map(String::as_str), Some("https://youtu.be/abc123"));
    }

    #[tokio::test]
    async fn test_missing_binary_is_fetch_error() {
        let mut config = DownloadConfig::with_temp_dir("tmp");
        config.ytdl_bin = "definitely-not-yt-dlp-9c1e".into();
        let source = YtDlpSource::new(config);
        let err = source
            .download_audio("https://youtu.be/abc123", Path::new("tmp/never.mp3"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Fetch(_)));
    }
}
