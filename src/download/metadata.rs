//! Metadata resolution through yt-dlp in no-download mode.
//!
//! One `--dump-single-json` call per URL yields title, artist/uploader,
//! thumbnail URL and duration. No media payload is transferred.

use serde::{Deserialize, Serialize};
use tokio::process::Command;

use crate::core::config::{self, DownloadConfig};
use crate::core::error::AppError;
use crate::core::process::{run_with_timeout, stderr_tail};

/// Artist used when the resolver knows neither artist nor uploader
pub const UNKNOWN_ARTIST: &str = "unknown";

/// Resolved description of a remote audio source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AudioMetadata {
    pub artist: String,
    pub title: String,
    /// Cover image URL; `None` means the placeholder is used
    pub thumbnail_url: Option<String>,
    pub duration_secs: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct Thumbnail {
    url: Option<String>,
}

/// Subset of yt-dlp's info dict that we read
#[derive(Debug, Deserialize)]
struct InfoJson {
    title: Option<String>,
    artist: Option<String>,
    uploader: Option<String>,
    channel: Option<String>,
    thumbnail: Option<String>,
    #[serde(default)]
    thumbnails: Vec<Thumbnail>,
    duration: Option<f64>,
}

/// yt-dlp prints "NA" for missing template fields; treat it like absence.
fn present(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty() && v != "NA")
}

/// Parses the JSON printed by `yt-dlp --dump-single-json`.
pub fn parse_info_json(json: &str) -> Result<AudioMetadata, AppError> {
    let info: InfoJson =
        serde_json::from_str(json).map_err(|e| AppError::Extraction(format!("Unparsable yt-dlp output: {}", e)))?;

    let title = present(info.title)
        .ok_or_else(|| AppError::Extraction("Resolver returned no title".to_string()))?;

    let artist = present(info.artist)
        .or_else(|| present(info.uploader))
        .or_else(|| present(info.channel))
        .unwrap_or_else(|| UNKNOWN_ARTIST.to_string());

    // The list is ordered by preference, best last
    let thumbnail_url = present(info.thumbnail).or_else(|| info.thumbnails.into_iter().rev().find_map(|t| present(t.url)));

    let duration_secs = info
        .duration
        .filter(|d| d.is_finite() && *d >= 0.0)
        .map(|d| d.round() as u32);

    Ok(AudioMetadata {
        artist,
        title,
        thumbnail_url,
        duration_secs,
    })
}

/// Builds the yt-dlp argument list for a metadata-only query.
pub fn metadata_args(config: &DownloadConfig, url: &str) -> Vec<String> {
    let mut args: Vec<String> = vec![
        "--dump-single-json".into(),
        "--skip-download".into(),
        "--flat-playlist".into(),
        "--no-playlist".into(),
        "--no-warnings".into(),
    ];
    if let Some(cookies) = config.usable_cookies_file() {
        args.push("--cookies".into());
        args.push(cookies.display().to_string());
    }
    args.push(url.to_string());
    args
}

/// Resolves title, artist and thumbnail for `url` without downloading media.
pub async fn extract_metadata(config: &DownloadConfig, url: &str) -> Result<AudioMetadata, AppError> {
    log::info!("Extracting audio details for {}", url);
    let args = metadata_args(config, url);
    log::debug!("yt-dlp command for metadata: {} {}", config.ytdl_bin, args.join(" "));

    let output = run_with_timeout(
        Command::new(&config.ytdl_bin).args(&args),
        config::download::metadata_timeout(),
    )
    .await
    .map_err(|e| {
        log::error!("Failed to extract audio details: {}", e);
        AppError::Extraction(e.to_string())
    })?;

    if !output.status.success() {
        let stderr = stderr_tail(&output.stderr, 500);
        log::error!("yt-dlp metadata failed ({}): {}", output.status, stderr);
        return Err(AppError::Extraction(format!("yt-dlp exited with {}: {}", output.status, stderr)));
    }

    let metadata = parse_info_json(&String::from_utf8_lossy(&output.stdout))?;
    log::info!(
        "Got metadata from yt-dlp: title='{}', artist='{}'",
        metadata.title,
        metadata.artist
    );
    Ok(metadata)
}
