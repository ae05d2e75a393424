//! Cover image download and normalisation.
//!
//! This module provides functions for:
//! - Downloading the thumbnail over HTTP, with a placeholder when none was resolved
//! - Detecting image formats from magic bytes (JPEG, PNG, WebP)
//! - Shrinking covers to what Telegram accepts as a thumbnail: JPEG, at most
//!   320 px on the longest side and at most 200 KB

use std::path::Path;
use tokio::process::Command;

use crate::core::config::download::thumbnail_timeout;
use crate::core::error::AppError;
use crate::core::process::{run_with_timeout, stderr_tail, FFMPEG_TIMEOUT};

/// Telegram drops thumbnails above this size
pub(crate) const MAX_THUMBNAIL_BYTES: usize = 200 * 1024;
/// Longest thumbnail side Telegram accepts, in pixels
pub(crate) const MAX_THUMBNAIL_SIDE: u16 = 320;

/// Image format detected by magic bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ImageFormat {
    Jpeg,
    Png,
    WebP,
    Unknown,
}

/// Detects image format from the first bytes of a file (magic bytes)
///
/// # Arguments
///
/// * `bytes` - The first bytes of the image file (at least 12 bytes recommended)
pub(crate) fn detect_image_format(bytes: &[u8]) -> ImageFormat {
    match bytes {
        [0xFF, 0xD8, 0xFF, ..] => ImageFormat::Jpeg,
        [0x89, b'P', b'N', b'G', ..] => ImageFormat::Png,
        [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => ImageFormat::WebP,
        _ => ImageFormat::Unknown,
    }
}

/// Reads `(width, height)` from the first SOF segment of a JPEG.
///
/// Returns `None` for non-JPEG input or when the stream ends, or reaches
/// scan data, before a frame header.
pub(crate) fn jpeg_dimensions(bytes: &[u8]) -> Option<(u16, u16)> {
    if detect_image_format(bytes) != ImageFormat::Jpeg {
        return None;
    }
    let mut i = 2;
    while i + 4 <= bytes.len() {
        if bytes[i] != 0xFF {
            return None;
        }
        let marker = bytes[i + 1];
        match marker {
            // fill byte
            0xFF => {
                i += 1;
                continue;
            }
            // markers without a length field
            0x01 | 0xD0..=0xD8 => {
                i += 2;
                continue;
            }
            _ => {}
        }
        let len = u16::from_be_bytes([bytes[i + 2], bytes[i + 3]]) as usize;
        let is_frame_header = matches!(marker, 0xC0..=0xCF) && !matches!(marker, 0xC4 | 0xC8 | 0xCC);
        if is_frame_header {
            if i + 9 > bytes.len() {
                return None;
            }
            let height = u16::from_be_bytes([bytes[i + 5], bytes[i + 6]]);
            let width = u16::from_be_bytes([bytes[i + 7], bytes[i + 8]]);
            return Some((width, height));
        }
        if marker == 0xDA || len < 2 {
            return None;
        }
        i += 2 + len;
    }
    None
}

/// Whether `bytes` must go through ffmpeg before Telegram takes it as a thumbnail.
///
/// JPEGs without a readable frame header are judged by size alone. Unknown
/// formats are left alone, ffmpeg would not read them either.
pub(crate) fn thumbnail_needs_shrinking(bytes: &[u8]) -> bool {
    match detect_image_format(bytes) {
        ImageFormat::WebP | ImageFormat::Png => true,
        ImageFormat::Jpeg => {
            bytes.len() > MAX_THUMBNAIL_BYTES
                || jpeg_dimensions(bytes).is_some_and(|(w, h)| w.max(h) > MAX_THUMBNAIL_SIDE)
        }
        ImageFormat::Unknown => false,
    }
}

/// Re-encodes a cover as JPEG fitting in 320x320 and under 200 KB using ffmpeg
///
/// Works through two sibling files of `dest` so concurrent downloads never
/// share scratch paths. Smaller images are not scaled up.
async fn compress_thumbnail_jpeg(image_bytes: &[u8], dest: &Path) -> Result<Vec<u8>, AppError> {
    let temp_input = dest.with_extension("src.img");
    let temp_output = dest.with_extension("conv.jpg");

    tokio::fs::write(&temp_input, image_bytes)
        .await
        .map_err(|e| AppError::Fetch(format!("Failed to write thumbnail temp file: {}", e)))?;

    let scale = format!(
        "scale='min({side},iw)':'min({side},ih)':force_original_aspect_ratio=decrease",
        side = MAX_THUMBNAIL_SIDE
    );
    let result = run_with_timeout(
        Command::new("ffmpeg")
            .arg("-loglevel")
            .arg("error")
            .arg("-i")
            .arg(&temp_input)
            .arg("-vf")
            .arg(&scale)
            // Medium quality keeps a 320 px cover well under the limit
            .args(["-q:v", "5", "-frames:v", "1", "-y"])
            .arg(&temp_output),
        FFMPEG_TIMEOUT,
    )
    .await;

    let _ = tokio::fs::remove_file(&temp_input).await;

    let compressed = match result {
        Ok(output) if output.status.success() => tokio::fs::read(&temp_output)
            .await
            .map_err(|e| AppError::Fetch(format!("Failed to read compressed JPEG: {}", e))),
        Ok(output) => Err(AppError::Fetch(format!(
            "ffmpeg thumbnail compression failed: {}",
            stderr_tail(&output.stderr, 300)
        ))),
        Err(e) => Err(AppError::Fetch(format!("Failed to run ffmpeg: {}", e))),
    };

    let _ = tokio::fs::remove_file(&temp_output).await;

    let compressed = compressed?;
    if compressed.len() > MAX_THUMBNAIL_BYTES {
        return Err(AppError::Fetch(format!(
            "Compressed thumbnail still {} bytes",
            compressed.len()
        )));
    }
    Ok(compressed)
}

/// Downloads the cover image to `dest`.
///
/// `None` for `thumbnail_url` means the resolver had no cover; the
/// placeholder at `fallback_url` is fetched instead. Redirects are followed,
/// any non-2xx status fails the fetch.
pub async fn fetch_thumbnail(
    client: &reqwest::Client,
    thumbnail_url: Option<&str>,
    fallback_url: &str,
    dest: &Path,
) -> Result<(), AppError> {
    let url = match thumbnail_url {
        Some(url) => url,
        None => {
            log::info!("No thumbnail resolved, using placeholder {}", fallback_url);
            fallback_url
        }
    };
    log::info!("Downloading thumbnail from {}", url);

    let response = client
        .get(url)
        .timeout(thumbnail_timeout())
        .send()
        .await
        .map_err(|e| {
            log::error!("Failed to download thumbnail: {}", e);
            AppError::Fetch(format!("Thumbnail request failed: {}", e))
        })?;

    let status = response.status();
    if !status.is_success() {
        log::error!("Failed to download thumbnail: HTTP {}", status);
        return Err(AppError::Fetch(format!("Thumbnail request failed with status: {}", status)));
    }

    let bytes = response.bytes().await?;

    let content = if thumbnail_needs_shrinking(&bytes) {
        match compress_thumbnail_jpeg(&bytes, dest).await {
            Ok(jpeg) => {
                log::info!("Thumbnail compressed from {} to {} bytes", bytes.len(), jpeg.len());
                jpeg
            }
            Err(e) => {
                log::warn!("Keeping thumbnail as downloaded: {}", e);
                bytes.to_vec()
            }
        }
    } else {
        bytes.to_vec()
    };

    tokio::fs::write(dest, &content).await?;
    log::info!("Thumbnail downloaded to {} ({} bytes)", dest.display(), content.len());
    Ok(())
}
