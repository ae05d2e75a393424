//! Download source abstraction.
//!
//! The pipeline in [`crate::download::pipeline`] is fixed; what varies is the
//! backend that resolves metadata and fetches the audio stream. Production
//! uses [`crate::download::ytdlp::YtDlpSource`], tests plug in their own.

use async_trait::async_trait;
use std::path::Path;

use crate::core::error::AppError;
use crate::download::metadata::AudioMetadata;

/// Backend for the two network-bound pipeline steps.
///
/// Both methods are invoked concurrently for the same URL, so implementations
/// must not share mutable per-call state.
#[async_trait]
pub trait AudioSource: Send + Sync {
    /// Human-readable name of this source (e.g., "yt-dlp")
    fn name(&self) -> &str;

    /// Resolve title, artist and thumbnail without downloading media.
    async fn get_audio_details(&self, url: &str) -> Result<AudioMetadata, AppError>;

    /// Download the best audio stream as MP3 to exactly `dest`.
    async fn download_audio(&self, url: &str, dest: &Path) -> Result<(), AppError>;
}
