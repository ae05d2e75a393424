//! Download orchestrator.
//!
//! Fixed stage order for one URL:
//!   spawn audio fetch (temp name) ‖ metadata → final name → thumbnail
//!   → join audio + thumbnail → rename → tag → artifact
//!
//! Every request works in its own `temp_dir/<id>/`, so equal titles never
//! share a path and a failure removes yt-dlp `.part` files along with ours.
//!
//! The backend is injected as an [`AudioSource`]; the order above is not.

use std::path::Path;
use std::sync::Arc;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::core::config::DownloadConfig;
use crate::core::error::AppError;
use crate::core::utils::filename_for_title;
use crate::download::artifact::{remove_dir_quietly, AudioArtifact};
use crate::download::source::AudioSource;
use crate::download::tagger::apply_tags;
use crate::download::thumbnail::fetch_thumbnail;

type AudioTask = JoinHandle<Result<(), AppError>>;

/// Runs the download-and-tag pipeline against an [`AudioSource`].
pub struct Downloader {
    config: DownloadConfig,
    source: Arc<dyn AudioSource>,
    http: reqwest::Client,
}

impl Downloader {
    /// Create a downloader with its own HTTP client for thumbnails
    pub fn new(config: DownloadConfig, source: Arc<dyn AudioSource>) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("audiorelay/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self::with_client(config, source, http))
    }

    pub fn with_client(config: DownloadConfig, source: Arc<dyn AudioSource>, http: reqwest::Client) -> Self {
        Self { config, source, http }
    }

    /// Downloads, renames and tags the audio behind `url`.
    ///
    /// On failure the request's work directory is removed before the error
    /// is returned, and a still-running audio fetch is aborted.
    pub async fn download(&self, url: &str) -> Result<AudioArtifact, AppError> {
        let id = Uuid::new_v4().simple().to_string();
        let work_dir = self.config.temp_dir.join(&id);
        tokio::fs::create_dir_all(&work_dir).await?;

        let temp_audio = work_dir.join(format!("{}.mp3", id));
        let thumbnail = work_dir.join(format!("{}_thumbnail.jpg", id));

        log::info!("Starting download of {} via {}", url, self.source.name());
        let source = Arc::clone(&self.source);
        let task_url = url.to_string();
        let task_dest = temp_audio.clone();
        let mut audio_task: Option<AudioTask> =
            Some(tokio::spawn(async move { source.download_audio(&task_url, &task_dest).await }));

        let outcome = self
            .run_stages(url, &mut audio_task, &work_dir, &temp_audio, &thumbnail)
            .await;

        if let Err(e) = &outcome {
            log::error!("Download of {} failed at {} stage: {}", url, e.category(), e);
            if let Some(task) = audio_task.take() {
                task.abort();
                let _ = task.await;
            }
            remove_dir_quietly(&work_dir).await;
        }

        outcome
    }

    async fn run_stages(
        &self,
        url: &str,
        audio_task: &mut Option<AudioTask>,
        work_dir: &Path,
        temp_audio: &Path,
        thumbnail: &Path,
    ) -> Result<AudioArtifact, AppError> {
        // Overlaps with the audio fetch spawned by the caller
        let metadata = self.source.get_audio_details(url).await?;

        let final_path = work_dir.join(format!("{}.mp3", filename_for_title(&metadata.title)));

        let audio = async {
            match audio_task.take() {
                Some(task) => task
                    .await
                    .map_err(|e| AppError::Fetch(format!("Audio download task failed: {}", e)))?,
                None => Err(AppError::Fetch("Audio download was not started".to_string())),
            }
        };
        let cover = fetch_thumbnail(
            &self.http,
            metadata.thumbnail_url.as_deref(),
            &self.config.thumbnail_fallback_url,
            thumbnail,
        );
        let (audio_result, cover_result) = tokio::join!(audio, cover);
        audio_result?;
        cover_result?;

        tokio::fs::rename(temp_audio, &final_path).await?;
        log::info!("Renamed {} -> {}", temp_audio.display(), final_path.display());

        apply_tags(&final_path, &metadata.title, &metadata.artist, thumbnail).await?;

        Ok(AudioArtifact {
            audio_path: final_path,
            thumbnail_path: thumbnail.to_path_buf(),
            artist: metadata.artist,
            title: metadata.title,
            duration_secs: metadata.duration_secs,
            work_dir: Some(work_dir.to_path_buf()),
        })
    }
}
