//! Shared fixtures for integration tests
//!
//! Fake yt-dlp and Telegram stand-ins plus a wiremock server for thumbnails.

#![allow(dead_code)] // not every test binary uses every fixture

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use audiorelay::core::config::DownloadConfig;
use audiorelay::delivery::mtproto::{Connect, LazySession, MtProtoError};
use audiorelay::download::{AudioArtifact, AudioMetadata, AudioSource, Downloader};
use audiorelay::{AppError, Uploader};

/// Minimal MPEG frame header followed by silence
pub fn fake_mp3(len: usize) -> Vec<u8> {
    let mut bytes = vec![0xFF, 0xFB, 0x90, 0x64];
    bytes.resize(len.max(4), 0);
    bytes
}

pub const FAKE_JPEG: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F', 0x00];

/// Thumbnail server with `/cover.jpg` and `/placeholder.jpg`
pub async fn thumbnail_server() -> MockServer {
    let server = MockServer::start().await;
    for route in ["/cover.jpg", "/placeholder.jpg"] {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(FAKE_JPEG.to_vec()))
            .mount(&server)
            .await;
    }
    server
}

pub fn download_config(temp_dir: &Path, server: &MockServer) -> DownloadConfig {
    let mut config = DownloadConfig::with_temp_dir(temp_dir);
    config.thumbnail_fallback_url = format!("{}/placeholder.jpg", server.uri());
    config
}

/// AudioSource that answers from memory
pub struct FakeSource {
    pub metadata: Result<AudioMetadata, String>,
    pub metadata_delay: Duration,
    pub audio_len: usize,
    pub audio_delay: Duration,
    pub fail_audio: bool,
    pub audio_calls: AtomicUsize,
}

impl FakeSource {
    pub fn new(metadata: AudioMetadata) -> Self {
        Self {
            metadata: Ok(metadata),
            metadata_delay: Duration::ZERO,
            audio_len: 4096,
            audio_delay: Duration::ZERO,
            fail_audio: false,
            audio_calls: AtomicUsize::new(0),
        }
    }

    pub fn failing_metadata(reason: &str) -> Self {
        Self {
            metadata: Err(reason.to_string()),
            // let the audio write land before the failure
            metadata_delay: Duration::from_millis(100),
            audio_delay: Duration::from_secs(30),
            ..Self::new(metadata("unused", "unused", None))
        }
    }
}

pub fn metadata(title: &str, artist: &str, thumbnail_url: Option<String>) -> AudioMetadata {
    AudioMetadata {
        artist: artist.to_string(),
        title: title.to_string(),
        thumbnail_url,
        duration_secs: Some(215),
    }
}

#[async_trait]
impl AudioSource for FakeSource {
    fn name(&self) -> &str {
        "fake"
    }

    async fn get_audio_details(&self, _url: &str) -> Result<AudioMetadata, AppError> {
        tokio::time::sleep(self.metadata_delay).await;
        self.metadata.clone().map_err(AppError::Extraction)
    }

    async fn download_audio(&self, _url: &str, dest: &Path) -> Result<(), AppError> {
        self.audio_calls.fetch_add(1, Ordering::SeqCst);
        // sparse past the frame header, so large sizes stay cheap
        let mut file = tokio::fs::File::create(dest).await?;
        file.write_all(&fake_mp3(4)).await?;
        file.flush().await?;
        file.set_len(self.audio_len.max(4) as u64).await?;
        tokio::time::sleep(self.audio_delay).await;
        if self.fail_audio {
            return Err(AppError::Fetch("audio stream unavailable".to_string()));
        }
        Ok(())
    }
}

pub fn downloader(config: DownloadConfig, source: FakeSource) -> Downloader {
    Downloader::with_client(config, Arc::new(source), reqwest::Client::new())
}

/// Writes an executable `/bin/sh` stand-in for yt-dlp into `dir`
#[cfg(unix)]
pub fn fake_ytdlp(dir: &Path, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let script = dir.join("yt-dlp");
    std::fs::write(&script, format!("#!/bin/sh\n{}", body)).unwrap();
    std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
    script
}

/// Records what it was asked to upload
#[derive(Default)]
pub struct RecordingUploader {
    pub uploads: Mutex<Vec<Upload>>,
    pub fail_with: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    pub audio_path: PathBuf,
    pub title: String,
    pub artist: String,
    pub caption: String,
    pub size: u64,
    pub audio_existed: bool,
    pub thumbnail_existed: bool,
}

impl RecordingUploader {
    pub fn failing(reason: &str) -> Self {
        Self {
            uploads: Mutex::new(Vec::new()),
            fail_with: Some(reason.to_string()),
        }
    }

    pub fn count(&self) -> usize {
        self.uploads.lock().unwrap().len()
    }
}

async fn record(artifact: &AudioArtifact, caption: &str) -> Upload {
    Upload {
        audio_path: artifact.audio_path.clone(),
        title: artifact.title.clone(),
        artist: artifact.artist.clone(),
        caption: caption.to_string(),
        size: artifact.audio_size().await.unwrap_or(0),
        audio_existed: artifact.audio_path.exists(),
        thumbnail_existed: artifact.thumbnail_path.exists(),
    }
}

#[async_trait]
impl Uploader for RecordingUploader {
    fn name(&self) -> &str {
        "recording"
    }

    async fn upload(&self, artifact: &AudioArtifact, caption: &str) -> Result<(), AppError> {
        let upload = record(artifact, caption).await;
        self.uploads.lock().unwrap().push(upload);
        match &self.fail_with {
            Some(reason) => Err(AppError::Upload(reason.clone())),
            None => Ok(()),
        }
    }
}

/// Connector that counts how often a session is started
pub struct CountingConnector {
    pub starts: Arc<AtomicUsize>,
}

#[async_trait]
impl Connect for CountingConnector {
    type Client = ();

    async fn connect(&self) -> Result<(), MtProtoError> {
        self.starts.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(50)).await;
        Ok(())
    }
}

/// Large-file stand-in that needs the lazy session before it records
pub struct SessionUploader {
    pub session: LazySession<CountingConnector>,
    pub inner: RecordingUploader,
}

impl SessionUploader {
    pub fn new(starts: Arc<AtomicUsize>) -> Self {
        Self {
            session: LazySession::new(CountingConnector { starts }),
            inner: RecordingUploader::default(),
        }
    }
}

#[async_trait]
impl Uploader for SessionUploader {
    fn name(&self) -> &str {
        "session"
    }

    async fn upload(&self, artifact: &AudioArtifact, caption: &str) -> Result<(), AppError> {
        self.session.client().await?;
        self.inner.upload(artifact, caption).await
    }
}
