//! One link in, one channel post out.

use async_trait::async_trait;
use std::sync::Arc;

use crate::core::config::Config;
use crate::core::error::AppError;
use crate::delivery::{DeliveryRouter, LargeFileUploader, StandardUploader};
use crate::download::{AudioArtifact, Downloader, YtDlpSource};

/// Result of handling a single link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Delivered { title: String },
    DownloadFailed(String),
    UploadFailed(String),
}

impl DeliveryOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, DeliveryOutcome::Delivered { .. })
    }
}

/// Phase notifications for one [`Relay::handle_link_with`] call.
///
/// Both hooks run while the artifact files are still on disk.
#[async_trait]
pub trait RelayProgress: Send + Sync {
    /// Audio and cover are ready; the upload starts next
    async fn downloaded(&self, _artifact: &AudioArtifact) {}

    /// The channel post went through
    async fn delivered(&self, _artifact: &AudioArtifact) {}
}

/// Ignores every phase
pub struct NoProgress;

impl RelayProgress for NoProgress {}

pub struct Relay {
    downloader: Downloader,
    router: DeliveryRouter,
}

impl Relay {
    pub fn new(downloader: Downloader, router: DeliveryRouter) -> Self {
        Self { downloader, router }
    }

    /// Production wiring: yt-dlp source, Bot API and user-session transports.
    pub fn from_config(config: &Config, bot: teloxide::Bot) -> Result<Self, AppError> {
        let source = Arc::new(YtDlpSource::new(config.download.clone()));
        let downloader = Downloader::new(config.download.clone(), source)?;

        let standard = Arc::new(StandardUploader::new(bot, config.telegram.channel_id));
        let large = Arc::new(LargeFileUploader::from_config(&config.telegram).map_err(|e| AppError::Config(e.to_string()))?);

        Ok(Self::new(downloader, DeliveryRouter::new(standard, large)))
    }

    /// Downloads, tags and delivers `url`. Both artifact files are removed
    /// after the delivery attempt whatever its result.
    pub async fn handle_link(&self, url: &str) -> DeliveryOutcome {
        self.handle_link_with(url, &NoProgress).await
    }

    /// Like [`handle_link`](Self::handle_link), reporting phases to `progress`.
    pub async fn handle_link_with(&self, url: &str, progress: &dyn RelayProgress) -> DeliveryOutcome {
        let artifact = match self.downloader.download(url).await {
            Ok(artifact) => artifact,
            Err(e) => {
                log::warn!("Not delivering {}: {} error", url, e.category());
                return DeliveryOutcome::DownloadFailed(e.to_string());
            }
        };
        progress.downloaded(&artifact).await;

        let result = self.router.route(&artifact, &artifact.title).await;
        if result.is_ok() {
            progress.delivered(&artifact).await;
        }
        artifact.cleanup().await;

        match result {
            Ok(transport) => {
                log::info!("Delivered {} ({:?})", artifact.title, transport);
                DeliveryOutcome::Delivered { title: artifact.title }
            }
            Err(e) => {
                log::warn!("Delivery of {} failed: {}", artifact.title, e);
                DeliveryOutcome::UploadFailed(e.to_string())
            }
        }
    }
}
