//! Size-based choice between the Bot API and the user-session transport.

use async_trait::async_trait;
use std::sync::Arc;

use crate::core::error::{AppError, AppResult};
use crate::download::AudioArtifact;

/// Largest file the Bot API accepts (50 MiB), inclusive.
pub const BOT_API_UPLOAD_LIMIT: u64 = 52_428_800;

/// A way of getting an artifact into the destination channel.
#[async_trait]
pub trait Uploader: Send + Sync {
    fn name(&self) -> &str;

    async fn upload(&self, artifact: &AudioArtifact, caption: &str) -> Result<(), AppError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    Standard,
    Large,
}

pub fn select_transport(size: u64) -> Transport {
    if size <= BOT_API_UPLOAD_LIMIT {
        Transport::Standard
    } else {
        Transport::Large
    }
}

pub struct DeliveryRouter {
    standard: Arc<dyn Uploader>,
    large: Arc<dyn Uploader>,
}

impl DeliveryRouter {
    pub fn new(standard: Arc<dyn Uploader>, large: Arc<dyn Uploader>) -> Self {
        Self { standard, large }
    }

    /// Sends `artifact` through the transport its on-disk size allows.
    pub async fn route(&self, artifact: &AudioArtifact, caption: &str) -> AppResult<Transport> {
        let size = artifact
            .audio_size()
            .await
            .map_err(|e| AppError::Upload(format!("Cannot stat {}: {}", artifact.audio_path.display(), e)))?;

        let transport = select_transport(size);
        let uploader = match transport {
            Transport::Standard => &self.standard,
            Transport::Large => &self.large,
        };
        log::info!(
            "Routing {} ({:.2} MB) via {}",
            artifact.audio_path.display(),
            size as f64 / (1024.0 * 1024.0),
            uploader.name()
        );

        uploader.upload(artifact, caption).await?;
        Ok(transport)
    }
}
