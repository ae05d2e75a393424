//! Bot API delivery for artifacts within the upload limit.

use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{InputFile, ParseMode};

use crate::core::error::AppError;
use crate::core::utils::format_channel_caption;
use crate::delivery::router::Uploader;
use crate::download::AudioArtifact;

pub struct StandardUploader {
    bot: Bot,
    channel_id: ChatId,
}

impl StandardUploader {
    pub fn new(bot: Bot, channel_id: i64) -> Self {
        Self {
            bot,
            channel_id: ChatId(channel_id),
        }
    }
}

#[async_trait]
impl Uploader for StandardUploader {
    fn name(&self) -> &str {
        "bot-api"
    }

    async fn upload(&self, artifact: &AudioArtifact, caption: &str) -> Result<(), AppError> {
        if !artifact.audio_path.is_file() {
            return Err(AppError::Upload(format!(
                "Audio file not found: {}",
                artifact.audio_path.display()
            )));
        }

        let mut request = self
            .bot
            .send_audio(self.channel_id, InputFile::file(&artifact.audio_path))
            .caption(format_channel_caption(caption))
            .parse_mode(ParseMode::Html)
            .title(artifact.title.clone())
            .performer(artifact.artist.clone());

        if artifact.thumbnail_path.is_file() {
            request = request.thumbnail(InputFile::file(&artifact.thumbnail_path));
        } else {
            log::warn!("No cover at {}, sending without thumbnail", artifact.thumbnail_path.display());
        }
        if let Some(duration) = artifact.duration_secs {
            request = request.duration(duration);
        }

        match request.await {
            Ok(message) => {
                log::info!("Sent {} to channel {} (message {})", artifact.title, self.channel_id, message.id.0);
                Ok(())
            }
            Err(e) => {
                log::error!("Bot API upload of {} failed: {}", artifact.audio_path.display(), e);
                Err(AppError::from(e))
            }
        }
    }
}
