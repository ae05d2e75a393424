//! Large-file delivery through a user session (MTProto).
//!
//! The Bot API refuses uploads above 50 MiB; a regular user account does not.
//! Parts are uploaded directly and the message is sent with `messages.sendMedia`.

pub mod error;
pub mod media;
pub mod peer;
pub mod session;
pub mod upload;

use async_trait::async_trait;
use grammers_client::Client;

use crate::core::config::TelegramConfig;
use crate::core::error::AppError;
use crate::delivery::router::Uploader;
use crate::download::AudioArtifact;

pub use error::MtProtoError;
pub use session::{Connect, LazySession, UserConnector};
pub use upload::UploadedFile;

/// Sends artifacts above the Bot API limit to the channel as a user.
pub struct LargeFileUploader {
    session: LazySession<UserConnector>,
    channel_username: String,
}

impl LargeFileUploader {
    pub fn new(connector: UserConnector, channel_reference: &str) -> Result<Self, MtProtoError> {
        Ok(Self {
            session: LazySession::new(connector),
            channel_username: peer::parse_channel_username(channel_reference)?,
        })
    }

    pub fn from_config(config: &TelegramConfig) -> Result<Self, MtProtoError> {
        let connector = UserConnector {
            api_id: config.api_id,
            api_hash: config.api_hash.clone(),
            phone_number: config.phone_number.clone(),
            two_fa_password: config.two_fa_password.clone(),
            session_path: config.session_path.clone(),
        };
        Self::new(connector, &config.channel_url)
    }

    async fn send(&self, client: &Client, artifact: &AudioArtifact, caption: &str) -> Result<(), MtProtoError> {
        let (cover, audio, peer) = tokio::try_join!(
            upload::upload_file(client, &artifact.thumbnail_path),
            upload::upload_file(client, &artifact.audio_path),
            peer::resolve_peer(client, &self.channel_username),
        )?;

        let media = media::build_audio_media(audio, cover, &artifact.title, &artifact.artist, artifact.duration_secs);
        let request = media::send_media_request(peer, media, caption, rand::random());
        client.invoke(&request).await?;
        Ok(())
    }
}

#[async_trait]
impl Uploader for LargeFileUploader {
    fn name(&self) -> &str {
        "mtproto"
    }

    async fn upload(&self, artifact: &AudioArtifact, caption: &str) -> Result<(), AppError> {
        let client = self.session.client().await.map_err(|e| {
            log::error!("User session unavailable: {}", e);
            AppError::from(e)
        })?;

        self.send(client, artifact, caption).await.map_err(|e| {
            log::error!("Large-file upload of {} failed: {}", artifact.audio_path.display(), e);
            AppError::from(e)
        })?;

        log::info!("Sent {} to @{} via user session", artifact.title, self.channel_username);
        Ok(())
    }
}
