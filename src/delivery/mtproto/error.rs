//! MTProto-specific error types

use thiserror::Error;

/// Errors that can occur during MTProto operations
#[derive(Error, Debug)]
pub enum MtProtoError {
    /// Grammers client invocation error
    #[error("MTProto client error: {0}")]
    Invocation(#[from] grammers_mtsender::InvocationError),

    /// Session-related errors (connect, load, save)
    #[error("Session error: {0}")]
    Session(String),

    /// Sign-in failed
    #[error("Sign-in failed: {0}")]
    SignIn(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Channel reference could not be turned into a username
    #[error("Invalid channel reference: {0}")]
    InvalidChannel(String),

    /// Username resolved to nothing
    #[error("Peer not found: {0}")]
    PeerNotFound(String),

    /// Zero-byte files cannot be uploaded
    #[error("Cannot upload empty file: {0}")]
    EmptyFile(String),

    /// More parts than the protocol accepts
    #[error("File too large for upload: {0} bytes")]
    FileTooLarge(u64),

    /// Server answered `false` to a part upload
    #[error("Server rejected file part {0}")]
    PartRejected(i32),

    /// A part worker panicked or was cancelled
    #[error("Part upload task failed: {0}")]
    PartTask(#[from] tokio::task::JoinError),
}

impl From<MtProtoError> for crate::core::error::AppError {
    fn from(err: MtProtoError) -> Self {
        crate::core::error::AppError::Upload(format!("MTProto: {}", err))
    }
}
