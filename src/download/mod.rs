//! Download-and-tag pipeline

pub mod artifact;
pub mod metadata;
pub mod pipeline;
pub mod source;
pub mod tagger;
pub mod thumbnail;
pub mod ytdlp;

// Re-exports for convenience
pub use artifact::AudioArtifact;
pub use metadata::AudioMetadata;
pub use pipeline::Downloader;
pub use source::AudioSource;
pub use ytdlp::YtDlpSource;
