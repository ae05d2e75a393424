//! Getting tagged artifacts into the destination channel

pub mod mtproto;
pub mod router;
pub mod standard;

pub use mtproto::LargeFileUploader;
pub use router::{select_transport, DeliveryRouter, Transport, Uploader, BOT_API_UPLOAD_LIMIT};
pub use standard::StandardUploader;
