//! ID3 tagging of the downloaded MP3.
//!
//! Only tag frames are touched; the MPEG payload after the tag is copied
//! through untouched by the `id3` crate.

use id3::frame::{Picture, PictureType};
use id3::{Tag, TagLike, Version};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::core::error::AppError;

/// Whether the leading bytes look like an MP3 container: an ID3v2 header or
/// an MPEG audio frame sync.
pub(crate) fn looks_like_mp3(head: &[u8]) -> bool {
    match head {
        [b'I', b'D', b'3', ..] => true,
        [0xFF, second, ..] => second & 0xE0 == 0xE0,
        _ => false,
    }
}

fn write_tags(audio_path: &Path, title: &str, artist: &str, thumbnail_path: &Path) -> Result<(), AppError> {
    let mut head = [0u8; 4];
    let read = File::open(audio_path)
        .and_then(|mut f| f.read(&mut head))
        .map_err(|e| AppError::Tag(format!("Cannot open {}: {}", audio_path.display(), e)))?;
    if !looks_like_mp3(&head[..read]) {
        return Err(AppError::Tag(format!("{} is not an MP3 file", audio_path.display())));
    }

    let mut tag = match Tag::read_from_path(audio_path) {
        Ok(tag) => tag,
        Err(e) if matches!(e.kind, id3::ErrorKind::NoTag) => Tag::new(),
        Err(e) => return Err(AppError::Tag(format!("Cannot parse existing tag: {}", e))),
    };

    tag.set_title(title);
    tag.set_artist(artist);

    if thumbnail_path.exists() {
        let data = std::fs::read(thumbnail_path)
            .map_err(|e| AppError::Tag(format!("Cannot read cover {}: {}", thumbnail_path.display(), e)))?;
        tag.remove_picture_by_type(PictureType::CoverFront);
        tag.add_frame(Picture {
            mime_type: "image/jpeg".to_string(),
            picture_type: PictureType::CoverFront,
            description: "Cover".to_string(),
            data,
        });
    } else {
        log::warn!("No cover at {}, tagging without picture", thumbnail_path.display());
    }

    // v2.4 stores text frames as UTF-8
    tag.write_to_path(audio_path, Version::Id3v24)
        .map_err(|e| AppError::Tag(format!("Failed to write tags: {}", e)))?;
    Ok(())
}

/// Embeds title, artist and (if present on disk) the cover image.
///
/// Runs on the blocking pool; the file is rewritten in place.
pub async fn apply_tags(audio_path: &Path, title: &str, artist: &str, thumbnail_path: &Path) -> Result<(), AppError> {
    log::info!("Adding metadata to {}", audio_path.display());

    let audio: PathBuf = audio_path.to_path_buf();
    let thumb: PathBuf = thumbnail_path.to_path_buf();
    let title = title.to_string();
    let artist = artist.to_string();

    tokio::task::spawn_blocking(move || write_tags(&audio, &title, &artist, &thumb))
        .await
        .map_err(|e| AppError::Tag(format!("Tagging task failed: {}", e)))??;

    log::info!("Metadata added successfully to {}", audio_path.display());
    Ok(())
}
