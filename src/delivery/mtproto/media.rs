//! Builds the `messages.sendMedia` request for a tagged audio file.

use grammers_tl_types as tl;

use super::upload::UploadedFile;

pub const AUDIO_MIME_TYPE: &str = "audio/mpeg";

fn audio_attribute(title: &str, performer: &str, duration_secs: Option<u32>) -> tl::enums::DocumentAttribute {
    tl::enums::DocumentAttribute::Audio(tl::types::DocumentAttributeAudio {
        voice: false,
        duration: duration_secs.map(|d| d.min(i32::MAX as u32) as i32).unwrap_or(0),
        title: Some(title.to_string()),
        performer: Some(performer.to_string()),
        waveform: None,
    })
}

/// Uploaded audio document with the cover as its thumbnail.
pub fn build_audio_media(
    audio: UploadedFile,
    cover: UploadedFile,
    title: &str,
    performer: &str,
    duration_secs: Option<u32>,
) -> tl::enums::InputMedia {
    tl::enums::InputMedia::UploadedDocument(tl::types::InputMediaUploadedDocument {
        nosound_video: false,
        force_file: false,
        spoiler: false,
        file: audio.into_input_file(),
        thumb: Some(cover.into_input_file()),
        mime_type: AUDIO_MIME_TYPE.to_string(),
        attributes: vec![audio_attribute(title, performer, duration_secs)],
        stickers: None,
        ttl_seconds: None,
    })
}

pub fn send_media_request(
    peer: tl::enums::InputPeer,
    media: tl::enums::InputMedia,
    message: &str,
    random_id: i64,
) -> tl::functions::messages::SendMedia {
    tl::functions::messages::SendMedia {
        silent: false,
        background: false,
        clear_draft: false,
        noforwards: false,
        update_stickersets_order: false,
        invert_media: false,
        peer,
        reply_to: None,
        media,
        message: message.to_string(),
        random_id,
        reply_markup: None,
        entities: None,
        schedule_date: None,
        send_as: None,
        quick_reply_shortcut: None,
    }
}
