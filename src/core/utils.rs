use crate::core::config::download::MAX_FILENAME_LEN;

/// Characters that are invalid in file names on at least one common filesystem.
const RESERVED_CHARS: [char; 9] = ['\\', '/', ':', '*', '?', '"', '<', '>', '|'];

/// Replaces reserved characters in a title so it can be used as a file name.
///
/// Each of `\ / : * ? " < > |` becomes `_`, then all trailing dots are
/// stripped (Windows silently drops them, which breaks later lookups).
///
/// # Example
///
/// ```
/// use audiorelay::core::utils::sanitize_filename;
///
/// assert_eq!(sanitize_filename("My Song: Live!"), "My Song_ Live!");
/// assert_eq!(sanitize_filename("a/b..."), "a_b");
/// ```
pub fn sanitize_filename(name: &str) -> String {
    let replaced: String = name
        .chars()
        .map(|c| if RESERVED_CHARS.contains(&c) { '_' } else { c })
        .collect();
    replaced.trim_end_matches('.').to_string()
}

/// Builds the on-disk stem for a title: sanitized, at most 250 characters.
///
/// Truncation happens on a char boundary and trailing dots exposed by the cut
/// are stripped again. An empty result falls back to `"audio"`.
pub fn filename_for_title(title: &str) -> String {
    let sanitized = sanitize_filename(title);
    let truncated: String = sanitized.chars().take(MAX_FILENAME_LEN).collect();
    let stem = truncated.trim_end_matches('.');
    if stem.is_empty() {
        "audio".to_string()
    } else {
        stem.to_string()
    }
}

/// Escapes text for Telegram's HTML parse mode.
pub fn escape_html(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            _ => result.push(c),
        }
    }
    result
}

/// Caption attached to audio posted into the channel.
///
/// # Example
///
/// ```
/// use audiorelay::core::utils::format_channel_caption;
///
/// assert_eq!(format_channel_caption("A & B"), "🔉 <b>A &amp; B</b>");
/// ```
pub fn format_channel_caption(title: &str) -> String {
    format!("🔉 <b>{}</b>", escape_html(title))
}
