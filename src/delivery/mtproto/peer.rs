use grammers_client::Client;
use grammers_tl_types as tl;

use super::error::MtProtoError;

const LINK_PREFIXES: &[&str] = &[
    "https://t.me/",
    "http://t.me/",
    "https://telegram.me/",
    "http://telegram.me/",
    "t.me/",
];

/// Extracts the public username from `https://t.me/name`, `@name` or `name`.
///
/// Invite links (`t.me/+...`, `t.me/joinchat/...`) have no username and are rejected.
pub fn parse_channel_username(reference: &str) -> Result<String, MtProtoError> {
    let trimmed = reference.trim();
    let rest = LINK_PREFIXES
        .iter()
        .find_map(|prefix| trimmed.strip_prefix(prefix))
        .unwrap_or(trimmed);
    let rest = rest.strip_prefix('@').unwrap_or(rest);
    let name = rest.split(['/', '?', '#']).next().unwrap_or_default();

    let valid = !name.is_empty()
        && name != "joinchat"
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(name.to_string())
    } else {
        Err(MtProtoError::InvalidChannel(reference.to_string()))
    }
}

pub async fn resolve_peer(client: &Client, username: &str) -> Result<tl::enums::InputPeer, MtProtoError> {
    let chat = client
        .resolve_username(username)
        .await?
        .ok_or_else(|| MtProtoError::PeerNotFound(username.to_string()))?;
    log::debug!("Resolved @{} to chat {}", username, chat.id());
    Ok(chat.pack().to_input_peer())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_channel_username() {
        assert_eq!(parse_channel_username("https://t.me/mychannel").unwrap(), "mychannel");
        assert_eq!(parse_channel_username("t.me/my_channel/15").unwrap(), "my_channel");
        assert_eq!(parse_channel_username("@mychannel").unwrap(), "mychannel");
        assert_eq!(parse_channel_username(" mychannel ").unwrap(), "mychannel");
        assert_eq!(parse_channel_username("https://t.me/@chan?x=1").unwrap(), "chan");
    }

    #[test]
    fn test_parse_channel_username_rejects_invites() {
        assert!(parse_channel_username("https://t.me/+AbCdEf").is_err());
        assert!(parse_channel_username("https://t.me/joinchat/AbCdEf").is_err());
        assert!(parse_channel_username("").is_err());
        assert!(parse_channel_username("https://t.me/").is_err());
    }
}
