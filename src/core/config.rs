use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::core::error::AppError;

/// Placeholder cover used when the resolver returns no thumbnail URL
pub const DEFAULT_THUMBNAIL_FALLBACK_URL: &str = "https://placehold.co/320x320.jpg?text=%E2%99%AA";

/// Default temporary directory, relative to the working directory
pub const DEFAULT_TEMP_DIR: &str = "tmp";

/// Download configuration
pub mod download {
    use super::Duration;

    /// Target MP3 bitrate in kbps for the yt-dlp post-processing step
    pub const AUDIO_BITRATE_KBPS: u32 = 192;

    /// Timeout for yt-dlp metadata commands (in seconds)
    pub const METADATA_TIMEOUT_SECS: u64 = 120;

    /// Timeout for yt-dlp audio downloads (in seconds)
    pub const AUDIO_TIMEOUT_SECS: u64 = 900;

    /// Timeout for the thumbnail HTTP request (in seconds)
    pub const THUMBNAIL_TIMEOUT_SECS: u64 = 30;

    /// Maximum length of the title-derived file stem
    pub const MAX_FILENAME_LEN: usize = 250;

    pub fn metadata_timeout() -> Duration {
        Duration::from_secs(METADATA_TIMEOUT_SECS)
    }

    pub fn audio_timeout() -> Duration {
        Duration::from_secs(AUDIO_TIMEOUT_SECS)
    }

    pub fn thumbnail_timeout() -> Duration {
        Duration::from_secs(THUMBNAIL_TIMEOUT_SECS)
    }
}

/// Network configuration
pub mod network {
    use super::Duration;

    /// Request timeout for Bot API requests (in seconds)
    /// Large audio uploads through the Bot API can take a while
    pub const REQUEST_TIMEOUT_SECS: u64 = 900; // 15 minutes

    pub fn timeout() -> Duration {
        Duration::from_secs(REQUEST_TIMEOUT_SECS)
    }
}

/// Everything the download pipeline needs. Buildable without Telegram credentials.
#[derive(Debug, Clone)]
pub struct DownloadConfig {
    /// yt-dlp binary (`YTDL_BIN`, default `yt-dlp`)
    pub ytdl_bin: String,
    /// Optional cookie file handed to yt-dlp (`COOKIE_FILE`)
    pub cookies_file: Option<PathBuf>,
    /// Where intermediate artifacts live (`TEMP_DIR`)
    pub temp_dir: PathBuf,
    /// Placeholder cover URL (`THUMBNAIL_FALLBACK_URL`)
    pub thumbnail_fallback_url: String,
}

impl DownloadConfig {
    /// Defaults rooted at the given temp dir
    pub fn with_temp_dir(temp_dir: impl Into<PathBuf>) -> Self {
        Self {
            ytdl_bin: "yt-dlp".to_string(),
            cookies_file: None,
            temp_dir: temp_dir.into(),
            thumbnail_fallback_url: DEFAULT_THUMBNAIL_FALLBACK_URL.to_string(),
        }
    }

    /// Cookie file, but only when it actually exists on disk
    pub fn usable_cookies_file(&self) -> Option<&PathBuf> {
        self.cookies_file.as_ref().filter(|p| p.exists())
    }

    fn from_lookup(lookup: &impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::with_temp_dir(non_empty(lookup, "TEMP_DIR").unwrap_or_else(|| DEFAULT_TEMP_DIR.into()));
        if let Some(bin) = non_empty(lookup, "YTDL_BIN") {
            config.ytdl_bin = bin;
        }
        if let Some(url) = non_empty(lookup, "THUMBNAIL_FALLBACK_URL") {
            config.thumbnail_fallback_url = url;
        }
        config.cookies_file = non_empty(lookup, "COOKIE_FILE").map(|p| PathBuf::from(shellexpand::tilde(&p).as_ref()));
        config
    }
}

/// Credentials and destination for both delivery transports
#[derive(Debug, Clone)]
pub struct TelegramConfig {
    /// Bot API token (`BOT_TOKEN` or `TELOXIDE_TOKEN`)
    pub bot_token: String,
    /// MTProto application id (`API_ID`)
    pub api_id: i32,
    /// MTProto application hash (`API_HASH`)
    pub api_hash: String,
    /// Phone number of the uploading user account (`PHONE_NUMBER`)
    pub phone_number: String,
    /// Optional 2FA password for the user account (`TWO_FA_PASSWORD`)
    pub two_fa_password: Option<String>,
    /// Human-readable channel reference for peer resolution (`CHANNEL_URL`)
    pub channel_url: String,
    /// Numeric channel id for the Bot API (`CHANNEL_ID`)
    pub channel_id: i64,
    /// grammers session file (`SESSION_PATH`)
    pub session_path: PathBuf,
    /// Local Bot API server instead of api.telegram.org (`BOT_API_URL`)
    pub bot_api_url: Option<String>,
}

impl TelegramConfig {
    fn from_lookup(lookup: &impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let bot_token = non_empty(lookup, "BOT_TOKEN")
            .or_else(|| non_empty(lookup, "TELOXIDE_TOKEN"))
            .ok_or_else(|| missing("BOT_TOKEN"))?;
        let api_id = parse_required(lookup, "API_ID")?;
        let channel_id = parse_required(lookup, "CHANNEL_ID")?;

        Ok(Self {
            bot_token,
            api_id,
            api_hash: non_empty(lookup, "API_HASH").ok_or_else(|| missing("API_HASH"))?,
            phone_number: non_empty(lookup, "PHONE_NUMBER").ok_or_else(|| missing("PHONE_NUMBER"))?,
            two_fa_password: non_empty(lookup, "TWO_FA_PASSWORD"),
            channel_url: non_empty(lookup, "CHANNEL_URL").ok_or_else(|| missing("CHANNEL_URL"))?,
            channel_id,
            session_path: non_empty(lookup, "SESSION_PATH")
                .unwrap_or_else(|| "audiorelay.session".to_string())
                .into(),
            bot_api_url: non_empty(lookup, "BOT_API_URL"),
        })
    }
}

/// Immutable application configuration, built once at startup and passed down
#[derive(Debug, Clone)]
pub struct Config {
    pub telegram: TelegramConfig,
    pub download: DownloadConfig,
}

impl Config {
    /// Read the full configuration from the process environment
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read the full configuration through an arbitrary key lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        Ok(Self {
            telegram: TelegramConfig::from_lookup(&lookup)?,
            download: DownloadConfig::from_lookup(&lookup),
        })
    }
}

impl DownloadConfig {
    /// Read only the download part from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(&|key: &str| env::var(key).ok())
    }
}

/// Log file path (`LOG_FILE_PATH`, default `audiorelay.log`)
pub fn log_file_path() -> String {
    env::var("LOG_FILE_PATH").unwrap_or_else(|_| "audiorelay.log".to_string())
}

fn non_empty(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn missing(key: &str) -> AppError {
    AppError::Config(format!("{} environment variable not set", key))
}

fn parse_required<T: std::str::FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<T, AppError> {
    let raw = non_empty(lookup, key).ok_or_else(|| missing(key))?;
    raw.parse()
        .map_err(|_| AppError::Config(format!("{} is not a valid number: {}", key, raw)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    fn full_env() -> Vec<(&'static str, &'static str)> {
        vec![
            ("BOT_TOKEN", "123:abc"),
            ("API_ID", "4242"),
            ("API_HASH", "deadbeef"),
            ("PHONE_NUMBER", "+10000000000"),
            ("CHANNEL_URL", "https://t.me/my_music"),
            ("CHANNEL_ID", "-1001234567890"),
        ]
    }

    #[test]
    fn test_full_config_parses() {
        let config = Config::from_lookup(lookup_from(&full_env())).unwrap();
        assert_eq!(config.telegram.api_id, 4242);
        assert_eq!(config.telegram.channel_id, -1001234567890);
        assert_eq!(config.telegram.session_path, PathBuf::from("audiorelay.session"));
        assert!(config.telegram.two_fa_password.is_none());
        assert!(config.telegram.bot_api_url.is_none());
        assert_eq!(config.download.ytdl_bin, "yt-dlp");
        assert_eq!(config.download.temp_dir, PathBuf::from(DEFAULT_TEMP_DIR));
        assert_eq!(config.download.thumbnail_fallback_url, DEFAULT_THUMBNAIL_FALLBACK_URL);
    }

    #[test]
    fn test_teloxide_token_fallback() {
        let mut env = full_env();
        env.retain(|(k, _)| *k != "BOT_TOKEN");
        env.push(("TELOXIDE_TOKEN", "999:xyz"));
        let config = Config::from_lookup(lookup_from(&env)).unwrap();
        assert_eq!(config.telegram.bot_token, "999:xyz");
    }

    #[test]
    fn test_bot_api_url_from_config() {
        let mut env = full_env();
        env.push(("BOT_API_URL", " http://localhost:8081 "));
        let config = Config::from_lookup(lookup_from(&env)).unwrap();
        assert_eq!(config.telegram.bot_api_url.as_deref(), Some("http://localhost:8081"));
    }

    #[test]
    fn test_missing_required_value() {
        let mut env = full_env();
        env.retain(|(k, _)| *k != "API_HASH");
        let err = Config::from_lookup(lookup_from(&env)).unwrap_err();
        assert!(matches!(err, AppError::Config(ref m) if m.contains("API_HASH")));
    }

    #[test]
    fn test_malformed_channel_id() {
        let mut env = full_env();
        env.retain(|(k, _)| *k != "CHANNEL_ID");
        env.push(("CHANNEL_ID", "not-a-number"));
        let err = Config::from_lookup(lookup_from(&env)).unwrap_err();
        assert!(matches!(err, AppError::Config(ref m) if m.contains("CHANNEL_ID")));
    }

    #[test]
    fn test_download_overrides() {
        let mut env = full_env();
        env.push(("YTDL_BIN", "/opt/yt-dlp"));
        env.push(("TEMP_DIR", "/var/tmp/relay"));
        env.push(("COOKIE_FILE", "/etc/cookies.txt"));
        env.push(("THUMBNAIL_FALLBACK_URL", "https://example.com/cover.jpg"));
        let config = Config::from_lookup(lookup_from(&env)).unwrap();
        assert_eq!(config.download.ytdl_bin, "/opt/yt-dlp");
        assert_eq!(config.download.temp_dir, PathBuf::from("/var/tmp/relay"));
        assert_eq!(config.download.cookies_file, Some(PathBuf::from("/etc/cookies.txt")));
        assert_eq!(config.download.thumbnail_fallback_url, "https://example.com/cover.jpg");
    }

    #[test]
    fn test_blank_values_count_as_missing() {
        let env = [("YTDL_BIN", "   "), ("COOKIE_FILE", "")];
        let config = DownloadConfig::from_lookup(&lookup_from(&env));
        assert_eq!(config.ytdl_bin, "yt-dlp");
        assert!(config.cookies_file.is_none());
    }

    #[test]
    fn test_usable_cookies_file_requires_existing_file() {
        let mut config = DownloadConfig::with_temp_dir("tmp");
        config.cookies_file = Some(PathBuf::from("/definitely/not/here/cookies.txt"));
        assert!(config.usable_cookies_file().is_none());

        let file = tempfile::NamedTempFile::new().unwrap();
        config.cookies_file = Some(file.path().to_path_buf());
        assert!(config.usable_cookies_file().is_some());
    }
}
