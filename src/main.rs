use anyhow::Result;
use dotenvy::dotenv;
use std::path::PathBuf;
use std::sync::Arc;
use teloxide::prelude::*;

use audiorelay::cli::{Cli, Commands};
use audiorelay::core::config::{self, DownloadConfig};
use audiorelay::core::{init_logger, log_cookies_configuration, Config};
use audiorelay::download::metadata::extract_metadata;
use audiorelay::download::{Downloader, YtDlpSource};
use audiorelay::relay::Relay;
use audiorelay::telegram::{create_bot, schema, setup_bot_profile, HandlerDeps};

/// Main entry point
///
/// Parses CLI arguments and dispatches to the chosen subcommand.
///
/// # Errors
/// Returns an error if initialization fails (logging, configuration, bot creation).
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();

    // .env first so LOG_FILE_PATH can come from it
    let _ = dotenv();

    init_logger(&config::log_file_path())?;

    match cli.command {
        Some(Commands::Run) | None => run_bot().await,
        Some(Commands::Download { url, output }) => run_cli_download(url, output).await,
        Some(Commands::Info { url, json }) => run_cli_info(url, json).await,
    }
}

async fn run_bot() -> Result<()> {
    let config = Config::from_env()?;
    log_cookies_configuration(&config.download);

    let bot = create_bot(&config.telegram)?;
    match bot.get_me().await {
        Ok(me) => log::info!("Bot started as @{}", me.username()),
        Err(e) => return Err(anyhow::anyhow!("Failed to reach Telegram: {}", e)),
    }
    if let Err(e) = setup_bot_profile(&bot).await {
        log::warn!("Failed to set bot commands/description: {}", e);
    }

    let relay = Arc::new(Relay::from_config(&config, bot.clone())?);
    let handler = schema(HandlerDeps::new(relay));

    log::info!(
        "Relaying to channel {} (large files via {})",
        config.telegram.channel_id,
        config.telegram.channel_url
    );
    Dispatcher::builder(bot, handler)
        .default_handler(|update| async move {
            log::debug!("Unhandled update: {:?}", update.kind);
        })
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    log::info!("Dispatcher shutdown gracefully");
    Ok(())
}

/// Run the pipeline for one URL and keep the files
async fn run_cli_download(url: String, output: Option<String>) -> Result<()> {
    let mut download_config = DownloadConfig::from_env();
    if let Some(dir) = output {
        download_config.temp_dir = PathBuf::from(shellexpand::tilde(&dir).into_owned());
    }
    log_cookies_configuration(&download_config);

    let source = Arc::new(YtDlpSource::new(download_config.clone()));
    let downloader = Downloader::new(download_config, source)?;
    let artifact = downloader.download(&url).await?;
    let size = artifact.audio_size().await?;

    println!("Title:     {}", artifact.title);
    println!("Artist:    {}", artifact.artist);
    println!("Audio:     {} ({:.2} MB)", artifact.audio_path.display(), size as f64 / (1024.0 * 1024.0));
    println!("Thumbnail: {}", artifact.thumbnail_path.display());
    Ok(())
}

/// Print resolved metadata for a URL
async fn run_cli_info(url: String, json: bool) -> Result<()> {
    let download_config = DownloadConfig::from_env();
    let metadata = extract_metadata(&download_config, &url).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&metadata)?);
    } else {
        println!("Title:     {}", metadata.title);
        println!("Artist:    {}", metadata.artist);
        println!(
            "Duration:  {}",
            metadata
                .duration_secs
                .map(|d| format!("{}:{:02}", d / 60, d % 60))
                .unwrap_or_else(|| "unknown".to_string())
        );
        println!(
            "Thumbnail: {}",
            metadata.thumbnail_url.as_deref().unwrap_or("(placeholder)")
        );
    }
    Ok(())
}
