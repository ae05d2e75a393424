use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "audiorelay")]
#[command(author, version, about = "Telegram bot that turns YouTube links into tagged MP3 channel posts", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Run the bot (default)
    Run,

    /// Download and tag a single URL locally, without uploading
    Download {
        /// YouTube URL
        url: String,

        /// Directory for the resulting files (defaults to TEMP_DIR)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Print the metadata resolved for a URL
    Info {
        /// YouTube URL
        url: String,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
