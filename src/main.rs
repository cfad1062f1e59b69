use std::fmt;
use std::path::PathBuf;

use clap::Parser;
use colored::Colorize;
use error_stack::fmt::{Charset, ColorMode};
use error_stack::{Report, ResultExt};
use log::LevelFilter;

use crate::config::AppConfig;
use crate::dialoguer::Dialoguer;
use crate::spotify::api::SpotifyApi;
use crate::spotify::playlist::PlaylistId;
use crate::sync::sync_playlist;
use crate::youtube::ytdlp::YtDlp;

mod config;
mod dialoguer;
mod library;
mod spotify;
mod sync;
mod youtube;

#[derive(Debug)]
pub struct PlaylistSyncError;
impl fmt::Display for PlaylistSyncError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Playlist sync error")
    }
}
impl std::error::Error for PlaylistSyncError {}

pub type PlaylistSyncResult<T> = error_stack::Result<T, PlaylistSyncError>;

/// Download every track of a Spotify playlist as mp3 into a folder on a USB drive.
/// Tracks already on the drive are skipped.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about)]
struct Cli {
    /// Spotify playlist url, uri or id. Asked for interactively when missing
    playlist: Option<String>,
    /// Mount point of the USB drive
    #[arg(long, env = AppConfig::USB_PATH_VAR, default_value = AppConfig::DEFAULT_USB_PATH)]
    usb_path: PathBuf,
    #[arg(long, env = AppConfig::SPOTIFY_CLIENT_ID_VAR, hide_env_values = true)]
    client_id: Option<String>,
    #[arg(long, env = AppConfig::SPOTIFY_CLIENT_SECRET_VAR, hide_env_values = true)]
    client_secret: Option<String>,
    /// yt-dlp executable used to search and download
    #[arg(long = "yt-dlp", env = AppConfig::YT_DLP_PATH_VAR, default_value = AppConfig::DEFAULT_YT_DLP_PATH)]
    yt_dlp: PathBuf,
    /// Print debug logs
    #[arg(long, short, action)]
    verbose: bool,
}

pub struct Suggestion(String);

impl Suggestion {
    pub fn set_report() {
        Report::set_charset(Charset::Utf8);
        Report::set_color_mode(ColorMode::Color);
        Report::install_debug_hook::<Self>(|Self(value), context| {
            context.push_body(format!("{}: {value}", "suggestion".yellow()))
        });
    }
}

fn init_logging(verbose: bool) {
    let mut clog = colog::default_builder();
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    clog.filter(None, level);
    clog.init();
}

async fn run() -> PlaylistSyncResult<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    init_logging(cli.verbose);
    Suggestion::set_report();

    let config = AppConfig::new(cli.client_id, cli.client_secret, cli.usb_path, cli.yt_dlp)
        .change_context(PlaylistSyncError)?;

    let playlist_input = match cli.playlist {
        Some(playlist) => playlist,
        None => Dialoguer::input("Enter Spotify playlist URL".to_string())
            .change_context(PlaylistSyncError)?,
    };
    let playlist_id = PlaylistId::parse(&playlist_input).change_context(PlaylistSyncError)?;

    let spotify = SpotifyApi::connect(&config)
        .await
        .change_context(PlaylistSyncError)?;
    let ytdlp = YtDlp::new(config.yt_dlp_path.clone());

    sync_playlist(&spotify, &ytdlp, &ytdlp, &config.usb_path, &playlist_id)
        .await
        .change_context(PlaylistSyncError)?;
    Ok(())
}

#[tokio::main]
async fn main() -> PlaylistSyncResult<()> {
    run().await
}
