use std::fmt;
use std::path::{Path, PathBuf};

use error_stack::{Report, Result};

use crate::Suggestion;

#[derive(Debug)]
pub struct ConfigError;

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Config error")
    }
}

impl std::error::Error for ConfigError {}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// `AppConfig` holds the values a sync run needs: the Spotify client credentials
/// and the mount point of the USB drive the playlist folders are written to.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub spotify_client_id: String,
    pub spotify_client_secret: String,
    pub usb_path: PathBuf,
    pub yt_dlp_path: PathBuf,
}

impl AppConfig {
    pub const SPOTIFY_CLIENT_ID_VAR: &'static str = "SPOTIFY_CLIENT_ID";
    pub const SPOTIFY_CLIENT_SECRET_VAR: &'static str = "SPOTIFY_CLIENT_SECRET";
    pub const USB_PATH_VAR: &'static str = "USB_PATH";
    pub const YT_DLP_PATH_VAR: &'static str = "YT_DLP_PATH";
    /// Mount point used when `USB_PATH` is not set.
    pub const DEFAULT_USB_PATH: &'static str = "/Volumes/SANDISK 32";
    pub const DEFAULT_YT_DLP_PATH: &'static str = "yt-dlp";

    /// Builds the config and checks the USB drive is mounted.
    ///
    /// Credentials must be non-empty. The USB path must already exist: it is a
    /// removable device, so it is never created here.
    pub fn new(
        spotify_client_id: Option<String>,
        spotify_client_secret: Option<String>,
        usb_path: impl Into<PathBuf>,
        yt_dlp_path: impl Into<PathBuf>,
    ) -> ConfigResult<Self> {
        let spotify_client_id = Self::require(spotify_client_id, Self::SPOTIFY_CLIENT_ID_VAR)?;
        let spotify_client_secret =
            Self::require(spotify_client_secret, Self::SPOTIFY_CLIENT_SECRET_VAR)?;
        let config = Self {
            spotify_client_id,
            spotify_client_secret,
            usb_path: usb_path.into(),
            yt_dlp_path: yt_dlp_path.into(),
        };
        config.check_usb_path()?;
        Ok(config)
    }

    pub fn check_usb_path(&self) -> ConfigResult<()> {
        if !Path::new(&self.usb_path).exists() {
            return Err(Report::new(ConfigError)
                .attach_printable(format!(
                    "USB drive not found at {}. Please plug it in.",
                    self.usb_path.display()
                ))
                .attach(Suggestion(format!(
                    "mount the drive or point {} to an existing folder",
                    Self::USB_PATH_VAR
                ))));
        }
        Ok(())
    }

    fn require(value: Option<String>, var_name: &str) -> ConfigResult<String> {
        match value {
            Some(value) if !value.trim().is_empty() => Ok(value),
            _ => Err(Report::new(ConfigError)
                .attach_printable(format!("{var_name} is not set"))
                .attach(Suggestion(format!(
                    "add {var_name} to your environment or to a .env file"
                )))),
        }
    }
}
