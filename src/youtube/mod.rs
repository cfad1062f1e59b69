use std::fmt;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

pub mod ytdlp;

#[derive(Debug)]
pub struct YoutubeError;

impl fmt::Display for YoutubeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Youtube error")
    }
}

impl std::error::Error for YoutubeError {}

pub type YoutubeResult<T> = error_stack::Result<T, YoutubeError>;

/// Maps a free-text query to the url of the best matching video.
#[async_trait]
pub trait TrackSearch: Send + Sync {
    async fn search(&self, query: &str) -> YoutubeResult<String>;
}

/// Downloads a video's audio and transcodes it into `{folder}/{file_stem}.mp3`.
#[async_trait]
pub trait TrackDownload: Send + Sync {
    async fn download(&self, url: &str, folder: &Path, file_stem: &str)
        -> YoutubeResult<PathBuf>;
}
