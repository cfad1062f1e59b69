use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub mod api;
pub mod playlist;
pub mod track;

#[derive(Debug)]
pub struct SpotifyError;

impl fmt::Display for SpotifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Spotify error")
    }
}

impl std::error::Error for SpotifyError {}

pub type SpotifyResult<T> = error_stack::Result<T, SpotifyError>;

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ApiArtist {
    pub name: String,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ApiTrack {
    pub name: String,
    // podcast episodes come without artists
    #[serde(default)]
    pub artists: Vec<ApiArtist>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct PlaylistItem {
    pub track: Option<ApiTrack>,
}

/// One page of a playlist's track listing. `next` is the absolute url of the
/// following page, `None` on the last one.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct PlaylistTracks {
    pub items: Vec<PlaylistItem>,
    pub next: Option<String>,
}

/// Where playlist metadata comes from. `SpotifyApi` talks to the Web API, tests
/// provide canned pages.
#[async_trait]
pub trait PlaylistSource: Send + Sync {
    async fn playlist_name(&self, playlist_id: &str) -> SpotifyResult<String>;

    async fn first_tracks_page(&self, playlist_id: &str) -> SpotifyResult<PlaylistTracks>;

    async fn next_tracks_page(&self, next_url: &str) -> SpotifyResult<PlaylistTracks>;
}
