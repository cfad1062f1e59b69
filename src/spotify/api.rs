use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use error_stack::{IntoReport, Report, ResultExt};
use log::debug;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use url::Url;

use crate::config::AppConfig;
use crate::spotify::{PlaylistSource, PlaylistTracks, SpotifyError, SpotifyResult};

#[derive(Deserialize, Debug)]
struct TokenResponse {
    access_token: String,
}

#[derive(Deserialize, Debug)]
struct ApiPlaylistName {
    name: String,
}

/// Spotify Web API client authenticated with the client credentials flow.
///
/// The token is requested once in [`SpotifyApi::connect`] and reused for every
/// request of the run.
pub struct SpotifyApi {
    client: reqwest::Client,
    access_token: String,
}

impl SpotifyApi {
    const TOKEN_URL: &'static str = "https://accounts.spotify.com/api/token";
    const API_BASE: &'static str = "https://api.spotify.com/v1/";
    /// Largest page the tracks endpoint serves.
    const PAGE_SIZE: &'static str = "100";

    pub async fn connect(config: &AppConfig) -> SpotifyResult<Self> {
        let client = reqwest::Client::new();
        let auth_string = format!(
            "{}:{}",
            config.spotify_client_id, config.spotify_client_secret
        );
        let encoded_auth = general_purpose::STANDARD.encode(auth_string);

        debug!("Requesting Spotify access token");
        let token_response = client
            .post(Self::TOKEN_URL)
            .header("Authorization", format!("Basic {}", encoded_auth))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .into_report()
            .change_context(SpotifyError)?
            .error_for_status()
            .into_report()
            .attach_printable("Spotify rejected the client credentials")
            .change_context(SpotifyError)?
            .json::<TokenResponse>()
            .await
            .into_report()
            .change_context(SpotifyError)?;

        Ok(Self {
            client,
            access_token: token_response.access_token,
        })
    }

    fn playlist_url(playlist_id: &str, tail: Option<&str>) -> SpotifyResult<Url> {
        let mut url = Url::parse(Self::API_BASE)
            .into_report()
            .change_context(SpotifyError)?;
        url.path_segments_mut()
            .map_err(|_| Report::new(SpotifyError).attach_printable("Invalid API base url"))?
            .pop_if_empty()
            .extend(["playlists", playlist_id])
            .extend(tail);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> SpotifyResult<T> {
        debug!("GET {}", url);
        self.client
            .get(url.clone())
            .bearer_auth(&self.access_token)
            .send()
            .await
            .into_report()
            .change_context(SpotifyError)?
            .error_for_status()
            .into_report()
            .attach_printable(format!("Request to {} failed", url))
            .change_context(SpotifyError)?
            .json::<T>()
            .await
            .into_report()
            .attach_printable(format!("Unexpected response from {}", url))
            .change_context(SpotifyError)
    }
}

#[async_trait]
impl PlaylistSource for SpotifyApi {
    async fn playlist_name(&self, playlist_id: &str) -> SpotifyResult<String> {
        let mut url = Self::playlist_url(playlist_id, None)?;
        url.query_pairs_mut().append_pair("fields", "name");
        let playlist: ApiPlaylistName = self.get_json(url).await?;
        Ok(playlist.name)
    }

    async fn first_tracks_page(&self, playlist_id: &str) -> SpotifyResult<PlaylistTracks> {
        let mut url = Self::playlist_url(playlist_id, Some("tracks"))?;
        url.query_pairs_mut()
            .append_pair("limit", Self::PAGE_SIZE)
            .append_pair("fields", "items(track(name,artists(name))),next");
        self.get_json(url).await
    }

    async fn next_tracks_page(&self, next_url: &str) -> SpotifyResult<PlaylistTracks> {
        let url = Url::parse(next_url)
            .into_report()
            .attach_printable(format!("Invalid next page url {}", next_url))
            .change_context(SpotifyError)?;
        self.get_json(url).await
    }
}
