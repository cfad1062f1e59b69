use colored::Colorize;
use error_stack::{IntoReport, Report};
use log::debug;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::spotify::track::SpotifyTrack;
use crate::spotify::{PlaylistItem, PlaylistSource, SpotifyError, SpotifyResult};

/// Playlist id extracted from whatever the user pasted: an
/// `open.spotify.com/.../playlist/{id}` url, a `spotify:playlist:{id}` uri or the id
/// itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistId(String);

impl PlaylistId {
    pub fn parse(input: &str) -> SpotifyResult<Self> {
        let input = input.trim();
        if input.is_empty() {
            return Err(Report::new(SpotifyError).attach_printable("Playlist url is empty"));
        }
        if let Some(id) = input.strip_prefix("spotify:playlist:") {
            return Ok(Self(id.to_string()));
        }
        if let Ok(playlist_url) = Url::parse(input) {
            if playlist_url.has_host() {
                let mut sections = playlist_url
                    .path_segments()
                    .ok_or(SpotifyError)
                    .into_report()?;
                // locale prefixed urls look like /intl-es/playlist/{id}
                return match sections.find(|section| *section == "playlist") {
                    Some(_) => match sections.next() {
                        Some(id) if !id.is_empty() => Ok(Self(id.to_string())),
                        _ => Err(Report::new(SpotifyError)
                            .attach_printable("Playlist url has no playlist id")),
                    },
                    None => Err(Report::new(SpotifyError)
                        .attach_printable(format!("{} is not a playlist url", input))),
                };
            }
        }
        // Anything else goes to the API untouched and is rejected there if invalid.
        Ok(Self(input.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct SpotifyPlaylist {
    pub name: String,
    pub spotify_playlist_id: String,
    pub tracks: Vec<SpotifyTrack>,
}

impl SpotifyPlaylist {
    /// Fetches the playlist name and its full track listing.
    ///
    /// Name and tracks come from two independent requests; the listing always starts
    /// again from the first page.
    pub async fn fetch<S>(source: &S, playlist_id: &PlaylistId) -> SpotifyResult<Self>
    where
        S: PlaylistSource + ?Sized,
    {
        let name = Self::get_playlist_name(source, playlist_id).await?;
        let tracks = Self::get_all_playlist_tracks(source, playlist_id).await?;
        Ok(Self {
            name,
            spotify_playlist_id: playlist_id.as_str().to_string(),
            tracks,
        })
    }

    pub async fn get_playlist_name<S>(source: &S, playlist_id: &PlaylistId) -> SpotifyResult<String>
    where
        S: PlaylistSource + ?Sized,
    {
        let name = source.playlist_name(playlist_id.as_str()).await?;
        println!("The playlist name is {}", name.clone().green());
        Ok(name)
    }

    /// Follows `next` links until the last page, keeping the service's order.
    pub async fn get_all_playlist_tracks<S>(
        source: &S,
        playlist_id: &PlaylistId,
    ) -> SpotifyResult<Vec<SpotifyTrack>>
    where
        S: PlaylistSource + ?Sized,
    {
        let mut page = source.first_tracks_page(playlist_id.as_str()).await?;
        let mut tracks = Vec::with_capacity(page.items.len());
        Self::process_track_items(&mut tracks, page.items);

        while let Some(next_url) = page.next.take() {
            debug!("Fetching next tracks page {}", next_url);
            page = source.next_tracks_page(&next_url).await?;
            Self::process_track_items(&mut tracks, page.items);
        }

        Ok(tracks)
    }

    fn process_track_items(tracks: &mut Vec<SpotifyTrack>, items: Vec<PlaylistItem>) {
        for item in items {
            match item.track {
                Some(track) => tracks.push(SpotifyTrack::from_api_track(track)),
                None => println!(
                    "{}",
                    "Skipping a playlist entry with no track (it might be unavailable)".yellow()
                ),
            }
        }
    }
}
