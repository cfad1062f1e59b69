use serde::{Deserialize, Serialize};

use crate::library::sanitize_filename;
use crate::spotify::ApiTrack;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct SpotifyTrack {
    pub title: String,
    pub artist_name: String,
}

impl SpotifyTrack {
    pub fn new(title: impl Into<String>, artist_name: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            artist_name: artist_name.into(),
        }
    }

    /// Only the first credited artist is kept.
    pub fn from_api_track(track: ApiTrack) -> Self {
        let artist_name = track
            .artists
            .into_iter()
            .next()
            .map(|artist| artist.name)
            .unwrap_or_default();
        Self::new(track.name, artist_name)
    }

    pub fn get_track_search_term(&self) -> String {
        format!("{} {} audio", self.title, self.artist_name)
    }

    /// `"Artist - Title"` made safe for the filesystem. Doubles as the key checked
    /// against the files already on the drive.
    pub fn get_file_stem(&self) -> String {
        sanitize_filename(&format!("{} - {}", self.artist_name, self.title))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spotify::ApiArtist;

    #[test]
    fn test_from_api_track_keeps_first_artist() {
        let track = SpotifyTrack::from_api_track(ApiTrack {
            name: "Get Lucky".to_string(),
            artists: vec![
                ApiArtist {
                    name: "Daft Punk".to_string(),
                },
                ApiArtist {
                    name: "Pharrell Williams".to_string(),
                },
            ],
        });
        assert_eq!(track, SpotifyTrack::new("Get Lucky", "Daft Punk"));
    }

    #[test]
    fn test_from_api_track_without_artists() {
        let track = SpotifyTrack::from_api_track(ApiTrack {
            name: "Episode 12".to_string(),
            artists: vec![],
        });
        assert_eq!(track.artist_name, "");
    }

    #[test]
    fn test_search_term_and_file_stem() {
        let track = SpotifyTrack::new("Who? (Live: 1979)", "AC/DC");
        assert_eq!(track.get_track_search_term(), "Who? (Live: 1979) AC/DC audio");
        assert_eq!(track.get_file_stem(), "ACDC - Who (Live 1979)");
    }
}
