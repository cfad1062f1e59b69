use std::fmt;
use std::path::{Path, PathBuf};

use colored::Colorize;
use error_stack::ResultExt;
use log::debug;

use crate::library::{ensure_playlist_folder, SkipSet};
use crate::spotify::playlist::{PlaylistId, SpotifyPlaylist};
use crate::spotify::track::SpotifyTrack;
use crate::spotify::PlaylistSource;
use crate::youtube::{TrackDownload, TrackSearch};

#[derive(Debug)]
pub struct SyncError;

impl fmt::Display for SyncError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Sync error")
    }
}

impl std::error::Error for SyncError {}

pub type SyncResult<T> = error_stack::Result<T, SyncError>;

/// What happened to a track that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackOutcome {
    Skipped,
    Downloaded(PathBuf),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum TrackStatus {
    Skipped,
    Downloaded,
    Failed,
}

#[derive(Debug, Clone)]
pub struct TrackReport {
    /// `[index/total]` marker printed for the track.
    pub progress: String,
    pub file_stem: String,
    pub status: TrackStatus,
}

#[derive(Debug, Default)]
pub struct SyncSummary {
    pub tracks: Vec<TrackReport>,
}

impl SyncSummary {
    pub fn count(&self, status: TrackStatus) -> usize {
        self.tracks
            .iter()
            .filter(|report| report.status == status)
            .count()
    }

    pub fn print(&self) {
        println!(
            "\n{}: Downloaded {} tracks, skipped {} tracks, failed {} tracks",
            "Summary".green(),
            self.count(TrackStatus::Downloaded).to_string().cyan(),
            self.count(TrackStatus::Skipped).to_string().yellow(),
            self.count(TrackStatus::Failed).to_string().red()
        );
    }
}

/// Resolves the playlist, prepares its folder on the drive and downloads every
/// track that is not there yet.
///
/// Errors while resolving the playlist or preparing the folder abort the run. Errors
/// on a single track are reported and the run moves on.
pub async fn sync_playlist(
    source: &dyn PlaylistSource,
    search: &dyn TrackSearch,
    download: &dyn TrackDownload,
    usb_path: &Path,
    playlist_id: &PlaylistId,
) -> SyncResult<SyncSummary> {
    println!("Fetching playlist...");
    let playlist = SpotifyPlaylist::fetch(source, playlist_id)
        .await
        .attach_printable(format!("Failed to fetch playlist {}", playlist_id.as_str()))
        .change_context(SyncError)?;

    let folder = ensure_playlist_folder(usb_path, &playlist.name).change_context(SyncError)?;
    println!("Saving tracks to: {}", folder.display().to_string().cyan());

    let skip_set = SkipSet::scan(&folder).change_context(SyncError)?;
    if !skip_set.is_empty() {
        debug!("{} tracks already on the drive", skip_set.len());
    }

    let playlist_sync = PlaylistSync::new(search, download, folder, skip_set);
    Ok(playlist_sync.run(&playlist.tracks).await)
}

pub struct PlaylistSync<'a> {
    search: &'a dyn TrackSearch,
    download: &'a dyn TrackDownload,
    folder: PathBuf,
    skip_set: SkipSet,
}

impl<'a> PlaylistSync<'a> {
    pub fn new(
        search: &'a dyn TrackSearch,
        download: &'a dyn TrackDownload,
        folder: PathBuf,
        skip_set: SkipSet,
    ) -> Self {
        Self {
            search,
            download,
            folder,
            skip_set,
        }
    }

    /// Processes tracks one after the other. Never fails: a track error ends up as
    /// a `Failed` entry of the summary.
    pub async fn run(&self, tracks: &[SpotifyTrack]) -> SyncSummary {
        let total = tracks.len();
        let mut summary = SyncSummary::default();
        for (index, track) in tracks.iter().enumerate() {
            let progress = format!("[{}/{}]", index + 1, total);
            let status = match self.sync_track(&progress, track).await {
                Ok(TrackOutcome::Skipped) => TrackStatus::Skipped,
                Ok(TrackOutcome::Downloaded(file_path)) => {
                    debug!("Wrote {}", file_path.display());
                    TrackStatus::Downloaded
                }
                Err(report) => {
                    println!(
                        "{} {} by {}: {:?}",
                        "Failed to download".red(),
                        track.title.clone().red(),
                        track.artist_name.clone().red(),
                        report
                    );
                    TrackStatus::Failed
                }
            };
            let file_stem = track.get_file_stem();
            debug!("{} {} {}", progress, file_stem, status);
            summary.tracks.push(TrackReport {
                progress,
                file_stem,
                status,
            });
        }
        summary.print();
        summary
    }

    pub async fn sync_track(
        &self,
        progress: &str,
        track: &SpotifyTrack,
    ) -> SyncResult<TrackOutcome> {
        let file_stem = track.get_file_stem();
        if self.skip_set.contains(&file_stem) {
            println!(
                "{} Skipping already downloaded: {}",
                progress,
                file_stem.yellow()
            );
            return Ok(TrackOutcome::Skipped);
        }

        let search_term = track.get_track_search_term();
        println!("\n{} Searching: {}", progress, search_term.cyan());
        let url = self
            .search
            .search(&search_term)
            .await
            .change_context(SyncError)?;
        println!("Found YouTube URL: {}", url.clone().green());

        let file_path = self
            .download
            .download(&url, &self.folder, &file_stem)
            .await
            .change_context(SyncError)?;
        Ok(TrackOutcome::Downloaded(file_path))
    }
}
