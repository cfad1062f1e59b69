use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Output;
use std::time::Duration;

use async_trait::async_trait;
use colored::Colorize;
use error_stack::{IntoReport, Report, ResultExt};
use indicatif::{ProgressBar, ProgressStyle};
use log::debug;
use serde::Deserialize;
use tokio::process::Command;

use crate::library::AUDIO_EXTENSION;
use crate::youtube::{TrackDownload, TrackSearch, YoutubeError, YoutubeResult};
use crate::Suggestion;

#[derive(Deserialize, Debug)]
struct SearchEntry {
    url: Option<String>,
    webpage_url: Option<String>,
}

#[derive(Deserialize, Debug)]
struct SearchResult {
    entries: Option<Vec<SearchEntry>>,
    webpage_url: Option<String>,
}

/// Runs the `yt-dlp` executable for both searching and downloading. Transcoding is
/// done by yt-dlp through ffmpeg, so both must be installed.
#[derive(Debug, Clone)]
pub struct YtDlp {
    binary: PathBuf,
}

impl YtDlp {
    const SEARCH_PREFIX: &'static str = "ytsearch1:";
    const SEARCH_FORMAT: &'static str = "bestaudio/best";
    const DOWNLOAD_FORMAT: &'static str = "bestaudio[ext=m4a]/bestaudio";
    const AUDIO_QUALITY: &'static str = "192K";

    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    fn search_args(query: &str) -> Vec<OsString> {
        [
            "--dump-single-json",
            "--flat-playlist",
            "--no-playlist",
            "--quiet",
            "--no-warnings",
            "--format",
            Self::SEARCH_FORMAT,
        ]
        .into_iter()
        .map(OsString::from)
        .chain([OsString::from(format!("{}{}", Self::SEARCH_PREFIX, query))])
        .collect()
    }

    fn download_args(url: &str, folder: &Path, file_stem: &str) -> Vec<OsString> {
        let output_template = folder.join(format!("{file_stem}.%(ext)s"));
        let mut args: Vec<OsString> = [
            "--no-playlist",
            "--format",
            Self::DOWNLOAD_FORMAT,
            "--extract-audio",
            "--audio-format",
            AUDIO_EXTENSION,
            "--audio-quality",
            Self::AUDIO_QUALITY,
            "--output",
        ]
        .into_iter()
        .map(OsString::from)
        .collect();
        args.push(output_template.into_os_string());
        args.push(OsString::from(url));
        args
    }

    /// The first search entry wins; a single video result falls back to its page url.
    fn parse_search_result(stdout: &[u8]) -> YoutubeResult<String> {
        let result: SearchResult = serde_json::from_slice(stdout)
            .into_report()
            .attach_printable("yt-dlp returned invalid json")
            .change_context(YoutubeError)?;
        let url = match result.entries {
            Some(entries) => entries
                .into_iter()
                .next()
                .and_then(|entry| entry.url.or(entry.webpage_url)),
            None => result.webpage_url,
        };
        url.ok_or(YoutubeError)
            .into_report()
            .attach_printable("No search results")
    }

    async fn run(&self, args: Vec<OsString>) -> YoutubeResult<Output> {
        debug!("Running {} {:?}", self.binary.display(), args);
        let output = Command::new(&self.binary)
            .args(&args)
            .kill_on_drop(true)
            .output()
            .await
            .into_report()
            .attach_printable(format!("Failed to run {}", self.binary.display()))
            .attach(Suggestion(
                "install yt-dlp and ffmpeg, or set YT_DLP_PATH".to_string(),
            ))
            .change_context(YoutubeError)?;
        if !output.status.success() {
            return Err(Report::new(YoutubeError).attach_printable(format!(
                "yt-dlp exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        Ok(output)
    }

    fn spinner(message: String) -> YoutubeResult<ProgressBar> {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {msg}")
                .into_report()
                .change_context(YoutubeError)?,
        );
        pb.set_message(message);
        pb.enable_steady_tick(Duration::from_millis(120));
        Ok(pb)
    }
}

#[async_trait]
impl TrackSearch for YtDlp {
    async fn search(&self, query: &str) -> YoutubeResult<String> {
        let output = self.run(Self::search_args(query)).await?;
        Self::parse_search_result(&output.stdout)
            .attach_printable(format!("Query: {}", query))
    }
}

#[async_trait]
impl TrackDownload for YtDlp {
    async fn download(
        &self,
        url: &str,
        folder: &Path,
        file_stem: &str,
    ) -> YoutubeResult<PathBuf> {
        let pb = Self::spinner(format!("Downloading {}", file_stem.cyan()))?;
        let result = self.run(Self::download_args(url, folder, file_stem)).await;
        if let Err(report) = result {
            pb.abandon_with_message(format!("{} was not downloaded", file_stem.red()));
            return Err(report);
        }

        let file_path = folder.join(format!("{file_stem}.{AUDIO_EXTENSION}"));
        if !file_path.is_file() {
            pb.abandon_with_message(format!("{} was not downloaded", file_stem.red()));
            return Err(Report::new(YoutubeError).attach_printable(format!(
                "yt-dlp finished but {} is missing",
                file_path.display()
            )));
        }
        pb.finish_with_message(format!("{} successfully downloaded", file_stem.green()));
        Ok(file_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_args_use_single_result_prefix() {
        let args = YtDlp::search_args("One More Time Daft Punk audio");
        assert_eq!(
            args.last().unwrap(),
            "ytsearch1:One More Time Daft Punk audio"
        );
        assert!(args.iter().any(|arg| arg == "--flat-playlist"));
        assert!(args.iter().any(|arg| arg == "bestaudio/best"));
    }

    #[cfg(unix)]
    #[test]
    fn test_download_args_target_mp3_at_192k() {
        let args = YtDlp::download_args(
            "https://www.youtube.com/watch?v=FGBhQbmPwH8",
            Path::new("/usb/Road Trip"),
            "Daft Punk - One More Time",
        );
        let args: Vec<String> = args
            .into_iter()
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect();
        let expected = [
            "--no-playlist",
            "--format",
            "bestaudio[ext=m4a]/bestaudio",
            "--extract-audio",
            "--audio-format",
            "mp3",
            "--audio-quality",
            "192K",
            "--output",
            "/usb/Road Trip/Daft Punk - One More Time.%(ext)s",
            "https://www.youtube.com/watch?v=FGBhQbmPwH8",
        ];
        assert_eq!(args, expected);
    }

    #[test]
    fn test_parse_search_result_takes_first_entry() {
        let stdout = br#"{
            "_type": "playlist",
            "entries": [
                {"url": "https://www.youtube.com/watch?v=first", "title": "First"},
                {"url": "https://www.youtube.com/watch?v=second", "title": "Second"}
            ]
        }"#;
        assert_eq!(
            YtDlp::parse_search_result(stdout).unwrap(),
            "https://www.youtube.com/watch?v=first"
        );
    }

    #[test]
    fn test_parse_search_result_single_video_uses_webpage_url() {
        let stdout = br#"{"webpage_url": "https://www.youtube.com/watch?v=only"}"#;
        assert_eq!(
            YtDlp::parse_search_result(stdout).unwrap(),
            "https://www.youtube.com/watch?v=only"
        );
    }

    #[test]
    fn test_parse_search_result_without_entries_fails() {
        assert!(YtDlp::parse_search_result(br#"{"entries": []}"#).is_err());
        assert!(YtDlp::parse_search_result(b"not json").is_err());
    }

    #[tokio::test]
    async fn test_search_with_missing_binary_fails() {
        let ytdlp = YtDlp::new("/nonexistent/bin/yt-dlp");
        assert!(ytdlp.search("anything").await.is_err());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_download_with_failing_binary_fails() {
        let folder = tempfile::tempdir().unwrap();
        let ytdlp = YtDlp::new("false");
        let result = ytdlp
            .download("https://www.youtube.com/watch?v=x", folder.path(), "A - B")
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    #[ignore] // Requires yt-dlp on PATH and network access. Run with `cargo test -- --ignored`
    async fn test_search_youtube() {
        let ytdlp = YtDlp::new("yt-dlp");
        let url = ytdlp.search("One More Time Daft Punk audio").await.unwrap();
        assert!(url.contains("youtube.com"));
    }
}
