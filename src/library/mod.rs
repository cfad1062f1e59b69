use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use error_stack::{IntoReport, ResultExt};
use lazy_regex::regex;
use walkdir::WalkDir;

#[derive(Debug)]
pub struct LibraryError;

impl fmt::Display for LibraryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Library error")
    }
}

impl std::error::Error for LibraryError {}

pub type LibraryResult<T> = error_stack::Result<T, LibraryError>;

/// Extension of every file written by the downloader.
pub const AUDIO_EXTENSION: &str = "mp3";

/// Removes the characters most filesystems reject (`< > : " / \ | ? *`) and trims
/// surrounding whitespace.
pub fn sanitize_filename(name: &str) -> String {
    regex!(r#"[<>:"/\\|?*]"#)
        .replace_all(name, "")
        .trim()
        .to_string()
}

/// Folder on the drive that holds one playlist's files.
pub fn playlist_folder(usb_path: &Path, playlist_name: &str) -> PathBuf {
    usb_path.join(sanitize_filename(playlist_name))
}

/// Creates the playlist folder if it is missing and returns its path.
pub fn ensure_playlist_folder(usb_path: &Path, playlist_name: &str) -> LibraryResult<PathBuf> {
    let folder = playlist_folder(usb_path, playlist_name);
    fs::create_dir_all(&folder)
        .into_report()
        .attach_printable(format!("Failed to create folder {}", folder.display()))
        .change_context(LibraryError)?;
    Ok(folder)
}

/// Stems of the audio files already in a playlist folder.
///
/// Only the folder itself is listed. A file counts as downloaded as soon as it has
/// the right name, whatever its size.
#[derive(Debug, Default, Clone)]
pub struct SkipSet {
    stems: HashSet<String>,
}

impl SkipSet {
    pub fn scan(folder: &Path) -> LibraryResult<Self> {
        let suffix = format!(".{AUDIO_EXTENSION}");
        let mut stems = HashSet::new();
        for entry in WalkDir::new(folder).min_depth(1).max_depth(1) {
            let entry = entry
                .into_report()
                .attach_printable(format!("Failed to list {}", folder.display()))
                .change_context(LibraryError)?;
            if !entry.file_type().is_file() {
                continue;
            }
            let file_name = entry.file_name().to_string_lossy();
            if let Some(stem) = file_name.strip_suffix(&suffix) {
                stems.insert(stem.to_string());
            }
        }
        Ok(Self { stems })
    }

    pub fn contains(&self, sanitized_title: &str) -> bool {
        self.stems.contains(sanitized_title)
    }

    pub fn len(&self) -> usize {
        self.stems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stems.is_empty()
    }
}

impl FromIterator<String> for SkipSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self {
            stems: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESERVED: [char; 9] = ['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

    #[test]
    fn test_sanitize_strips_reserved_characters() {
        let dirty = r#" AC/DC - Who? <Live> "Remix" a|b\c*d: "#;
        let clean = sanitize_filename(dirty);
        assert_eq!(clean, "ACDC - Who Live Remix abcd");
        assert!(!clean.contains(&RESERVED[..]));
    }

    #[test]
    fn test_sanitize_keeps_clean_input_and_is_idempotent() {
        for input in ["Daft Punk - One More Time", "  padded  ", "???", "é - ü (Edit)"] {
            let once = sanitize_filename(input);
            assert_eq!(sanitize_filename(&once), once);
        }
        assert_eq!(
            sanitize_filename("Daft Punk - One More Time"),
            "Daft Punk - One More Time"
        );
        assert_eq!(sanitize_filename("???"), "");
    }

    #[test]
    fn test_playlist_folder_is_created_then_reused() {
        let usb = tempfile::tempdir().unwrap();
        let expected = usb.path().join("My Mix2024");
        assert!(!expected.exists());

        let folder = ensure_playlist_folder(usb.path(), "My: Mix/2024").unwrap();
        assert_eq!(folder, expected);
        assert!(folder.is_dir());

        fs::write(folder.join("keep.mp3"), b"").unwrap();
        let again = ensure_playlist_folder(usb.path(), "My: Mix/2024").unwrap();
        assert_eq!(again, expected);
        assert!(again.join("keep.mp3").exists());
    }

    #[test]
    fn test_skip_set_only_counts_top_level_mp3_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("Artist - Title.mp3"), b"").unwrap();
        fs::write(dir.path().join("Other - Song.m4a"), b"partial").unwrap();
        fs::write(dir.path().join("notes.txt"), b"").unwrap();
        fs::create_dir(dir.path().join("Folder.mp3")).unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested").join("Deep - Cut.mp3"), b"").unwrap();

        let skip_set = SkipSet::scan(dir.path()).unwrap();
        assert_eq!(skip_set.len(), 1);
        assert!(skip_set.contains("Artist - Title"));
        assert!(!skip_set.contains("Other - Song"));
        assert!(!skip_set.contains("Deep - Cut"));
    }

    #[test]
    fn test_skip_set_of_empty_folder() {
        let dir = tempfile::tempdir().unwrap();
        assert!(SkipSet::scan(dir.path()).unwrap().is_empty());
    }
}
