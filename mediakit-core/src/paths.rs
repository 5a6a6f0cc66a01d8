//! Filename and extension helpers.
//!
//! These work on plain path strings (local paths or URLs) and never touch the
//! filesystem.

use regex::Regex;
use std::sync::LazyLock;

use crate::MediaKind;
use crate::error::{MediaError, Result};

pub const AUDIO_EXTENSIONS: &[&str] = &[
    "wav", "bwf", "raw", "aiff", "flac", "m4a", "pac", "tta", "wv", "ast", "aac", "mp2", "mp3",
    "mp4", "amr", "s3m", "3gp", "act", "au", "dct", "dss", "gsm", "m4p", "mmf", "mpc", "ogg",
    "oga", "opus", "ra", "sln", "vox",
];

pub const VIDEO_EXTENSIONS: &[&str] = &[
    "3g2", "3gp", "aaf", "asf", "avchd", "avi", "drc", "flv", "m2v", "m4p", "m4v", "mkv", "mng",
    "mov", "mp2", "mp4", "mpe", "mpeg", "mpg", "mpv", "mxf", "nsv", "ogg", "ogv", "qt", "rm",
    "rmvb", "roq", "svi", "vob", "webm", "wmv", "yuv",
];

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp"];

static TRAILING_EXTENSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.\w+$").expect("extension pattern is valid"));

/// Last `/`-separated segment of `path`.
///
/// A path without any `/` is rejected, so bare names like `clip.mp4` are not
/// accepted as media paths.
pub fn filename_of(path: &str) -> Result<&str> {
    match path.rsplit_once('/') {
        Some((_, name)) => Ok(name),
        None => Err(MediaError::InvalidInputPath),
    }
}

/// Filename without its final extension.
pub fn stem_of(path: &str) -> Result<&str> {
    let name = filename_of(path)?;
    Ok(name.rsplit_once('.').map_or(name, |(stem, _)| stem))
}

/// Whether `extension` is in the whitelist for `kind` (case-insensitive).
pub fn is_known_extension(extension: &str, kind: MediaKind) -> bool {
    let extension = extension.to_lowercase();
    kind.known_extensions().contains(&extension.as_str())
}

/// Extension of `path`, normalized to the default for `kind` when it is
/// missing or not one of the known extensions for that kind.
pub fn extension_of(path: &str, kind: MediaKind) -> String {
    let extension = filename_of(path)
        .ok()
        .and_then(|name| name.rsplit_once('.'))
        .map(|(_, ext)| ext)
        .filter(|ext| is_known_extension(ext, kind));

    match extension {
        Some(ext) => ext.to_string(),
        None => kind.default_extension().to_string(),
    }
}

/// Swap the trailing `.ext` of `path` for `.{extension}`.
///
/// Only the end of the last segment is touched; a path with no trailing
/// extension is returned unchanged.
pub fn replace_extension(path: &str, extension: &str) -> String {
    TRAILING_EXTENSION
        .replace(path, format!(".{extension}").as_str())
        .into_owned()
}

/// Strip a `file://` scheme so the engine receives a plain local path.
pub fn local_path(path: &str) -> String {
    path.replacen("file:///", "/", 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filename_of() {
        assert_eq!(filename_of("/sdcard/movies/clip.mp4").unwrap(), "clip.mp4");
        assert_eq!(filename_of("file:///tmp/a.mp3").unwrap(), "a.mp3");
        assert!(matches!(
            filename_of("clip.mp4"),
            Err(MediaError::InvalidInputPath)
        ));
    }

    #[test]
    fn test_stem_of() {
        assert_eq!(stem_of("/tmp/holiday.mov").unwrap(), "holiday");
        assert_eq!(stem_of("/tmp/noext").unwrap(), "noext");
        assert_eq!(stem_of("/tmp/archive.tar.gz").unwrap(), "archive.tar");
    }

    #[test]
    fn test_extension_of_known() {
        assert_eq!(extension_of("/tmp/song.flac", MediaKind::Audio), "flac");
        assert_eq!(extension_of("/tmp/movie.MKV", MediaKind::Video), "MKV");
        assert_eq!(extension_of("/tmp/photo.png", MediaKind::Image), "png");
    }

    #[test]
    fn test_extension_of_normalizes_unknown() {
        assert_eq!(extension_of("/tmp/song.xyz", MediaKind::Audio), "mp3");
        assert_eq!(extension_of("/tmp/movie", MediaKind::Video), "mp4");
        assert_eq!(extension_of("/tmp/photo.gif", MediaKind::Image), "jpg");
        // mkv is a video container, not an audio one
        assert_eq!(extension_of("/tmp/song.mkv", MediaKind::Audio), "mp3");
    }

    #[test]
    fn test_replace_extension_keeps_directory_and_stem() {
        assert_eq!(
            replace_extension("/cache/dir.v2/3f2a.mp4", "webm"),
            "/cache/dir.v2/3f2a.webm"
        );
        assert_eq!(replace_extension("/cache/dir.v2/noext", "webm"), "/cache/dir.v2/noext");
    }

    #[test]
    fn test_local_path() {
        assert_eq!(local_path("file:///storage/clip.mp4"), "/storage/clip.mp4");
        assert_eq!(local_path("/storage/clip.mp4"), "/storage/clip.mp4");
    }
}
