//! Mediakit Core - option validation and argument construction for FFmpeg
//!
//! This library turns high-level media requests into command lines for an
//! external FFmpeg-class engine, including:
//! - Validation of per-operation options (compress, cut, crop, scale, rotate,
//!   volume, watermark, audio extraction, format conversion)
//! - Output path resolution, either caller-supplied or generated
//! - Cross-checks against the probed source (duration, dimensions)
//! - Deterministic argument vectors handed to a pluggable engine
//!
//! The engine, the probe and the output path generator are traits in
//! [`backend`]; [`ffmpeg_wrapper`] implements them on top of the `ffmpeg` and
//! `ffprobe` executables.

pub mod backend;
pub mod config;
pub mod error;
pub mod ffmpeg_wrapper;
pub mod media;
pub mod options;
pub mod paths;
pub mod presets;
pub mod time;
pub mod validator;

// Re-export commonly used types at the crate root
pub use backend::{Backend, Engine, ExecutionReport, MediaDetails, MediaProbe, OutputPathGenerator};
pub use config::ToolConfig;
pub use error::{MediaError, Result};
pub use ffmpeg_wrapper::{CacheDirOutputPaths, FFmpegCommand, FfmpegCli, check_ffmpeg};
pub use media::{Audio, Image, MediaHandle, OperationOutcome, Video};
pub use options::{OptionBag, Operation, ValidationResult};
pub use presets::{Speed, WatermarkPosition};
pub use validator::validate;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Audio,
    Video,
    Image,
}

impl MediaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Audio => "audio",
            MediaKind::Video => "video",
            MediaKind::Image => "image",
        }
    }

    /// Extension used when a path has none, or one not known for the kind
    pub fn default_extension(&self) -> &'static str {
        match self {
            MediaKind::Audio => "mp3",
            MediaKind::Video => "mp4",
            MediaKind::Image => "jpg",
        }
    }

    pub fn known_extensions(&self) -> &'static [&'static str] {
        match self {
            MediaKind::Audio => paths::AUDIO_EXTENSIONS,
            MediaKind::Video => paths::VIDEO_EXTENSIONS,
            MediaKind::Image => paths::IMAGE_EXTENSIONS,
        }
    }
}
