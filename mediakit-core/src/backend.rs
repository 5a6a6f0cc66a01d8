//! Interfaces to the external engine.
//!
//! The core never runs media code itself. It asks a [`MediaProbe`] about the
//! source, an [`OutputPathGenerator`] for somewhere to write, and hands the
//! finished argument vector to an [`Engine`].

use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Ordered tokens of one engine invocation, without the program name
pub type ArgumentVector = Vec<String>;

/// What the engine reported for a finished invocation.
///
/// The core does not interpret this; it is returned to the caller as is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionReport {
    pub return_code: i32,
    /// Diagnostic output captured from the engine, possibly empty
    pub log: String,
}

pub trait Engine: Send + Sync {
    /// Run one invocation to completion
    fn execute(&self, args: &[String]) -> anyhow::Result<ExecutionReport>;

    /// Best-effort abort of the invocation in flight, if any
    fn cancel(&self);
}

pub trait OutputPathGenerator: Send + Sync {
    /// A fresh path ending in `.{extension}`, or `None` if none could be made
    fn generate_output_path(&self, extension: &str) -> anyhow::Result<Option<String>>;
}

pub trait MediaProbe: Send + Sync {
    fn media_info(&self, path: &str) -> anyhow::Result<MediaDetails>;
}

/// Read-only snapshot of a probed source
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaDetails {
    /// Seconds
    pub duration: f64,
    pub streams: Vec<StreamInfo>,
    pub format: Option<String>,
    pub bitrate: Option<String>,
    pub size: Option<String>,
    pub filename: Option<String>,
}

impl MediaDetails {
    /// First stream carrying both a width and a height
    pub fn first_visual_stream(&self) -> Option<&StreamInfo> {
        self.streams
            .iter()
            .find(|stream| stream.width.is_some() && stream.height.is_some())
    }

    pub fn has_audio(&self) -> bool {
        self.streams
            .iter()
            .any(|stream| stream.codec_type.as_deref() == Some("audio"))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamInfo {
    pub index: usize,
    pub codec_type: Option<String>,
    pub codec_name: Option<String>,
    pub width: Option<u64>,
    pub height: Option<u64>,
}

/// The three collaborators every media entity needs
#[derive(Clone)]
pub struct Backend {
    pub engine: Arc<dyn Engine>,
    pub paths: Arc<dyn OutputPathGenerator>,
    pub probe: Arc<dyn MediaProbe>,
}

impl Backend {
    pub fn new(
        engine: Arc<dyn Engine>,
        paths: Arc<dyn OutputPathGenerator>,
        probe: Arc<dyn MediaProbe>,
    ) -> Self {
        Self {
            engine,
            paths,
            probe,
        }
    }
}

impl std::fmt::Debug for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Backend").finish_non_exhaustive()
    }
}
