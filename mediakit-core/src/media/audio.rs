use serde_json::Value;

use super::{
    MediaHandle, OperationOutcome, check_input_and_options, convert_to, cut, number_option, run,
    str_option,
};
use crate::MediaKind;
use crate::backend::{Backend, MediaDetails};
use crate::error::{MediaError, Result};
use crate::ffmpeg_wrapper::FFmpegCommand;
use crate::options::Operation;
use crate::presets::AUDIO_BITRATES;
use crate::validator::parse_bitrate;

/// Bitrate used when compressing audio without one
pub const DEFAULT_AUDIO_BITRATE: u32 = 96;

/// Operations on an audio source
#[derive(Debug, Clone)]
pub struct Audio {
    handle: MediaHandle,
    backend: Backend,
}

impl Audio {
    pub fn new(path: impl Into<String>, backend: Backend) -> Self {
        Self {
            handle: MediaHandle::new(path, MediaKind::Audio),
            backend,
        }
    }

    pub fn handle(&self) -> &MediaHandle {
        &self.handle
    }

    pub fn details(&self) -> Result<MediaDetails> {
        super::check_input(&self.handle, &self.backend)
    }

    /// Re-encode at `options.bitrate` kbit/s (96 when absent)
    pub fn compress(&self, options: &Value) -> Result<OperationOutcome> {
        let extension = str_option(options, "extension").unwrap_or(self.handle.extension());
        let checked = check_input_and_options(
            &self.handle,
            &self.backend,
            options,
            Operation::Compress,
            extension,
        )?;

        let bitrate = options
            .get("bitrate")
            .and_then(parse_bitrate)
            .filter(|b| AUDIO_BITRATES.contains(b))
            .unwrap_or(DEFAULT_AUDIO_BITRATE);

        log::info!(
            "Compressing audio {} at {}k",
            self.handle.path(),
            bitrate
        );

        let args = FFmpegCommand::new(self.handle.path())
            .audio_bitrate(bitrate)
            .map("a")
            .build(&checked.output_file_path);
        run(&self.backend, args, checked.output_file_path)
    }

    /// Scale the volume by `options.rate`
    pub fn adjust_volume(&self, options: &Value) -> Result<OperationOutcome> {
        if options.get("rate").is_none() {
            return Err(MediaError::MissingOption("rate"));
        }

        let checked = check_input_and_options(
            &self.handle,
            &self.backend,
            options,
            Operation::AdjustVolume,
            self.handle.extension(),
        )?;

        let rate = number_option(options, "rate");
        log::info!("Adjusting volume of {} by {}", self.handle.path(), rate);

        let args = FFmpegCommand::new(self.handle.path())
            .audio_filter(&format!("volume={}", rate))
            .build(&checked.output_file_path);
        run(&self.backend, args, checked.output_file_path)
    }

    pub fn cut(&self, options: &Value) -> Result<OperationOutcome> {
        cut(&self.handle, &self.backend, options)
    }

    pub fn convert_to(&self, options: &Value) -> Result<OperationOutcome> {
        convert_to(&self.handle, &self.backend, options)
    }

    pub fn cancel(&self) {
        self.backend.engine.cancel();
    }
}
