use serde_json::Value;

use super::{
    Image, MediaHandle, OperationOutcome, check_input_and_options, convert_to, cut, number_option,
    run, str_option,
};
use crate::MediaKind;
use crate::backend::{Backend, MediaDetails};
use crate::error::{MediaError, Result};
use crate::ffmpeg_wrapper::FFmpegCommand;
use crate::options::Operation;
use crate::paths::local_path;
use crate::presets::{Speed, WatermarkPosition, compression_flags, watermark_filter_graph};

/// Operations on a video source
#[derive(Debug, Clone)]
pub struct Video {
    handle: MediaHandle,
    backend: Backend,
}

impl Video {
    pub fn new(path: impl Into<String>, backend: Backend) -> Self {
        Self {
            handle: MediaHandle::new(path, MediaKind::Video),
            backend,
        }
    }

    pub fn handle(&self) -> &MediaHandle {
        &self.handle
    }

    pub fn details(&self) -> Result<MediaDetails> {
        super::check_input(&self.handle, &self.backend)
    }

    /// Re-encode with libx264 at `options.quality` (CRF) and `options.speed`
    pub fn compress(&self, options: &Value) -> Result<OperationOutcome> {
        let extension = str_option(options, "extension").unwrap_or(self.handle.extension());
        let checked = check_input_and_options(
            &self.handle,
            &self.backend,
            options,
            Operation::Compress,
            extension,
        )?;

        // validated as a whole number in [0, 51]
        let quality = options
            .get("quality")
            .and_then(Value::as_f64)
            .map(|q| q as u8);
        let speed = str_option(options, "speed").and_then(Speed::from_name);
        let flags = compression_flags(quality, speed);

        log::info!(
            "Compressing video {} (crf {}, preset {})",
            self.handle.path(),
            flags.crf,
            flags.preset.as_str()
        );

        let args = FFmpegCommand::new(local_path(self.handle.path()))
            .video_codec("libx264")
            .quality(flags.crf)
            .preset(flags.preset.as_str())
            .build(&checked.output_file_path);
        run(&self.backend, args, checked.output_file_path)
    }

    /// Write the audio track to a file of `options.extension` (mp3 by default)
    pub fn extract_audio(&self, options: &Value) -> Result<OperationOutcome> {
        let extension =
            str_option(options, "extension").unwrap_or(MediaKind::Audio.default_extension());
        let checked = check_input_and_options(
            &self.handle,
            &self.backend,
            options,
            Operation::ExtractAudio,
            extension,
        )?;

        log::info!("Extracting audio from {}", self.handle.path());

        let args = FFmpegCommand::new(self.handle.path()).build(&checked.output_file_path);
        run(&self.backend, args, checked.output_file_path)
    }

    /// Overlay `options.watermarksImage` at `options.position` with
    /// `options.opacity`, keeping the audio as is
    pub fn add_watermark(&self, options: &Value) -> Result<OperationOutcome> {
        let extension = str_option(options, "extension").unwrap_or(self.handle.extension());
        let checked = check_input_and_options(
            &self.handle,
            &self.backend,
            options,
            Operation::AddWatermark,
            extension,
        )?;

        let Some(watermark_path) = str_option(options, "watermarksImage") else {
            return Err(MediaError::WatermarkDetails);
        };
        let watermark = Image::new(watermark_path, self.backend.clone());
        watermark
            .details()
            .map_err(|_| MediaError::WatermarkDetails)?;

        let position = str_option(options, "position")
            .and_then(WatermarkPosition::from_name)
            .unwrap_or_default();
        let graph = watermark_filter_graph(position, number_option(options, "opacity"));

        log::info!(
            "Adding watermark {} to {} at {}",
            watermark_path,
            self.handle.path(),
            position.name()
        );

        let args = FFmpegCommand::new(self.handle.path())
            .overwrite()
            .input(watermark_path)
            .filter_complex(&graph)
            .audio_codec("copy")
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
