use serde_json::Value;

use super::{
    MediaHandle, OperationOutcome, check_input_and_options, convert_to, number_option, run,
};
use crate::MediaKind;
use crate::backend::{Backend, MediaDetails};
use crate::error::{MediaError, Result};
use crate::ffmpeg_wrapper::FFmpegCommand;
use crate::options::Operation;

/// Operations on a still image
#[derive(Debug, Clone)]
pub struct Image {
    handle: MediaHandle,
    backend: Backend,
}

impl Image {
    pub fn new(path: impl Into<String>, backend: Backend) -> Self {
        Self {
            handle: MediaHandle::new(path, MediaKind::Image),
            backend,
        }
    }

    pub fn handle(&self) -> &MediaHandle {
        &self.handle
    }

    pub fn details(&self) -> Result<MediaDetails> {
        super::check_input(&self.handle, &self.backend)
    }

    /// Resize to exactly `width` x `height`
    pub fn scale(&self, options: &Value) -> Result<OperationOutcome> {
        let checked = check_input_and_options(
            &self.handle,
            &self.backend,
            options,
            Operation::Scale,
            self.handle.extension(),
        )?;

        let filter = format!(
            "scale={}:{}",
            number_option(options, "width"),
            number_option(options, "height")
        );
        log::info!("Scaling image {} ({})", self.handle.path(), filter);

        let args = FFmpegCommand::new(self.handle.path())
            .video_filter(&filter)
            .build(&checked.output_file_path);
        run(&self.backend, args, checked.output_file_path)
    }

    /// Cut a `width` x `height` region whose top-left corner is at `x`,`y`.
    ///
    /// The region may not be wider or taller than the source; width is
    /// checked before height.
    pub fn crop(&self, options: &Value) -> Result<OperationOutcome> {
        let checked = check_input_and_options(
            &self.handle,
            &self.backend,
            options,
            Operation::Crop,
            self.handle.extension(),
        )?;

        let width = number_option(options, "width");
        let height = number_option(options, "height");

        let Some(stream) = checked.details.first_visual_stream() else {
            return Err(MediaError::InputDetails);
        };
        let source_width = stream.width.unwrap_or_default();
        let source_height = stream.height.unwrap_or_default();

        if width > source_width as f64 {
            return Err(MediaError::ExceedsDimension {
                dimension: "width",
                limit: source_width,
            });
        }
        if height > source_height as f64 {
            return Err(MediaError::ExceedsDimension {
                dimension: "height",
                limit: source_height,
            });
        }

        let filter = format!(
            "crop={}:{}:{}:{}",
            width,
            height,
            number_option(options, "x"),
            number_option(options, "y")
        );
        log::info!("Cropping image {} ({})", self.handle.path(), filter);

        let args = FFmpegCommand::new(self.handle.path())
            .video_filter(&filter)
            .build(&checked.output_file_path);
        run(&self.backend, args, checked.output_file_path)
    }

    /// Rotate clockwise by `angle` degrees
    pub fn rotate(&self, options: &Value) -> Result<OperationOutcome> {
        let checked = check_input_and_options(
            &self.handle,
            &self.backend,
            options,
            Operation::Rotate,
            self.handle.extension(),
        )?;

        let filter = format!("rotate=angle={}*PI/180", number_option(options, "angle"));
        log::info!("Rotating image {} ({})", self.handle.path(), filter);

        let args = FFmpegCommand::new(self.handle.path())
            .video_filter(&filter)
            .build(&checked.output_file_path);
        run(&self.backend, args, checked.output_file_path)
    }

    pub fn convert_to(&self, options: &Value) -> Result<OperationOutcome> {
        convert_to(&self.handle, &self.backend, options)
    }

    pub fn cancel(&self) {
        self.backend.engine.cancel();
    }
}
