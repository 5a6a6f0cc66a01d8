//! Media handles and the operations they expose.
//!
//! [`Audio`], [`Video`] and [`Image`] each wrap a [`MediaHandle`] plus the
//! [`Backend`] collaborators. Steps shared between kinds (input checks,
//! output path resolution, cutting, converting) live here as free functions
//! so each kind only composes the pieces it needs.

mod audio;
mod image;
mod video;

pub use audio::Audio;
pub use image::Image;
pub use video::Video;

use serde::Serialize;
use serde_json::Value;

use crate::MediaKind;
use crate::backend::{ArgumentVector, Backend, ExecutionReport, MediaDetails};
use crate::error::{MediaError, Result};
use crate::ffmpeg_wrapper::FFmpegCommand;
use crate::options::{Operation, ValidationResult};
use crate::paths::{extension_of, replace_extension, stem_of};
use crate::time::{ms_to_time_string, seconds_to_ms, time_string_to_ms};
use crate::validator::validate;

/// One source file and what was derived from its path.
///
/// Nothing here changes after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaHandle {
    path: String,
    filename: Option<String>,
    extension: String,
    kind: MediaKind,
}

impl MediaHandle {
    pub fn new(path: impl Into<String>, kind: MediaKind) -> Self {
        let path = path.into();
        let filename = stem_of(&path).ok().map(str::to_string);
        let extension = extension_of(&path, kind);
        Self {
            path,
            filename,
            extension,
            kind,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Filename without extension; fails when the path could not be split
    pub fn filename(&self) -> Result<&str> {
        self.filename
            .as_deref()
            .ok_or(MediaError::InvalidInputPath)
    }

    /// Known extension of the source, or the default for its kind
    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn kind(&self) -> MediaKind {
        self.kind
    }
}

/// Successful input and option check
#[derive(Debug, Clone, PartialEq)]
pub struct Checked {
    pub output_file_path: String,
    /// Probe result gathered while checking the input
    pub details: MediaDetails,
}

impl From<&Result<Checked>> for ValidationResult {
    fn from(result: &Result<Checked>) -> Self {
        match result {
            Ok(checked) => {
                ValidationResult::correct().with_output_file_path(&checked.output_file_path)
            }
            Err(err) => ValidationResult::incorrect(err.to_string()),
        }
    }
}

/// What an operation resolved to: where it wrote, and the engine's report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationOutcome {
    pub output_file_path: String,
    pub report: ExecutionReport,
}

/// Make sure the source path is well formed and that the probe can read it.
pub fn check_input(handle: &MediaHandle, backend: &Backend) -> Result<MediaDetails> {
    handle.filename()?;
    backend.probe.media_info(handle.path()).map_err(|err| {
        log::warn!("Could not read details of {}: {:#}", handle.path(), err);
        MediaError::InputDetails
    })
}

/// Use the caller's `outputFilePath`, or ask for a fresh path ending in
/// `extension`.
pub fn resolve_output_path(backend: &Backend, options: &Value, extension: &str) -> Result<String> {
    match options.get("outputFilePath") {
        Some(Value::String(path)) if !path.is_empty() => return Ok(path.clone()),
        Some(Value::Null) | Some(Value::String(_)) | None => {}
        Some(_) => return Err(MediaError::IncorrectOutputPath),
    }

    match backend.paths.generate_output_path(extension) {
        Ok(Some(path)) if !path.is_empty() => Ok(path),
        Ok(_) => Err(MediaError::OutputGeneration),
        Err(err) => {
            log::warn!("Output path generation failed: {:#}", err);
            Err(MediaError::OutputGeneration)
        }
    }
}

/// Input check, then option rules, then output path; the first failure wins.
pub fn check_input_and_options(
    handle: &MediaHandle,
    backend: &Backend,
    options: &Value,
    operation: Operation,
    extension: &str,
) -> Result<Checked> {
    let details = check_input(handle, backend)?;

    let validation = validate(options, operation, handle.kind());
    if !validation.is_correct {
        log::warn!("Rejected {} options: {}", operation, validation.message);
        return Err(MediaError::InvalidOptions(validation.message));
    }

    let output_file_path = resolve_output_path(backend, options, extension)?;
    Ok(Checked {
        output_file_path,
        details,
    })
}

/// Hand a finished argument vector to the engine
pub(crate) fn run(
    backend: &Backend,
    args: ArgumentVector,
    output_file_path: String,
) -> Result<OperationOutcome> {
    log::debug!("Engine arguments: {:?}", args);
    let report = backend.engine.execute(&args).map_err(MediaError::Engine)?;
    log::info!("Output saved to: {}", output_file_path);
    Ok(OperationOutcome {
        output_file_path,
        report,
    })
}

pub(crate) fn str_option<'a>(options: &'a Value, key: &str) -> Option<&'a str> {
    options.get(key).and_then(Value::as_str)
}

/// Numeric option that the validator has already checked
pub(crate) fn number_option(options: &Value, key: &str) -> f64 {
    options
        .get(key)
        .and_then(Value::as_f64)
        .unwrap_or_default()
}

/// Keep `[from, to]` of an audio or video source without re-encoding.
///
/// Both bounds must lie within the source duration; `to` is checked first.
/// `to` earlier than `from` is not rejected here.
pub fn cut(handle: &MediaHandle, backend: &Backend, options: &Value) -> Result<OperationOutcome> {
    let checked = check_input_and_options(
        handle,
        backend,
        options,
        Operation::Cut,
        handle.extension(),
    )?;

    let from = str_option(options, "from").unwrap_or_default();
    let to = str_option(options, "to").unwrap_or_default();
    let bound_ms = |field: &'static str, time: &str| {
        time_string_to_ms(time).ok_or_else(|| {
            MediaError::InvalidOptions(format!(
                "Incorrect option \"{field}\". Please provide a valid one matching hh:mm:ss"
            ))
        })
    };
    let to_ms = bound_ms("to", to)?;
    let from_ms = bound_ms("from", from)?;
    let duration_ms = seconds_to_ms(checked.details.duration);

    if duration_ms < to_ms as f64 {
        return Err(MediaError::ExceedsDuration { field: "to" });
    }
    if duration_ms < from_ms as f64 {
        return Err(MediaError::ExceedsDuration { field: "from" });
    }

    log::info!(
        "Cutting {} from {} to {} (source length {})",
        handle.path(),
        from,
        to,
        ms_to_time_string(duration_ms as u64)
    );

    let args = FFmpegCommand::new(handle.path())
        .range(from, to)
        .stream_copy()
        .build(&checked.output_file_path);
    run(backend, args, checked.output_file_path)
}

/// Re-container the source into `options.extension`.
///
/// The resolved output path keeps its directory and stem; only its trailing
/// extension is replaced by the requested one.
pub fn convert_to(
    handle: &MediaHandle,
    backend: &Backend,
    options: &Value,
) -> Result<OperationOutcome> {
    let Some(extension) = str_option(options, "extension") else {
        return Err(MediaError::MissingOption("extension"));
    };

    let checked = check_input_and_options(handle, backend, options, Operation::ConvertTo, extension)?;
    let output_file_path = replace_extension(&checked.output_file_path, extension);

    log::info!("Converting {} to {}", handle.path(), extension);

    let args = FFmpegCommand::new(handle.path()).build(&output_file_path);
    run(backend, args, output_file_path)
}
