use thiserror::Error;

/// Every failure the core can report to its caller.
///
/// `Display` is the human-readable message handed back from an operation.
#[derive(Error, Debug)]
pub enum MediaError {
    #[error("Invalid path. Please provide a valid path")]
    InvalidInputPath,

    #[error(
        "An error occur while getting input file details. Please check your input file details"
    )]
    InputDetails,

    #[error(
        "An error occur while getting watermark file details. Please check your input file details"
    )]
    WatermarkDetails,

    /// A required field was absent before validation even started
    #[error("Parameter {0} should be set")]
    MissingOption(&'static str),

    /// An option failed one of the validator rules
    #[error("{0}")]
    InvalidOptions(String),

    /// The caller supplied `outputFilePath` but it could not be used
    #[error("Incorrect output path. Please provide a valid one")]
    IncorrectOutputPath,

    /// No output path was supplied and none could be generated
    #[error("An error occur while generating output file")]
    OutputGeneration,

    #[error("The option \"{field}\" can not be greater than the total time of the video")]
    ExceedsDuration { field: &'static str },

    #[error("Parameter {dimension} is greater than image {dimension} {limit}.")]
    ExceedsDimension { dimension: &'static str, limit: u64 },

    /// Failure reported by the external engine, message untouched
    #[error("{0:#}")]
    Engine(anyhow::Error),

    #[error("Options serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, MediaError>;
