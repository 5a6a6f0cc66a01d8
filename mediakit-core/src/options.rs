//! Operation kinds and their option bags.
//!
//! Options travel as a JSON object with camelCase keys so that callers holding
//! arbitrary user input and callers using the typed structs below go through
//! the same validation. The typed structs serialize into exactly that shape.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::error::Result;
use crate::presets::{Speed, WatermarkPosition};

/// The closed set of supported transformations
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Operation {
    Compress,
    Cut,
    AdjustVolume,
    Scale,
    Crop,
    Rotate,
    AddWatermark,
    ExtractAudio,
    ConvertTo,
}

impl Operation {
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Compress => "compress",
            Operation::Cut => "cut",
            Operation::AdjustVolume => "adjustVolume",
            Operation::Scale => "scale",
            Operation::Crop => "crop",
            Operation::Rotate => "rotate",
            Operation::AddWatermark => "addWatermark",
            Operation::ExtractAudio => "extractAudio",
            Operation::ConvertTo => "convertTo",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Outcome of checking an option bag
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_correct: bool,
    /// Empty exactly when `is_correct` is true
    pub message: String,
    /// Set only for successful checks of operations that write a file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_file_path: Option<String>,
}

impl ValidationResult {
    pub fn correct() -> Self {
        Self {
            is_correct: true,
            message: String::new(),
            output_file_path: None,
        }
    }

    pub fn incorrect(message: impl Into<String>) -> Self {
        Self {
            is_correct: false,
            message: message.into(),
            output_file_path: None,
        }
    }

    pub fn with_output_file_path(mut self, path: impl Into<String>) -> Self {
        if self.is_correct {
            self.output_file_path = Some(path.into());
        }
        self
    }
}

/// Typed option structs convert into the JSON bag the validator reads.
pub trait OptionBag: Serialize {
    fn to_value(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompressVideoOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed: Option<Speed>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_file_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<String>,
}

impl Default for CompressVideoOptions {
    fn default() -> Self {
        Self {
            quality: Some(18),
            speed: Some(Speed::Medium),
            output_file_path: None,
            extension: None,
        }
    }
}

impl OptionBag for CompressVideoOptions {}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompressAudioOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bitrate: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_file_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<String>,
}

impl Default for CompressAudioOptions {
    fn default() -> Self {
        Self {
            bitrate: Some(96),
            output_file_path: None,
            extension: None,
        }
    }
}

impl OptionBag for CompressAudioOptions {}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CutOptions {
    /// Start, `hh:mm:ss`
    pub from: String,
    /// End, `hh:mm:ss`
    pub to: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_file_path: Option<String>,
}

impl OptionBag for CutOptions {}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdjustVolumeOptions {
    /// Volume multiplier, 1.0 keeps the original level
    pub rate: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_file_path: Option<String>,
}

impl OptionBag for AdjustVolumeOptions {}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScaleOptions {
    pub width: f64,
    pub height: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_file_path: Option<String>,
}

impl Default for ScaleOptions {
    fn default() -> Self {
        Self {
            width: 1024.0,
            height: 768.0,
            output_file_path: None,
        }
    }
}

impl OptionBag for ScaleOptions {}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CropOptions {
    pub width: f64,
    pub height: f64,
    pub x: f64,
    pub y: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_file_path: Option<String>,
}

impl OptionBag for CropOptions {}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RotateOptions {
    /// Degrees, clockwise
    pub angle: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_file_path: Option<String>,
}

impl OptionBag for RotateOptions {}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatermarkOptions {
    pub watermarks_image: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<WatermarkPosition>,
    /// In (0, 1]
    pub opacity: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_file_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<String>,
}

impl OptionBag for WatermarkOptions {}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractAudioOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_file_path: Option<String>,
}

impl Default for ExtractAudioOptions {
    fn default() -> Self {
        Self {
            extension: Some(crate::MediaKind::Audio.default_extension().to_string()),
            output_file_path: None,
        }
    }
}

impl OptionBag for ExtractAudioOptions {}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvertOptions {
    pub extension: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_file_path: Option<String>,
}

impl OptionBag for ConvertOptions {}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_typed_options_serialize_to_camel_case_bag() {
        let options = WatermarkOptions {
            watermarks_image: "/tmp/logo.png".to_string(),
            position: Some(WatermarkPosition::TopLeft),
            opacity: 0.5,
            output_file_path: None,
            extension: None,
        };
        assert_eq!(
            options.to_value().unwrap(),
            json!({
                "watermarksImage": "/tmp/logo.png",
                "position": "TOP_LEFT",
                "opacity": 0.5
            })
        );
    }

    #[test]
    fn test_defaults() {
        assert_eq!(
            CompressVideoOptions::default().to_value().unwrap(),
            json!({"quality": 18, "speed": "medium"})
        );
        assert_eq!(CompressAudioOptions::default().bitrate, Some(96));
        assert_eq!(ScaleOptions::default().width, 1024.0);
        assert_eq!(
            ExtractAudioOptions::default().extension.as_deref(),
            Some("mp3")
        );
    }

    #[test]
    fn test_validation_result_output_path_only_when_correct() {
        let ok = ValidationResult::correct().with_output_file_path("/tmp/out.mp4");
        assert_eq!(ok.output_file_path.as_deref(), Some("/tmp/out.mp4"));
        assert!(ok.message.is_empty());

        let bad = ValidationResult::incorrect("nope").with_output_file_path("/tmp/out.mp4");
        assert_eq!(bad.output_file_path, None);
        assert!(!bad.is_correct);
    }
}
