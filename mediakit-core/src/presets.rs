use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Bitrates (kbit/s) accepted for audio compression
pub const AUDIO_BITRATES: [u32; 10] = [512, 480, 320, 256, 192, 160, 128, 96, 64, 32];

/// CRF used when compressing video without an explicit quality
pub const DEFAULT_CRF: u8 = 18;

/// x264 encoding presets, slowest to fastest
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[value(rename_all = "lower")]
#[serde(rename_all = "lowercase")]
pub enum Speed {
    VerySlow,
    Slower,
    Slow,
    Medium,
    Fast,
    Faster,
    VeryFast,
    SuperFast,
    UltraFast,
}

impl Speed {
    pub const ALL: [Speed; 9] = [
        Speed::VerySlow,
        Speed::Slower,
        Speed::Slow,
        Speed::Medium,
        Speed::Fast,
        Speed::Faster,
        Speed::VeryFast,
        Speed::SuperFast,
        Speed::UltraFast,
    ];

    /// Value passed to `-preset`
    pub fn as_str(&self) -> &'static str {
        match self {
            Speed::VerySlow => "veryslow",
            Speed::Slower => "slower",
            Speed::Slow => "slow",
            Speed::Medium => "medium",
            Speed::Fast => "fast",
            Speed::Faster => "faster",
            Speed::VeryFast => "veryfast",
            Speed::SuperFast => "superfast",
            Speed::UltraFast => "ultrafast",
        }
    }

    /// Look up a preset by its exact encoder name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|speed| speed.as_str() == name)
    }
}

/// Named placement of a watermark over the main video
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WatermarkPosition {
    BottomLeft,
    #[default]
    BottomRight,
    TopLeft,
    TopRight,
    Center,
}

impl WatermarkPosition {
    pub const ALL: [WatermarkPosition; 5] = [
        WatermarkPosition::BottomLeft,
        WatermarkPosition::BottomRight,
        WatermarkPosition::TopLeft,
        WatermarkPosition::TopRight,
        WatermarkPosition::Center,
    ];

    /// Name used in option bags
    pub fn name(&self) -> &'static str {
        match self {
            WatermarkPosition::BottomLeft => "BOTTOM_LEFT",
            WatermarkPosition::BottomRight => "BOTTOM_RIGHT",
            WatermarkPosition::TopLeft => "TOP_LEFT",
            WatermarkPosition::TopRight => "TOP_RIGHT",
            WatermarkPosition::Center => "CENTER",
        }
    }

    /// Overlay coordinates, `W`/`H` being the main video and `w`/`h` the
    /// watermark, with a 5 pixel margin at the edges
    pub fn expression(&self) -> &'static str {
        match self {
            WatermarkPosition::BottomLeft => "5:H-h-5",
            WatermarkPosition::BottomRight => "W-w-5:H-h-5",
            WatermarkPosition::TopLeft => "5:5",
            WatermarkPosition::TopRight => "W-w-5:5",
            WatermarkPosition::Center => "(W-w)/2:(H-h)/2",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|position| position.name() == name)
    }
}

/// Encoder settings resolved from compression options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressionFlags {
    pub crf: u8,
    pub preset: Speed,
}

/// Resolve `-crf`/`-preset` values; each field falls back independently.
pub fn compression_flags(quality: Option<u8>, speed: Option<Speed>) -> CompressionFlags {
    CompressionFlags {
        crf: quality.unwrap_or(DEFAULT_CRF),
        preset: speed.unwrap_or(Speed::Fast),
    }
}

/// Filter graph for overlaying input 1 on input 0.
///
/// The watermark's alpha channel is scaled by `opacity` first, then the
/// result is overlaid at `position`.
pub fn watermark_filter_graph(position: WatermarkPosition, opacity: f64) -> String {
    format!(
        "[1]lut=a=val*{}[a];[0][a]overlay={}",
        opacity,
        position.expression()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_speed_names() {
        assert_eq!(Speed::from_name("veryslow"), Some(Speed::VerySlow));
        assert_eq!(Speed::from_name("ultrafast"), Some(Speed::UltraFast));
        assert_eq!(Speed::from_name("Fast"), None);
        assert_eq!(Speed::from_name("turbo"), None);
        for speed in Speed::ALL {
            assert_eq!(Speed::from_name(speed.as_str()), Some(speed));
        }
    }

    #[test]
    fn test_compression_flags_defaults_are_independent() {
        assert_eq!(
            compression_flags(None, None),
            CompressionFlags {
                crf: 18,
                preset: Speed::Fast
            }
        );
        assert_eq!(compression_flags(Some(30), None).preset, Speed::Fast);
        assert_eq!(compression_flags(None, Some(Speed::Slow)).crf, 18);
        assert_eq!(compression_flags(Some(0), None).crf, 0);
    }

    #[test]
    fn test_watermark_filter_graph() {
        assert_eq!(
            watermark_filter_graph(WatermarkPosition::BottomRight, 0.5),
            "[1]lut=a=val*0.5[a];[0][a]overlay=W-w-5:H-h-5"
        );
        assert_eq!(
            watermark_filter_graph(WatermarkPosition::Center, 1.0),
            "[1]lut=a=val*1[a];[0][a]overlay=(W-w)/2:(H-h)/2"
        );
    }

    #[test]
    fn test_position_serde_uses_option_names() {
        let json = serde_json::to_string(&WatermarkPosition::TopLeft).unwrap();
        assert_eq!(json, "\"TOP_LEFT\"");
        assert_eq!(
            WatermarkPosition::from_name("TOP_RIGHT"),
            Some(WatermarkPosition::TopRight)
        );
    }
}
