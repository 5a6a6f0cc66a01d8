//! Per-operation option rules.
//!
//! `validate` only looks at the option bag. Checking that the source is
//! readable and resolving the output path happen in
//! [`crate::media::check_input_and_options`].

use serde_json::{Map, Value};

use crate::MediaKind;
use crate::options::{Operation, ValidationResult};
use crate::presets::{AUDIO_BITRATES, Speed, WatermarkPosition};
use crate::time::is_time_string;

/// Highest CRF accepted by libx264
pub const MAX_QUALITY: f64 = 51.0;

type Fields = Map<String, Value>;
type Rule = std::result::Result<(), String>;

/// Check `options` against the rules of `operation` for a source of `kind`.
///
/// Operations without rules of their own (`extractAudio`, `convertTo`) pass
/// as long as `options` is an object.
pub fn validate(options: &Value, operation: Operation, kind: MediaKind) -> ValidationResult {
    let Some(fields) = options.as_object() else {
        return ValidationResult::incorrect(format!(
            "Parameter \"options\" must be an object. {} given",
            type_name(Some(options))
        ));
    };

    let outcome = match operation {
        Operation::Compress => match kind {
            MediaKind::Video => check_video_compression(fields),
            MediaKind::Audio => check_audio_compression(fields),
            MediaKind::Image => Ok(()),
        },
        Operation::Cut => check_cut(fields),
        Operation::AdjustVolume => check_volume(fields),
        Operation::Scale => check_scale(fields),
        Operation::Crop => check_crop(fields),
        Operation::Rotate => check_rotate(fields),
        Operation::AddWatermark => check_watermark(fields),
        Operation::ExtractAudio | Operation::ConvertTo => Ok(()),
    };

    match outcome {
        Ok(()) => ValidationResult::correct(),
        Err(message) => ValidationResult::incorrect(message),
    }
}

/// Bitrate as the encoder will receive it, accepting numbers and numeric
/// strings such as `"96"`.
pub fn parse_bitrate(value: &Value) -> Option<u32> {
    let parsed = match value {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()).map(|v| v.trunc() as i64),
        Value::String(s) => leading_integer(s),
        _ => None,
    }?;
    u32::try_from(parsed).ok()
}

/// JSON type of a field as shown in messages; `undefined` when absent.
pub fn type_name(value: Option<&Value>) -> &'static str {
    match value {
        None => "undefined",
        Some(Value::Null) => "null",
        Some(Value::Bool(_)) => "boolean",
        Some(Value::Number(_)) => "number",
        Some(Value::String(_)) => "string",
        Some(Value::Array(_)) => "array",
        Some(Value::Object(_)) => "object",
    }
}

fn present<'a>(fields: &'a Fields, key: &str) -> Option<&'a Value> {
    fields.get(key).filter(|v| !v.is_null())
}

fn leading_integer(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (sign, digits) = match s.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, s.strip_prefix('+').unwrap_or(s)),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end].parse::<i64>().ok().map(|n| sign * n)
}

fn quoted_list<I, S>(items: I) -> String
where
    I: IntoIterator<Item = S>,
    S: std::fmt::Display,
{
    items
        .into_iter()
        .map(|item| format!("\"{item}\""))
        .collect::<Vec<_>>()
        .join(", ")
}

fn number_field(fields: &Fields, key: &str) -> Rule {
    match fields.get(key) {
        Some(Value::Number(_)) => Ok(()),
        other => Err(format!(
            "Parameter {key} should be a number. {} given",
            type_name(other)
        )),
    }
}

fn check_video_compression(fields: &Fields) -> Rule {
    if let Some(quality) = present(fields, "quality") {
        let Some(q) = quality.as_f64() else {
            return Err("Incorrect option \"quality\".".to_string());
        };
        let is_integer = q.fract() == 0.0;
        if (is_integer && q > MAX_QUALITY) || q < 0.0 {
            return Err(
                "Incorrect option \"quality\". Please provide between 0 to 51".to_string(),
            );
        }
        if !is_integer {
            return Err("Incorrect option \"quality\".".to_string());
        }
    }

    if let Some(speed) = present(fields, "speed")
        && speed.as_str().and_then(Speed::from_name).is_none()
    {
        return Err(format!(
            "Incorrect option \"speed\". Please provide one of [{}]",
            quoted_list(Speed::ALL.iter().map(Speed::as_str))
        ));
    }

    Ok(())
}

fn check_audio_compression(fields: &Fields) -> Rule {
    if let Some(bitrate) = present(fields, "bitrate") {
        let allowed = parse_bitrate(bitrate).is_some_and(|b| AUDIO_BITRATES.contains(&b));
        if !allowed {
            return Err(format!(
                "Incorrect option \"bitrate\". Please provide one of [{}]",
                quoted_list(AUDIO_BITRATES)
            ));
        }
    }
    Ok(())
}

fn check_cut(fields: &Fields) -> Rule {
    for key in ["from", "to"] {
        let valid = fields
            .get(key)
            .and_then(Value::as_str)
            .is_some_and(is_time_string);
        if !valid {
            return Err(format!(
                "Incorrect option \"{key}\". Please provide a valid one matching hh:mm:ss"
            ));
        }
    }
    Ok(())
}

fn check_volume(fields: &Fields) -> Rule {
    number_field(fields, "rate")?;
    let rate = fields.get("rate").and_then(Value::as_f64).unwrap_or_default();
    if rate < 0.0 {
        return Err(format!(
            "Parameter rate should be greater than or equal 0. Found {rate}"
        ));
    }
    Ok(())
}

fn check_scale(fields: &Fields) -> Rule {
    if !fields.contains_key("width") || !fields.contains_key("height") {
        return Err("Parameter width and height both should be passed.".to_string());
    }
    number_field(fields, "width")?;
    number_field(fields, "height")
}

fn check_crop(fields: &Fields) -> Rule {
    if ["width", "height", "x", "y"]
        .iter()
        .any(|key| !fields.contains_key(*key))
    {
        return Err("Parameter width, height, x and y should be passed.".to_string());
    }
    for key in ["width", "height", "x", "y"] {
        number_field(fields, key)?;
    }
    Ok(())
}

fn check_rotate(fields: &Fields) -> Rule {
    number_field(fields, "angle")
}

fn check_watermark(fields: &Fields) -> Rule {
    if let Some(position) = present(fields, "position")
        && position
            .as_str()
            .and_then(WatermarkPosition::from_name)
            .is_none()
    {
        return Err(format!(
            "Incorrect option \"position\". Please provide one of [{}]",
            quoted_list(WatermarkPosition::ALL.iter().map(WatermarkPosition::name))
        ));
    }

    // zero opacity is rejected along with non-numbers
    let opacity = fields.get("opacity");
    let in_range = opacity
        .and_then(Value::as_f64)
        .is_some_and(|o| o > 0.0 && o <= 1.0);
    if !in_range {
        return Err(format!(
            "Parameter opacity should be between 0 and 1. Found {}",
            match opacity {
                Some(Value::Number(n)) => n.to_string(),
                other => type_name(other).to_string(),
            }
        ));
    }
    Ok(())
}
