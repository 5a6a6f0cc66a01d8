use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Where the external tools live and where generated outputs go
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolConfig {
    pub ffmpeg_path: String,
    pub ffprobe_path: String,
    /// Directory for outputs when the caller gives no `outputFilePath`
    pub output_dir: PathBuf,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: "ffmpeg".to_string(),
            ffprobe_path: "ffprobe".to_string(),
            output_dir: std::env::temp_dir().join("mediakit"),
        }
    }
}

impl ToolConfig {
    /// Load from a JSON file; absent fields keep their defaults
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"ffmpeg_path": "/opt/ffmpeg/bin/ffmpeg"}}"#).unwrap();

        let config = ToolConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.ffmpeg_path, "/opt/ffmpeg/bin/ffmpeg");
        assert_eq!(config.ffprobe_path, "ffprobe");
        assert_eq!(config.output_dir, ToolConfig::default().output_dir);
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(ToolConfig::from_json_file(file.path()).is_err());
        assert!(ToolConfig::from_json_file("/definitely/missing.json").is_err());
    }
}
