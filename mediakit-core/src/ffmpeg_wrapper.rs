use anyhow::{Context, Result};
use regex::Regex;
use serde::Deserialize;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;
use uuid::Uuid;

use crate::backend::{
    ArgumentVector, Engine, ExecutionReport, MediaDetails, MediaProbe, OutputPathGenerator,
    StreamInfo,
};
use crate::config::ToolConfig;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// FFmpeg argument builder with fluent interface.
///
/// Tokens are always emitted in the same order regardless of the order the
/// setters were called in, and the output path is always last.
#[derive(Debug, Clone, Default)]
pub struct FFmpegCommand {
    inputs: Vec<String>,
    overwrite: bool,
    seek_start: Option<String>,
    seek_end: Option<String>,
    stream_copy: bool,
    filter_complex: Option<String>,
    video_filters: Vec<String>,
    audio_filters: Vec<String>,
    video_codec: Option<String>,
    audio_codec: Option<String>,
    quality: Option<u8>,
    preset: Option<String>,
    audio_bitrate: Option<u32>,
    maps: Vec<String>,
}

impl FFmpegCommand {
    pub fn new(input: impl Into<String>) -> Self {
        Self {
            inputs: vec![input.into()],
            ..Self::default()
        }
    }

    /// Add another input after the primary one
    pub fn input(mut self, input: impl Into<String>) -> Self {
        self.inputs.push(input.into());
        self
    }

    /// Enable overwrite without asking
    pub fn overwrite(mut self) -> Self {
        self.overwrite = true;
        self
    }

    /// Keep only `[start, end]` of the input (`hh:mm:ss`)
    pub fn range(mut self, start: &str, end: &str) -> Self {
        self.seek_start = Some(start.to_string());
        self.seek_end = Some(end.to_string());
        self
    }

    /// Copy every stream without re-encoding
    pub fn stream_copy(mut self) -> Self {
        self.stream_copy = true;
        self
    }

    pub fn filter_complex(mut self, graph: &str) -> Self {
        self.filter_complex = Some(graph.to_string());
        self
    }

    /// Add a video filter
    pub fn video_filter(mut self, filter: &str) -> Self {
        self.video_filters.push(filter.to_string());
        self
    }

    /// Add an audio filter
    pub fn audio_filter(mut self, filter: &str) -> Self {
        self.audio_filters.push(filter.to_string());
        self
    }

    /// Set video codec
    pub fn video_codec(mut self, codec: &str) -> Self {
        self.video_codec = Some(codec.to_string());
        self
    }

    /// Set audio codec
    pub fn audio_codec(mut self, codec: &str) -> Self {
        self.audio_codec = Some(codec.to_string());
        self
    }

    /// Set quality (CRF value, 0-51 for x264)
    pub fn quality(mut self, crf: u8) -> Self {
        self.quality = Some(crf);
        self
    }

    /// Set encoding preset (ultrafast ... veryslow)
    pub fn preset(mut self, preset: &str) -> Self {
        self.preset = Some(preset.to_string());
        self
    }

    /// Set audio bitrate in kbit/s
    pub fn audio_bitrate(mut self, kbps: u32) -> Self {
        self.audio_bitrate = Some(kbps);
        self
    }

    /// Select streams for the output (`a`, `0:v`, ...)
    pub fn map(mut self, specifier: &str) -> Self {
        self.maps.push(specifier.to_string());
        self
    }

    /// Build the argument vector, ending with `output`
    pub fn build(&self, output: &str) -> ArgumentVector {
        let mut args = Vec::new();

        // Global options
        if self.overwrite {
            args.push("-y".to_string());
        }

        for input in &self.inputs {
            args.push("-i".to_string());
            args.push(input.clone());
        }

        if let Some(ref start) = self.seek_start {
            args.extend(["-ss".to_string(), start.clone()]);
        }
        if let Some(ref end) = self.seek_end {
            args.extend(["-to".to_string(), end.clone()]);
        }
        if self.stream_copy {
            args.extend(["-c".to_string(), "copy".to_string()]);
        }

        if let Some(ref graph) = self.filter_complex {
            args.extend(["-filter_complex".to_string(), graph.clone()]);
        }
        if !self.video_filters.is_empty() {
            args.extend(["-vf".to_string(), self.video_filters.join(",")]);
        }
        if !self.audio_filters.is_empty() {
            args.extend(["-filter:a".to_string(), self.audio_filters.join(",")]);
        }

        if let Some(ref codec) = self.video_codec {
            args.extend(["-c:v".to_string(), codec.clone()]);
        }
        if let Some(ref codec) = self.audio_codec {
            args.extend(["-codec:a".to_string(), codec.clone()]);
        }

        // Quality settings
        if let Some(crf) = self.quality {
            args.extend(["-crf".to_string(), crf.to_string()]);
        }
        if let Some(ref preset) = self.preset {
            args.extend(["-preset".to_string(), preset.clone()]);
        }
        if let Some(kbps) = self.audio_bitrate {
            args.extend(["-b:a".to_string(), format!("{}k", kbps)]);
        }

        for specifier in &self.maps {
            args.extend(["-map".to_string(), specifier.clone()]);
        }

        // Output file
        args.push(output.to_string());
        args
    }
}

/// Engine and probe backed by the `ffmpeg`/`ffprobe` executables
#[derive(Debug)]
pub struct FfmpegCli {
    ffmpeg_path: String,
    ffprobe_path: String,
    cancelled: AtomicBool,
}

impl FfmpegCli {
    pub fn new(config: &ToolConfig) -> Self {
        Self {
            ffmpeg_path: config.ffmpeg_path.clone(),
            ffprobe_path: config.ffprobe_path.clone(),
            cancelled: AtomicBool::new(false),
        }
    }
}

impl Engine for FfmpegCli {
    fn execute(&self, args: &[String]) -> Result<ExecutionReport> {
        let mut cmd = Command::new(&self.ffmpeg_path);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());

        log::info!("Executing FFmpeg command: {:?}", cmd);

        self.cancelled.store(false, Ordering::SeqCst);
        let mut child = cmd.spawn().context("Failed to spawn FFmpeg process")?;

        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| anyhow::anyhow!("Failed to capture stderr"))?;

        // Drain stderr so FFmpeg never blocks on a full pipe
        let reader_thread = thread::spawn(move || {
            let reader = BufReader::new(stderr);
            let mut all_output = String::new();
            for line in reader.lines().map_while(std::result::Result::ok) {
                log::trace!("ffmpeg: {}", line);
                all_output.push_str(&line);
                all_output.push('\n');
            }
            all_output
        });

        let status = loop {
            if let Some(status) = child
                .try_wait()
                .context("Failed to wait for FFmpeg process")?
            {
                break status;
            }
            if self.cancelled.swap(false, Ordering::SeqCst) {
                log::warn!("Cancelling FFmpeg process {}", child.id());
                child.kill().context("Failed to kill FFmpeg process")?;
                let _ = child.wait();
                let _ = reader_thread.join();
                anyhow::bail!("FFmpeg execution cancelled");
            }
            thread::sleep(POLL_INTERVAL);
        };

        let all_output = reader_thread
            .join()
            .unwrap_or_else(|_| String::from("Failed to get output"));

        if !status.success() {
            log::error!("FFmpeg failed with output:\n{}", all_output);
            anyhow::bail!(
                "FFmpeg failed with exit code: {:?}. Check logs for details.",
                status.code()
            );
        }

        Ok(ExecutionReport {
            return_code: status.code().unwrap_or_default(),
            log: all_output,
        })
    }

    fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }
}

impl MediaProbe for FfmpegCli {
    /// Get media metadata using ffprobe
    fn media_info(&self, path: &str) -> Result<MediaDetails> {
        let output = Command::new(&self.ffprobe_path)
            .args([
                "-v",
                "quiet",
                "-print_format",
                "json",
                "-show_format",
                "-show_streams",
                path,
            ])
            .output()
            .context("Failed to run ffprobe")?;

        if !output.status.success() {
            anyhow::bail!(
                "ffprobe could not read {} (exit code: {:?})",
                path,
                output.status.code()
            );
        }

        parse_probe_output(&String::from_utf8_lossy(&output.stdout))
    }
}

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
    format: Option<ProbeFormat>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    index: usize,
    codec_type: Option<String>,
    codec_name: Option<String>,
    width: Option<u64>,
    height: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct ProbeFormat {
    filename: Option<String>,
    format_name: Option<String>,
    duration: Option<String>,
    size: Option<String>,
    bit_rate: Option<String>,
}

/// Convert `ffprobe -print_format json` output into [`MediaDetails`]
pub fn parse_probe_output(json: &str) -> Result<MediaDetails> {
    let probe: ProbeOutput =
        serde_json::from_str(json).context("Failed to parse ffprobe output")?;
    let format = probe.format.context("ffprobe output has no format section")?;

    let duration = match format.duration.as_deref() {
        Some(text) => text
            .parse::<f64>()
            .with_context(|| format!("Invalid duration in ffprobe output: {}", text))?,
        // Still images have no duration
        None => 0.0,
    };

    let streams = probe
        .streams
        .into_iter()
        .map(|stream| StreamInfo {
            index: stream.index,
            codec_type: stream.codec_type,
            codec_name: stream.codec_name,
            width: stream.width,
            height: stream.height,
        })
        .collect();

    Ok(MediaDetails {
        duration,
        streams,
        format: format.format_name,
        bitrate: format.bit_rate,
        size: format.size,
        filename: format.filename,
    })
}

/// Generates `<output_dir>/<uuid>.<ext>` paths
#[derive(Debug, Clone)]
pub struct CacheDirOutputPaths {
    dir: PathBuf,
}

impl CacheDirOutputPaths {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl OutputPathGenerator for CacheDirOutputPaths {
    fn generate_output_path(&self, extension: &str) -> Result<Option<String>> {
        let path = self.dir.join(format!("{}.{}", Uuid::new_v4(), extension));
        Ok(path.to_str().map(str::to_string))
    }
}

/// Check if FFmpeg is available and return version info
pub fn check_ffmpeg(ffmpeg_path: &str) -> Result<String> {
    let output = Command::new(ffmpeg_path)
        .arg("-version")
        .output()
        .context("FFmpeg not found. Please install FFmpeg.")?;

    let version = String::from_utf8_lossy(&output.stdout);
    let version_regex = Regex::new(r"ffmpeg version (\S+)").context("Invalid version pattern")?;
    if let Some(caps) = version_regex.captures(&version) {
        Ok(caps[1].to_string())
    } else {
        Ok("unknown".to_string())
    }
}
