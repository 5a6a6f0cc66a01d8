use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use mediakit_core::options::{
    AdjustVolumeOptions, CompressAudioOptions, CompressVideoOptions, ConvertOptions, CropOptions,
    CutOptions, ExtractAudioOptions, RotateOptions, ScaleOptions, WatermarkOptions,
};
use mediakit_core::{
    Audio, Backend, CacheDirOutputPaths, Engine, FfmpegCli, Image, MediaKind, OperationOutcome,
    OptionBag, Speed, ToolConfig, Video, WatermarkPosition, check_ffmpeg,
};

#[derive(Parser, Debug)]
#[command(name = "mediakit")]
#[command(about = "Validated FFmpeg operations on audio, video and image files")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// JSON file with tool paths and the output directory
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// FFmpeg executable
    #[arg(long, global = true)]
    ffmpeg: Option<String>,

    /// FFprobe executable
    #[arg(long, global = true)]
    ffprobe: Option<String>,

    /// Directory for generated output files
    #[arg(long, global = true)]
    output_dir: Option<PathBuf>,

    /// Write to this path instead of a generated one
    #[arg(short, long, global = true)]
    output: Option<String>,

    /// Raw JSON options, merged over the ones built from the flags
    #[arg(long, global = true, value_name = "JSON")]
    options: Option<String>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print probed details of a file
    Info {
        input: String,
        #[arg(short, long, value_enum, default_value = "video")]
        kind: MediaKind,
    },
    /// Re-encode audio at a bitrate or video at a quality and speed
    Compress {
        input: String,
        #[arg(short, long, value_enum, default_value = "video")]
        kind: MediaKind,
        /// Video quality (0-51, lower is better)
        #[arg(short, long)]
        quality: Option<u8>,
        /// Video encoding speed
        #[arg(short, long, value_enum)]
        speed: Option<Speed>,
        /// Audio bitrate in kbit/s
        #[arg(short, long)]
        bitrate: Option<u32>,
        #[arg(short, long)]
        extension: Option<String>,
    },
    /// Keep the part between two hh:mm:ss times
    Cut {
        input: String,
        #[arg(short, long, value_enum, default_value = "video")]
        kind: MediaKind,
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
    },
    /// Scale the volume of an audio file
    Volume {
        input: String,
        #[arg(short, long)]
        rate: f64,
    },
    /// Resize an image
    Scale {
        input: String,
        #[arg(long, default_value = "1024")]
        width: f64,
        #[arg(long, default_value = "768")]
        height: f64,
    },
    /// Cut a region out of an image
    Crop {
        input: String,
        #[arg(long)]
        width: f64,
        #[arg(long)]
        height: f64,
        #[arg(short, default_value = "0")]
        x: f64,
        #[arg(short, default_value = "0")]
        y: f64,
    },
    /// Rotate an image clockwise
    Rotate {
        input: String,
        /// Degrees
        #[arg(short, long)]
        angle: f64,
    },
    /// Overlay an image on a video
    Watermark {
        input: String,
        /// Watermark image
        #[arg(short, long)]
        image: String,
        #[arg(short, long, value_enum)]
        position: Option<WatermarkPosition>,
        /// Opacity in (0, 1]
        #[arg(long, default_value = "1.0")]
        opacity: f64,
        #[arg(short, long)]
        extension: Option<String>,
    },
    /// Write the audio track of a video to its own file
    ExtractAudio {
        input: String,
        /// Audio extension (mp3 when not given)
        #[arg(short, long)]
        extension: Option<String>,
    },
    /// Change the container format
    Convert {
        input: String,
        #[arg(short, long, value_enum, default_value = "video")]
        kind: MediaKind,
        #[arg(short, long)]
        extension: String,
    },
}

type Job = Box<dyn FnOnce() -> mediakit_core::Result<OperationOutcome> + Send>;

fn load_config(args: &Args) -> Result<ToolConfig> {
    let mut config = match &args.config {
        Some(path) => ToolConfig::from_json_file(path)?,
        None => ToolConfig::default(),
    };
    if let Some(ffmpeg) = &args.ffmpeg {
        config.ffmpeg_path = ffmpeg.clone();
    }
    if let Some(ffprobe) = &args.ffprobe {
        config.ffprobe_path = ffprobe.clone();
    }
    if let Some(dir) = &args.output_dir {
        config.output_dir = dir.clone();
    }
    Ok(config)
}

/// Typed options from the flags, with `--options` keys laid over them.
///
/// A non-object `--options` replaces the whole bag so the core can reject it.
fn merge_options(typed: impl OptionBag, raw: Option<&str>) -> Result<Value> {
    let mut options = typed.to_value()?;
    let Some(raw) = raw else {
        return Ok(options);
    };
    let extra: Value = serde_json::from_str(raw).context("--options is not valid JSON")?;
    let Value::Object(extra) = extra else {
        return Ok(extra);
    };
    if let Some(base) = options.as_object_mut() {
        base.extend(extra);
    }
    Ok(options)
}

fn build_job(
    command: Command,
    backend: Backend,
    output: Option<String>,
    raw: Option<&str>,
) -> Result<Job> {
    let job: Job = match command {
        Command::Info { .. } => anyhow::bail!("info does not run an operation"),
        Command::Compress {
            input,
            kind,
            quality,
            speed,
            bitrate,
            extension,
        } => match kind {
            MediaKind::Video => {
                let options = merge_options(
                    CompressVideoOptions {
                        quality,
                        speed,
                        output_file_path: output,
                        extension,
                    },
                    raw,
                )?;
                let video = Video::new(input, backend);
                Box::new(move || video.compress(&options))
            }
            MediaKind::Audio => {
                let options = merge_options(
                    CompressAudioOptions {
                        bitrate,
                        output_file_path: output,
                        extension,
                    },
                    raw,
                )?;
                let audio = Audio::new(input, backend);
                Box::new(move || audio.compress(&options))
            }
            MediaKind::Image => anyhow::bail!("Only audio and video can be compressed"),
        },
        Command::Cut {
            input,
            kind,
            from,
            to,
        } => {
            let options = merge_options(
                CutOptions {
                    from,
                    to,
                    output_file_path: output,
                },
                raw,
            )?;
            match kind {
                MediaKind::Video => {
                    let video = Video::new(input, backend);
                    Box::new(move || video.cut(&options))
                }
                MediaKind::Audio => {
                    let audio = Audio::new(input, backend);
                    Box::new(move || audio.cut(&options))
                }
                MediaKind::Image => anyhow::bail!("Only audio and video can be cut"),
            }
        }
        Command::Volume { input, rate } => {
            let options = merge_options(
                AdjustVolumeOptions {
                    rate,
                    output_file_path: output,
                },
                raw,
            )?;
            let audio = Audio::new(input, backend);
            Box::new(move || audio.adjust_volume(&options))
        }
        Command::Scale {
            input,
            width,
            height,
        } => {
            let options = merge_options(
                ScaleOptions {
                    width,
                    height,
                    output_file_path: output,
                },
                raw,
            )?;
            let image = Image::new(input, backend);
            Box::new(move || image.scale(&options))
        }
        Command::Crop {
            input,
            width,
            height,
            x,
            y,
        } => {
            let options = merge_options(
                CropOptions {
                    width,
                    height,
                    x,
                    y,
                    output_file_path: output,
                },
                raw,
            )?;
            let image = Image::new(input, backend);
            Box::new(move || image.crop(&options))
        }
        Command::Rotate { input, angle } => {
            let options = merge_options(
                RotateOptions {
                    angle,
                    output_file_path: output,
                },
                raw,
            )?;
            let image = Image::new(input, backend);
            Box::new(move || image.rotate(&options))
        }
        Command::Watermark {
            input,
            image,
            position,
            opacity,
            extension,
        } => {
            let options = merge_options(
                WatermarkOptions {
                    watermarks_image: image,
                    position,
                    opacity,
                    output_file_path: output,
                    extension,
                },
                raw,
            )?;
            let video = Video::new(input, backend);
            Box::new(move || video.add_watermark(&options))
        }
        Command::ExtractAudio { input, extension } => {
            let options = merge_options(
                ExtractAudioOptions {
                    extension,
                    output_file_path: output,
                },
                raw,
            )?;
            let video = Video::new(input, backend);
            Box::new(move || video.extract_audio(&options))
        }
        Command::Convert {
            input,
            kind,
            extension,
        } => {
            let options = merge_options(
                ConvertOptions {
                    extension,
                    output_file_path: output,
                },
                raw,
            )?;
            match kind {
                MediaKind::Video => {
                    let video = Video::new(input, backend);
                    Box::new(move || video.convert_to(&options))
                }
                MediaKind::Audio => {
                    let audio = Audio::new(input, backend);
                    Box::new(move || audio.convert_to(&options))
                }
                MediaKind::Image => {
                    let image = Image::new(input, backend);
                    Box::new(move || image.convert_to(&options))
                }
            }
        }
    };
    Ok(job)
}

fn print_info(input: String, kind: MediaKind, backend: Backend) -> Result<()> {
    let details = match kind {
        MediaKind::Audio => Audio::new(input, backend).details()?,
        MediaKind::Video => Video::new(input, backend).details()?,
        MediaKind::Image => Image::new(input, backend).details()?,
    };

    println!("Duration: {:.3}s", details.duration);
    if let Some(format) = &details.format {
        println!("Format:   {}", format);
    }
    if let Some(bitrate) = &details.bitrate {
        println!("Bitrate:  {}", bitrate);
    }
    if let Some(stream) = details.first_visual_stream() {
        println!(
            "Picture:  {}x{}",
            stream.width.unwrap_or_default(),
            stream.height.unwrap_or_default()
        );
    }
    println!("Audio:    {}", if details.has_audio() { "yes" } else { "no" });
    println!("{:-<50}", "");
    for stream in &details.streams {
        println!(
            "#{:<3} {:<10} {}",
            stream.index,
            stream.codec_type.as_deref().unwrap_or("unknown"),
            stream.codec_name.as_deref().unwrap_or("")
        );
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    if args.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    }

    let config = load_config(&args)?;
    let Args {
        command,
        output,
        options,
        ..
    } = args;

    // Check FFmpeg availability
    match check_ffmpeg(&config.ffmpeg_path) {
        Ok(version) => {
            log::info!("FFmpeg version {} detected", version);
        }
        Err(e) => {
            eprintln!("Error: FFmpeg not found!");
            eprintln!("Please install FFmpeg or point --ffmpeg at it.");
            eprintln!();
            eprintln!("Installation instructions:");
            eprintln!("  Ubuntu/Debian: sudo apt install ffmpeg");
            eprintln!("  macOS:         brew install ffmpeg");
            eprintln!("  Windows:       Download from https://ffmpeg.org/download.html");
            eprintln!();
            eprintln!("Details: {:#}", e);
            std::process::exit(1);
        }
    }

    std::fs::create_dir_all(&config.output_dir).with_context(|| {
        format!(
            "Failed to create output directory {}",
            config.output_dir.display()
        )
    })?;

    let ffmpeg = Arc::new(FfmpegCli::new(&config));
    let backend = Backend::new(
        ffmpeg.clone(),
        Arc::new(CacheDirOutputPaths::new(&config.output_dir)),
        ffmpeg.clone(),
    );

    let command = match command {
        Command::Info { input, kind } => return print_info(input, kind, backend),
        command => command,
    };
    let job = build_job(command, backend, output, options.as_deref())?;

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .context("Invalid progress template")?,
    );
    pb.set_message("Running FFmpeg...");
    pb.enable_steady_tick(Duration::from_millis(100));

    let mut task = tokio::task::spawn_blocking(job);
    let result = tokio::select! {
        joined = &mut task => joined,
        _ = tokio::signal::ctrl_c() => {
            pb.set_message("Cancelling...");
            log::warn!("Interrupted, stopping FFmpeg");
            ffmpeg.cancel();
            task.await
        }
    }
    .context("Engine task panicked")?;

    match result {
        Ok(outcome) => {
            pb.finish_with_message("Done");
            log::debug!("Engine log:\n{}", outcome.report.log);
            println!("\n✅ Operation completed successfully!");
            println!("📁 Output saved to: {}", outcome.output_file_path);
            Ok(())
        }
        Err(err) => {
            pb.abandon_with_message("Failed");
            Err(err.into())
        }
    }
}
