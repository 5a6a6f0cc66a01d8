use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use mediakit_core::backend::StreamInfo;
use mediakit_core::media::check_input_and_options;
use mediakit_core::options::{CompressVideoOptions, CutOptions, WatermarkOptions};
use mediakit_core::{
    Audio, Backend, Engine, ExecutionReport, Image, MediaDetails, MediaError, MediaHandle,
    MediaKind, MediaProbe, Operation, OptionBag, OutputPathGenerator, ValidationResult, Video,
    WatermarkPosition,
};
use serde_json::json;

#[derive(Default)]
struct RecordingEngine {
    calls: Mutex<Vec<Vec<String>>>,
    failure: Option<String>,
    cancelled: AtomicBool,
}

impl Engine for RecordingEngine {
    fn execute(&self, args: &[String]) -> anyhow::Result<ExecutionReport> {
        self.calls.lock().unwrap().push(args.to_vec());
        match &self.failure {
            Some(message) => Err(anyhow::anyhow!(message.clone())),
            None => Ok(ExecutionReport {
                return_code: 0,
                log: String::new(),
            }),
        }
    }

    fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }
}

struct FixedPaths {
    generate: bool,
    requested: Mutex<Vec<String>>,
}

impl OutputPathGenerator for FixedPaths {
    fn generate_output_path(&self, extension: &str) -> anyhow::Result<Option<String>> {
        self.requested.lock().unwrap().push(extension.to_string());
        Ok(self.generate.then(|| format!("/cache/generated.{extension}")))
    }
}

struct CannedProbe {
    sources: HashMap<String, MediaDetails>,
}

impl MediaProbe for CannedProbe {
    fn media_info(&self, path: &str) -> anyhow::Result<MediaDetails> {
        self.sources
            .get(path)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("No such file: {path}"))
    }
}

struct Fixture {
    backend: Backend,
    engine: Arc<RecordingEngine>,
    paths: Arc<FixedPaths>,
}

impl Fixture {
    fn new() -> Self {
        Self::build(None, true)
    }

    fn build(failure: Option<&str>, generate: bool) -> Self {
        let engine = Arc::new(RecordingEngine {
            failure: failure.map(str::to_string),
            ..RecordingEngine::default()
        });
        let paths = Arc::new(FixedPaths {
            generate,
            requested: Mutex::new(Vec::new()),
        });
        let probe = Arc::new(CannedProbe {
            sources: sources(),
        });
        Self {
            backend: Backend::new(engine.clone(), paths.clone(), probe),
            engine,
            paths,
        }
    }

    fn calls(&self) -> Vec<Vec<String>> {
        self.engine.calls.lock().unwrap().clone()
    }

    fn last_call(&self) -> Vec<String> {
        self.calls().pop().expect("engine was not called")
    }

    fn requested_extensions(&self) -> Vec<String> {
        self.paths.requested.lock().unwrap().clone()
    }
}

fn visual(width: u64, height: u64) -> StreamInfo {
    StreamInfo {
        index: 0,
        codec_type: Some("video".to_string()),
        codec_name: Some("h264".to_string()),
        width: Some(width),
        height: Some(height),
    }
}

fn sources() -> HashMap<String, MediaDetails> {
    let mut sources = HashMap::new();
    sources.insert(
        "/media/clip.mp4".to_string(),
        MediaDetails {
            duration: 60.0,
            streams: vec![visual(1280, 720)],
            ..MediaDetails::default()
        },
    );
    sources.insert(
        "file:///media/clip.mov".to_string(),
        MediaDetails {
            duration: 10.0,
            streams: vec![visual(640, 360)],
            ..MediaDetails::default()
        },
    );
    sources.insert(
        "/media/song.wav".to_string(),
        MediaDetails {
            duration: 185.5,
            ..MediaDetails::default()
        },
    );
    sources.insert(
        "/media/photo.png".to_string(),
        MediaDetails {
            streams: vec![
                StreamInfo {
                    index: 0,
                    codec_type: Some("data".to_string()),
                    ..StreamInfo::default()
                },
                visual(800, 600),
            ],
            ..MediaDetails::default()
        },
    );
    sources.insert(
        "/media/logo.png".to_string(),
        MediaDetails {
            streams: vec![visual(64, 64)],
            ..MediaDetails::default()
        },
    );
    sources
}

#[test]
fn test_compress_video_falls_back_per_field() {
    let fx = Fixture::new();
    let video = Video::new("/media/clip.mp4", fx.backend.clone());

    let outcome = video.compress(&json!({"quality": 28})).unwrap();
    assert_eq!(outcome.output_file_path, "/cache/generated.mp4");
    assert_eq!(
        fx.last_call(),
        [
            "-i",
            "/media/clip.mp4",
            "-c:v",
            "libx264",
            "-crf",
            "28",
            "-preset",
            "fast",
            "/cache/generated.mp4"
        ]
    );

    video.compress(&json!({"speed": "slow"})).unwrap();
    let args = fx.last_call();
    assert_eq!(args[5], "18");
    assert_eq!(args[7], "slow");
}

#[test]
fn test_compress_video_typed_defaults_and_file_scheme() {
    let fx = Fixture::new();
    let video = Video::new("file:///media/clip.mov", fx.backend.clone());

    let options = CompressVideoOptions {
        extension: Some("mkv".to_string()),
        ..CompressVideoOptions::default()
    };
    let outcome = video.compress(&options.to_value().unwrap()).unwrap();

    assert_eq!(outcome.output_file_path, "/cache/generated.mkv");
    assert_eq!(
        fx.last_call(),
        [
            "-i",
            "/media/clip.mov",
            "-c:v",
            "libx264",
            "-crf",
            "18",
            "-preset",
            "medium",
            "/cache/generated.mkv"
        ]
    );
}

#[test]
fn test_malformed_input_path_is_rejected_first() {
    let fx = Fixture::new();
    let video = Video::new("clip.mp4", fx.backend.clone());

    let err = video.compress(&json!({"quality": 99})).unwrap_err();
    assert!(matches!(err, MediaError::InvalidInputPath));
    assert_eq!(err.to_string(), "Invalid path. Please provide a valid path");
    assert!(fx.calls().is_empty());
}

#[test]
fn test_unreadable_input_is_rejected_before_options() {
    let fx = Fixture::new();
    let audio = Audio::new("/media/missing.mp3", fx.backend.clone());

    let err = audio.compress(&json!({"bitrate": 7})).unwrap_err();
    assert!(matches!(err, MediaError::InputDetails));
    assert!(fx.requested_extensions().is_empty());
}

#[test]
fn test_option_failure_stops_before_output_path() {
    let fx = Fixture::new();
    let video = Video::new("/media/clip.mp4", fx.backend.clone());

    let err = video.compress(&json!({"quality": 52})).unwrap_err();
    assert!(matches!(err, MediaError::InvalidOptions(_)));
    assert!(fx.requested_extensions().is_empty());
    assert!(fx.calls().is_empty());
}

#[test]
fn test_custom_output_path_is_used_verbatim() {
    let fx = Fixture::new();
    let video = Video::new("/media/clip.mp4", fx.backend.clone());

    let outcome = video
        .compress(&json!({"outputFilePath": "/exports/small.mp4"}))
        .unwrap();
    assert_eq!(outcome.output_file_path, "/exports/small.mp4");
    assert_eq!(fx.last_call().last().unwrap(), "/exports/small.mp4");
    assert!(fx.requested_extensions().is_empty());
}

#[test]
fn test_output_path_failures_are_distinguished() {
    let fx = Fixture::build(None, false);
    let video = Video::new("/media/clip.mp4", fx.backend.clone());

    let generated = video.compress(&json!({})).unwrap_err();
    assert!(matches!(generated, MediaError::OutputGeneration));

    let custom = video.compress(&json!({"outputFilePath": 42})).unwrap_err();
    assert!(matches!(custom, MediaError::IncorrectOutputPath));
    assert!(fx.calls().is_empty());
}

#[test]
fn test_check_input_and_options_as_validation_result() {
    let fx = Fixture::new();
    let handle = MediaHandle::new("/media/clip.mp4", MediaKind::Video);

    let ok = check_input_and_options(&handle, &fx.backend, &json!({}), Operation::ExtractAudio, "mp3");
    let result = ValidationResult::from(&ok);
    assert!(result.is_correct);
    assert!(result.message.is_empty());
    assert_eq!(result.output_file_path.as_deref(), Some("/cache/generated.mp3"));

    let bad = check_input_and_options(&handle, &fx.backend, &json!(null), Operation::Cut, "mp4");
    let result = ValidationResult::from(&bad);
    assert!(!result.is_correct);
    assert!(result.message.starts_with("Parameter \"options\" must be an object."));
    assert_eq!(result.output_file_path, None);
}

#[test]
fn test_compress_audio() {
    let fx = Fixture::new();
    let audio = Audio::new("/media/song.wav", fx.backend.clone());

    let outcome = audio
        .compress(&json!({"bitrate": "128", "extension": "aac"}))
        .unwrap();
    assert_eq!(outcome.output_file_path, "/cache/generated.aac");
    assert_eq!(
        fx.last_call(),
        ["-i", "/media/song.wav", "-b:a", "128k", "-map", "a", "/cache/generated.aac"]
    );

    audio.compress(&json!({})).unwrap();
    assert_eq!(fx.last_call()[3], "96k");
    assert_eq!(fx.requested_extensions(), ["aac", "wav"]);
}

#[test]
fn test_adjust_volume() {
    let fx = Fixture::new();
    let audio = Audio::new("/media/song.wav", fx.backend.clone());

    let missing = audio.adjust_volume(&json!({})).unwrap_err();
    assert_eq!(missing.to_string(), "Parameter rate should be set");

    audio.adjust_volume(&json!({"rate": 1.5})).unwrap();
    assert_eq!(
        fx.last_call(),
        ["-i", "/media/song.wav", "-filter:a", "volume=1.5", "/cache/generated.wav"]
    );
}

#[test]
fn test_cut_within_duration() {
    let fx = Fixture::new();
    let video = Video::new("/media/clip.mp4", fx.backend.clone());
    let options = CutOptions {
        from: "00:00:05".to_string(),
        to: "00:00:45".to_string(),
        output_file_path: None,
    };

    video.cut(&options.to_value().unwrap()).unwrap();
    assert_eq!(
        fx.last_call(),
        [
            "-i",
            "/media/clip.mp4",
            "-ss",
            "00:00:05",
            "-to",
            "00:00:45",
            "-c",
            "copy",
            "/cache/generated.mp4"
        ]
    );
}

#[test]
fn test_cut_checks_to_before_from() {
    let fx = Fixture::new();
    let video = Video::new("/media/clip.mp4", fx.backend.clone());

    let both = video
        .cut(&json!({"from": "00:02:00", "to": "00:01:30"}))
        .unwrap_err();
    assert_eq!(
        both.to_string(),
        "The option \"to\" can not be greater than the total time of the video"
    );

    let from_only = video
        .cut(&json!({"from": "00:02:00", "to": "00:00:30"}))
        .unwrap_err();
    assert!(matches!(from_only, MediaError::ExceedsDuration { field: "from" }));
    assert!(fx.calls().is_empty());
}

#[test]
fn test_cut_accepts_reversed_bounds_inside_duration() {
    let fx = Fixture::new();
    let audio = Audio::new("/media/song.wav", fx.backend.clone());

    audio
        .cut(&json!({"from": "00:00:10", "to": "00:00:05"}))
        .unwrap();
    assert_eq!(fx.calls().len(), 1);
}

#[test]
fn test_crop_checks_width_first() {
    let fx = Fixture::new();
    let image = Image::new("/media/photo.png", fx.backend.clone());

    let err = image
        .crop(&json!({"width": 801, "height": 601, "x": 0, "y": 0}))
        .unwrap_err();
    assert_eq!(err.to_string(), "Parameter width is greater than image width 800.");

    let err = image
        .crop(&json!({"width": 800, "height": 601, "x": 0, "y": 0}))
        .unwrap_err();
    assert_eq!(err.to_string(), "Parameter height is greater than image height 600.");
    assert!(fx.calls().is_empty());
}

#[test]
fn test_image_filters() {
    let fx = Fixture::new();
    let image = Image::new("/media/photo.png", fx.backend.clone());

    image
        .crop(&json!({"width": 400, "height": 300, "x": 10, "y": 20}))
        .unwrap();
    assert_eq!(
        fx.last_call(),
        ["-i", "/media/photo.png", "-vf", "crop=400:300:10:20", "/cache/generated.png"]
    );

    image.scale(&json!({"width": 320, "height": 240})).unwrap();
    assert_eq!(fx.last_call()[3], "scale=320:240");

    image.rotate(&json!({"angle": 90})).unwrap();
    assert_eq!(fx.last_call()[3], "rotate=angle=90*PI/180");
}

#[test]
fn test_add_watermark() {
    let fx = Fixture::new();
    let video = Video::new("/media/clip.mp4", fx.backend.clone());
    let options = WatermarkOptions {
        watermarks_image: "/media/logo.png".to_string(),
        position: Some(WatermarkPosition::TopRight),
        opacity: 0.25,
        output_file_path: None,
        extension: None,
    };

    video.add_watermark(&options.to_value().unwrap()).unwrap();
    assert_eq!(
        fx.last_call(),
        [
            "-y",
            "-i",
            "/media/clip.mp4",
            "-i",
            "/media/logo.png",
            "-filter_complex",
            "[1]lut=a=val*0.25[a];[0][a]overlay=W-w-5:5",
            "-codec:a",
            "copy",
            "/cache/generated.mp4"
        ]
    );

    video
        .add_watermark(&json!({"watermarksImage": "/media/logo.png", "opacity": 1}))
        .unwrap();
    assert_eq!(fx.last_call()[6], "[1]lut=a=val*1[a];[0][a]overlay=W-w-5:H-h-5");
}

#[test]
fn test_add_watermark_rejections() {
    let fx = Fixture::new();
    let video = Video::new("/media/clip.mp4", fx.backend.clone());

    let zero = video
        .add_watermark(&json!({"watermarksImage": "/media/logo.png", "opacity": 0}))
        .unwrap_err();
    assert!(matches!(zero, MediaError::InvalidOptions(_)));

    let unreadable = video
        .add_watermark(&json!({"watermarksImage": "/media/nope.png", "opacity": 0.5}))
        .unwrap_err();
    assert!(matches!(unreadable, MediaError::WatermarkDetails));

    let missing = video.add_watermark(&json!({"opacity": 0.5})).unwrap_err();
    assert!(matches!(missing, MediaError::WatermarkDetails));
    assert!(fx.calls().is_empty());
}

#[test]
fn test_extract_audio_defaults_to_mp3() {
    let fx = Fixture::new();
    let video = Video::new("/media/clip.mp4", fx.backend.clone());

    video.extract_audio(&json!({})).unwrap();
    assert_eq!(fx.last_call(), ["-i", "/media/clip.mp4", "/cache/generated.mp3"]);

    video.extract_audio(&json!({"extension": "ogg"})).unwrap();
    assert_eq!(fx.last_call()[2], "/cache/generated.ogg");
}

#[test]
fn test_convert_to_rewrites_only_the_extension() {
    let fx = Fixture::new();
    let video = Video::new("/media/clip.mp4", fx.backend.clone());

    let missing = video.convert_to(&json!({})).unwrap_err();
    assert!(matches!(missing, MediaError::MissingOption("extension")));

    let outcome = video
        .convert_to(&json!({"extension": "mkv", "outputFilePath": "/out/v1.2/clip.mp4"}))
        .unwrap();
    assert_eq!(outcome.output_file_path, "/out/v1.2/clip.mkv");
    assert_eq!(fx.last_call(), ["-i", "/media/clip.mp4", "/out/v1.2/clip.mkv"]);

    let generated = video.convert_to(&json!({"extension": "webm"})).unwrap();
    assert_eq!(generated.output_file_path, "/cache/generated.webm");
}

#[test]
fn test_engine_failure_is_passed_through() {
    let fx = Fixture::build(Some("engine exploded"), true);
    let image = Image::new("/media/photo.png", fx.backend.clone());

    let err = image.rotate(&json!({"angle": 45})).unwrap_err();
    assert!(matches!(err, MediaError::Engine(_)));
    assert_eq!(err.to_string(), "engine exploded");
    assert_eq!(fx.calls().len(), 1);
}

#[test]
fn test_cancel_is_forwarded_to_engine() {
    let fx = Fixture::new();
    Audio::new("/media/song.wav", fx.backend.clone()).cancel();
    assert!(fx.engine.cancelled.load(Ordering::SeqCst));
}
