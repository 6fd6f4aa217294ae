//! Configuration parsing for the web application.
//!
//! Translates CLI arguments into validated config structs so handlers and the
//! capture loop never re-parse flags.

use std::{path::PathBuf, time::Duration};

use anyhow::{Result, anyhow, bail};
use clap::Args;
use ml_core::{
    CascadeResolver, DetectorConfig,
    resource::{CASCADE_URL, DEFAULT_MODELS_DIR, SYSTEM_CASCADE_DIRS},
};
use video_ingest::{CaptureSettings, DEFAULT_CAMERA_INDICES};

/// Classifier location and scan parameters shared by every subcommand.
#[derive(Clone, Debug, Args)]
pub struct DetectorArgs {
    /// Directory searched first for the cascade file and used as the download target.
    #[arg(long = "models-dir", value_name = "DIR", default_value = DEFAULT_MODELS_DIR)]
    pub models_dir: PathBuf,
    /// URL the cascade file is fetched from when no local copy exists.
    #[arg(long = "cascade-url", value_name = "URL", default_value = CASCADE_URL)]
    pub cascade_url: String,
    /// Directory holding a bundled cascade, tried when the download fails (repeatable).
    #[arg(long = "bundled-dir", value_name = "DIR")]
    pub bundled_dirs: Vec<PathBuf>,
    /// Timeout for the cascade download.
    #[arg(long = "download-timeout-secs", value_name = "SECS", default_value_t = 30)]
    pub download_timeout_secs: u64,
    /// Image pyramid scale step; must be greater than 1.0.
    #[arg(long = "scale-factor", value_name = "FACTOR", default_value_t = DetectorConfig::DEFAULT_SCALE_FACTOR)]
    pub scale_factor: f64,
    /// Neighbouring hits required to keep a candidate box.
    #[arg(long = "min-neighbors", value_name = "N", default_value_t = DetectorConfig::DEFAULT_MIN_NEIGHBORS)]
    pub min_neighbors: u32,
    /// Smallest face considered, as `N` or `WxH` pixels.
    #[arg(long = "min-size", value_name = "WxH", default_value = "30x30", value_parser = parse_min_size)]
    pub min_size: (u32, u32),
}

impl DetectorArgs {
    pub fn resolver(&self) -> Result<CascadeResolver> {
        if self.download_timeout_secs == 0 {
            bail!("--download-timeout-secs must be at least 1");
        }
        let bundled = if self.bundled_dirs.is_empty() {
            SYSTEM_CASCADE_DIRS.iter().map(PathBuf::from).collect()
        } else {
            self.bundled_dirs.clone()
        };
        Ok(CascadeResolver::new(&self.models_dir)
            .with_url(self.cascade_url.clone())
            .with_bundled_dirs(bundled)
            .with_timeout(Duration::from_secs(self.download_timeout_secs)))
    }

    pub fn detector_config(&self) -> Result<DetectorConfig> {
        DetectorConfig::new(self.scale_factor, self.min_neighbors, self.min_size)
            .map_err(|err| anyhow!("{err}"))
    }
}

fn parse_min_size(value: &str) -> Result<(u32, u32), String> {
    let parse = |part: &str| {
        part.trim()
            .parse::<u32>()
            .map_err(|_| format!("invalid size component {part:?}; expected N or WxH"))
    };
    match value.split_once(['x', 'X']) {
        Some((w, h)) => Ok((parse(w)?, parse(h)?)),
        None => {
            let side = parse(value)?;
            Ok((side, side))
        }
    }
}

/// CLI arguments accepted by the `serve` subcommand.
#[derive(Clone, Debug, Args)]
pub struct ServeArgs {
    #[command(flatten)]
    pub detector: DetectorArgs,
    /// Interface to bind.
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,
    /// Port to bind.
    #[arg(long, default_value_t = 5000)]
    pub port: u16,
    /// Camera device index to try, in order (repeatable).
    #[arg(long = "camera-index", value_name = "INDEX")]
    pub camera_indices: Vec<i32>,
    /// Requested capture width in pixels.
    #[arg(long, value_name = "PX", default_value_t = 640)]
    pub width: u32,
    /// Requested capture height in pixels.
    #[arg(long, value_name = "PX", default_value_t = 480)]
    pub height: u32,
    /// Requested capture frame rate.
    #[arg(long, default_value_t = 30.0)]
    pub fps: f64,
    /// JPEG quality used by the stream encoder (1-100).
    #[arg(long = "jpeg-quality", value_name = "QUALITY", default_value_t = 95)]
    pub jpeg_quality: u8,
    /// Pause after clearing the active flag before the camera is released.
    #[arg(long = "stop-grace-ms", value_name = "MS", default_value_t = 500)]
    pub stop_grace_ms: u64,
    /// Pause after a failed frame read or detection before the next cycle.
    #[arg(long = "read-retry-ms", value_name = "MS", default_value_t = 100)]
    pub read_retry_ms: u64,
    /// Pacing between chunks of the MJPEG stream.
    #[arg(long = "stream-interval-ms", value_name = "MS", default_value_t = 33)]
    pub stream_interval_ms: u64,
    /// Pacing between placeholder chunks while no frame is published.
    #[arg(long = "placeholder-interval-ms", value_name = "MS", default_value_t = 100)]
    pub placeholder_interval_ms: u64,
    /// Load the face detector on the first start request instead of at startup.
    #[arg(long = "lazy-detector", action = clap::ArgAction::SetTrue)]
    pub lazy_detector: bool,
}

/// Capture-loop and stream tuning consumed by the application state.
#[derive(Clone, Debug, PartialEq)]
pub struct PipelineSettings {
    pub capture: CaptureSettings,
    pub camera_indices: Vec<i32>,
    pub jpeg_quality: u8,
    pub stop_grace: Duration,
    pub read_retry: Duration,
    pub stream_interval: Duration,
    pub placeholder_interval: Duration,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            capture: CaptureSettings::default(),
            camera_indices: DEFAULT_CAMERA_INDICES.to_vec(),
            jpeg_quality: 95,
            stop_grace: Duration::from_millis(500),
            read_retry: Duration::from_millis(100),
            stream_interval: Duration::from_millis(33),
            placeholder_interval: Duration::from_millis(100),
        }
    }
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub lazy_detector: bool,
    pub resolver: CascadeResolver,
    pub detector: DetectorConfig,
    pub pipeline: PipelineSettings,
}

impl TryFrom<ServeArgs> for ServerConfig {
    type Error = anyhow::Error;

    fn try_from(args: ServeArgs) -> Result<Self> {
        if args.width == 0 || args.height == 0 {
            bail!("Capture width and height must be positive integers");
        }
        if !args.fps.is_finite() || args.fps <= 0.0 {
            bail!("--fps must be a positive number");
        }
        if !(1..=100).contains(&args.jpeg_quality) {
            bail!("--jpeg-quality must be an integer between 1 and 100");
        }
        if args.camera_indices.iter().any(|index| *index < 0) {
            bail!("--camera-index values must be non-negative");
        }

        let resolver = args.detector.resolver()?;
        let detector = args.detector.detector_config()?;
        let camera_indices = if args.camera_indices.is_empty() {
            DEFAULT_CAMERA_INDICES.to_vec()
        } else {
            args.camera_indices
        };

        Ok(Self {
            host: args.host,
            port: args.port,
            lazy_detector: args.lazy_detector,
            resolver,
            detector,
            pipeline: PipelineSettings {
                capture: CaptureSettings {
                    width: args.width,
                    height: args.height,
                    fps: args.fps,
                },
                camera_indices,
                jpeg_quality: args.jpeg_quality,
                stop_grace: Duration::from_millis(args.stop_grace_ms),
                read_retry: Duration::from_millis(args.read_retry_ms),
                stream_interval: Duration::from_millis(args.stream_interval_ms),
                placeholder_interval: Duration::from_millis(args.placeholder_interval_ms),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use rstest::rstest;

    use super::*;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        serve: ServeArgs,
    }

    fn parse(args: &[&str]) -> Result<ServerConfig> {
        let cli = TestCli::try_parse_from(std::iter::once("facecount").chain(args.iter().copied()))?;
        ServerConfig::try_from(cli.serve)
    }

    #[test]
    fn defaults_match_the_demo_setup() {
        let config = parse(&[]).unwrap();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 5000);
        assert!(!config.lazy_detector);
        assert_eq!(config.detector, DetectorConfig::default());
        assert_eq!(config.pipeline, PipelineSettings::default());
        assert_eq!(config.resolver.url(), CASCADE_URL);
    }

    #[test]
    fn explicit_flags_override_defaults() {
        let config = parse(&[
            "--port",
            "8080",
            "--camera-index",
            "2",
            "--camera-index",
            "0",
            "--min-size",
            "40x48",
            "--scale-factor",
            "1.3",
            "--stop-grace-ms",
            "0",
            "--lazy-detector",
        ])
        .unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.pipeline.camera_indices, vec![2, 0]);
        assert_eq!(config.detector.min_size(), (40, 48));
        assert_eq!(config.detector.scale_factor(), 1.3);
        assert_eq!(config.pipeline.stop_grace, Duration::ZERO);
        assert!(config.lazy_detector);
    }

    #[rstest]
    #[case("24", (24, 24))]
    #[case("30x20", (30, 20))]
    #[case("16X16", (16, 16))]
    fn parses_min_size(#[case] raw: &str, #[case] expected: (u32, u32)) {
        assert_eq!(parse_min_size(raw).unwrap(), expected);
    }

    #[rstest]
    #[case(&["--scale-factor", "1.0"])]
    #[case(&["--jpeg-quality", "0"])]
    #[case(&["--width", "0"])]
    #[case(&["--fps", "0"])]
    #[case(&["--min-size", "axb"])]
    #[case(&["--min-neighbors", "3000000000"])]
    #[case(&["--min-size", "3000000000x30"])]
    #[case(&["--download-timeout-secs", "0"])]
    fn rejects_invalid_values(#[case] args: &[&str]) {
        assert!(parse(args).is_err());
    }
}
