//! Still-image detection: the capture loop's detect-and-annotate pass applied
//! to a single file on disk.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::Args;
use ml_core::{CascadeLoader, DetectorLoader, FaceBox, FaceDetector};
use tracing::info;
use video_ingest::Frame;

use crate::vision::{config::DetectorArgs, encoding::encode_jpeg, pipeline::process_frame};

pub const DEFAULT_OUTPUT_DIR: &str = "output";

/// CLI arguments accepted by the `detect` subcommand.
#[derive(Clone, Debug, Args)]
pub struct DetectArgs {
    #[command(flatten)]
    pub detector: DetectorArgs,
    /// Image to scan for faces.
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,
    /// Where to write the annotated JPEG (default `output/<stem>_faces.jpg`).
    #[arg(long, short, value_name = "PATH")]
    pub output: Option<PathBuf>,
    /// JPEG quality for the annotated output (1-100).
    #[arg(long = "jpeg-quality", value_name = "QUALITY", default_value_t = 95)]
    pub jpeg_quality: u8,
}

#[derive(Debug)]
pub struct StillReport {
    pub output: PathBuf,
    pub faces: Vec<FaceBox>,
}

pub fn run_detect(args: DetectArgs) -> Result<StillReport> {
    let loader = CascadeLoader::new(args.detector.resolver()?, args.detector.detector_config()?);
    let detector = loader
        .load()
        .context("Failed to initialize face detector")?;
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&args.input));
    detect_still(detector.as_ref(), &args.input, &output, args.jpeg_quality)
}

pub(crate) fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    Path::new(DEFAULT_OUTPUT_DIR).join(format!("{stem}_faces.jpg"))
}

pub(crate) fn detect_still(
    detector: &dyn FaceDetector,
    input: &Path,
    output: &Path,
    quality: u8,
) -> Result<StillReport> {
    let image = image::open(input)
        .with_context(|| format!("Failed to read image {}", input.display()))?
        .to_rgb8();
    let frame = Frame::new(image, chrono::Utc::now().timestamp_millis());
    let packet = process_frame(detector, &frame, 1)
        .with_context(|| format!("Face detection failed for {}", input.display()))?;

    if let Some(parent) = output.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create output directory {}", parent.display()))?;
    }
    let jpeg = encode_jpeg(&packet.image, quality)?;
    fs::write(output, jpeg).with_context(|| format!("Failed to write {}", output.display()))?;

    info!(
        "Found {} faces in {} -> {}",
        packet.faces.len(),
        input.display(),
        output.display()
    );
    Ok(StillReport {
        output: output.to_path_buf(),
        faces: packet.faces,
    })
}
