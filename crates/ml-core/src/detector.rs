use image::{GrayImage, RgbImage, imageops};
use thiserror::Error;

use crate::resource::ResourceError;

/// Axis-aligned face bounding box in frame pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FaceBox {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl FaceBox {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }
}

/// Multi-scale scan parameters handed to the classifier on every call.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DetectorConfig {
    scale_factor: f64,
    min_neighbors: u32,
    min_size: (u32, u32),
}

impl DetectorConfig {
    pub const DEFAULT_SCALE_FACTOR: f64 = 1.1;
    pub const DEFAULT_MIN_NEIGHBORS: u32 = 5;
    pub const DEFAULT_MIN_SIZE: (u32, u32) = (30, 30);

    pub fn new(
        scale_factor: f64,
        min_neighbors: u32,
        min_size: (u32, u32),
    ) -> Result<Self, DetectorInitError> {
        if !scale_factor.is_finite() || scale_factor <= 1.0 {
            return Err(DetectorInitError::InvalidConfig(format!(
                "scale factor must be greater than 1.0 (got {scale_factor})"
            )));
        }
        // The classifier takes these as C ints.
        if i32::try_from(min_neighbors).is_err() {
            return Err(DetectorInitError::InvalidConfig(format!(
                "min neighbors must be at most {} (got {min_neighbors})",
                i32::MAX
            )));
        }
        if i32::try_from(min_size.0).is_err() || i32::try_from(min_size.1).is_err() {
            return Err(DetectorInitError::InvalidConfig(format!(
                "min size must be at most {}x{} (got {}x{})",
                i32::MAX,
                i32::MAX,
                min_size.0,
                min_size.1
            )));
        }
        Ok(Self {
            scale_factor,
            min_neighbors,
            min_size,
        })
    }

    pub fn scale_factor(&self) -> f64 {
        self.scale_factor
    }

    pub fn min_neighbors(&self) -> u32 {
        self.min_neighbors
    }

    pub fn min_size(&self) -> (u32, u32) {
        self.min_size
    }
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            scale_factor: Self::DEFAULT_SCALE_FACTOR,
            min_neighbors: Self::DEFAULT_MIN_NEIGHBORS,
            min_size: Self::DEFAULT_MIN_SIZE,
        }
    }
}

#[derive(Debug, Error)]
pub enum DetectorInitError {
    #[error("classifier resource unavailable: {0}")]
    ResourceUnavailable(#[from] ResourceError),
    #[error("could not load cascade classifier from {path}: {reason}")]
    Load { path: String, reason: String },
    #[error("invalid detector configuration: {0}")]
    InvalidConfig(String),
    #[error("cascade backend unavailable: built without the `opencv` feature")]
    BackendUnavailable,
}

#[derive(Debug, Error)]
pub enum DetectionError {
    #[error("invalid frame: {0}")]
    InvalidFrame(String),
    #[error("classifier failed: {0}")]
    Backend(String),
}

/// A loaded face detector. Detection is stateless: the same grayscale input
/// always yields the same boxes for a fixed configuration.
pub trait FaceDetector: Send + Sync {
    fn detect(&self, gray: &GrayImage) -> Result<Vec<FaceBox>, DetectionError>;

    fn config(&self) -> &DetectorConfig;
}

pub fn to_grayscale(image: &RgbImage) -> GrayImage {
    imageops::grayscale(image)
}

/// Histogram equalization to normalise contrast before the cascade scan.
pub fn equalize(gray: &GrayImage) -> GrayImage {
    imageproc::contrast::equalize_histogram(gray)
}

pub fn prepare_for_detection(image: &RgbImage) -> GrayImage {
    equalize(&to_grayscale(image))
}

/// Display number for `faces[index]`: one more than the number of faces whose
/// top edge lies strictly above it. Faces sharing a top edge share a number.
pub fn face_number(faces: &[FaceBox], index: usize) -> usize {
    let top = faces[index].y;
    faces.iter().filter(|other| other.y < top).count() + 1
}
