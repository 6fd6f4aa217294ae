use image::RgbImage;
use thiserror::Error;

/// Raw RGB frame captured from a camera device.
#[derive(Clone)]
pub struct Frame {
    pub image: RgbImage,
    pub timestamp_ms: i64,
}

impl Frame {
    pub fn new(image: RgbImage, timestamp_ms: i64) -> Self {
        Self {
            image,
            timestamp_ms,
        }
    }
}

/// Target capture properties requested from the device on open.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CaptureSettings {
    pub width: u32,
    pub height: u32,
    pub fps: f64,
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            fps: 30.0,
        }
    }
}

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("no camera device could be opened (tried indices {tried:?})")]
    DeviceUnavailable { tried: Vec<i32> },
    #[error("failed to open camera #{index}: {reason}")]
    Open { index: i32, reason: String },
    /// A single missed frame. Callers retry after a short pause.
    #[error("frame read failed: {0}")]
    Read(String),
    #[error("camera backend unavailable: built without the `opencv` feature")]
    BackendUnavailable,
}

impl CaptureError {
    /// Whether the capture loop should treat this as a missed frame rather
    /// than a device fault.
    pub fn is_transient(&self) -> bool {
        matches!(self, CaptureError::Read(_))
    }
}
