use std::sync::{Arc, Mutex};

use image::RgbImage;
use ml_core::FaceBox;
use serde::Serialize;

/// A fully annotated frame ready to be served.
#[derive(Clone, Debug)]
pub(crate) struct FramePacket {
    pub(crate) image: RgbImage,
    pub(crate) faces: Vec<FaceBox>,
    pub(crate) timestamp_ms: i64,
    /// Process-wide sequence number, never reused across camera restarts.
    pub(crate) frame_number: u64,
}

/// Single-slot, most-recent-wins frame buffer.
pub(crate) type SharedFrame = Arc<Mutex<Option<Arc<FramePacket>>>>;

#[derive(Debug, Serialize, PartialEq, Eq)]
pub(crate) struct ControlResponse {
    pub(crate) success: bool,
    pub(crate) message: String,
}

impl ControlResponse {
    pub(crate) fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub(crate) fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub(crate) struct FaceCountResponse {
    pub(crate) face_count: usize,
    pub(crate) success: bool,
    pub(crate) message: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub(crate) struct HealthResponse {
    pub(crate) status: &'static str,
    pub(crate) service: &'static str,
    pub(crate) camera: &'static str,
    pub(crate) detector: &'static str,
    pub(crate) camera_initialized: bool,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub(crate) struct CameraStatusResponse {
    pub(crate) camera_active: bool,
    pub(crate) face_detector_ready: bool,
    pub(crate) camera_initialized: bool,
}
