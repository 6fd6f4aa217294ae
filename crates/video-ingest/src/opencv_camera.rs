//! OpenCV-backed camera capture.

use chrono::Utc;
use image::RgbImage;
use opencv::{
    core::{Mat, MatTraitConst, MatTraitConstManual},
    prelude::*,
    videoio::{self, VideoCapture, VideoCaptureTrait, VideoCaptureTraitConst},
};
use tracing::warn;

use crate::{
    camera::{Camera, CameraOpener},
    types::{CaptureError, CaptureSettings, Frame},
};

/// Opens `VideoCapture` devices by index.
pub struct OpenCvOpener;

impl CameraOpener for OpenCvOpener {
    fn open(&self, index: i32, settings: &CaptureSettings) -> Result<Box<dyn Camera>, CaptureError> {
        let mut cap = VideoCapture::new(index, videoio::CAP_ANY).map_err(|err| CaptureError::Open {
            index,
            reason: err.to_string(),
        })?;
        let opened = cap.is_opened().map_err(|err| CaptureError::Open {
            index,
            reason: err.to_string(),
        })?;
        if !opened {
            return Err(CaptureError::Open {
                index,
                reason: "device did not open".into(),
            });
        }

        configure_camera(&mut cap, settings);

        Ok(Box::new(OpenCvCamera {
            cap,
            index,
            scratch: Mat::default(),
            released: false,
        }))
    }
}

pub struct OpenCvCamera {
    cap: VideoCapture,
    index: i32,
    scratch: Mat,
    released: bool,
}

impl Camera for OpenCvCamera {
    fn read_frame(&mut self) -> Result<Frame, CaptureError> {
        if self.released {
            return Err(CaptureError::Read(format!("camera #{} released", self.index)));
        }

        let grabbed = self
            .cap
            .read(&mut self.scratch)
            .map_err(|err| CaptureError::Read(err.to_string()))?;
        if !grabbed || self.scratch.empty() {
            return Err(CaptureError::Read("camera returned no frame".into()));
        }

        let image = mat_to_rgb(&self.scratch)?;
        Ok(Frame::new(image, Utc::now().timestamp_millis()))
    }

    fn release(&mut self) {
        if self.released {
            return;
        }
        if let Err(err) = self.cap.release() {
            warn!("failed to release camera #{}: {err}", self.index);
        }
        self.released = true;
    }
}

impl Drop for OpenCvCamera {
    fn drop(&mut self) {
        self.release();
    }
}

/// Apply resolution, frame rate, and preferred pixel format. Devices may
/// ignore any of these.
fn configure_camera(cap: &mut VideoCapture, settings: &CaptureSettings) {
    if let Ok(mjpg) = videoio::VideoWriter::fourcc('M', 'J', 'P', 'G') {
        let _ = cap.set(videoio::CAP_PROP_FOURCC, mjpg as f64);
    }
    let _ = cap.set(videoio::CAP_PROP_FRAME_WIDTH, settings.width as f64);
    let _ = cap.set(videoio::CAP_PROP_FRAME_HEIGHT, settings.height as f64);
    let _ = cap.set(videoio::CAP_PROP_FPS, settings.fps);
}

fn mat_to_rgb(mat: &Mat) -> Result<RgbImage, CaptureError> {
    if mat.channels() != 3 {
        return Err(CaptureError::Read(format!(
            "expected 3-channel BGR frame, got {} channels",
            mat.channels()
        )));
    }
    let width = mat.cols() as u32;
    let height = mat.rows() as u32;
    let bgr = mat
        .data_bytes()
        .map_err(|err| CaptureError::Read(err.to_string()))?;

    RgbImage::from_raw(width, height, bgr_to_rgb(bgr))
        .ok_or_else(|| CaptureError::Read("frame buffer size mismatch".into()))
}

fn bgr_to_rgb(input: &[u8]) -> Vec<u8> {
    let mut output = Vec::with_capacity(input.len());
    for chunk in input.chunks_exact(3) {
        output.push(chunk[2]);
        output.push(chunk[1]);
        output.push(chunk[0]);
    }
    output
}
