//! Camera capture for the face count demo.
//!
//! Devices are opened by index through a [`CameraOpener`]; the OpenCV
//! `VideoCapture` backend is compiled in with the `opencv` feature.

pub mod camera;
#[cfg(feature = "opencv")]
pub mod opencv_camera;
pub mod types;

pub use camera::{
    Camera, CameraOpener, DEFAULT_CAMERA_INDICES, UnavailableOpener, open_first, system_opener,
};
pub use types::{CaptureError, CaptureSettings, Frame};
