//! Camera device seam and index fallback.

use std::sync::Arc;

use tracing::{debug, info};

use crate::types::{CaptureError, CaptureSettings, Frame};

/// Device indices tried when no explicit list is configured.
pub const DEFAULT_CAMERA_INDICES: [i32; 4] = [0, 1, 2, 3];

/// An open camera connection. At most one should be alive per device index.
pub trait Camera: Send {
    /// Block until the next frame is available.
    fn read_frame(&mut self) -> Result<Frame, CaptureError>;

    /// Release the underlying device. Further reads fail.
    fn release(&mut self);
}

/// Opens camera devices by index, applying the requested capture settings.
pub trait CameraOpener: Send + Sync {
    fn open(&self, index: i32, settings: &CaptureSettings) -> Result<Box<dyn Camera>, CaptureError>;
}

/// Try each index in order and return the first camera that opens.
pub fn open_first(
    opener: &dyn CameraOpener,
    indices: &[i32],
    settings: &CaptureSettings,
) -> Result<(i32, Box<dyn Camera>), CaptureError> {
    for &index in indices {
        match opener.open(index, settings) {
            Ok(camera) => {
                info!(
                    "Camera opened at index {index} ({}x{} @ {} fps requested)",
                    settings.width, settings.height, settings.fps
                );
                return Ok((index, camera));
            }
            Err(CaptureError::BackendUnavailable) => return Err(CaptureError::BackendUnavailable),
            Err(err) => debug!("camera #{index} unavailable: {err}"),
        }
    }

    Err(CaptureError::DeviceUnavailable {
        tried: indices.to_vec(),
    })
}

/// Opener used when no capture backend is compiled in.
#[derive(Default)]
pub struct UnavailableOpener;

impl CameraOpener for UnavailableOpener {
    fn open(&self, _index: i32, _settings: &CaptureSettings) -> Result<Box<dyn Camera>, CaptureError> {
        Err(CaptureError::BackendUnavailable)
    }
}

/// The opener backed by the compiled-in capture backend.
pub fn system_opener() -> Arc<dyn CameraOpener> {
    #[cfg(feature = "opencv")]
    {
        Arc::new(crate::opencv_camera::OpenCvOpener)
    }
    #[cfg(not(feature = "opencv"))]
    {
        Arc::new(UnavailableOpener)
    }
}
