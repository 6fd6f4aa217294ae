//! Application state shared by every HTTP handler.
//!
//! Start and stop transitions take the async `worker` lock for their whole
//! duration, so at most one capture loop exists and camera open/release never
//! interleave. Readers of the active flag and the frame slot never wait on it.

use std::sync::{
    Arc, Mutex, OnceLock,
    atomic::{AtomicBool, AtomicU64, Ordering},
};

use actix_web::{rt::time::sleep, web, web::Bytes};
use anyhow::{Context, Result};
use ml_core::{DetectorInitError, DetectorLoader, FaceDetector, to_grayscale};
use tracing::{error, info, warn};
use video_ingest::{CameraOpener, open_first};

use crate::vision::{
    annotation::placeholder_frame,
    config::PipelineSettings,
    data::{
        CameraStatusResponse, ControlResponse, FaceCountResponse, FramePacket, HealthResponse,
        SharedFrame,
    },
    encoding::{encode_jpeg, multipart_chunk},
    pipeline::{CaptureContext, CaptureWorker, clear, snapshot},
};

pub(crate) const SERVICE_NAME: &str = "Face Count Detector";
pub(crate) const NOT_ACTIVE_MESSAGE: &str = "Camera not active";

pub(crate) struct AppState {
    settings: PipelineSettings,
    loader: Arc<dyn DetectorLoader>,
    opener: Arc<dyn CameraOpener>,
    detector: OnceLock<Arc<dyn FaceDetector>>,
    active: Arc<AtomicBool>,
    latest: SharedFrame,
    frames: Arc<AtomicU64>,
    camera_initialized: AtomicBool,
    worker: tokio::sync::Mutex<Option<CaptureWorker>>,
    placeholder: Bytes,
}

impl AppState {
    pub(crate) fn new(
        settings: PipelineSettings,
        loader: Arc<dyn DetectorLoader>,
        opener: Arc<dyn CameraOpener>,
    ) -> Result<Self> {
        let placeholder = placeholder_frame(settings.capture.width, settings.capture.height);
        let jpeg = encode_jpeg(&placeholder, settings.jpeg_quality)
            .context("Failed to render the placeholder frame")?;
        Ok(Self {
            settings,
            loader,
            opener,
            detector: OnceLock::new(),
            active: Arc::new(AtomicBool::new(false)),
            latest: Arc::new(Mutex::new(None)),
            frames: Arc::new(AtomicU64::new(0)),
            camera_initialized: AtomicBool::new(false),
            worker: tokio::sync::Mutex::new(None),
            placeholder: multipart_chunk(&jpeg),
        })
    }

    pub(crate) fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Load the detector if it is not loaded yet. Blocks on file I/O and,
    /// when the classifier is missing, on the download.
    pub(crate) fn init_detector_blocking(&self) -> Result<Arc<dyn FaceDetector>, DetectorInitError> {
        if let Some(detector) = self.detector.get() {
            return Ok(detector.clone());
        }
        let loaded = self.loader.load()?;
        info!("Face detector ready");
        Ok(self.detector.get_or_init(|| loaded).clone())
    }

    pub(crate) fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    pub(crate) fn detector_ready(&self) -> bool {
        self.detector.get().is_some()
    }

    pub(crate) fn camera_initialized(&self) -> bool {
        self.camera_initialized.load(Ordering::Acquire)
    }

    pub(crate) fn latest_frame(&self) -> Option<Arc<FramePacket>> {
        snapshot(&self.latest)
    }

    /// Pre-encoded multipart chunk streamed while no frame is published.
    pub(crate) fn placeholder_chunk(&self) -> Bytes {
        self.placeholder.clone()
    }

    pub(crate) async fn start(self: &Arc<Self>) -> ControlResponse {
        let mut worker = self.worker.lock().await;
        if self.is_active() {
            return ControlResponse::ok("Camera is already running");
        }
        // A loop that died on its own leaves its handle behind.
        if let Some(stale) = worker.take() {
            retire(stale).await;
            clear(&self.latest);
        }

        let state = self.clone();
        let detector = match web::block(move || state.init_detector_blocking()).await {
            Ok(Ok(detector)) => detector,
            Ok(Err(err)) => {
                error!("Failed to initialize face detector: {err}");
                return ControlResponse::failed("Failed to initialize face detector");
            }
            Err(err) => {
                error!("Detector initialization task failed: {err}");
                return ControlResponse::failed("Failed to initialize face detector");
            }
        };

        let opener = self.opener.clone();
        let indices = self.settings.camera_indices.clone();
        let capture = self.settings.capture;
        let opened = match web::block(move || open_first(opener.as_ref(), &indices, &capture)).await {
            Ok(Ok(opened)) => opened,
            Ok(Err(err)) => {
                error!("Failed to start camera: {err}");
                return ControlResponse::failed("Failed to start camera");
            }
            Err(err) => {
                error!("Camera open task failed: {err}");
                return ControlResponse::failed("Failed to start camera");
            }
        };
        let (index, camera) = opened;

        self.active.store(true, Ordering::Release);
        let context = CaptureContext {
            detector,
            latest: self.latest.clone(),
            active: self.active.clone(),
            frames: self.frames.clone(),
            read_retry: self.settings.read_retry,
        };
        match CaptureWorker::spawn(camera, index, context) {
            Ok(spawned) => {
                *worker = Some(spawned);
                self.camera_initialized.store(true, Ordering::Release);
                info!("Camera {index} started");
                ControlResponse::ok("Camera started successfully")
            }
            Err(err) => {
                self.active.store(false, Ordering::Release);
                error!("Failed to start camera: {err:#}");
                ControlResponse::failed("Failed to start camera")
            }
        }
    }

    /// Always succeeds. Joins the capture thread after the grace period and
    /// releases the camera it hands back.
    pub(crate) async fn stop(self: &Arc<Self>) -> ControlResponse {
        let mut worker = self.worker.lock().await;
        self.active.store(false, Ordering::Release);

        if let Some(running) = worker.take() {
            if !self.settings.stop_grace.is_zero() {
                sleep(self.settings.stop_grace).await;
            }
            retire(running).await;
        }

        clear(&self.latest);
        ControlResponse::ok("Camera stopped successfully")
    }

    /// Re-run detection on the latest published frame.
    pub(crate) async fn face_count(self: &Arc<Self>) -> FaceCountResponse {
        let not_active = || FaceCountResponse {
            face_count: 0,
            success: false,
            message: NOT_ACTIVE_MESSAGE.to_string(),
        };
        if !self.is_active() {
            return not_active();
        }
        let Some(packet) = self.latest_frame() else {
            return not_active();
        };
        let Some(detector) = self.detector.get().cloned() else {
            return not_active();
        };

        let counted = web::block(move || detector.detect(&to_grayscale(&packet.image))).await;
        match counted {
            Ok(Ok(faces)) => FaceCountResponse {
                face_count: faces.len(),
                success: true,
                message: format!("Found {} faces", faces.len()),
            },
            Ok(Err(err)) => FaceCountResponse {
                face_count: 0,
                success: false,
                message: err.to_string(),
            },
            Err(err) => FaceCountResponse {
                face_count: 0,
                success: false,
                message: err.to_string(),
            },
        }
    }

    pub(crate) fn health(&self) -> HealthResponse {
        HealthResponse {
            status: "healthy",
            service: SERVICE_NAME,
            camera: if self.is_active() { "active" } else { "inactive" },
            detector: if self.detector_ready() {
                "ready"
            } else {
                "not ready"
            },
            camera_initialized: self.camera_initialized(),
        }
    }

    pub(crate) fn status(&self) -> CameraStatusResponse {
        CameraStatusResponse {
            camera_active: self.is_active(),
            face_detector_ready: self.detector_ready(),
            camera_initialized: self.camera_initialized(),
        }
    }
}

/// Join a worker off the async executor and release the camera it hands back.
async fn retire(running: CaptureWorker) {
    let index = running.device_index();
    let released = web::block(move || {
        if let Some(mut camera) = running.join() {
            camera.release();
        }
    })
    .await;
    match released {
        Ok(()) => info!("Camera {index} released"),
        Err(err) => warn!("Failed to release camera {index}: {err}"),
    }
}
