//! In-process fakes for the camera and detector seams.

use std::sync::{
    Arc, Mutex,
    atomic::{AtomicBool, AtomicUsize, Ordering},
};

use image::{GrayImage, Rgb, RgbImage};
use ml_core::{
    DetectionError, DetectorConfig, DetectorInitError, DetectorLoader, FaceBox, FaceDetector,
    ResourceError,
};
use video_ingest::{Camera, CameraOpener, CaptureError, CaptureSettings, Frame};

/// Returns the same boxes for every frame.
pub(crate) struct StaticDetector {
    faces: Vec<FaceBox>,
    config: DetectorConfig,
    pub(crate) calls: AtomicUsize,
}

impl StaticDetector {
    pub(crate) fn new(faces: Vec<FaceBox>) -> Self {
        Self {
            faces,
            config: DetectorConfig::default(),
            calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn two_faces() -> Self {
        Self::new(vec![FaceBox::new(100, 120, 80, 80), FaceBox::new(360, 60, 90, 90)])
    }
}

impl FaceDetector for StaticDetector {
    fn detect(&self, _gray: &GrayImage) -> Result<Vec<FaceBox>, DetectionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.faces.clone())
    }

    fn config(&self) -> &DetectorConfig {
        &self.config
    }
}

pub(crate) struct FailingDetector {
    config: DetectorConfig,
}

impl FailingDetector {
    pub(crate) fn new() -> Self {
        Self {
            config: DetectorConfig::default(),
        }
    }
}

impl FaceDetector for FailingDetector {
    fn detect(&self, _gray: &GrayImage) -> Result<Vec<FaceBox>, DetectionError> {
        Err(DetectionError::Backend("synthetic failure".into()))
    }

    fn config(&self) -> &DetectorConfig {
        &self.config
    }
}

/// Panics on every call, like a backend hitting a bug mid-frame.
pub(crate) struct PanickingDetector {
    config: DetectorConfig,
}

impl PanickingDetector {
    pub(crate) fn new() -> Self {
        Self {
            config: DetectorConfig::default(),
        }
    }
}

impl FaceDetector for PanickingDetector {
    fn detect(&self, _gray: &GrayImage) -> Result<Vec<FaceBox>, DetectionError> {
        panic!("synthetic detector panic");
    }

    fn config(&self) -> &DetectorConfig {
        &self.config
    }
}

pub(crate) enum LoaderOutcome {
    Ready(Arc<dyn FaceDetector>),
    Missing,
}

pub(crate) struct FakeLoader {
    outcome: LoaderOutcome,
    pub(crate) loads: AtomicUsize,
}

impl FakeLoader {
    pub(crate) fn ready(detector: Arc<dyn FaceDetector>) -> Self {
        Self {
            outcome: LoaderOutcome::Ready(detector),
            loads: AtomicUsize::new(0),
        }
    }

    pub(crate) fn missing() -> Self {
        Self {
            outcome: LoaderOutcome::Missing,
            loads: AtomicUsize::new(0),
        }
    }
}

impl DetectorLoader for FakeLoader {
    fn load(&self) -> Result<Arc<dyn FaceDetector>, DetectorInitError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        match &self.outcome {
            LoaderOutcome::Ready(detector) => Ok(detector.clone()),
            LoaderOutcome::Missing => Err(DetectorInitError::ResourceUnavailable(
                ResourceError::EmptyBody {
                    url: "http://127.0.0.1:9/cascade.xml".into(),
                },
            )),
        }
    }
}

/// Shared counters observed by tests after the camera moved into a worker.
#[derive(Clone, Default)]
pub(crate) struct CameraCounters {
    pub(crate) reads: Arc<AtomicUsize>,
    pub(crate) released: Arc<AtomicBool>,
}

pub(crate) fn synthetic_image(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| Rgb([(x % 256) as u8, (y % 256) as u8, 128]))
}

/// How a `ScriptedCamera` fails its scripted reads.
#[derive(Clone, Copy)]
pub(crate) enum Miss {
    Transient,
    Fault,
    Panic,
}

/// Fails the first `misses` reads, then yields synthetic frames.
pub(crate) struct ScriptedCamera {
    counters: CameraCounters,
    misses: usize,
    miss: Miss,
}

impl ScriptedCamera {
    pub(crate) fn new(counters: CameraCounters, misses: usize) -> Self {
        Self::with_miss(counters, misses, Miss::Transient)
    }

    pub(crate) fn with_miss(counters: CameraCounters, misses: usize, miss: Miss) -> Self {
        Self {
            counters,
            misses,
            miss,
        }
    }
}

impl Camera for ScriptedCamera {
    fn read_frame(&mut self) -> Result<Frame, CaptureError> {
        let read = self.counters.reads.fetch_add(1, Ordering::SeqCst);
        if self.counters.released.load(Ordering::SeqCst) {
            return Err(CaptureError::Read("released".into()));
        }
        std::thread::sleep(std::time::Duration::from_millis(2));
        if read < self.misses {
            return match self.miss {
                Miss::Transient => Err(CaptureError::Read("synthetic miss".into())),
                Miss::Fault => Err(CaptureError::BackendUnavailable),
                Miss::Panic => panic!("synthetic camera panic"),
            };
        }
        Ok(Frame::new(synthetic_image(640, 480), read as i64))
    }

    fn release(&mut self) {
        self.counters.released.store(true, Ordering::SeqCst);
    }
}

/// Opens `ScriptedCamera`s for the configured indices only.
pub(crate) struct FakeOpener {
    working: Vec<i32>,
    pub(crate) counters: CameraCounters,
    pub(crate) attempts: Mutex<Vec<i32>>,
    pub(crate) opens: AtomicUsize,
    panics_left: AtomicUsize,
}

impl FakeOpener {
    pub(crate) fn with_working(working: &[i32]) -> Self {
        Self {
            working: working.to_vec(),
            counters: CameraCounters::default(),
            attempts: Mutex::new(Vec::new()),
            opens: AtomicUsize::new(0),
            panics_left: AtomicUsize::new(0),
        }
    }

    pub(crate) fn broken() -> Self {
        Self::with_working(&[])
    }

    /// The first camera handed out panics on its first read.
    pub(crate) fn panicking_once(working: &[i32]) -> Self {
        let opener = Self::with_working(working);
        opener.panics_left.store(1, Ordering::SeqCst);
        opener
    }
}

impl CameraOpener for FakeOpener {
    fn open(&self, index: i32, _settings: &CaptureSettings) -> Result<Box<dyn Camera>, CaptureError> {
        if let Ok(mut attempts) = self.attempts.lock() {
            attempts.push(index);
        }
        if !self.working.contains(&index) {
            return Err(CaptureError::Open {
                index,
                reason: "no such device".into(),
            });
        }
        self.opens.fetch_add(1, Ordering::SeqCst);
        self.counters.released.store(false, Ordering::SeqCst);
        let panics = self
            .panics_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok();
        if panics {
            return Ok(Box::new(ScriptedCamera::with_miss(self.counters.clone(), 1, Miss::Panic)));
        }
        Ok(Box::new(ScriptedCamera::new(self.counters.clone(), 0)))
    }
}
