//! Background capture loop: read a frame, detect faces, annotate, publish.
//!
//! Exactly one loop runs at a time. It polls the shared active flag once per
//! cycle and hands the camera back to its owner when it exits, so the stop
//! path can release the device after joining the thread.

use std::{
    panic::{self, AssertUnwindSafe},
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicU64, Ordering},
    },
    thread,
    time::{Duration, Instant},
};

use anyhow::{Context, Result};
use ml_core::{DetectionError, FaceDetector, prepare_for_detection};
use tracing::{debug, error, info, warn};
use video_ingest::{Camera, Frame};

use crate::vision::{
    annotation::annotate_frame,
    data::{FramePacket, SharedFrame},
    telemetry,
};

/// Everything the capture thread needs besides the camera itself.
pub(crate) struct CaptureContext {
    pub(crate) detector: Arc<dyn FaceDetector>,
    pub(crate) latest: SharedFrame,
    pub(crate) active: Arc<AtomicBool>,
    /// Last frame number handed out. Owned by the app state so numbering
    /// continues across restarts.
    pub(crate) frames: Arc<AtomicU64>,
    pub(crate) read_retry: Duration,
}

/// Handle to the running capture thread.
pub(crate) struct CaptureWorker {
    device_index: i32,
    handle: thread::JoinHandle<Box<dyn Camera>>,
}

impl CaptureWorker {
    pub(crate) fn spawn(
        camera: Box<dyn Camera>,
        device_index: i32,
        context: CaptureContext,
    ) -> Result<Self> {
        let handle = telemetry::spawn_thread("capture-loop", move || {
            capture_loop(camera, device_index, context)
        })
        .context("Failed to spawn capture thread")?;
        Ok(Self {
            device_index,
            handle,
        })
    }

    pub(crate) fn device_index(&self) -> i32 {
        self.device_index
    }

    /// Block until the loop exits and take back the camera. `None` if the
    /// thread panicked, in which case the camera was dropped with it.
    pub(crate) fn join(self) -> Option<Box<dyn Camera>> {
        match self.handle.join() {
            Ok(camera) => Some(camera),
            Err(_) => {
                error!("Capture thread for camera {} panicked", self.device_index);
                None
            }
        }
    }
}

/// Clears the active flag if the capture thread unwinds.
struct ActiveGuard<'a>(&'a AtomicBool);

impl Drop for ActiveGuard<'_> {
    fn drop(&mut self) {
        if thread::panicking() {
            self.0.store(false, Ordering::Release);
        }
    }
}

fn capture_loop(
    mut camera: Box<dyn Camera>,
    device_index: i32,
    context: CaptureContext,
) -> Box<dyn Camera> {
    info!("Capture loop started on camera {device_index}");
    let _guard = ActiveGuard(&context.active);
    let mut captured: u64 = 0;

    while context.active.load(Ordering::Acquire) {
        let frame = match camera.read_frame() {
            Ok(frame) => frame,
            Err(err) if err.is_transient() => {
                warn!("Failed to capture frame: {err}");
                metrics::counter!("facecount_frame_read_failures_total").increment(1);
                thread::sleep(context.read_retry);
                continue;
            }
            Err(err) => {
                error!("Camera {device_index} read error: {err}");
                metrics::counter!("facecount_camera_errors_total").increment(1);
                thread::sleep(context.read_retry);
                continue;
            }
        };
        metrics::counter!("facecount_frames_captured_total").increment(1);
        captured += 1;
        let frame_number = context.frames.fetch_add(1, Ordering::Relaxed) + 1;

        let processed = panic::catch_unwind(AssertUnwindSafe(|| {
            process_frame(context.detector.as_ref(), &frame, frame_number)
        }));
        match processed {
            Ok(Ok(packet)) => {
                debug!(
                    frame = packet.frame_number,
                    faces = packet.faces.len(),
                    captured_at = packet.timestamp_ms,
                    "frame published"
                );
                publish(&context.latest, packet);
            }
            Ok(Err(err)) => {
                error!("Face detection failed: {err}");
                metrics::counter!("facecount_detection_errors_total").increment(1);
                thread::sleep(context.read_retry);
            }
            Err(_) => {
                error!("Processing frame {frame_number} panicked; skipping it");
                metrics::counter!("facecount_detection_errors_total").increment(1);
                thread::sleep(context.read_retry);
            }
        }
    }

    info!("Capture loop stopped after {captured} frames");
    camera
}

/// Run detection on one captured frame and produce the annotated packet.
pub(crate) fn process_frame(
    detector: &dyn FaceDetector,
    frame: &Frame,
    frame_number: u64,
) -> Result<FramePacket, DetectionError> {
    let gray = prepare_for_detection(&frame.image);
    let started = Instant::now();
    let faces = detector.detect(&gray)?;
    metrics::histogram!("facecount_detect_seconds").record(started.elapsed().as_secs_f64());
    metrics::gauge!("facecount_faces_detected").set(faces.len() as f64);
    Ok(annotate_frame(
        &frame.image,
        faces,
        frame.timestamp_ms,
        frame_number,
    ))
}

/// Replace the shared frame. The lock only guards the pointer swap.
pub(crate) fn publish(latest: &SharedFrame, packet: FramePacket) {
    let packet = Arc::new(packet);
    match latest.lock() {
        Ok(mut guard) => *guard = Some(packet),
        Err(poisoned) => *poisoned.into_inner() = Some(packet),
    }
}

/// Clone the current frame pointer out of the shared slot.
pub(crate) fn snapshot(latest: &SharedFrame) -> Option<Arc<FramePacket>> {
    match latest.lock() {
        Ok(guard) => guard.clone(),
        Err(poisoned) => poisoned.into_inner().clone(),
    }
}

pub(crate) fn clear(latest: &SharedFrame) {
    match latest.lock() {
        Ok(mut guard) => *guard = None,
        Err(poisoned) => *poisoned.into_inner() = None,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use ml_core::FaceBox;

    use super::*;
    use crate::vision::{
        annotation::{shows_caption, shows_count, shows_label},
        testing::{
            CameraCounters, FailingDetector, Miss, PanickingDetector, ScriptedCamera, StaticDetector,
            synthetic_image,
        },
    };

    fn wait_for(mut condition: impl FnMut() -> bool) -> bool {
        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            if condition() {
                return true;
            }
            thread::sleep(Duration::from_millis(5));
        }
        false
    }

    fn context(
        detector: Arc<dyn FaceDetector>,
        latest: &SharedFrame,
        active: &Arc<AtomicBool>,
        frames: &Arc<AtomicU64>,
    ) -> CaptureContext {
        CaptureContext {
            detector,
            latest: latest.clone(),
            active: active.clone(),
            frames: frames.clone(),
            read_retry: Duration::from_millis(1),
        }
    }

    #[test]
    fn two_known_faces_produce_two_boxes_and_the_count_caption() {
        let detector = StaticDetector::two_faces();
        let frame = Frame::new(synthetic_image(640, 480), 1_700_000_000_000);

        let packet = process_frame(&detector, &frame, 7).unwrap();

        assert_eq!(packet.faces.len(), 2);
        assert!(shows_count(&packet.image, 2));
        assert!(shows_caption(&packet.image));
        assert!(shows_label(&packet.image, &packet.faces[0], 2));
        assert!(shows_label(&packet.image, &packet.faces[1], 1));
        assert_eq!(packet.frame_number, 7);
        assert_eq!(packet.timestamp_ms, 1_700_000_000_000);
        assert_ne!(packet.image, frame.image);
    }

    #[test]
    fn detection_is_stable_for_the_same_frame() {
        let detector = StaticDetector::new(vec![FaceBox::new(10, 10, 40, 40)]);
        let frame = Frame::new(synthetic_image(160, 120), 0);
        let first = process_frame(&detector, &frame, 1).unwrap();
        let second = process_frame(&detector, &frame, 2).unwrap();
        assert_eq!(first.faces, second.faces);
        assert_eq!(first.image, second.image);
    }

    #[test]
    fn detection_errors_are_returned_not_published() {
        let frame = Frame::new(synthetic_image(64, 48), 0);
        let err = process_frame(&FailingDetector::new(), &frame, 1).unwrap_err();
        assert!(err.to_string().contains("synthetic failure"));
    }

    #[test]
    fn worker_publishes_after_transient_misses_and_returns_the_camera() {
        let counters = CameraCounters::default();
        let latest: SharedFrame = Arc::new(Mutex::new(None));
        let active = Arc::new(AtomicBool::new(true));
        let frames = Arc::new(AtomicU64::new(0));
        let worker = CaptureWorker::spawn(
            Box::new(ScriptedCamera::new(counters.clone(), 3)),
            2,
            context(Arc::new(StaticDetector::two_faces()), &latest, &active, &frames),
        )
        .unwrap();
        assert_eq!(worker.device_index(), 2);

        assert!(wait_for(|| snapshot(&latest).is_some()));
        let packet = snapshot(&latest).unwrap();
        assert!(shows_count(&packet.image, 2));
        assert!(counters.reads.load(Ordering::SeqCst) > 3);

        active.store(false, Ordering::Release);
        let mut camera = worker.join().expect("camera handed back");
        assert!(!counters.released.load(Ordering::SeqCst));
        camera.release();
        assert!(counters.released.load(Ordering::SeqCst));
    }

    #[test]
    fn device_faults_are_retried_like_misses() {
        let counters = CameraCounters::default();
        let latest: SharedFrame = Arc::new(Mutex::new(None));
        let active = Arc::new(AtomicBool::new(true));
        let frames = Arc::new(AtomicU64::new(0));
        let worker = CaptureWorker::spawn(
            Box::new(ScriptedCamera::with_miss(counters.clone(), 4, Miss::Fault)),
            0,
            context(Arc::new(StaticDetector::new(Vec::new())), &latest, &active, &frames),
        )
        .unwrap();

        assert!(wait_for(|| snapshot(&latest).is_some()));
        assert!(counters.reads.load(Ordering::SeqCst) > 4);
        assert!(active.load(Ordering::Acquire));

        active.store(false, Ordering::Release);
        assert!(worker.join().is_some());
    }

    #[test]
    fn worker_survives_detection_failures() {
        let counters = CameraCounters::default();
        let latest: SharedFrame = Arc::new(Mutex::new(None));
        let active = Arc::new(AtomicBool::new(true));
        let frames = Arc::new(AtomicU64::new(0));
        let worker = CaptureWorker::spawn(
            Box::new(ScriptedCamera::new(counters.clone(), 0)),
            0,
            context(Arc::new(FailingDetector::new()), &latest, &active, &frames),
        )
        .unwrap();

        assert!(wait_for(|| counters.reads.load(Ordering::SeqCst) >= 3));
        assert!(snapshot(&latest).is_none());

        active.store(false, Ordering::Release);
        assert!(worker.join().is_some());
    }

    #[test]
    fn worker_survives_a_panicking_detector() {
        let counters = CameraCounters::default();
        let latest: SharedFrame = Arc::new(Mutex::new(None));
        let active = Arc::new(AtomicBool::new(true));
        let frames = Arc::new(AtomicU64::new(0));
        let worker = CaptureWorker::spawn(
            Box::new(ScriptedCamera::new(counters.clone(), 0)),
            1,
            context(Arc::new(PanickingDetector::new()), &latest, &active, &frames),
        )
        .unwrap();

        assert!(wait_for(|| counters.reads.load(Ordering::SeqCst) >= 3));
        assert!(active.load(Ordering::Acquire));
        assert!(snapshot(&latest).is_none());

        active.store(false, Ordering::Release);
        assert!(worker.join().is_some());
    }

    #[test]
    fn camera_panic_clears_the_active_flag() {
        let counters = CameraCounters::default();
        let latest: SharedFrame = Arc::new(Mutex::new(None));
        let active = Arc::new(AtomicBool::new(true));
        let frames = Arc::new(AtomicU64::new(0));
        let worker = CaptureWorker::spawn(
            Box::new(ScriptedCamera::with_miss(counters.clone(), 1, Miss::Panic)),
            0,
            context(Arc::new(StaticDetector::new(Vec::new())), &latest, &active, &frames),
        )
        .unwrap();

        assert!(wait_for(|| !active.load(Ordering::Acquire)));
        assert!(worker.join().is_none());
        assert!(snapshot(&latest).is_none());
    }

    #[test]
    fn frame_numbers_continue_across_workers() {
        let latest: SharedFrame = Arc::new(Mutex::new(None));
        let frames = Arc::new(AtomicU64::new(0));
        let mut seen = Vec::new();

        for _ in 0..2 {
            let active = Arc::new(AtomicBool::new(true));
            let worker = CaptureWorker::spawn(
                Box::new(ScriptedCamera::new(CameraCounters::default(), 0)),
                0,
                context(Arc::new(StaticDetector::new(Vec::new())), &latest, &active, &frames),
            )
            .unwrap();
            assert!(wait_for(|| snapshot(&latest).is_some()));
            active.store(false, Ordering::Release);
            assert!(worker.join().is_some());
            seen.push(snapshot(&latest).unwrap().frame_number);
            clear(&latest);
        }

        assert!(seen[1] > seen[0], "frame numbers went {seen:?}");
        assert_eq!(frames.load(Ordering::SeqCst), seen[1]);
    }

    #[test]
    fn publish_replaces_and_clear_empties_the_slot() {
        let latest: SharedFrame = Arc::new(Mutex::new(None));
        let detector = StaticDetector::new(Vec::new());
        for number in 1..=3 {
            let frame = Frame::new(synthetic_image(32, 32), number);
            publish(&latest, process_frame(&detector, &frame, number as u64).unwrap());
        }
        assert_eq!(snapshot(&latest).unwrap().frame_number, 3);
        clear(&latest);
        assert!(snapshot(&latest).is_none());
    }
}
