//! Haar cascade face detector backed by OpenCV's `CascadeClassifier`.

use std::{path::Path, sync::Arc};

use tracing::info;

use crate::{
    detector::{DetectorConfig, DetectorInitError, FaceDetector},
    resource::CascadeResolver,
};

/// Produces a ready detector. Loading may touch the filesystem and network,
/// so callers run it off the async executor.
pub trait DetectorLoader: Send + Sync {
    fn load(&self) -> Result<Arc<dyn FaceDetector>, DetectorInitError>;
}

/// Resolve the classifier file, then load it with the given parameters.
#[derive(Clone, Debug)]
pub struct CascadeLoader {
    resolver: CascadeResolver,
    config: DetectorConfig,
}

impl CascadeLoader {
    pub fn new(resolver: CascadeResolver, config: DetectorConfig) -> Self {
        Self { resolver, config }
    }
}

impl DetectorLoader for CascadeLoader {
    fn load(&self) -> Result<Arc<dyn FaceDetector>, DetectorInitError> {
        let resolved = self.resolver.resolve()?;
        let detector = load_cascade(&resolved.path, self.config)?;
        info!(
            "Face cascade classifier loaded from {} ({:?})",
            resolved.path.display(),
            resolved.source
        );
        Ok(detector)
    }
}

#[cfg(feature = "opencv")]
pub fn load_cascade(
    path: &Path,
    config: DetectorConfig,
) -> Result<Arc<dyn FaceDetector>, DetectorInitError> {
    Ok(Arc::new(backend::CascadeDetector::load(path, config)?))
}

#[cfg(not(feature = "opencv"))]
pub fn load_cascade(
    _path: &Path,
    _config: DetectorConfig,
) -> Result<Arc<dyn FaceDetector>, DetectorInitError> {
    Err(DetectorInitError::BackendUnavailable)
}

#[cfg(feature = "opencv")]
mod backend {
    use std::{path::Path, sync::Mutex};

    use image::GrayImage;
    use opencv::{
        core::{self, Mat, MatTraitManual, Rect, Scalar, Size, Vector},
        objdetect::{CascadeClassifier, CascadeClassifierTrait, CascadeClassifierTraitConst},
        prelude::*,
    };

    use crate::detector::{
        DetectionError, DetectorConfig, DetectorInitError, FaceBox, FaceDetector,
    };

    pub(super) struct CascadeDetector {
        // detect_multi_scale needs &mut; the mutex lets the capture loop and
        // the face-count route share one loaded classifier.
        classifier: Mutex<CascadeClassifier>,
        config: DetectorConfig,
    }

    impl CascadeDetector {
        pub(super) fn load(path: &Path, config: DetectorConfig) -> Result<Self, DetectorInitError> {
            let load_err = |reason: String| DetectorInitError::Load {
                path: path.display().to_string(),
                reason,
            };
            let classifier = CascadeClassifier::new(&path.to_string_lossy())
                .map_err(|err| load_err(err.to_string()))?;
            if classifier.empty().map_err(|err| load_err(err.to_string()))? {
                return Err(load_err("classifier is empty".into()));
            }
            Ok(Self {
                classifier: Mutex::new(classifier),
                config,
            })
        }
    }

    impl FaceDetector for CascadeDetector {
        fn detect(&self, gray: &GrayImage) -> Result<Vec<FaceBox>, DetectionError> {
            let mat = gray_to_mat(gray)?;
            let (min_w, min_h) = self.config.min_size();
            let mut faces = Vector::<Rect>::new();

            let mut classifier = self
                .classifier
                .lock()
                .map_err(|_| DetectionError::Backend("classifier lock poisoned".into()))?;
            classifier
                .detect_multi_scale(
                    &mat,
                    &mut faces,
                    self.config.scale_factor(),
                    self.config.min_neighbors() as i32,
                    0,
                    Size::new(min_w as i32, min_h as i32),
                    Size::new(0, 0),
                )
                .map_err(|err| DetectionError::Backend(err.to_string()))?;

            Ok(faces
                .iter()
                .map(|rect| FaceBox::new(rect.x, rect.y, rect.width, rect.height))
                .collect())
        }

        fn config(&self) -> &DetectorConfig {
            &self.config
        }
    }

    fn gray_to_mat(gray: &GrayImage) -> Result<Mat, DetectionError> {
        let (width, height) = gray.dimensions();
        if width == 0 || height == 0 {
            return Err(DetectionError::InvalidFrame("empty frame".into()));
        }
        let mut mat = Mat::new_rows_cols_with_default(
            height as i32,
            width as i32,
            core::CV_8UC1,
            Scalar::all(0.0),
        )
        .map_err(|err| DetectionError::Backend(err.to_string()))?;
        mat.data_bytes_mut()
            .map_err(|err| DetectionError::Backend(err.to_string()))?
            .copy_from_slice(gray.as_raw());
        Ok(mat)
    }
}
