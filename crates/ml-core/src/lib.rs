//! Face detector wrapper: detection parameters, grayscale preprocessing, the
//! cascade classifier backend, and resolution of the classifier resource.

pub mod cascade;
pub mod detector;
pub mod resource;

pub use cascade::{CascadeLoader, DetectorLoader, load_cascade};
pub use detector::{
    DetectionError, DetectorConfig, DetectorInitError, FaceBox, FaceDetector, equalize,
    face_number, prepare_for_detection, to_grayscale,
};
pub use resource::{CascadeResolver, CascadeSource, ResolvedCascade, ResourceError};
