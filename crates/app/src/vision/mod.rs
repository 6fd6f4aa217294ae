//! Webcam face counting: capture, detect, annotate, and serve over HTTP.
//!
//! The module is split into focused submodules:
//! - `config`: CLI configuration parsing.
//! - `pipeline`: The background capture → detect → annotate loop.
//! - `state`: Application state behind the start/stop/face-count handlers.
//! - `server`: Actix Web routes and the MJPEG stream.
//! - `still`: Single-image detection for the `detect` subcommand.
//! - `encoding`: JPEG encoding and multipart framing.
//! - `annotation`: Box, label and caption drawing.
//! - `telemetry`: Tracing and Prometheus setup.
//! - `data`: Shared structs passed between stages and handlers.

pub use config::{DetectorArgs, ServeArgs, ServerConfig};
pub use server::serve;
pub use still::{DetectArgs, run_detect};
pub(crate) use telemetry::init_tracing;

mod annotation;
mod config;
mod data;
mod encoding;
mod pipeline;
mod server;
mod state;
mod still;
mod telemetry;

#[cfg(test)]
mod testing;
