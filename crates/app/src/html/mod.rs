//! Embedded static HTML assets served by the web UI.
//!
//! The assets are kept as `&'static str` so they can be bundled directly inside
//! the binary without filesystem lookups.

mod detection;
mod pages;

pub use detection::{DETECTION_HTML, SCRIPT_JS};
pub use pages::{ABOUT_HTML, CONTACT_HTML, HOME_HTML};
