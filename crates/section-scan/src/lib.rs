//! Cross-section profiling of roughly circular objects from one photograph.
//!
//! The pipeline finds circle-like contours, lets the caller confirm which of
//! them are real targets, converts pixels to real units with a calibration
//! scale and produces a polar profile per confirmed contour.
//!
//! ## Quickstart
//!
//! ```no_run
//! use section_scan::{ScanParams, Session};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut session = Session::new(ScanParams::default());
//! let found = session.load_image("culm.jpg")?;
//! println!("{found} candidates");
//!
//! if session.original_count() > 0 {
//!     session.set_final(&[0, 1])?;
//! }
//! session.set_pixels_per_metric(42.0)?;
//! for profile in session.profile()? {
//!     println!("average diameter {}", profile.average_diameter);
//! }
//! session.generate_report("culm_report.txt")?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Stages
//! - [`preprocess`]: grayscale, blur, Canny, closing.
//! - [`extract`]: border tracing, area filter, rotated boxes.
//! - [`classify`]: polygon, size, solidity and aspect heuristics.
//! - [`registry`]: candidate snapshot, selection and outer/inner order.
//! - [`profile`]: calibrated polar profiles.
//! - [`render`] and [`report`]: overlays and the text report.

pub mod classify;
pub mod config;
mod error;
pub mod extract;
mod params;
pub mod preprocess;
pub mod profile;
pub mod registry;
pub mod render;
pub mod report;
mod session;

pub use section_scan_core as core;

pub use config::{ConfigError, ReferenceObject, ScanConfig};
pub use error::ScanError;
pub use params::{ExtractParams, PreprocessParams, ScanParams, ShapeParams};
pub use registry::CircumferenceRegistry;
pub use session::Session;

pub use section_scan_core::{
    BisectionAxis, BoundingBox, CalibrationError, Circumference, Contour, GeometryError,
    PixelsPerMetric, PolarProfile,
};
