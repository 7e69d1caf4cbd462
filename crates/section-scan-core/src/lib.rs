//! Core types and geometry for cross-section profiling.
//!
//! This crate is purely geometric. It knows nothing about image buffers or
//! edge detection; it works on traced contours, rotated boxes and the
//! calibration scale that turns pixel distances into real units.

mod bbox;
mod calibration;
mod contour;
mod logger;
mod polar;

pub use bbox::{midpoint, order_corners, BisectionAxis, BoundingBox, Segment};
pub use calibration::{CalibrationError, CalibrationUnit, PixelsPerMetric};
pub use contour::{polygon_area, Contour, GeometryError, Moments, PixelRect};
pub use polar::{polar_profile, round_to, to_polar_inverted_y, Circumference, PolarProfile};

#[cfg(feature = "tracing")]
pub use logger::{init_tracing, TracingFormat, DEFAULT_TRACING_FILTER};

pub use logger::{
    format_line, init_with_level, level_from_verbosity, stage_name, WORKSPACE_TARGET,
};
