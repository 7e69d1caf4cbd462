use std::path::PathBuf;

use section_scan_core::{CalibrationError, GeometryError};

/// Errors returned by the scanning session.
#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    #[error("failed to load image {path:?}")]
    ImageLoad {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("no image loaded")]
    NoImage,

    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Calibration(#[from] CalibrationError),

    #[error("no active circumferences")]
    NoActiveCircumferences,

    #[error("outer/inner ordering needs at most two active circumferences, got {count}")]
    NotAPair { count: usize },

    #[error("selection index {index} out of range (candidates: {len})")]
    SelectionOutOfRange { index: usize, len: usize },

    #[error("bounding box index {index} out of range (boxes: {len})")]
    BoxOutOfRange { index: usize, len: usize },
}
