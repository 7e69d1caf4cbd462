//! Pixel-to-real-world calibration scale.

use serde::{Deserialize, Serialize};

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum CalibrationError {
    #[error("calibration scale not set")]
    NotSet,
    #[error("invalid calibration scale {value} (must be finite and positive)")]
    InvalidScale { value: f64 },
}

/// Pixels per real-world unit. Always finite and strictly positive.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct PixelsPerMetric(f64);

impl PixelsPerMetric {
    pub fn new(value: f64) -> Result<Self, CalibrationError> {
        if value.is_finite() && value > 0.0 {
            Ok(Self(value))
        } else {
            Err(CalibrationError::InvalidScale { value })
        }
    }

    /// Scale from a reference object of known size measured in pixels.
    pub fn from_reference(pixel_length: f64, real_length: f64) -> Result<Self, CalibrationError> {
        Self::new(pixel_length / real_length)
    }

    pub fn get(self) -> f64 {
        self.0
    }

    /// Convert a pixel distance into real-world units.
    pub fn to_real(self, pixels: f64) -> f64 {
        pixels / self.0
    }
}

impl TryFrom<f64> for PixelsPerMetric {
    type Error = CalibrationError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PixelsPerMetric> for f64 {
    fn from(value: PixelsPerMetric) -> Self {
        value.0
    }
}

/// Holder for the session scale. Starts unset; there is no default.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CalibrationUnit {
    scale: Option<PixelsPerMetric>,
}

impl CalibrationUnit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_pixels_per_metric(&mut self, value: f64) -> Result<(), CalibrationError> {
        self.scale = Some(PixelsPerMetric::new(value)?);
        Ok(())
    }

    pub fn set_scale(&mut self, scale: PixelsPerMetric) {
        self.scale = Some(scale);
    }

    pub fn scale(&self) -> Result<PixelsPerMetric, CalibrationError> {
        self.scale.ok_or(CalibrationError::NotSet)
    }

    pub fn pixels_per_metric(&self) -> Result<f64, CalibrationError> {
        self.scale().map(PixelsPerMetric::get)
    }

    pub fn is_set(&self) -> bool {
        self.scale.is_some()
    }

    pub fn clear(&mut self) {
        self.scale = None;
    }
}
