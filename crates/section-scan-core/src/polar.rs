//! Polar profiles of circumferences around their centroids.

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::{Contour, GeometryError, PixelsPerMetric};

/// A candidate cross-section: traced contour plus its integer centroid.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Circumference {
    pub contour: Contour,
    pub centroid: Point2<i32>,
}

impl Circumference {
    /// Pair a contour with its moment centroid.
    pub fn from_contour(contour: Contour) -> Result<Self, GeometryError> {
        let centroid = contour.centroid()?;
        Ok(Self { contour, centroid })
    }

    /// Point count of the traced contour, used as a cheap size proxy.
    pub fn point_count(&self) -> usize {
        self.contour.len()
    }
}

/// Calibrated polar samples of one circumference.
///
/// `radii[i]` and `angles_deg[i]` belong to the i-th contour point.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PolarProfile {
    /// Radii in real units, rounded to 2 decimals.
    pub radii: Vec<f64>,
    /// Angles in degrees in (-180, 180], counter-clockwise on screen.
    pub angles_deg: Vec<f64>,
    /// Mean of the unrounded per-point diameters, rounded to 2 decimals.
    pub average_diameter: f64,
}

impl PolarProfile {
    pub fn len(&self) -> usize {
        self.radii.len()
    }

    pub fn is_empty(&self) -> bool {
        self.radii.is_empty()
    }

    pub fn samples(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.radii.iter().copied().zip(self.angles_deg.iter().copied())
    }
}

/// Polar coordinates `(r, theta)` of `p` around `center` with the vertical
/// axis flipped, so theta follows the usual mathematical orientation even
/// though image rows grow downwards.
#[inline]
pub fn to_polar_inverted_y(p: Point2<i32>, center: Point2<i32>) -> (f64, f64) {
    let dx = (p.x - center.x) as f64;
    let dy = (center.y - p.y) as f64;
    (dx.hypot(dy), dy.atan2(dx))
}

/// Round half away from zero to `decimals` places.
#[inline]
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let f = 10f64.powi(decimals);
    (value * f).round() / f
}

/// Profile every contour point of `circ` around its own centroid.
pub fn polar_profile(circ: &Circumference, scale: PixelsPerMetric) -> PolarProfile {
    let n = circ.contour.len();
    let mut radii = Vec::with_capacity(n);
    let mut angles_deg = Vec::with_capacity(n);
    let mut diameter_sum = 0.0f64;

    for &p in &circ.contour.points {
        let (r_px, theta) = to_polar_inverted_y(p, circ.centroid);
        let r = scale.to_real(r_px);
        diameter_sum += 2.0 * r;
        radii.push(round_to(r, 2));
        angles_deg.push(round_to(theta.to_degrees(), 2));
    }

    let average_diameter = if n == 0 {
        0.0
    } else {
        round_to(diameter_sum / n as f64, 2)
    };

    PolarProfile {
        radii,
        angles_deg,
        average_diameter,
    }
}
