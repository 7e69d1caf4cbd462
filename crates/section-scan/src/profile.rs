//! Calibrated polar profiling of the active circumferences.

use log::info;

use section_scan_core::{polar_profile, CalibrationUnit, Circumference, PolarProfile};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::error::ScanError;

/// Profile each circumference independently around its own centroid.
///
/// Every traced point contributes one sample, so angular spacing follows the
/// tracer and is not uniform. The calibration must be set and the list must
/// not be empty.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "info", skip(circumferences, calibration), fields(count = circumferences.len()))
)]
pub fn profile_circumferences(
    circumferences: &[Circumference],
    calibration: &CalibrationUnit,
) -> Result<Vec<PolarProfile>, ScanError> {
    let scale = calibration.scale()?;
    if circumferences.is_empty() {
        return Err(ScanError::NoActiveCircumferences);
    }

    let profiles: Vec<PolarProfile> = circumferences
        .iter()
        .map(|c| polar_profile(c, scale))
        .collect();

    for (i, p) in profiles.iter().enumerate() {
        info!(
            "circumference {i}: {} samples, average diameter {}",
            p.len(),
            p.average_diameter
        );
    }
    Ok(profiles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use nalgebra::Point2;
    use section_scan_core::{CalibrationError, Contour};

    fn diamond(cx: i32, cy: i32, r: i32) -> Circumference {
        Circumference {
            contour: Contour::new(vec![
                Point2::new(cx + r, cy),
                Point2::new(cx, cy - r),
                Point2::new(cx - r, cy),
                Point2::new(cx, cy + r),
            ]),
            centroid: Point2::new(cx, cy),
        }
    }

    #[test]
    fn unset_calibration_is_an_error() {
        let err = profile_circumferences(&[diamond(0, 0, 10)], &CalibrationUnit::new())
            .expect_err("no calibration");
        assert!(matches!(
            err,
            ScanError::Calibration(CalibrationError::NotSet)
        ));
    }

    #[test]
    fn empty_selection_is_an_error() {
        let mut cal = CalibrationUnit::new();
        cal.set_pixels_per_metric(1.0).expect("scale");
        assert!(matches!(
            profile_circumferences(&[], &cal),
            Err(ScanError::NoActiveCircumferences)
        ));
    }

    #[test]
    fn each_circumference_uses_its_own_centroid() {
        let mut cal = CalibrationUnit::new();
        cal.set_pixels_per_metric(4.0).expect("scale");
        let profiles =
            profile_circumferences(&[diamond(100, 100, 80), diamond(300, 50, 40)], &cal)
                .expect("profiles");
        assert_eq!(profiles.len(), 2);
        assert_abs_diff_eq!(profiles[0].average_diameter, 40.0);
        assert_abs_diff_eq!(profiles[1].average_diameter, 20.0);
        assert_eq!(profiles[1].angles_deg, vec![0.0, 90.0, 180.0, -90.0]);
    }
}
