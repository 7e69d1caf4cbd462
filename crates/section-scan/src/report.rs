//! Plain-text measurement report.
//!
//! Layout:
//!
//! ```text
//! Image processed: <image id>
//!
//! <timestamp>
//! *Outer Circumference*
//! Polar coordinates:
//!  (r, theta)  (r, theta) ...
//! Centroid: (x, y)
//! Average Diameter: d
//!
//! *Inner Circumference*
//! ...
//! ```
//!
//! Centroids are expressed relative to an origin at the outer contour's
//! leftmost x and bottommost y, in real units.

use std::fmt::Write as _;
use std::path::Path;

use log::{error, info};
use nalgebra::Point2;

use section_scan_core::{round_to, Circumference, PixelsPerMetric, PolarProfile};

use crate::error::ScanError;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Tag for the i-th circumference in outer-first order.
pub fn circumference_tag(index: usize) -> String {
    match index {
        0 => "Outer Circumference".to_string(),
        1 => "Inner Circumference".to_string(),
        n => format!("Inner Circumference {n}"),
    }
}

/// Local time formatted for the report header.
pub fn timestamp_now() -> String {
    chrono::Local::now().format(TIMESTAMP_FORMAT).to_string()
}

/// Bottom-left reference point of the outer contour.
pub fn report_origin(outer: &Circumference) -> Option<Point2<i32>> {
    let left = outer.contour.leftmost()?;
    let bottom = outer.contour.bottommost()?;
    Some(Point2::new(left.x, bottom.y))
}

/// Centroid relative to `origin`, scaled to real units and rounded.
pub fn centroid_from_origin(
    centroid: Point2<i32>,
    origin: Point2<i32>,
    scale: PixelsPerMetric,
) -> (f64, f64) {
    let dx = (centroid.x - origin.x).abs() as f64;
    let dy = (centroid.y - origin.y).abs() as f64;
    (
        round_to(scale.to_real(dx), 2),
        round_to(scale.to_real(dy), 2),
    )
}

/// Format a number the way the report always has: shortest round-trip
/// representation, with `.0` kept on integral values.
pub fn fmt_number(v: f64) -> String {
    format!("{v:?}")
}

/// Render the full report text. `active` and `profiles` must be aligned and
/// in outer-first order.
pub fn format_report(
    image_id: &str,
    timestamp: &str,
    active: &[Circumference],
    profiles: &[PolarProfile],
    scale: PixelsPerMetric,
) -> Result<String, ScanError> {
    let outer = active.first().ok_or(ScanError::NoActiveCircumferences)?;
    let origin = report_origin(outer).ok_or(ScanError::NoActiveCircumferences)?;

    let mut out = String::new();
    let _ = writeln!(out, "Image processed: {image_id}");
    out.push('\n');
    out.push_str(timestamp);
    out.push('\n');

    for (i, (circ, profile)) in active.iter().zip(profiles).enumerate() {
        let _ = writeln!(out, "*{}*", circumference_tag(i));
        out.push_str("Polar coordinates:\n");
        for (r, theta) in profile.samples() {
            let _ = write!(out, " ({}, {}) ", fmt_number(r), fmt_number(theta));
        }
        out.push('\n');

        let (cx, cy) = centroid_from_origin(circ.centroid, origin, scale);
        let _ = writeln!(out, "Centroid: ({}, {})", fmt_number(cx), fmt_number(cy));
        let _ = writeln!(
            out,
            "Average Diameter: {}",
            fmt_number(profile.average_diameter)
        );
        out.push('\n');
    }
    Ok(out)
}

/// Write `contents` to `path`. I/O failures are logged and reported as
/// `false`.
pub fn write_report(path: &Path, contents: &str) -> bool {
    match std::fs::write(path, contents) {
        Ok(()) => {
            info!("report written to {}", path.display());
            true
        }
        Err(e) => {
            error!("failed to write report {}: {e}", path.display());
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use section_scan_core::{polar_profile, Contour};

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
    fn numbers_keep_trailing_zero() {
        assert_eq!(fmt_number(40.0), "40.0");
        assert_eq!(fmt_number(12.34), "12.34");
        assert_eq!(fmt_number(-90.0), "-90.0");
    }

    #[test]
    fn tags_for_outer_then_inner() {
        assert_eq!(circumference_tag(0), "Outer Circumference");
        assert_eq!(circumference_tag(1), "Inner Circumference");
    }

    #[test]
    fn centroid_is_measured_from_outer_bottom_left() {
        let outer = diamond(100, 100, 50);
        let origin = report_origin(&outer).expect("origin");
        assert_eq!(origin, Point2::new(50, 150));
        let scale = PixelsPerMetric::new(10.0).expect("scale");
        assert_eq!(centroid_from_origin(outer.centroid, origin, scale), (5.0, 5.0));
    }

    #[test]
    fn report_layout() {
        let scale = PixelsPerMetric::new(10.0).expect("scale");
        let active = vec![diamond(100, 100, 50), diamond(110, 100, 20)];
        let profiles: Vec<_> = active.iter().map(|c| polar_profile(c, scale)).collect();
        let text = format_report("slice.png", "2024-01-02 03:04:05", &active, &profiles, scale)
            .expect("report");

        let expected = "Image processed: slice.png\n\
                        \n\
                        2024-01-02 03:04:05\n\
                        *Outer Circumference*\n\
                        Polar coordinates:\n \
                        (5.0, 0.0)  (5.0, 90.0)  (5.0, 180.0)  (5.0, -90.0) \n\
                        Centroid: (5.0, 5.0)\n\
                        Average Diameter: 10.0\n\
                        \n\
                        *Inner Circumference*\n\
                        Polar coordinates:\n \
                        (2.0, 0.0)  (2.0, 90.0)  (2.0, 180.0)  (2.0, -90.0) \n\
                        Centroid: (6.0, 5.0)\n\
                        Average Diameter: 4.0\n\
                        \n";
        assert_eq!(text, expected);
    }

    #[test]
    fn write_failure_is_reported_not_raised() {
        let dir = tempfile::tempdir().expect("tempdir");
        let missing = dir.path().join("no-such-dir").join("report.txt");
        assert!(!write_report(&missing, "x"));

        let ok = dir.path().join("report.txt");
        assert!(write_report(&ok, "hello"));
        assert_eq!(std::fs::read_to_string(ok).expect("read"), "hello");
    }
}
