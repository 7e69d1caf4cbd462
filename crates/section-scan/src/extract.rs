//! Contour extraction from a binary edge map.

use image::GrayImage;
use imageproc::contours::find_contours;
use imageproc::geometry::min_area_rect;
use imageproc::point::Point;
use log::{debug, info};
use nalgebra::Point2;

use section_scan_core::{BoundingBox, Contour};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::params::ExtractParams;

/// A contour that survived the area filter, with its rotated bounding box.
#[derive(Clone, Debug, PartialEq)]
pub struct ExtractedContour {
    pub contour: Contour,
    pub area: f64,
    pub bbox: BoundingBox,
}

/// Trace every border (outer and hole) in `edges`, drop the ones enclosing
/// less than `min_area`, and box the rest. Output keeps tracer order.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "info", skip(edges, params), fields(width = edges.width(), height = edges.height()))
)]
pub fn extract_contours(edges: &GrayImage, params: &ExtractParams) -> Vec<ExtractedContour> {
    let traced = find_contours::<i32>(edges);
    let total = traced.len();

    let out: Vec<ExtractedContour> = traced
        .into_iter()
        .filter_map(|c| {
            let contour = Contour::new(c.points.iter().map(|p| Point2::new(p.x, p.y)).collect());
            let area = contour.area();
            if area < params.min_area {
                return None;
            }
            let bbox = rotated_box(&c.points);
            debug!(
                "contour kept: {} points, area {:.0}, box {:?}",
                contour.len(),
                area,
                bbox.corners
            );
            Some(ExtractedContour {
                contour,
                area,
                bbox,
            })
        })
        .collect();

    info!(
        "extracted {} of {} traced contours (min area {})",
        out.len(),
        total,
        params.min_area
    );
    out
}

fn rotated_box(points: &[Point<i32>]) -> BoundingBox {
    let rect = min_area_rect(points);
    BoundingBox::from_unordered(rect.map(|p| Point2::new(p.x, p.y)))
}

/// Convert a core contour into `imageproc` points.
pub(crate) fn to_ip_points(contour: &Contour) -> Vec<Point<i32>> {
    contour
        .points
        .iter()
        .map(|p| Point::new(p.x, p.y))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;
    use imageproc::drawing::draw_filled_rect_mut;
    use imageproc::rect::Rect;

    fn blank(w: u32, h: u32) -> GrayImage {
        GrayImage::new(w, h)
    }

    #[test]
    fn empty_edge_map_yields_nothing() {
        assert!(extract_contours(&blank(50, 50), &ExtractParams::default()).is_empty());
    }

    #[test]
    fn small_blobs_are_discarded() {
        let mut img = blank(300, 300);
        // 90x90 = 8100 px^2 < 10_000
        draw_filled_rect_mut(&mut img, Rect::at(20, 20).of_size(90, 90), Luma([255]));
        assert!(extract_contours(&img, &ExtractParams::default()).is_empty());
    }

    #[test]
    fn large_blob_is_kept_with_canonical_box() {
        let mut img = blank(400, 300);
        draw_filled_rect_mut(&mut img, Rect::at(50, 40).of_size(201, 151), Luma([255]));
        // Noise blob that must not survive.
        draw_filled_rect_mut(&mut img, Rect::at(300, 250).of_size(20, 20), Luma([255]));

        let out = extract_contours(&img, &ExtractParams::default());
        assert_eq!(out.len(), 1, "{out:?}");
        let kept = &out[0];
        assert!(kept.area >= 10_000.0);
        assert_eq!(kept.area, kept.contour.area());

        let expected = [
            Point2::new(50, 40),
            Point2::new(250, 40),
            Point2::new(250, 190),
            Point2::new(50, 190),
        ];
        for (got, want) in kept.bbox.corners.iter().zip(expected) {
            assert!(
                (got.x - want.x).abs() <= 1 && (got.y - want.y).abs() <= 1,
                "corner {got:?} expected near {want:?}"
            );
        }
    }

    #[test]
    fn ring_yields_outer_and_hole_borders() {
        let mut img = blank(400, 400);
        draw_filled_rect_mut(&mut img, Rect::at(50, 50).of_size(300, 300), Luma([255]));
        draw_filled_rect_mut(&mut img, Rect::at(100, 100).of_size(200, 200), Luma([0]));

        let out = extract_contours(&img, &ExtractParams::default());
        assert_eq!(out.len(), 2, "expected outer and hole contours");
        let mut counts: Vec<usize> = out.iter().map(|c| c.contour.len()).collect();
        counts.sort_unstable();
        assert!(counts[0] < counts[1]);
    }

    #[test]
    fn min_area_is_configurable() {
        let mut img = blank(300, 300);
        draw_filled_rect_mut(&mut img, Rect::at(20, 20).of_size(90, 90), Luma([255]));
        let params = ExtractParams { min_area: 1_000.0 };
        assert_eq!(extract_contours(&img, &params).len(), 1);
    }
}
