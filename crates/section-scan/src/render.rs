//! Overlays for operator review: candidate previews, bisection views and the
//! region of interest around the selected pair.
//!
//! Nothing here feeds back into the measurements; every function takes the
//! source image by reference and returns a fresh buffer.

use image::{imageops, Rgb, RgbImage};
use imageproc::drawing::draw_filled_circle_mut;
use nalgebra::Point2;

use section_scan_core::{BoundingBox, Circumference, Contour, Segment};

use crate::error::ScanError;

pub const CANDIDATE_COLOR: Rgb<u8> = Rgb([0, 255, 0]);
pub const CORNER_COLOR: Rgb<u8> = Rgb([255, 0, 0]);
pub const MIDPOINT_COLOR: Rgb<u8> = Rgb([0, 0, 255]);
pub const BISECTION_COLOR: Rgb<u8> = Rgb([255, 0, 255]);
/// Outer, inner.
pub const ACTIVE_COLORS: [Rgb<u8>; 2] = [Rgb([255, 0, 0]), Rgb([24, 115, 179])];

pub const LINE_THICKNESS: i32 = 5;
const DOT_RADIUS: i32 = 5;

/// An annotated image together with the pixel length it illustrates.
#[derive(Clone, Debug)]
pub struct AnnotatedLength {
    pub image: RgbImage,
    pub segment: Segment,
    pub length_px: f64,
}

/// Horizontal and vertical bisection views of one bounding box.
#[derive(Clone, Debug)]
pub struct BoxViews {
    pub bbox: BoundingBox,
    pub horizontal: AnnotatedLength,
    pub vertical: AnnotatedLength,
}

/// Stamp a thick segment from `a` to `b`.
pub fn draw_thick_segment_mut(
    img: &mut RgbImage,
    a: Point2<f64>,
    b: Point2<f64>,
    thickness: i32,
    color: Rgb<u8>,
) {
    let radius = (thickness / 2).max(0);
    let d = b - a;
    let steps = d.x.abs().max(d.y.abs()).ceil().max(1.0) as usize;
    for i in 0..=steps {
        let t = i as f64 / steps as f64;
        let p = a + d * t;
        draw_filled_circle_mut(img, (p.x.round() as i32, p.y.round() as i32), radius, color);
    }
}

/// Outline a closed contour.
pub fn draw_contour_mut(img: &mut RgbImage, contour: &Contour, color: Rgb<u8>, thickness: i32) {
    let n = contour.len();
    for (i, p) in contour.points.iter().enumerate() {
        let q = contour.points[(i + 1) % n];
        draw_thick_segment_mut(img, to_f64(*p), to_f64(q), thickness, color);
    }
}

fn to_f64(p: Point2<i32>) -> Point2<f64> {
    Point2::new(p.x as f64, p.y as f64)
}

fn draw_dot(img: &mut RgbImage, p: Point2<f64>, color: Rgb<u8>) {
    draw_filled_circle_mut(
        img,
        (p.x.round() as i32, p.y.round() as i32),
        DOT_RADIUS,
        color,
    );
}

/// All candidates outlined on one shared copy of the source.
pub fn candidates_overlay(source: &RgbImage, circumferences: &[Circumference]) -> RgbImage {
    let mut out = source.clone();
    for c in circumferences {
        draw_contour_mut(&mut out, &c.contour, CANDIDATE_COLOR, LINE_THICKNESS);
    }
    out
}

/// One source copy per candidate with only that candidate outlined.
pub fn isolated_views(source: &RgbImage, circumferences: &[Circumference]) -> Vec<RgbImage> {
    circumferences
        .iter()
        .map(|c| {
            let mut img = source.clone();
            draw_contour_mut(&mut img, &c.contour, CANDIDATE_COLOR, LINE_THICKNESS);
            img
        })
        .collect()
}

/// Box outline, corner dots, then one view per bisection with its midpoints
/// and connecting line.
pub fn box_views(source: &RgbImage, boxes: &[BoundingBox]) -> Vec<BoxViews> {
    boxes
        .iter()
        .map(|bbox| {
            let mut base = source.clone();
            let corners = bbox.corners.map(to_f64);
            for i in 0..4 {
                draw_thick_segment_mut(
                    &mut base,
                    corners[i],
                    corners[(i + 1) % 4],
                    LINE_THICKNESS,
                    CANDIDATE_COLOR,
                );
            }
            for &c in &corners {
                draw_dot(&mut base, c, CORNER_COLOR);
            }

            BoxViews {
                bbox: *bbox,
                horizontal: annotate_bisection(&base, bbox.horizontal_bisection()),
                vertical: annotate_bisection(&base, bbox.vertical_bisection()),
            }
        })
        .collect()
}

fn annotate_bisection(base: &RgbImage, segment: Segment) -> AnnotatedLength {
    let mut image = base.clone();
    draw_dot(&mut image, segment.start, MIDPOINT_COLOR);
    draw_dot(&mut image, segment.end, MIDPOINT_COLOR);
    draw_thick_segment_mut(
        &mut image,
        segment.start,
        segment.end,
        LINE_THICKNESS,
        BISECTION_COLOR,
    );
    AnnotatedLength {
        image,
        segment,
        length_px: segment.length(),
    }
}

/// Outline the active circumferences (outer first) and crop to the outer
/// contour's axis-aligned bounding rectangle.
pub fn roi(source: &RgbImage, active: &[Circumference]) -> Result<RgbImage, ScanError> {
    let outer = active.first().ok_or(ScanError::NoActiveCircumferences)?;
    let rect = outer
        .contour
        .bounding_rect()
        .ok_or(ScanError::NoActiveCircumferences)?;

    let mut canvas = source.clone();
    for (c, color) in active.iter().zip(ACTIVE_COLORS) {
        draw_contour_mut(&mut canvas, &c.contour, color, LINE_THICKNESS);
    }

    let x = rect.x.max(0) as u32;
    let y = rect.y.max(0) as u32;
    Ok(imageops::crop_imm(&canvas, x, y, rect.width, rect.height).to_image())
}
