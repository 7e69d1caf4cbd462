//! Traced contours and the polygon moments computed on them.
//!
//! A contour is the closed pixel boundary reported by a border follower. Its
//! points are kept in discovery order; the closing edge from the last point
//! back to the first is implicit.

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// Errors raised by geometric computations on contours.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    #[error("degenerate contour: zero area moment over {points} points")]
    DegenerateContour { points: usize },
}

/// Axis-aligned bounding rectangle in pixel units.
///
/// `width`/`height` count pixels inclusively, so a single point has size 1x1.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct PixelRect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    pub fn aspect_ratio(&self) -> f64 {
        self.width as f64 / self.height as f64
    }
}

/// Zeroth and first order spatial moments of a closed polygon.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Moments {
    pub m00: f64,
    pub m10: f64,
    pub m01: f64,
}

/// Closed sequence of integer boundary points.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contour {
    pub points: Vec<Point2<i32>>,
}

impl Contour {
    pub fn new(points: Vec<Point2<i32>>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Enclosed area (shoelace), always non-negative.
    pub fn area(&self) -> f64 {
        polygon_area(&self.points)
    }

    /// Polygon moments via Green's theorem, normalized to positive orientation.
    pub fn moments(&self) -> Moments {
        let n = self.points.len();
        if n < 3 {
            return Moments::default();
        }

        let mut a00 = 0.0f64;
        let mut a10 = 0.0f64;
        let mut a01 = 0.0f64;
        let mut prev = self.points[n - 1];
        for &p in &self.points {
            let (xp, yp) = (prev.x as f64, prev.y as f64);
            let (xi, yi) = (p.x as f64, p.y as f64);
            let cross = xp * yi - xi * yp;
            a00 += cross;
            a10 += cross * (xp + xi);
            a01 += cross * (yp + yi);
            prev = p;
        }

        let sign = if a00 < 0.0 { -1.0 } else { 1.0 };
        Moments {
            m00: sign * a00 / 2.0,
            m10: sign * a10 / 6.0,
            m01: sign * a01 / 6.0,
        }
    }

    /// Area-weighted centroid, truncated toward zero to whole pixels.
    pub fn centroid(&self) -> Result<Point2<i32>, GeometryError> {
        let m = self.moments();
        if m.m00 == 0.0 {
            return Err(GeometryError::DegenerateContour {
                points: self.points.len(),
            });
        }
        Ok(Point2::new(
            (m.m10 / m.m00) as i32,
            (m.m01 / m.m00) as i32,
        ))
    }

    /// Axis-aligned bounding rectangle; `None` for an empty contour.
    pub fn bounding_rect(&self) -> Option<PixelRect> {
        let first = self.points.first()?;
        let (mut min_x, mut min_y) = (first.x, first.y);
        let (mut max_x, mut max_y) = (first.x, first.y);
        for p in &self.points[1..] {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        Some(PixelRect {
            x: min_x,
            y: min_y,
            width: (max_x - min_x + 1) as u32,
            height: (max_y - min_y + 1) as u32,
        })
    }

    /// First point with the smallest x.
    pub fn leftmost(&self) -> Option<Point2<i32>> {
        let mut it = self.points.iter().copied();
        let first = it.next()?;
        Some(it.fold(first, |best, p| if p.x < best.x { p } else { best }))
    }

    /// First point with the largest y (lowest in the image).
    pub fn bottommost(&self) -> Option<Point2<i32>> {
        let mut it = self.points.iter().copied();
        let first = it.next()?;
        Some(it.fold(first, |best, p| if p.y > best.y { p } else { best }))
    }
}

/// Unsigned shoelace area of a closed polygon.
pub fn polygon_area(points: &[Point2<i32>]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let mut acc = 0i64;
    let mut prev = points[points.len() - 1];
    for &p in points {
        acc += prev.x as i64 * p.y as i64 - p.x as i64 * prev.y as i64;
        prev = p;
    }
    (acc as f64).abs() / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(x0: i32, y0: i32, side: i32) -> Contour {
        Contour::new(vec![
            Point2::new(x0, y0),
            Point2::new(x0 + side, y0),
            Point2::new(x0 + side, y0 + side),
            Point2::new(x0, y0 + side),
        ])
    }

    #[test]
    fn area_is_orientation_independent() {
        let cw = square(10, 20, 100);
        let mut ccw = cw.clone();
        ccw.points.reverse();
        assert_eq!(cw.area(), 10_000.0);
        assert_eq!(ccw.area(), 10_000.0);
        assert_eq!(cw.moments().m00, ccw.moments().m00);
    }

    #[test]
    fn centroid_of_square_is_its_center() {
        let c = square(10, 20, 100).centroid().expect("non-degenerate");
        assert_eq!(c, Point2::new(60, 70));
    }

    #[test]
    fn centroid_truncates_toward_zero() {
        // Triangle with centroid at (10/3, 10/3).
        let tri = Contour::new(vec![
            Point2::new(0, 0),
            Point2::new(10, 0),
            Point2::new(0, 10),
        ]);
        assert_eq!(tri.centroid().expect("triangle"), Point2::new(3, 3));

        let neg = Contour::new(vec![
            Point2::new(0, 0),
            Point2::new(-10, 0),
            Point2::new(0, -10),
        ]);
        assert_eq!(neg.centroid().expect("triangle"), Point2::new(-3, -3));
    }

    #[test]
    fn collinear_contour_is_degenerate() {
        let line = Contour::new(vec![
            Point2::new(0, 0),
            Point2::new(5, 5),
            Point2::new(10, 10),
        ]);
        assert_eq!(
            line.centroid(),
            Err(GeometryError::DegenerateContour { points: 3 })
        );
    }

    #[test]
    fn bounding_rect_counts_pixels_inclusively() {
        let r = square(3, 4, 9).bounding_rect().expect("rect");
        assert_eq!(
            r,
            PixelRect {
                x: 3,
                y: 4,
                width: 10,
                height: 10
            }
        );
        assert!(Contour::default().bounding_rect().is_none());
    }

    #[test]
    fn extreme_points() {
        let c = Contour::new(vec![
            Point2::new(5, 0),
            Point2::new(9, 5),
            Point2::new(5, 9),
            Point2::new(1, 5),
        ]);
        assert_eq!(c.leftmost(), Some(Point2::new(1, 5)));
        assert_eq!(c.bottommost(), Some(Point2::new(5, 9)));
    }
}
