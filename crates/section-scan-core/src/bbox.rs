//! Rotated bounding boxes and their bisections.

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// Straight segment between two sub-pixel points.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub start: Point2<f64>,
    pub end: Point2<f64>,
}

impl Segment {
    pub fn length(&self) -> f64 {
        (self.end - self.start).norm()
    }

    pub fn midpoint(&self) -> Point2<f64> {
        midpoint(self.start, self.end)
    }
}

/// Which of the two box bisections to use as a reference length.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BisectionAxis {
    /// Left edge midpoint to right edge midpoint.
    Horizontal,
    /// Top edge midpoint to bottom edge midpoint.
    Vertical,
}

/// Minimum-area rotated rectangle with corners in canonical order.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct BoundingBox {
    /// TL, TR, BR, BL in image space.
    pub corners: [Point2<i32>; 4],
}

impl BoundingBox {
    /// Build a box from four corners in any order.
    pub fn from_unordered(corners: [Point2<i32>; 4]) -> Self {
        Self {
            corners: order_corners(corners),
        }
    }

    pub fn tl(&self) -> Point2<i32> {
        self.corners[0]
    }

    pub fn tr(&self) -> Point2<i32> {
        self.corners[1]
    }

    pub fn br(&self) -> Point2<i32> {
        self.corners[2]
    }

    pub fn bl(&self) -> Point2<i32> {
        self.corners[3]
    }

    pub fn horizontal_bisection(&self) -> Segment {
        Segment {
            start: midpoint(to_f64(self.tl()), to_f64(self.bl())),
            end: midpoint(to_f64(self.tr()), to_f64(self.br())),
        }
    }

    pub fn vertical_bisection(&self) -> Segment {
        Segment {
            start: midpoint(to_f64(self.tl()), to_f64(self.tr())),
            end: midpoint(to_f64(self.bl()), to_f64(self.br())),
        }
    }

    pub fn bisection(&self, axis: BisectionAxis) -> Segment {
        match axis {
            BisectionAxis::Horizontal => self.horizontal_bisection(),
            BisectionAxis::Vertical => self.vertical_bisection(),
        }
    }
}

pub fn midpoint(a: Point2<f64>, b: Point2<f64>) -> Point2<f64> {
    Point2::new((a.x + b.x) * 0.5, (a.y + b.y) * 0.5)
}

fn to_f64(p: Point2<i32>) -> Point2<f64> {
    Point2::new(p.x as f64, p.y as f64)
}

fn dist2(a: Point2<i32>, b: Point2<i32>) -> i64 {
    let dx = (a.x - b.x) as i64;
    let dy = (a.y - b.y) as i64;
    dx * dx + dy * dy
}

/// Reorder four rectangle corners into TL, TR, BR, BL.
///
/// The two points with the smallest x form the left side (ties broken by y);
/// of those, the upper one is TL. BR is the right-side point farthest from
/// TL. The result only depends on the set of input points.
pub fn order_corners(corners: [Point2<i32>; 4]) -> [Point2<i32>; 4] {
    let mut by_x = corners;
    by_x.sort_by_key(|p| (p.x, p.y));

    let mut left = [by_x[0], by_x[1]];
    left.sort_by_key(|p| (p.y, p.x));
    let [tl, bl] = left;

    let (a, b) = (by_x[2], by_x[3]);
    let (da, db) = (dist2(tl, a), dist2(tl, b));
    let (br, tr) = if da > db || (da == db && (a.y, a.x) > (b.y, b.x)) {
        (a, b)
    } else {
        (b, a)
    };

    [tl, tr, br, bl]
}
