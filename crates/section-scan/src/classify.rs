//! Circle-likeness heuristics on extracted contours.
//!
//! Detection is kept free of drawing: a contour goes in, an accept/reject
//! verdict (with the centroid on accept) comes out. Overlays are produced
//! separately by [`crate::render`].

use imageproc::geometry::{approximate_polygon_dp, arc_length, convex_hull};
use log::{debug, info};
use serde::{Deserialize, Serialize};

use section_scan_core::{polygon_area, Circumference, Contour, GeometryError, PixelRect};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::extract::{to_ip_points, ExtractedContour};
use crate::params::ShapeParams;

/// Why a contour was not accepted as a circumference.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum RejectReason {
    VertexCount { vertices: usize },
    TooSmall { width: u32, height: u32 },
    LowSolidity { solidity: f64 },
    AspectRatio { ratio: f64 },
}

/// Shape measurements used by the heuristics.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ShapeMetrics {
    pub vertices: usize,
    pub rect: PixelRect,
    pub area: f64,
    pub hull_area: f64,
    pub solidity: f64,
    pub aspect_ratio: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Classification {
    Accepted(Circumference),
    Rejected(RejectReason),
}

/// Vertex count of the closed polygon approximation with tolerance
/// `epsilon_frac * perimeter`.
pub fn approx_vertex_count(contour: &Contour, epsilon_frac: f64) -> usize {
    if contour.len() < 3 {
        return contour.len();
    }
    let pts = to_ip_points(contour);
    let epsilon = epsilon_frac * arc_length(&pts, true);
    if epsilon.is_nan() || epsilon <= 0.0 {
        return contour.len();
    }
    let mut approx = approximate_polygon_dp(&pts, epsilon, true);
    // The closed form repeats the start point at the end.
    while approx.len() > 1 && approx.first() == approx.last() {
        approx.pop();
    }
    approx.len()
}

/// Measure size, solidity and aspect ratio. `vertices` is passed in so the
/// polygon approximation is not recomputed.
pub fn shape_metrics(contour: &Contour, vertices: usize) -> Option<ShapeMetrics> {
    let rect = contour.bounding_rect()?;
    let area = contour.area();
    let hull = convex_hull(to_ip_points(contour).as_slice());
    let hull_pts: Vec<_> = hull
        .iter()
        .map(|p| nalgebra::Point2::new(p.x, p.y))
        .collect();
    let hull_area = polygon_area(&hull_pts);
    let solidity = if hull_area > 0.0 {
        area / hull_area
    } else {
        0.0
    };
    Some(ShapeMetrics {
        vertices,
        rect,
        area,
        hull_area,
        solidity,
        aspect_ratio: rect.aspect_ratio(),
    })
}

/// First failing heuristic among size, solidity and aspect ratio.
pub fn check_metrics(m: &ShapeMetrics, params: &ShapeParams) -> Option<RejectReason> {
    if m.rect.width <= params.min_side_px || m.rect.height <= params.min_side_px {
        return Some(RejectReason::TooSmall {
            width: m.rect.width,
            height: m.rect.height,
        });
    }
    if m.solidity <= params.min_solidity {
        return Some(RejectReason::LowSolidity {
            solidity: m.solidity,
        });
    }
    if m.aspect_ratio < params.min_aspect || m.aspect_ratio > params.max_aspect {
        return Some(RejectReason::AspectRatio {
            ratio: m.aspect_ratio,
        });
    }
    None
}

fn vertex_count_ok(vertices: usize, params: &ShapeParams) -> bool {
    vertices > params.min_vertices_exclusive && vertices < params.max_vertices_exclusive
}

/// Classify one contour. Fails only if an accepted contour has no area moment.
pub fn classify_contour(
    contour: &Contour,
    params: &ShapeParams,
) -> Result<Classification, GeometryError> {
    let vertices = approx_vertex_count(contour, params.approx_epsilon_frac);
    if !vertex_count_ok(vertices, params) {
        return Ok(Classification::Rejected(RejectReason::VertexCount {
            vertices,
        }));
    }

    let Some(metrics) = shape_metrics(contour, vertices) else {
        return Ok(Classification::Rejected(RejectReason::TooSmall {
            width: 0,
            height: 0,
        }));
    };
    if let Some(reason) = check_metrics(&metrics, params) {
        return Ok(Classification::Rejected(reason));
    }

    Ok(Classification::Accepted(Circumference::from_contour(
        contour.clone(),
    )?))
}

/// Run the classifier over extracted contours, keeping accepted ones in order.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "info", skip(extracted, params), fields(contours = extracted.len()))
)]
pub fn find_circumferences(
    extracted: &[ExtractedContour],
    params: &ShapeParams,
) -> Result<Vec<Circumference>, GeometryError> {
    let mut out = Vec::new();
    for (idx, ex) in extracted.iter().enumerate() {
        match classify_contour(&ex.contour, params)? {
            Classification::Accepted(circ) => {
                debug!(
                    "contour {idx}: accepted, centroid ({}, {})",
                    circ.centroid.x, circ.centroid.y
                );
                out.push(circ);
            }
            Classification::Rejected(reason) => {
                debug!("contour {idx}: rejected {reason:?}");
            }
        }
    }
    info!(
        "{} circumference candidates out of {} contours",
        out.len(),
        extracted.len()
    );
    Ok(out)
}
