use serde::{Deserialize, Serialize};

/// Edge-map preprocessing settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessParams {
    /// Odd Gaussian kernel size; sigma is derived from it.
    pub blur_kernel_size: u32,
    /// Canny hysteresis low threshold.
    pub canny_low: f32,
    /// Canny hysteresis high threshold.
    pub canny_high: f32,
    /// Chebyshev radius of the closing dilation/erosion (1 = 3x3 square).
    pub morph_radius: u8,
}

impl Default for PreprocessParams {
    fn default() -> Self {
        Self {
            blur_kernel_size: 5,
            canny_low: 0.0,
            canny_high: 60.0,
            morph_radius: 1,
        }
    }
}

impl PreprocessParams {
    /// Gaussian sigma implied by the kernel size when no sigma is given.
    pub fn blur_sigma(&self) -> f32 {
        let k = self.blur_kernel_size.max(1) as f32;
        0.3 * ((k - 1.0) * 0.5 - 1.0) + 0.8
    }
}

/// Contour extraction settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractParams {
    /// Contours enclosing less area (px^2) are treated as noise.
    pub min_area: f64,
}

impl Default for ExtractParams {
    fn default() -> Self {
        Self { min_area: 10_000.0 }
    }
}

/// Shape heuristics that decide whether a contour looks like a circle.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShapeParams {
    /// Polygon approximation tolerance as a fraction of the perimeter.
    pub approx_epsilon_frac: f64,
    /// Vertex count must be strictly greater than this.
    pub min_vertices_exclusive: usize,
    /// Vertex count must be strictly less than this.
    pub max_vertices_exclusive: usize,
    /// Both bounding-rect sides must be strictly larger (px).
    pub min_side_px: u32,
    /// Contour area over convex hull area must be strictly larger.
    pub min_solidity: f64,
    /// Inclusive lower bound on width / height.
    pub min_aspect: f64,
    /// Inclusive upper bound on width / height.
    pub max_aspect: f64,
}

impl Default for ShapeParams {
    fn default() -> Self {
        Self {
            approx_epsilon_frac: 0.01,
            min_vertices_exclusive: 10,
            max_vertices_exclusive: 20,
            min_side_px: 25,
            min_solidity: 0.9,
            min_aspect: 0.8,
            max_aspect: 1.2,
        }
    }
}

/// All pipeline parameters.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanParams {
    pub preprocess: PreprocessParams,
    pub extract: ExtractParams,
    pub shape: ShapeParams,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_kernel_gives_classic_sigma() {
        let sigma = PreprocessParams::default().blur_sigma();
        assert!((sigma - 1.1).abs() < 1e-6, "sigma {sigma}");
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let params: ScanParams =
            serde_json::from_str(r#"{ "shape": { "min_solidity": 0.8 } }"#).expect("json");
        assert_eq!(params.shape.min_solidity, 0.8);
        assert_eq!(params.shape.max_vertices_exclusive, 20);
        assert_eq!(params.extract, ExtractParams::default());
        assert_eq!(params.preprocess, PreprocessParams::default());
    }
}
