//! Color image to closed binary edge map.
//!
//! One pass each of: BT.601 grayscale, a `k`-tap separable Gaussian,
//! Sobel + non-maximum suppression + hysteresis, then a dilate/erode
//! closing. The edge detector works on the blurred image as given and does
//! not smooth it again.

use image::{GrayImage, Luma, RgbImage};
use imageproc::distance_transform::Norm;
use imageproc::filter::separable_filter_equal;
use imageproc::gradients::{horizontal_sobel, vertical_sobel};
use imageproc::morphology::{dilate, erode};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::params::PreprocessParams;

const TAN_22_5: f32 = 0.414_213_57;
const TAN_67_5: f32 = 2.414_213_6;

/// Grayscale, blur, edge detection, then one dilation and one erosion.
///
/// Output pixels are 0 or 255 and the size matches the input.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "info", skip(image, params), fields(width = image.width(), height = image.height()))
)]
pub fn edge_map(image: &RgbImage, params: &PreprocessParams) -> GrayImage {
    edge_map_gray(&grayscale_bt601(image), params)
}

/// Same as [`edge_map`] for an image that is already grayscale.
pub fn edge_map_gray(gray: &GrayImage, params: &PreprocessParams) -> GrayImage {
    let blurred = gaussian_blur(gray, params);
    let edges = canny_edges(&blurred, params.canny_low, params.canny_high);
    close_edges(&edges, params.morph_radius)
}

/// Luma with BT.601 weights in 14-bit fixed point (0.299, 0.587, 0.114).
pub fn grayscale_bt601(image: &RgbImage) -> GrayImage {
    GrayImage::from_fn(image.width(), image.height(), |x, y| {
        let [r, g, b] = image.get_pixel(x, y).0;
        let v = (r as u32 * 4899 + g as u32 * 9617 + b as u32 * 1868 + (1 << 13)) >> 14;
        Luma([v.min(255) as u8])
    })
}

/// Normalised Gaussian taps; `size / 2` on each side of the center.
pub fn gaussian_kernel(size: u32, sigma: f32) -> Vec<f32> {
    let radius = (size.max(1) / 2) as i32;
    let denom = 2.0 * sigma * sigma;
    let mut taps: Vec<f32> = (-radius..=radius)
        .map(|i| (-((i * i) as f32) / denom).exp())
        .collect();
    let sum: f32 = taps.iter().sum();
    for t in &mut taps {
        *t /= sum;
    }
    taps
}

/// Single separable blur with `blur_kernel_size` taps per axis.
pub fn gaussian_blur(gray: &GrayImage, params: &PreprocessParams) -> GrayImage {
    let kernel = gaussian_kernel(params.blur_kernel_size, params.blur_sigma());
    separable_filter_equal(gray, &kernel[..])
}

/// Canny on an already smoothed image.
///
/// Gradient magnitude is the L1 norm of the Sobel responses. A pixel is an
/// edge candidate when it is a local maximum across the gradient direction
/// with magnitude above `low`; candidates connected (8-neighborhood) to one
/// above `high` are kept. The one-pixel frame is never marked.
pub fn canny_edges(blurred: &GrayImage, low: f32, high: f32) -> GrayImage {
    let (w, h) = blurred.dimensions();
    if w < 3 || h < 3 {
        return GrayImage::new(w, h);
    }

    let gx = horizontal_sobel(blurred);
    let gy = vertical_sobel(blurred);
    let (wu, hu) = (w as usize, h as usize);
    let mag: Vec<f32> = (0..hu * wu)
        .map(|i| {
            let (x, y) = ((i % wu) as u32, (i / wu) as u32);
            (gx.get_pixel(x, y)[0] as f32).abs() + (gy.get_pixel(x, y)[0] as f32).abs()
        })
        .collect();
    let at = |x: usize, y: usize| mag[y * wu + x];

    let mut peaks = vec![0.0f32; wu * hu];
    for y in 1..hu - 1 {
        for x in 1..wu - 1 {
            let m = at(x, y);
            if m <= low {
                continue;
            }
            let sx = gx.get_pixel(x as u32, y as u32)[0];
            let sy = gy.get_pixel(x as u32, y as u32)[0];
            let (ax, ay) = ((sx as f32).abs(), (sy as f32).abs());
            let is_peak = if ay <= ax * TAN_22_5 {
                m > at(x - 1, y) && m >= at(x + 1, y)
            } else if ay > ax * TAN_67_5 {
                m > at(x, y - 1) && m >= at(x, y + 1)
            } else if (sx > 0) == (sy > 0) {
                m > at(x - 1, y - 1) && m > at(x + 1, y + 1)
            } else {
                m > at(x + 1, y - 1) && m > at(x - 1, y + 1)
            };
            if is_peak {
                peaks[y * wu + x] = m;
            }
        }
    }

    let mut on = vec![false; wu * hu];
    let mut stack = Vec::new();
    for seed in 0..wu * hu {
        if on[seed] || peaks[seed] <= high {
            continue;
        }
        on[seed] = true;
        stack.push(seed);
        while let Some(i) = stack.pop() {
            let (x, y) = (i % wu, i / wu);
            for ny in y.saturating_sub(1)..=(y + 1).min(hu - 1) {
                for nx in x.saturating_sub(1)..=(x + 1).min(wu - 1) {
                    let n = ny * wu + nx;
                    if !on[n] && peaks[n] > low {
                        on[n] = true;
                        stack.push(n);
                    }
                }
            }
        }
    }

    GrayImage::from_fn(w, h, |x, y| {
        Luma([if on[y as usize * wu + x as usize] { 255 } else { 0 }])
    })
}

/// Dilate then erode with a square of Chebyshev radius `radius`.
pub fn close_edges(edges: &GrayImage, radius: u8) -> GrayImage {
    if radius == 0 {
        return edges.clone();
    }
    let closed = dilate(edges, Norm::LInf, radius);
    erode(&closed, Norm::LInf, radius)
}
