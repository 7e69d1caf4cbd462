//! Caller-owned measurement session.
//!
//! A [`Session`] holds everything derived from one photograph: the source
//! image, the boxed contours, the candidate registry, the calibration and
//! the last computed profiles. It has no interior synchronization; share it
//! across threads behind a `Mutex` if needed.

use std::path::{Path, PathBuf};

use image::RgbImage;
use log::{info, warn};

use section_scan_core::{
    BisectionAxis, BoundingBox, CalibrationUnit, Circumference, PixelsPerMetric, PolarProfile,
};

use crate::classify::find_circumferences;
use crate::error::ScanError;
use crate::extract::extract_contours;
use crate::params::ScanParams;
use crate::preprocess::edge_map;
use crate::profile::profile_circumferences;
use crate::registry::CircumferenceRegistry;
use crate::render::{self, BoxViews};
use crate::report;

/// Boxes and accepted candidates of one image.
struct Detection {
    boxes: Vec<BoundingBox>,
    candidates: Vec<Circumference>,
}

fn detect(image: &RgbImage, params: &ScanParams) -> Result<Detection, ScanError> {
    let edges = edge_map(image, &params.preprocess);
    let extracted = extract_contours(&edges, &params.extract);
    let candidates = find_circumferences(&extracted, &params.shape)?;
    Ok(Detection {
        boxes: extracted.iter().map(|e| e.bbox).collect(),
        candidates,
    })
}

#[derive(Clone, Debug, Default)]
pub struct Session {
    params: ScanParams,
    image_path: Option<PathBuf>,
    source: Option<RgbImage>,
    boxes: Vec<BoundingBox>,
    registry: CircumferenceRegistry,
    calibration: CalibrationUnit,
    profiles: Vec<PolarProfile>,
}

impl Session {
    pub fn new(params: ScanParams) -> Self {
        Self {
            params,
            ..Self::default()
        }
    }

    pub fn params(&self) -> &ScanParams {
        &self.params
    }

    /// Decode `path` and run detection on it.
    ///
    /// On failure the session keeps its previous state and the caller gets
    /// [`ScanError::ImageLoad`]. On success returns the candidate count.
    pub fn load_image(&mut self, path: impl AsRef<Path>) -> Result<usize, ScanError> {
        let path = path.as_ref();
        let decoded = image::open(path).map_err(|source| {
            warn!("could not load {}: {source}", path.display());
            ScanError::ImageLoad {
                path: path.to_path_buf(),
                source,
            }
        })?;
        self.process_image(decoded.to_rgb8(), Some(path.to_path_buf()))
    }

    /// Run detection on an in-memory image, replacing all per-image state.
    /// Parameters and calibration carry over. If detection fails the
    /// previous image and its results are kept.
    pub fn process_image(
        &mut self,
        image: RgbImage,
        path: Option<PathBuf>,
    ) -> Result<usize, ScanError> {
        let detection = detect(&image, &self.params);
        self.install(image, path, detection)
    }

    fn install(
        &mut self,
        image: RgbImage,
        path: Option<PathBuf>,
        detection: Result<Detection, ScanError>,
    ) -> Result<usize, ScanError> {
        let Detection { boxes, candidates } = detection?;

        self.clear_image_state();
        self.boxes = boxes;
        self.registry.load_candidates(candidates);
        self.registry.capture_snapshot();
        self.image_path = path;
        self.source = Some(image);

        let count = self.registry.candidates().len();
        info!(
            "{} candidates, {} boxes, snapshot: {}",
            count,
            self.boxes.len(),
            self.registry.has_snapshot()
        );
        Ok(count)
    }

    pub fn image_path(&self) -> Option<&Path> {
        self.image_path.as_deref()
    }

    pub fn source_image(&self) -> Option<&RgbImage> {
        self.source.as_ref()
    }

    fn source(&self) -> Result<&RgbImage, ScanError> {
        self.source.as_ref().ok_or(ScanError::NoImage)
    }

    pub fn boxes(&self) -> &[BoundingBox] {
        &self.boxes
    }

    pub fn registry(&self) -> &CircumferenceRegistry {
        &self.registry
    }

    pub fn candidate_count(&self) -> usize {
        self.registry.candidates().len()
    }

    pub fn original_count(&self) -> usize {
        self.registry.original().len()
    }

    pub fn active(&self) -> &[Circumference] {
        self.registry.active()
    }

    pub fn capture_snapshot(&mut self) -> bool {
        self.registry.capture_snapshot()
    }

    /// Select the final circumferences by snapshot index.
    pub fn set_final(&mut self, indices: &[usize]) -> Result<(), ScanError> {
        self.registry.set_final(indices)?;
        self.profiles.clear();
        Ok(())
    }

    pub fn order_outer_first(&mut self) -> Result<bool, ScanError> {
        let swapped = self.registry.order_outer_first()?;
        if swapped {
            self.profiles.clear();
        }
        Ok(swapped)
    }

    pub fn set_pixels_per_metric(&mut self, value: f64) -> Result<(), ScanError> {
        self.calibration.set_pixels_per_metric(value)?;
        self.profiles.clear();
        Ok(())
    }

    pub fn pixels_per_metric(&self) -> Result<f64, ScanError> {
        Ok(self.calibration.pixels_per_metric()?)
    }

    pub fn calibration(&self) -> &CalibrationUnit {
        &self.calibration
    }

    /// Calibrate from a reference box of known real size along `axis`.
    pub fn calibrate_from_box(
        &mut self,
        index: usize,
        axis: BisectionAxis,
        real_length: f64,
    ) -> Result<PixelsPerMetric, ScanError> {
        let bbox = self.boxes.get(index).ok_or(ScanError::BoxOutOfRange {
            index,
            len: self.boxes.len(),
        })?;
        let pixel_length = bbox.bisection(axis).length();
        let scale = PixelsPerMetric::from_reference(pixel_length, real_length)?;
        info!(
            "box {index} {axis:?} bisection {pixel_length:.2} px = {real_length} units -> {} px/unit",
            scale.get()
        );
        self.calibration.set_scale(scale);
        self.profiles.clear();
        Ok(scale)
    }

    /// Shared overlay of every candidate for the confirmation screen.
    pub fn candidates_preview(&self) -> Result<RgbImage, ScanError> {
        Ok(render::candidates_overlay(
            self.source()?,
            self.registry.candidates(),
        ))
    }

    /// One highlighted view per snapshot candidate.
    pub fn render_all(&self) -> Result<Vec<RgbImage>, ScanError> {
        Ok(render::isolated_views(self.source()?, self.registry.original()))
    }

    /// Bisection views for every retained box.
    pub fn render_boxes(&self) -> Result<Vec<BoxViews>, ScanError> {
        Ok(render::box_views(self.source()?, &self.boxes))
    }

    /// Order the active pair, then profile each circumference.
    pub fn profile(&mut self) -> Result<&[PolarProfile], ScanError> {
        self.calibration.scale()?;
        self.order_outer_first()?;
        self.profiles = profile_circumferences(self.registry.active(), &self.calibration)?;
        Ok(&self.profiles)
    }

    pub fn profiles(&self) -> &[PolarProfile] {
        &self.profiles
    }

    /// Outlined active pair cropped to the outer contour.
    pub fn roi(&mut self) -> Result<RgbImage, ScanError> {
        self.order_outer_first()?;
        render::roi(self.source()?, self.registry.active())
    }

    /// Profile the active set and write the text report to `path`.
    ///
    /// Missing calibration or selection are errors. A failed write is
    /// logged and returned as `Ok(false)`.
    pub fn generate_report(&mut self, path: impl AsRef<Path>) -> Result<bool, ScanError> {
        let scale = self.calibration.scale()?;
        self.profile()?;
        let image_id = self
            .image_path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        let text = report::format_report(
            &image_id,
            &report::timestamp_now(),
            self.registry.active(),
            &self.profiles,
            scale,
        )?;
        Ok(report::write_report(path.as_ref(), &text))
    }

    fn clear_image_state(&mut self) {
        self.image_path = None;
        self.source = None;
        self.boxes.clear();
        self.registry.clear();
        self.profiles.clear();
    }

    /// Clear all per-image state and the calibration. Parameters are kept.
    pub fn reset(&mut self) {
        self.clear_image_state();
        self.calibration.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;
    use imageproc::drawing::draw_filled_circle_mut;
    use section_scan_core::GeometryError;

    fn disk_scene() -> RgbImage {
        let mut img = RgbImage::from_pixel(320, 320, Rgb([20, 20, 20]));
        draw_filled_circle_mut(&mut img, (160, 160), 100, Rgb([230, 230, 230]));
        img
    }

    #[test]
    fn failed_detection_keeps_previous_image() {
        let mut session = Session::new(ScanParams::default());
        let count = session
            .process_image(disk_scene(), Some(PathBuf::from("first.png")))
            .expect("process");
        let boxes = session.boxes().len();

        let failed = Err(GeometryError::DegenerateContour { points: 3 }.into());
        let err = session
            .install(RgbImage::new(8, 8), Some(PathBuf::from("second.png")), failed)
            .expect_err("degenerate");
        assert!(matches!(err, ScanError::Geometry(_)));

        assert_eq!(session.candidate_count(), count);
        assert_eq!(session.boxes().len(), boxes);
        assert_eq!(session.image_path(), Some(Path::new("first.png")));
        assert_eq!(
            session.source_image().map(|i| i.dimensions()),
            Some((320, 320))
        );
    }

    #[test]
    fn successful_detection_replaces_previous_image() {
        let mut session = Session::new(ScanParams::default());
        session
            .process_image(disk_scene(), Some(PathBuf::from("first.png")))
            .expect("process");
        let blank = RgbImage::from_pixel(64, 64, Rgb([0, 0, 0]));
        let count = session.process_image(blank, None).expect("process");

        assert_eq!(count, 0);
        assert!(session.boxes().is_empty());
        assert!(session.image_path().is_none());
        assert_eq!(
            session.source_image().map(|i| i.dimensions()),
            Some((64, 64))
        );
    }
}
