//! Candidate circumferences and the operator-confirmed subset.

use std::collections::BTreeSet;

use log::{debug, info};

use section_scan_core::Circumference;

use crate::error::ScanError;

/// Detection only snapshots candidates when more than this many were found.
pub const SNAPSHOT_MIN_EXCLUSIVE: usize = 2;

/// Owns the candidates of the current image.
///
/// - `candidates`: everything the classifier accepted, in discovery order.
/// - `original`: immutable snapshot of `candidates`, captured once there are
///   more than two of them. Selection indices refer to this list.
/// - `active`: the working set. Starts as all candidates and is replaced by
///   [`set_final`](Self::set_final).
#[derive(Clone, Debug, Default)]
pub struct CircumferenceRegistry {
    candidates: Vec<Circumference>,
    original: Vec<Circumference>,
    captured: bool,
    active: Vec<Circumference>,
}

impl CircumferenceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace everything with a fresh candidate list.
    pub fn load_candidates(&mut self, candidates: Vec<Circumference>) {
        self.clear();
        self.active = candidates.clone();
        self.candidates = candidates;
    }

    /// Snapshot the candidates into `original` once there are more than two.
    ///
    /// Returns whether a snapshot exists afterwards. Idempotent.
    pub fn capture_snapshot(&mut self) -> bool {
        if !self.captured && self.candidates.len() > SNAPSHOT_MIN_EXCLUSIVE {
            self.original = self.candidates.clone();
            self.captured = true;
            debug!("captured snapshot of {} candidates", self.original.len());
        }
        self.captured
    }

    pub fn candidates(&self) -> &[Circumference] {
        &self.candidates
    }

    pub fn original(&self) -> &[Circumference] {
        &self.original
    }

    pub fn active(&self) -> &[Circumference] {
        &self.active
    }

    pub fn has_snapshot(&self) -> bool {
        self.captured
    }

    /// Make the snapshot entries at `indices` the active set, in snapshot
    /// order. Previous selections are discarded; duplicates collapse.
    pub fn set_final(&mut self, indices: &[usize]) -> Result<(), ScanError> {
        let len = self.original.len();
        let selected: BTreeSet<usize> = indices.iter().copied().collect();
        if let Some(&index) = selected.iter().find(|&&i| i >= len) {
            return Err(ScanError::SelectionOutOfRange { index, len });
        }
        self.active = selected.iter().map(|&i| self.original[i].clone()).collect();
        info!("selected {} of {} candidates", self.active.len(), len);
        Ok(())
    }

    /// Put the larger of two active circumferences first, judged by traced
    /// point count rather than area.
    ///
    /// Zero or one active entries are left alone. Returns whether the order
    /// changed.
    pub fn order_outer_first(&mut self) -> Result<bool, ScanError> {
        match self.active.as_mut_slice() {
            [] | [_] => Ok(false),
            [first, second] => {
                if second.point_count() > first.point_count() {
                    std::mem::swap(first, second);
                    debug!("circumference order reversed");
                    Ok(true)
                } else {
                    Ok(false)
                }
            }
            more => Err(ScanError::NotAPair { count: more.len() }),
        }
    }

    pub fn clear(&mut self) {
        self.candidates.clear();
        self.original.clear();
        self.captured = false;
        self.active.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point2;
    use section_scan_core::Contour;

    fn circ(tag: i32, points: usize) -> Circumference {
        Circumference {
            contour: Contour::new((0..points as i32).map(|i| Point2::new(i, tag)).collect()),
            centroid: Point2::new(tag, tag),
        }
    }

    fn registry_with(counts: &[usize]) -> CircumferenceRegistry {
        let mut reg = CircumferenceRegistry::new();
        let cands = counts
            .iter()
            .enumerate()
            .map(|(i, &n)| circ(i as i32, n))
            .collect();
        reg.load_candidates(cands);
        reg
    }

    fn tags(list: &[Circumference]) -> Vec<i32> {
        list.iter().map(|c| c.centroid.x).collect()
    }

    #[test]
    fn snapshot_needs_more_than_two_candidates() {
        let mut reg = registry_with(&[10, 20]);
        assert!(!reg.capture_snapshot());
        assert!(reg.original().is_empty());
        assert_eq!(reg.active().len(), 2);

        let mut reg = registry_with(&[10, 20, 30]);
        assert!(reg.capture_snapshot());
        assert_eq!(tags(reg.original()), vec![0, 1, 2]);
    }

    #[test]
    fn snapshot_is_captured_once() {
        let mut reg = registry_with(&[10, 20, 30]);
        assert!(reg.capture_snapshot());
        reg.candidates.push(circ(9, 5));
        assert!(reg.capture_snapshot());
        assert_eq!(reg.original().len(), 3);
    }

    #[test]
    fn set_final_projects_snapshot_regardless_of_history() {
        let mut reg = registry_with(&[10, 20, 30, 40]);
        reg.capture_snapshot();

        reg.set_final(&[3, 0]).expect("select");
        assert_eq!(tags(reg.active()), vec![0, 3]);

        reg.set_final(&[2, 1, 2]).expect("select");
        assert_eq!(tags(reg.active()), vec![1, 2]);
        assert_eq!(reg.active()[0], reg.original()[1]);

        reg.set_final(&[]).expect("select");
        assert!(reg.active().is_empty());
    }

    #[test]
    fn set_final_rejects_out_of_range() {
        let mut reg = registry_with(&[10, 20, 30]);
        reg.capture_snapshot();
        reg.set_final(&[0, 1]).expect("select");
        let err = reg.set_final(&[1, 7]).expect_err("out of range");
        assert!(matches!(
            err,
            ScanError::SelectionOutOfRange { index: 7, len: 3 }
        ));
        // Failed selection leaves the previous one in place.
        assert_eq!(tags(reg.active()), vec![0, 1]);
    }

    #[test]
    fn order_outer_first_uses_point_count_and_is_idempotent() {
        let mut reg = registry_with(&[10, 50, 30]);
        reg.capture_snapshot();
        reg.set_final(&[0, 1]).expect("select");

        assert!(reg.order_outer_first().expect("pair"));
        assert_eq!(tags(reg.active()), vec![1, 0]);
        assert!(!reg.order_outer_first().expect("pair"));
        assert_eq!(tags(reg.active()), vec![1, 0]);
    }

    #[test]
    fn equal_point_counts_keep_order() {
        let mut reg = registry_with(&[25, 25]);
        assert!(!reg.order_outer_first().expect("pair"));
        assert_eq!(tags(reg.active()), vec![0, 1]);
    }

    #[test]
    fn ordering_other_counts() {
        let mut reg = registry_with(&[5]);
        assert!(!reg.order_outer_first().expect("single"));

        let mut reg = registry_with(&[5, 6, 7]);
        assert!(matches!(
            reg.order_outer_first(),
            Err(ScanError::NotAPair { count: 3 })
        ));
    }

    #[test]
    fn clear_resets_everything() {
        let mut reg = registry_with(&[1, 2, 3]);
        reg.capture_snapshot();
        reg.clear();
        assert!(reg.candidates().is_empty());
        assert!(reg.original().is_empty());
        assert!(reg.active().is_empty());
        assert!(!reg.has_snapshot());
    }
}
