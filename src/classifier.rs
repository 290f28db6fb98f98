//! Mouth-open classification from the inner-lip gap.

use crate::landmarks::{LandmarkLayout, MouthLandmarks};

/// Classifies a landmark set as open or closed by comparing the distance
/// between the top and bottom lip centres to a fixed threshold.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MouthOpenClassifier {
    threshold: f64,
    layout: LandmarkLayout,
}

impl MouthOpenClassifier {
    pub fn new(threshold: f64, layout: LandmarkLayout) -> Self {
        Self { threshold, layout }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Inner-lip gap, or `None` when the sequence is too short for the layout.
    pub fn lip_distance(&self, mouth: &MouthLandmarks) -> Option<f64> {
        let (top, bottom) = self.layout.lip_indices();
        let top = mouth.get(top)?;
        let bottom = mouth.get(bottom)?;
        Some(top.distance(bottom))
    }

    /// Open iff the gap strictly exceeds the threshold. Short input reads as closed.
    pub fn classify(&self, mouth: &MouthLandmarks) -> bool {
        self.lip_distance(mouth)
            .is_some_and(|d| d > self.threshold)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::landmarks::LandmarkPoint;

    /// 20-point mouth with the lip centres `gap` pixels apart vertically.
    pub(crate) fn mouth_with_gap(gap: f64) -> MouthLandmarks {
        let mut pts = vec![LandmarkPoint::new(100.0, 200.0); 20];
        pts[13] = LandmarkPoint::new(100.0, 200.0);
        pts[19] = LandmarkPoint::new(100.0, 200.0 + gap);
        MouthLandmarks::new(pts)
    }

    #[test]
    fn gap_above_threshold_is_open() {
        let c = MouthOpenClassifier::new(20.0, LandmarkLayout::Mouth20);
        assert!(c.classify(&mouth_with_gap(20.5)));
        assert!(c.classify(&mouth_with_gap(45.0)));
    }

    #[test]
    fn gap_at_threshold_is_closed() {
        let c = MouthOpenClassifier::new(20.0, LandmarkLayout::Mouth20);
        assert!(!c.classify(&mouth_with_gap(20.0)));
        assert!(!c.classify(&mouth_with_gap(3.0)));
    }

    #[test]
    fn short_sequence_is_closed() {
        let c = MouthOpenClassifier::new(20.0, LandmarkLayout::Mouth20);
        let pts = vec![LandmarkPoint::new(0.0, 0.0); 19];
        assert!(!c.classify(&MouthLandmarks::new(pts)));
        assert!(!c.classify(&MouthLandmarks::default()));
    }

    #[test]
    fn face68_layout_reads_full_face_indices() {
        let mut pts = vec![LandmarkPoint::new(0.0, 0.0); 68];
        pts[61] = LandmarkPoint::new(10.0, 10.0);
        pts[67] = LandmarkPoint::new(10.0, 50.0);
        let c = MouthOpenClassifier::new(30.0, LandmarkLayout::Face68);
        assert_eq!(c.lip_distance(&MouthLandmarks::new(pts.clone())), Some(40.0));
        assert!(c.classify(&MouthLandmarks::new(pts)));
        // a 20-point mouth is too short for the face layout
        assert!(!c.classify(&mouth_with_gap(80.0)));
    }
}
