//! Facial landmark points as handed over by the external detector.
//!
//! The detector hands us either the 20-point mouth slice or the full 68-point
//! face. Only the inner-lip centre pair is ever read, so the layout just maps
//! to a fixed pair of indices.

use serde::{Deserialize, Serialize};

/// A single 2D landmark coordinate (video pixel space).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LandmarkPoint {
    pub x: f64,
    pub y: f64,
}

impl LandmarkPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &LandmarkPoint) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Index convention of the points in a [`MouthLandmarks`] sequence.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LandmarkLayout {
    /// `landmarks.getMouth()` output: points 48..=67 of the face, re-based at 0.
    #[default]
    Mouth20,
    /// Whole-face 68-point set.
    Face68,
}

impl LandmarkLayout {
    /// (top-lip-centre, bottom-lip-centre) indices.
    pub fn lip_indices(self) -> (usize, usize) {
        match self {
            Self::Mouth20 => (13, 19),
            Self::Face68 => (61, 67),
        }
    }
}

/// Ordered landmark sequence for one detected face.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MouthLandmarks {
    points: Vec<LandmarkPoint>,
}

impl MouthLandmarks {
    pub fn new(points: Vec<LandmarkPoint>) -> Self {
        Self { points }
    }

    /// Decode `[x0, y0, x1, y1, ...]`. A trailing odd coordinate is dropped.
    pub fn from_flat(coords: &[f64]) -> Self {
        let points = coords
            .chunks_exact(2)
            .map(|c| LandmarkPoint::new(c[0], c[1]))
            .collect();
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<&LandmarkPoint> {
        self.points.get(idx)
    }

    pub fn points(&self) -> &[LandmarkPoint] {
        &self.points
    }
}

impl From<Vec<LandmarkPoint>> for MouthLandmarks {
    fn from(points: Vec<LandmarkPoint>) -> Self {
        Self::new(points)
    }
}
