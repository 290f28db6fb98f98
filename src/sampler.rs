//! Landmark sampling: one detector call per tick, folded into an open/closed sample.
//!
//! The detector is a black box. Whatever it reports (a face, no face, or an
//! error) the tick still yields a [`DetectionSample`]; only a face with the lips
//! far enough apart counts as open.

use tracing::{debug, warn};

use crate::classifier::MouthOpenClassifier;
use crate::error::{Error, Result};
use crate::landmarks::MouthLandmarks;

/// Result of one detector call. `Ok(None)` means no face this tick.
pub type DetectOutcome = Result<Option<MouthLandmarks>>;

/// Anything that can return the mouth landmarks of the current video frame.
pub trait FaceDetector {
    fn detect_face(&mut self) -> DetectOutcome;
}

impl<F> FaceDetector for F
where
    F: FnMut() -> DetectOutcome,
{
    fn detect_face(&mut self) -> DetectOutcome {
        self()
    }
}

/// What a single tick observed, after classification.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Signal {
    Open,
    Closed,
    NoFace,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DetectionSample {
    pub timestamp_ms: f64,
    pub signal: Signal,
}

impl DetectionSample {
    pub fn new(timestamp_ms: f64, signal: Signal) -> Self {
        Self {
            timestamp_ms,
            signal,
        }
    }

    /// Classify a detector outcome. Errors and empty results count as no face.
    pub fn from_outcome(
        outcome: DetectOutcome,
        classifier: &MouthOpenClassifier,
        timestamp_ms: f64,
    ) -> Self {
        let signal = match outcome {
            Ok(Some(mouth)) if classifier.classify(&mouth) => Signal::Open,
            Ok(Some(_)) => Signal::Closed,
            Ok(None) => Signal::NoFace,
            Err(err) => {
                warn!(error = %err, "detector call failed, treating tick as closed");
                Signal::NoFace
            }
        };
        debug!(?signal, t = timestamp_ms, "sampled");
        Self::new(timestamp_ms, signal)
    }

    /// Only an explicit open classification keeps a debounce window alive.
    pub fn mouth_open(&self) -> bool {
        self.signal == Signal::Open
    }
}

/// Convenience for hosts that report failures as strings.
pub fn detection_failed(reason: impl Into<String>) -> DetectOutcome {
    Err(Error::Detection(reason.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::tests::mouth_with_gap;
    use crate::landmarks::LandmarkLayout;

    fn classifier() -> MouthOpenClassifier {
        MouthOpenClassifier::new(20.0, LandmarkLayout::Mouth20)
    }

    #[test]
    fn every_detector_outcome_yields_a_sample() {
        let mut script = vec![
            Ok(Some(mouth_with_gap(30.0))),
            Ok(Some(mouth_with_gap(5.0))),
            Ok(None),
            detection_failed("model not warmed up"),
        ]
        .into_iter();
        let mut detector = move || script.next().unwrap_or(Ok(None));
        let classifier = classifier();

        let signals: Vec<Signal> = (0..4)
            .map(|i| {
                let outcome = detector.detect_face();
                DetectionSample::from_outcome(outcome, &classifier, i as f64 * 100.0).signal
            })
            .collect();
        assert_eq!(
            signals,
            vec![Signal::Open, Signal::Closed, Signal::NoFace, Signal::NoFace]
        );
    }

    #[test]
    fn only_open_signal_counts_as_open() {
        assert!(DetectionSample::new(0.0, Signal::Open).mouth_open());
        assert!(!DetectionSample::new(0.0, Signal::Closed).mouth_open());
        assert!(!DetectionSample::new(0.0, Signal::NoFace).mouth_open());
    }
}
