// Property tests for the classifier boundary, the debouncer and the battle drain.
#![cfg(not(target_arch = "wasm32"))]

use open_wide::{
    BattleState, LandmarkLayout, LandmarkPoint, MouthLandmarks, MouthOpenClassifier,
    OpenDurationDebouncer,
};
use proptest::prelude::*;

fn mouth_with_gap(dx: f64, dy: f64) -> MouthLandmarks {
    let mut pts = vec![LandmarkPoint::new(0.0, 0.0); 20];
    pts[13] = LandmarkPoint::new(200.0, 150.0);
    pts[19] = LandmarkPoint::new(200.0 + dx, 150.0 + dy);
    MouthLandmarks::new(pts)
}

proptest! {
    #[test]
    fn classify_matches_distance_threshold(
        threshold in 1.0f64..60.0,
        dx in -80.0f64..80.0,
        dy in -80.0f64..80.0,
    ) {
        let c = MouthOpenClassifier::new(threshold, LandmarkLayout::Mouth20);
        let m = mouth_with_gap(dx, dy);
        let d = c.lip_distance(&m).unwrap();
        prop_assert_eq!(c.classify(&m), d > threshold);
    }

    #[test]
    fn isolated_open_samples_never_fire(gaps in prop::collection::vec(1.0f64..2_000.0, 1..50)) {
        // open / closed alternating: every open run is a single sample long
        let mut d = OpenDurationDebouncer::new(500.0);
        let mut t = 0.0;
        for (i, gap) in gaps.iter().enumerate() {
            t += gap;
            prop_assert!(!d.observe(i % 2 == 0, t));
        }
    }

    #[test]
    fn fires_iff_run_strictly_exceeds_sustain(
        steps in prop::collection::vec(1.0f64..120.0, 1..40),
    ) {
        let sustain = 500.0;
        let mut d = OpenDurationDebouncer::new(sustain);
        let mut t = 1_000.0;
        let start = t;
        d.observe(true, t);
        let mut fired = 0;
        for step in &steps {
            t += step;
            let fire = d.observe(true, t);
            if fire {
                prop_assert!(t - start > sustain);
                fired += 1;
                break;
            }
            prop_assert!(t - start <= sustain);
        }
        prop_assert!(fired <= 1);
    }

    #[test]
    fn drain_is_max_zero_of_linear_loss(
        rate in 0.1f64..20.0,
        frames in prop::collection::vec(1.0f64..250.0, 1..200),
    ) {
        let mut b = BattleState::new(rate);
        b.start_drain(0.0);
        let mut t = 0.0;
        for f in &frames {
            t += f;
            b.drain(t);
        }
        let expected = (100.0 - rate * t / 1_000.0).max(0.0);
        prop_assert!((b.player_hp() - expected).abs() < 1e-6);
        prop_assert!(b.player_hp() >= 0.0);
    }
}
