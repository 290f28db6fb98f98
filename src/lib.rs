//! Open Wide core crate.
//!
//! Webcam minigames won by opening your mouth on cue. The page script owns the
//! camera, the face-landmark model and the DOM; this crate turns the landmark
//! stream into a debounced "mouth held open" signal and runs the game flow
//! (menu -> countdown -> detection -> win / lose) for the three variants:
//! Cheers, World and the HP-race Battle.
//!
//! Everything except [`web`] is plain Rust and testable on the host.

use wasm_bindgen::prelude::*;

pub mod battle;
pub mod classifier;
pub mod config;
pub mod controller;
pub mod debounce;
pub mod error;
pub mod events;
pub mod landmarks;
pub mod logging;
pub mod sampler;
pub mod session;
pub mod web;

pub use battle::BattleState;
pub use classifier::MouthOpenClassifier;
pub use config::{ConfigSet, GameConfig, Messages, Variant};
pub use controller::{DetectionRequest, DetectorStatus, GameController, View};
pub use debounce::OpenDurationDebouncer;
pub use error::{Error, Result};
pub use events::{Fighter, GameEvent};
pub use landmarks::{LandmarkLayout, LandmarkPoint, MouthLandmarks};
pub use sampler::{DetectOutcome, DetectionSample, FaceDetector, Signal};
pub use session::{GameSession, Phase, SessionId};

// Optional small allocator for size (feature gated)
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}
