//! Notifications the core hands to the UI host. The core never touches the DOM;
//! the host renders these (text, HP bars, sounds, media swaps).

use serde::Serialize;

use crate::session::Phase;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Fighter {
    Player,
    Enemy,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum GameEvent {
    PhaseChanged { phase: Phase },
    CountdownTick { remaining: u32 },
    Message { text: String },
    HpChanged { who: Fighter, hp: f64 },
    PlayMedia { src: String },
    /// Win cue; fired once per session.
    Win,
    /// Lose cue; fired once per session.
    Lose,
    /// Camera or model could not be initialised.
    DetectorUnavailable { reason: String },
}

impl GameEvent {
    pub fn message(text: impl Into<String>) -> Self {
        Self::Message { text: text.into() }
    }
}
