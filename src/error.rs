//! Error taxonomy for the game core.
//!
//! Only initialisation problems (camera / model) and caller misuse surface as
//! errors. Per-tick detector trouble is folded into a closed-mouth sample by the
//! sampler, and stale async results are dropped before they ever become a value.

use thiserror::Error;

use crate::session::Phase;

#[derive(Debug, Error)]
pub enum Error {
    /// Camera or landmark model failed to come up; starting a game is refused
    /// until the host reports the detector ready again.
    #[error("detector unavailable: {0}")]
    DetectorUnavailable(String),

    /// A single detection call failed. Never leaves the sampling path.
    #[error("detection failed: {0}")]
    Detection(String),

    #[error("no game session is active (menu view)")]
    NoActiveSession,

    #[error("expected phase {expected:?}, session is {actual:?}")]
    InvalidPhase { expected: Phase, actual: Phase },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("config json: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<Error> for wasm_bindgen::JsValue {
    fn from(err: Error) -> Self {
        wasm_bindgen::JsValue::from_str(&err.to_string())
    }
}
