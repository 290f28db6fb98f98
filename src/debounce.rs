//! Open-duration debouncer: turns per-tick open/closed samples into a single
//! "mouth held open" event.

use tracing::debug;

/// Sustain threshold used by every shipped variant (milliseconds).
pub const DEFAULT_SUSTAIN_MS: f64 = 500.0;

/// Tracks the start of the current continuous open run.
///
/// A run is broken by any closed (or no-face) sample. Once the run has lasted
/// strictly longer than `sustain_ms` the debouncer fires and forgets the run,
/// so a single held-open mouth produces exactly one event.
#[derive(Clone, Debug, PartialEq)]
pub struct OpenDurationDebouncer {
    sustain_ms: f64,
    open_since: Option<f64>,
}

impl OpenDurationDebouncer {
    pub fn new(sustain_ms: f64) -> Self {
        Self {
            sustain_ms,
            open_since: None,
        }
    }

    /// Feed one sample. Returns `true` on the tick the sustain threshold is first exceeded.
    pub fn observe(&mut self, open: bool, now_ms: f64) -> bool {
        if !open {
            self.open_since = None;
            return false;
        }
        match self.open_since {
            None => {
                self.open_since = Some(now_ms);
                false
            }
            Some(since) if now_ms - since > self.sustain_ms => {
                debug!(held_ms = now_ms - since, "mouth held open past sustain threshold");
                self.open_since = None;
                true
            }
            Some(_) => false,
        }
    }

    pub fn open_since(&self) -> Option<f64> {
        self.open_since
    }

    pub fn reset(&mut self) {
        self.open_since = None;
    }
}

impl Default for OpenDurationDebouncer {
    fn default() -> Self {
        Self::new(DEFAULT_SUSTAIN_MS)
    }
}
