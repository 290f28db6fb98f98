//! Owns the single live [`GameSession`] and routes every external trigger
//! (view switches, buttons, timers, detector results) to it.
//!
//! Timers and in-flight detector calls are tagged with the [`SessionId`] they
//! were created for. The controller drops anything whose tag does not match
//! the live, non-terminal session, so teardown never has to chase callbacks.

use tracing::{debug, info, warn};

use crate::config::{ConfigSet, GameConfig, Variant};
use crate::error::{Error, Result};
use crate::events::GameEvent;
use crate::sampler::{DetectOutcome, FaceDetector};
use crate::session::{GameSession, Phase, SessionId};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum View {
    Menu,
    Cheers,
    World,
    Battle,
}

impl View {
    pub fn variant(self) -> Option<Variant> {
        match self {
            View::Menu => None,
            View::Cheers => Some(Variant::Cheers),
            View::World => Some(Variant::World),
            View::Battle => Some(Variant::Battle),
        }
    }

    pub fn parse(name: &str) -> Option<View> {
        match name {
            "menu" => Some(View::Menu),
            other => Variant::parse(other).map(View::from),
        }
    }
}

impl From<Variant> for View {
    fn from(v: Variant) -> Self {
        match v {
            Variant::Cheers => View::Cheers,
            Variant::World => View::World,
            Variant::Battle => View::Battle,
        }
    }
}

/// Camera + landmark model readiness, reported by the host.
#[derive(Clone, Debug, PartialEq)]
pub enum DetectorStatus {
    Loading,
    Ready,
    Unavailable(String),
}

/// Ticket for one asynchronous detector call.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DetectionRequest {
    pub session: SessionId,
    pub issued_at_ms: f64,
}

#[derive(Debug)]
pub struct GameController {
    configs: ConfigSet,
    view: View,
    session: Option<GameSession>,
    next_session_id: u64,
    detector: DetectorStatus,
}

impl Default for GameController {
    fn default() -> Self {
        Self::new(ConfigSet::default())
    }
}

impl GameController {
    pub fn new(configs: ConfigSet) -> Self {
        Self {
            configs,
            view: View::Menu,
            session: None,
            next_session_id: 1,
            detector: DetectorStatus::Loading,
        }
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn session(&self) -> Option<&GameSession> {
        self.session.as_ref()
    }

    pub fn detector_status(&self) -> &DetectorStatus {
        &self.detector
    }

    pub fn config(&self, variant: Variant) -> &GameConfig {
        self.configs.get(variant)
    }

    /// Replace a variant's config. Takes effect at the next session.
    pub fn set_config(&mut self, variant: Variant, config: GameConfig) -> Result<()> {
        self.configs.set(variant, config)
    }

    pub fn set_detector_ready(&mut self) {
        info!("face detector ready");
        self.detector = DetectorStatus::Ready;
    }

    pub fn set_detector_unavailable(&mut self, reason: impl Into<String>) -> Vec<GameEvent> {
        let reason = reason.into();
        warn!(%reason, "face detector unavailable");
        self.detector = DetectorStatus::Unavailable(reason.clone());
        vec![GameEvent::DetectorUnavailable { reason }]
    }

    /// Leave the current view (tearing its session down) and enter `view`.
    pub fn show_view(&mut self, view: View) -> Vec<GameEvent> {
        if let Some(old) = self.session.take() {
            debug!(session = old.id().0, phase = ?old.phase(), "tearing down session");
        }
        self.view = view;
        info!(?view, "view changed");
        match view.variant() {
            Some(variant) => self.open_session(variant),
            None => Vec::new(),
        }
    }

    /// Throw the current session away and start over in the same view.
    pub fn restart(&mut self) -> Result<Vec<GameEvent>> {
        let variant = self.view.variant().ok_or(Error::NoActiveSession)?;
        Ok(self.open_session(variant))
    }

    fn open_session(&mut self, variant: Variant) -> Vec<GameEvent> {
        let id = SessionId(self.next_session_id);
        self.next_session_id += 1;
        let session = GameSession::new(id, variant, self.configs.get(variant).clone());
        let events = session.opening_events();
        self.session = Some(session);
        events
    }

    pub fn start(&mut self) -> Result<Vec<GameEvent>> {
        match &self.detector {
            DetectorStatus::Ready => {}
            DetectorStatus::Loading => {
                return Err(Error::DetectorUnavailable("still loading".into()));
            }
            DetectorStatus::Unavailable(reason) => {
                return Err(Error::DetectorUnavailable(reason.clone()));
            }
        }
        self.session_mut()?.start()
    }

    pub fn intro_finished(&mut self) -> Result<Vec<GameEvent>> {
        self.session_mut()?.intro_finished()
    }

    fn session_mut(&mut self) -> Result<&mut GameSession> {
        self.session.as_mut().ok_or(Error::NoActiveSession)
    }

    /// The live session if `id` still names it and it is in `phase`.
    fn live(&mut self, id: SessionId, phase: Phase) -> Option<&mut GameSession> {
        self.session
            .as_mut()
            .filter(|s| s.id() == id && s.phase() == phase)
    }

    pub fn active_session_id(&self) -> Option<SessionId> {
        self.session.as_ref().map(GameSession::id)
    }

    /// Whether a countdown timer scheduled for `id` should keep firing.
    pub fn wants_countdown(&self, id: SessionId) -> bool {
        self.session
            .as_ref()
            .is_some_and(|s| s.id() == id && s.phase() == Phase::Countdown)
    }

    /// Whether a detection / drain loop scheduled for `id` should keep running.
    pub fn wants_detection(&self, id: SessionId) -> bool {
        self.session
            .as_ref()
            .is_some_and(|s| s.id() == id && s.phase() == Phase::Active)
    }

    pub fn countdown_tick(&mut self, id: SessionId, now_ms: f64) -> Vec<GameEvent> {
        match self.live(id, Phase::Countdown) {
            Some(s) => s.countdown_tick(now_ms),
            None => {
                debug!(session = id.0, "countdown tick for a dead session ignored");
                Vec::new()
            }
        }
    }

    /// Animation-frame callback: battle drain between detector polls.
    pub fn advance(&mut self, id: SessionId, now_ms: f64) -> Vec<GameEvent> {
        self.live(id, Phase::Active)
            .map(|s| s.advance(now_ms))
            .unwrap_or_default()
    }

    /// Issue a ticket for an asynchronous detector call, if detection is live.
    pub fn request_detection(&mut self, id: SessionId, now_ms: f64) -> Option<DetectionRequest> {
        self.live(id, Phase::Active).map(|_| DetectionRequest {
            session: id,
            issued_at_ms: now_ms,
        })
    }

    /// Consume an asynchronous detector result. Results for a session that has
    /// since ended or been replaced are discarded without a trace in the UI.
    pub fn complete_detection(
        &mut self,
        request: DetectionRequest,
        outcome: DetectOutcome,
        now_ms: f64,
    ) -> Vec<GameEvent> {
        let Some(session) = self.live(request.session, Phase::Active) else {
            debug!(
                session = request.session.0,
                age_ms = now_ms - request.issued_at_ms,
                "discarding stale detection result"
            );
            return Vec::new();
        };
        let sample = session.sample(outcome, now_ms);
        session.detection_tick(sample)
    }

    /// Synchronous poll: request, detect and consume in one step.
    pub fn poll<D: FaceDetector>(&mut self, detector: &mut D, now_ms: f64) -> Vec<GameEvent> {
        let Some(id) = self.active_session_id() else {
            return Vec::new();
        };
        match self.request_detection(id, now_ms) {
            Some(req) => {
                let outcome = detector.detect_face();
                self.complete_detection(req, outcome, now_ms)
            }
            None => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::tests::mouth_with_gap;

    fn ready_controller() -> GameController {
        let mut c = GameController::default();
        c.set_detector_ready();
        c
    }

    fn run_countdown(c: &mut GameController) -> SessionId {
        let id = c.active_session_id().unwrap();
        let mut t = 0.0;
        while c.wants_countdown(id) {
            t += 1_000.0;
            c.countdown_tick(id, t);
        }
        id
    }

    #[test]
    fn start_refused_until_detector_ready() {
        let mut c = GameController::default();
        c.show_view(View::Battle);
        assert!(matches!(c.start(), Err(Error::DetectorUnavailable(_))));
        let ev = c.set_detector_unavailable("camera permission denied");
        assert_eq!(ev.len(), 1);
        match c.start() {
            Err(Error::DetectorUnavailable(reason)) => assert!(reason.contains("permission")),
            other => panic!("unexpected {other:?}"),
        }
        c.set_detector_ready();
        assert!(c.start().is_ok());
    }

    #[test]
    fn menu_has_no_session() {
        let mut c = ready_controller();
        assert!(c.show_view(View::Menu).is_empty());
        assert!(matches!(c.start(), Err(Error::NoActiveSession)));
        assert!(matches!(c.restart(), Err(Error::NoActiveSession)));
    }

    #[test]
    fn switching_views_kills_old_timers() {
        let mut c = ready_controller();
        c.show_view(View::Battle);
        c.start().unwrap();
        let old = c.active_session_id().unwrap();
        assert!(c.wants_countdown(old));

        c.show_view(View::World);
        assert!(!c.wants_countdown(old));
        assert!(c.countdown_tick(old, 1_000.0).is_empty());
        assert_eq!(c.session().unwrap().phase(), Phase::Idle);
    }

    #[test]
    fn stale_detection_result_is_discarded() {
        let mut c = ready_controller();
        c.show_view(View::Battle);
        c.start().unwrap();
        let id = run_countdown(&mut c);
        let req = c.request_detection(id, 3_100.0).unwrap();

        // player restarts while the detector call is in flight
        c.restart().unwrap();
        let ev = c.complete_detection(req, Ok(Some(mouth_with_gap(80.0))), 3_200.0);
        assert!(ev.is_empty());
        assert_eq!(c.session().unwrap().phase(), Phase::Idle);
        assert_eq!(c.session().unwrap().open_since(), None);
    }

    #[test]
    fn restart_hands_out_a_fresh_session() {
        let mut c = ready_controller();
        let opening = c.show_view(View::Battle);
        let first = c.active_session_id().unwrap();
        let again = c.restart().unwrap();
        assert_eq!(opening, again);
        assert_ne!(c.active_session_id().unwrap(), first);
    }

    #[test]
    fn config_change_applies_to_next_session() {
        let mut c = ready_controller();
        c.show_view(View::Cheers);
        let cfg = GameConfig {
            countdown_seconds: 5,
            intro_media: None,
            ..c.config(Variant::Cheers).clone()
        };
        c.set_config(Variant::Cheers, cfg).unwrap();
        assert_eq!(c.session().unwrap().config().countdown_seconds, 3);
        c.restart().unwrap();
        c.start().unwrap();
        assert_eq!(c.session().unwrap().countdown_remaining(), 5);
    }

    #[test]
    fn view_names_parse() {
        assert_eq!(View::parse("menu"), Some(View::Menu));
        assert_eq!(View::parse("battle"), Some(View::Battle));
        assert_eq!(View::parse("settings"), None);
    }
}
