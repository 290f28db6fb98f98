//! Browser glue: exported functions for the page script, the countdown timer,
//! and the per-frame detection / drain loop.
//!
//! The page owns the DOM, the camera and the face-landmark model. It hands us
//! two callbacks at init: `onEvent(event)` receives every [`GameEvent`] as a
//! plain object, and `detect(sessionId, issuedAt)` is asked for landmarks; it
//! answers later through `submitDetection` (or `detectionFailed`).
//!
//! Loops reschedule themselves only while the controller says the session they
//! were started for is still live, so a view switch or restart stops them on
//! their next callback.

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::window;

use crate::config::{GameConfig, Variant};
use crate::controller::{DetectionRequest, GameController, View};
use crate::events::GameEvent;
use crate::landmarks::MouthLandmarks;
use crate::sampler;
use crate::session::{Phase, SessionId};

/// A detector call older than this is presumed lost and polling resumes.
const PENDING_TIMEOUT_MS: f64 = 1_000.0;

struct Host {
    controller: GameController,
    on_event: js_sys::Function,
    detect: js_sys::Function,
    pending: Option<DetectionRequest>,
    last_poll_ms: f64,
}

thread_local! {
    static GAME_STATE: RefCell<Option<Host>> = const { RefCell::new(None) };
}

type TimeoutCallback = Rc<RefCell<Option<Closure<dyn FnMut()>>>>;
type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

pub(crate) fn performance_now() -> f64 {
    window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or(0.0)
}

/// Run `f` against the host. The borrow is released before anything calls back into JS.
fn with_host<R>(f: impl FnOnce(&mut Host) -> R) -> Result<R, JsValue> {
    GAME_STATE.with(|cell| {
        let mut guard = cell.borrow_mut();
        let host = guard
            .as_mut()
            .ok_or_else(|| JsValue::from_str("game not initialised; call initGame first"))?;
        Ok(f(host))
    })
}

fn dispatch(events: Vec<GameEvent>) {
    if events.is_empty() {
        return;
    }
    let Ok(cb) = with_host(|h| h.on_event.clone()) else {
        return;
    };
    for event in &events {
        match serde_wasm_bindgen::to_value(event) {
            Ok(value) => {
                if let Err(err) = cb.call1(&JsValue::NULL, &value) {
                    tracing::warn!(?err, "onEvent callback threw");
                }
            }
            Err(err) => tracing::warn!(%err, "could not serialise game event"),
        }
    }
}

#[wasm_bindgen(js_name = initGame)]
pub fn init_game(
    on_event: js_sys::Function,
    detect: js_sys::Function,
    log_filter: Option<String>,
) {
    crate::logging::init(log_filter.as_deref().unwrap_or(crate::logging::DEFAULT_FILTER));
    GAME_STATE.with(|cell| {
        cell.replace(Some(Host {
            controller: GameController::default(),
            on_event,
            detect,
            pending: None,
            last_poll_ms: f64::NEG_INFINITY,
        }))
    });
    tracing::info!("game host initialised");
}

/// Overlay JSON settings onto a variant's preset.
#[wasm_bindgen]
pub fn configure(variant: &str, json: &str) -> Result<(), JsValue> {
    let variant = Variant::parse(variant)
        .ok_or_else(|| JsValue::from_str(&format!("unknown variant '{variant}'")))?;
    let config = GameConfig::from_json(variant, json)?;
    with_host(|h| h.controller.set_config(variant, config))??;
    Ok(())
}

#[wasm_bindgen(js_name = showView)]
pub fn show_view(name: &str) -> Result<(), JsValue> {
    let view = View::parse(name)
        .ok_or_else(|| JsValue::from_str(&format!("unknown view '{name}'")))?;
    let events = with_host(|h| {
        h.pending = None;
        h.controller.show_view(view)
    })?;
    dispatch(events);
    Ok(())
}

#[wasm_bindgen(js_name = detectorReady)]
pub fn detector_ready() -> Result<(), JsValue> {
    with_host(|h| h.controller.set_detector_ready())
}

#[wasm_bindgen(js_name = detectorFailed)]
pub fn detector_failed(reason: &str) -> Result<(), JsValue> {
    let events = with_host(|h| h.controller.set_detector_unavailable(reason))?;
    dispatch(events);
    Ok(())
}

#[wasm_bindgen(js_name = startGame)]
pub fn start_game() -> Result<(), JsValue> {
    let events = with_host(|h| h.controller.start())??;
    dispatch(events);
    kick_countdown()
}

/// The intro clip finished playing.
#[wasm_bindgen(js_name = introEnded)]
pub fn intro_ended() -> Result<(), JsValue> {
    let events = with_host(|h| h.controller.intro_finished())??;
    dispatch(events);
    kick_countdown()
}

#[wasm_bindgen(js_name = restartGame)]
pub fn restart_game() -> Result<(), JsValue> {
    let events = with_host(|h| {
        h.pending = None;
        h.controller.restart()
    })??;
    dispatch(events);
    Ok(())
}

/// Answer to a `detect(sessionId, issuedAt)` call. `landmarks` is the flat
/// `[x0, y0, x1, y1, ...]` mouth (or face) array, or `undefined` for no face.
#[wasm_bindgen(js_name = submitDetection)]
pub fn submit_detection(
    session_id: f64,
    issued_at: f64,
    landmarks: Option<Vec<f64>>,
) -> Result<(), JsValue> {
    let outcome = Ok(landmarks.map(|coords| MouthLandmarks::from_flat(&coords)));
    finish_detection(session_id, issued_at, outcome)
}

#[wasm_bindgen(js_name = detectionFailed)]
pub fn detection_failed(session_id: f64, issued_at: f64, reason: &str) -> Result<(), JsValue> {
    finish_detection(session_id, issued_at, sampler::detection_failed(reason))
}

fn finish_detection(
    session_id: f64,
    issued_at: f64,
    outcome: sampler::DetectOutcome,
) -> Result<(), JsValue> {
    let request = DetectionRequest {
        session: SessionId(session_id as u64),
        issued_at_ms: issued_at,
    };
    let events = with_host(|h| {
        if h.pending == Some(request) {
            h.pending = None;
        }
        h.controller.complete_detection(request, outcome, performance_now())
    })?;
    dispatch(events);
    Ok(())
}

// --- Countdown ----------------------------------------------------------------

fn kick_countdown() -> Result<(), JsValue> {
    let id = with_host(|h| {
        h.controller
            .active_session_id()
            .filter(|id| h.controller.wants_countdown(*id))
    })?;
    if let Some(id) = id {
        start_countdown_loop(id)?;
    }
    Ok(())
}

fn set_timeout(cb: &Closure<dyn FnMut()>, ms: i32) -> Result<i32, JsValue> {
    let w = window().ok_or_else(|| JsValue::from_str("no window"))?;
    w.set_timeout_with_callback_and_timeout_and_arguments_0(cb.as_ref().unchecked_ref(), ms)
}

fn start_countdown_loop(id: SessionId) -> Result<(), JsValue> {
    let f: TimeoutCallback = Rc::new(RefCell::new(None));
    let g = f.clone();
    *g.borrow_mut() = Some(Closure::wrap(Box::new(move || {
        let events = with_host(|h| h.controller.countdown_tick(id, performance_now()))
            .unwrap_or_default();
        dispatch(events);

        let (counting, active, poll_ms) = with_host(|h| {
            let poll_ms = h
                .controller
                .session()
                .map(|s| s.config().poll_interval_ms)
                .unwrap_or(100);
            (
                h.controller.wants_countdown(id),
                h.controller.wants_detection(id),
                poll_ms,
            )
        })
        .unwrap_or((false, false, 100));

        if counting {
            if let Some(cb) = f.borrow().as_ref() {
                let _ = set_timeout(cb, 1_000);
            }
            return;
        }
        if active {
            let _ = start_detection_loop(id, poll_ms as f64);
        }
        // countdown over (or session gone): release this closure
        let _ = f.borrow_mut().take();
    }) as Box<dyn FnMut()>));

    if let Some(cb) = g.borrow().as_ref() {
        set_timeout(cb, 1_000)?;
    }
    Ok(())
}

// --- Detection / drain loop ---------------------------------------------------

fn start_detection_loop(id: SessionId, poll_interval_ms: f64) -> Result<(), JsValue> {
    let f: FrameCallback = Rc::new(RefCell::new(None));
    let g = f.clone();
    *g.borrow_mut() = Some(Closure::wrap(Box::new(move |_ts: f64| {
        // rAF timestamps share performance.now()'s origin; read the clock
        // directly so drain and submitDetection use one time source
        let now = performance_now();
        if !with_host(|h| h.controller.wants_detection(id)).unwrap_or(false) {
            let _ = f.borrow_mut().take();
            return;
        }
        let events = with_host(|h| h.controller.advance(id, now)).unwrap_or_default();
        dispatch(events);

        let request = with_host(|h| poll_due(h, id, now, poll_interval_ms)).unwrap_or(None);
        if let Some(req) = request {
            call_detector(req);
        }

        if with_host(|h| h.controller.wants_detection(id)).unwrap_or(false) {
            if let Some(w) = window() {
                let _ = w.request_animation_frame(
                    f.borrow().as_ref().unwrap_throw().as_ref().unchecked_ref(),
                );
            }
        } else {
            let _ = f.borrow_mut().take();
        }
    }) as Box<dyn FnMut(f64)>));

    let w = window().ok_or_else(|| JsValue::from_str("no window"))?;
    if let Some(cb) = g.borrow().as_ref() {
        w.request_animation_frame(cb.as_ref().unchecked_ref())?;
    }
    Ok(())
}

fn poll_due(
    h: &mut Host,
    id: SessionId,
    now: f64,
    poll_interval_ms: f64,
) -> Option<DetectionRequest> {
    if now - h.last_poll_ms < poll_interval_ms {
        return None;
    }
    if let Some(p) = h.pending {
        if p.session == id && now - p.issued_at_ms < PENDING_TIMEOUT_MS {
            return None;
        }
    }
    let req = h.controller.request_detection(id, now)?;
    h.last_poll_ms = now;
    h.pending = Some(req);
    Some(req)
}

fn call_detector(req: DetectionRequest) {
    let Ok(detect) = with_host(|h| h.detect.clone()) else {
        return;
    };
    let session = JsValue::from_f64(req.session.0 as f64);
    let issued = JsValue::from_f64(req.issued_at_ms);
    if let Err(err) = detect.call2(&JsValue::NULL, &session, &issued) {
        let reason = err.as_string().unwrap_or_else(|| format!("{err:?}"));
        let outcome = sampler::detection_failed(reason);
        let _ = finish_detection(req.session.0 as f64, req.issued_at_ms, outcome);
    }
}

/// Current phase name, for hosts that poll instead of listening to events.
#[wasm_bindgen(js_name = currentPhase)]
pub fn current_phase() -> Option<String> {
    with_host(|h| h.controller.session().map(|s| s.phase()))
        .ok()
        .flatten()
        .map(|p| match p {
            Phase::Idle => "idle",
            Phase::Countdown => "countdown",
            Phase::Active => "active",
            Phase::Won => "won",
            Phase::Lost => "lost",
        })
        .map(String::from)
}
