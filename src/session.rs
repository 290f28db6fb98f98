//! One play-through of a variant: Idle -> Countdown -> Active -> Won | Lost.
//!
//! Every input (start, countdown tick, detection sample, frame advance) returns
//! the events it caused. Inputs that arrive in the wrong phase are ignored
//! rather than rejected, which is what makes late timer callbacks and slow
//! detector results harmless: once a session is Won or Lost nothing mutates it.

use serde::Serialize;
use tracing::{debug, info};

use crate::battle::{BattleState, MAX_HP};
use crate::classifier::MouthOpenClassifier;
use crate::config::{GameConfig, Variant};
use crate::debounce::OpenDurationDebouncer;
use crate::error::{Error, Result};
use crate::events::{Fighter, GameEvent};
use crate::sampler::{DetectOutcome, DetectionSample};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    Idle,
    Countdown,
    Active,
    Won,
    Lost,
}

impl Phase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Won | Phase::Lost)
    }
}

/// Identifies one session instance; timers and detector requests carry it so
/// they can tell whether the session they were scheduled for is still around.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct SessionId(pub u64);

#[derive(Debug)]
pub struct GameSession {
    id: SessionId,
    variant: Variant,
    config: GameConfig,
    phase: Phase,
    countdown_remaining: u32,
    /// Start was pressed and the intro clip is playing.
    awaiting_intro: bool,
    classifier: MouthOpenClassifier,
    debouncer: OpenDurationDebouncer,
    battle: Option<BattleState>,
}

impl GameSession {
    pub fn new(id: SessionId, variant: Variant, config: GameConfig) -> Self {
        let battle = (variant == Variant::Battle)
            .then(|| BattleState::new(config.drain_rate_hp_per_sec));
        Self {
            id,
            variant,
            classifier: config.classifier(),
            debouncer: OpenDurationDebouncer::new(config.sustain_ms),
            countdown_remaining: config.countdown_seconds,
            config,
            phase: Phase::Idle,
            awaiting_intro: false,
            battle,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_terminal(&self) -> bool {
        self.phase.is_terminal()
    }

    pub fn countdown_remaining(&self) -> u32 {
        self.countdown_remaining
    }

    pub fn awaiting_intro(&self) -> bool {
        self.awaiting_intro
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn battle(&self) -> Option<&BattleState> {
        self.battle.as_ref()
    }

    pub fn open_since(&self) -> Option<f64> {
        self.debouncer.open_since()
    }

    /// Events that paint the fresh view: idle phase, intro copy, full HP bars.
    pub fn opening_events(&self) -> Vec<GameEvent> {
        let mut events = vec![
            GameEvent::PhaseChanged { phase: Phase::Idle },
            GameEvent::message(self.config.messages.initial.clone()),
        ];
        if self.battle.is_some() {
            events.push(GameEvent::HpChanged { who: Fighter::Player, hp: MAX_HP });
            events.push(GameEvent::HpChanged { who: Fighter::Enemy, hp: MAX_HP });
        }
        events
    }

    /// Player pressed start. Variants with an intro clip wait for
    /// [`GameSession::intro_finished`]; the rest count down right away.
    pub fn start(&mut self) -> Result<Vec<GameEvent>> {
        if self.phase != Phase::Idle || self.awaiting_intro {
            return Err(Error::InvalidPhase {
                expected: Phase::Idle,
                actual: self.phase,
            });
        }
        match self.config.intro_media.clone() {
            Some(src) => {
                debug!(session = self.id.0, %src, "playing intro before countdown");
                self.awaiting_intro = true;
                Ok(vec![GameEvent::PlayMedia { src }])
            }
            None => Ok(self.begin_countdown()),
        }
    }

    pub fn intro_finished(&mut self) -> Result<Vec<GameEvent>> {
        if self.phase != Phase::Idle || !self.awaiting_intro {
            return Err(Error::InvalidPhase {
                expected: Phase::Idle,
                actual: self.phase,
            });
        }
        self.awaiting_intro = false;
        Ok(self.begin_countdown())
    }

    fn begin_countdown(&mut self) -> Vec<GameEvent> {
        self.phase = Phase::Countdown;
        self.countdown_remaining = self.config.countdown_seconds;
        info!(session = self.id.0, variant = self.variant.as_str(), "countdown started");
        vec![
            GameEvent::PhaseChanged { phase: Phase::Countdown },
            GameEvent::message(self.config.messages.countdown.clone()),
            GameEvent::CountdownTick { remaining: self.countdown_remaining },
        ]
    }

    /// One-second countdown timer. Activates the session when it reaches zero.
    pub fn countdown_tick(&mut self, now_ms: f64) -> Vec<GameEvent> {
        if self.phase != Phase::Countdown {
            return Vec::new();
        }
        self.countdown_remaining = self.countdown_remaining.saturating_sub(1);
        let mut events = vec![GameEvent::CountdownTick { remaining: self.countdown_remaining }];
        if self.countdown_remaining == 0 {
            events.extend(self.activate(now_ms));
        }
        events
    }

    fn activate(&mut self, now_ms: f64) -> Vec<GameEvent> {
        self.phase = Phase::Active;
        self.debouncer.reset();
        if let Some(battle) = self.battle.as_mut() {
            battle.start_drain(now_ms);
        }
        info!(session = self.id.0, "detection active");
        vec![
            GameEvent::message(self.config.messages.action.clone()),
            GameEvent::PhaseChanged { phase: Phase::Active },
        ]
    }

    /// Classify a detector outcome with this session's threshold.
    pub fn sample(&self, outcome: DetectOutcome, now_ms: f64) -> DetectionSample {
        DetectionSample::from_outcome(outcome, &self.classifier, now_ms)
    }

    /// Frame callback: advance the battle drain only.
    pub fn advance(&mut self, now_ms: f64) -> Vec<GameEvent> {
        let mut events = Vec::new();
        if self.phase == Phase::Active {
            self.apply_drain(now_ms, &mut events);
        }
        events
    }

    /// Detection tick. In battle the drain is applied first, so a player who
    /// runs out of HP on the very tick the counterattack would land still loses.
    pub fn detection_tick(&mut self, sample: DetectionSample) -> Vec<GameEvent> {
        let mut events = Vec::new();
        if self.phase != Phase::Active {
            return events;
        }
        self.apply_drain(sample.timestamp_ms, &mut events);
        if self.is_terminal() {
            return events;
        }
        if self.debouncer.observe(sample.mouth_open(), sample.timestamp_ms) {
            if let Some(battle) = self.battle.as_mut() {
                battle.counterattack();
                events.push(GameEvent::HpChanged { who: Fighter::Enemy, hp: 0.0 });
                if !self.config.messages.critical.is_empty() {
                    events.push(GameEvent::message(self.config.messages.critical.clone()));
                }
            }
            events.extend(self.finish(Phase::Won));
        }
        events
    }

    fn apply_drain(&mut self, now_ms: f64, events: &mut Vec<GameEvent>) {
        let Some(battle) = self.battle.as_mut() else {
            return;
        };
        if let Some(hp) = battle.drain(now_ms) {
            events.push(GameEvent::HpChanged { who: Fighter::Player, hp });
        }
        if battle.player_down() {
            events.extend(self.finish(Phase::Lost));
        }
    }

    fn finish(&mut self, outcome: Phase) -> Vec<GameEvent> {
        if self.is_terminal() {
            return Vec::new();
        }
        self.phase = outcome;
        self.debouncer.reset();
        if let Some(battle) = self.battle.as_mut() {
            battle.stop_drain();
        }
        info!(session = self.id.0, variant = self.variant.as_str(), ?outcome, "session over");

        let messages = &self.config.messages;
        let mut events = Vec::with_capacity(4);
        match outcome {
            Phase::Won => {
                events.push(GameEvent::Win);
                if !messages.win.is_empty() {
                    events.push(GameEvent::message(messages.win.clone()));
                }
                if let Some(src) = self.config.win_media.clone() {
                    events.push(GameEvent::PlayMedia { src });
                }
            }
            _ => {
                events.push(GameEvent::Lose);
                events.push(GameEvent::message(messages.lose.clone()));
            }
        }
        events.push(GameEvent::PhaseChanged { phase: outcome });
        events
    }
}
