//! HP model for the battle variant: the player bleeds HP over wall-clock time
//! while a sustained open mouth delivers a one-shot counterattack.

use tracing::debug;

pub const MAX_HP: f64 = 100.0;

#[derive(Clone, Debug, PartialEq)]
pub struct BattleState {
    player_hp: f64,
    enemy_hp: f64,
    is_draining: bool,
    /// Timestamp the drain was last applied at.
    last_drain_ms: Option<f64>,
    drain_rate_hp_per_sec: f64,
}

impl BattleState {
    pub fn new(drain_rate_hp_per_sec: f64) -> Self {
        Self {
            player_hp: MAX_HP,
            enemy_hp: MAX_HP,
            is_draining: false,
            last_drain_ms: None,
            drain_rate_hp_per_sec,
        }
    }

    pub fn player_hp(&self) -> f64 {
        self.player_hp
    }

    pub fn enemy_hp(&self) -> f64 {
        self.enemy_hp
    }

    pub fn is_draining(&self) -> bool {
        self.is_draining
    }

    pub fn start_drain(&mut self, now_ms: f64) {
        self.is_draining = true;
        self.last_drain_ms = Some(now_ms);
    }

    pub fn stop_drain(&mut self) {
        self.is_draining = false;
        self.last_drain_ms = None;
    }

    /// Apply the drain for the time elapsed since the last call and return the
    /// new player HP, or `None` when not draining (or time went backwards).
    pub fn drain(&mut self, now_ms: f64) -> Option<f64> {
        if !self.is_draining {
            return None;
        }
        let last = self.last_drain_ms.replace(now_ms)?;
        let elapsed_ms = now_ms - last;
        if elapsed_ms <= 0.0 {
            // keep the older mark so a stale timestamp cannot refund HP
            self.last_drain_ms = Some(last);
            return None;
        }
        let loss = self.drain_rate_hp_per_sec * elapsed_ms / 1000.0;
        self.player_hp = (self.player_hp - loss).max(0.0);
        Some(self.player_hp)
    }

    pub fn player_down(&self) -> bool {
        self.player_hp <= 0.0
    }

    /// The counterattack is a guaranteed kill.
    pub fn counterattack(&mut self) {
        debug!(player_hp = self.player_hp, "counterattack lands");
        self.enemy_hp = 0.0;
    }
}
