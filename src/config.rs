//! Per-variant tuning. The three games share one state machine and differ only
//! in the numbers and copy held here.

use serde::{Deserialize, Serialize};

use crate::classifier::MouthOpenClassifier;
use crate::debounce::DEFAULT_SUSTAIN_MS;
use crate::error::{Error, Result};
use crate::landmarks::LandmarkLayout;

/// The three shipped minigames.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Variant {
    /// Toast with a senior colleague: drink on cue.
    Cheers,
    /// Save the world by downing the potion.
    World,
    /// HP race against a boss; open wide for an ice counterattack.
    Battle,
}

impl Variant {
    pub const ALL: [Variant; 3] = [Variant::Cheers, Variant::World, Variant::Battle];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cheers => "cheers",
            Self::World => "world",
            Self::Battle => "battle",
        }
    }

    pub fn parse(name: &str) -> Option<Variant> {
        Self::ALL.into_iter().find(|v| v.as_str() == name)
    }
}

/// Player-facing copy for one variant.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Messages {
    pub initial: String,
    pub countdown: String,
    pub action: String,
    pub win: String,
    pub lose: String,
    /// Shown when the battle counterattack lands.
    pub critical: String,
}

impl Default for Messages {
    fn default() -> Self {
        Self {
            initial: "Press start when you are ready!".into(),
            countdown: "On three...".into(),
            action: "Now! Open wide!".into(),
            win: String::new(),
            lose: "Game over...".into(),
            critical: String::new(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GameConfig {
    /// Inner-lip gap (pixels) above which the mouth counts as open.
    pub mouth_open_threshold: f64,
    /// How long the mouth must stay open before it counts (ms).
    pub sustain_ms: f64,
    pub countdown_seconds: u32,
    /// Player HP lost per second while the battle runs. Zero disables the drain.
    pub drain_rate_hp_per_sec: f64,
    /// Detector polling cadence (ms).
    pub poll_interval_ms: u32,
    pub layout: LandmarkLayout,
    /// Clip played between pressing start and the countdown.
    pub intro_media: Option<String>,
    /// Media swapped in after a win.
    pub win_media: Option<String>,
    pub messages: Messages,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            mouth_open_threshold: 20.0,
            sustain_ms: DEFAULT_SUSTAIN_MS,
            countdown_seconds: 3,
            drain_rate_hp_per_sec: 0.0,
            poll_interval_ms: 100,
            layout: LandmarkLayout::Mouth20,
            intro_media: None,
            win_media: None,
            messages: Messages::default(),
        }
    }
}

impl GameConfig {
    pub fn preset(variant: Variant) -> Self {
        match variant {
            Variant::Cheers => Self {
                intro_media: Some("assets/izakaya.mp4".into()),
                messages: Messages {
                    initial: "You're an office worker and your idol senpai just invited you out for drinks!\nPress start when you're ready!".into(),
                    countdown: "Ready... set...".into(),
                    action: "Now! Drink up and toast with a smile!".into(),
                    win: "Cheers!".into(),
                    ..Messages::default()
                },
                ..Self::default()
            },
            Variant::World => Self {
                intro_media: Some("assets/intro.mp4".into()),
                win_media: Some("assets/lastboss2.png".into()),
                messages: Messages {
                    initial: "You alone carry the fate of the world. Only by drinking the poison in your hand can it be saved. Press start when ready.".into(),
                    countdown: "Ready... set...".into(),
                    action: "Now! Drink the poison!!".into(),
                    win: "The world is saved.".into(),
                    ..Messages::default()
                },
                ..Self::default()
            },
            Variant::Battle => Self {
                mouth_open_threshold: 30.0,
                drain_rate_hp_per_sec: 6.0,
                win_media: Some("assets/boss2.png".into()),
                messages: Messages {
                    initial: "Once you've taken the potion, open your mouth to unleash an ice attack!".into(),
                    countdown: "Ready... set...".into(),
                    action: "Open your mouth to attack!".into(),
                    win: "You won!".into(),
                    critical: "Critical hit! The enemy is down!".into(),
                    ..Messages::default()
                },
                ..Self::default()
            },
        }
    }

    /// Overlay a (possibly partial) JSON document onto the variant preset.
    ///
    /// Objects merge key by key at every depth, so `{"messages": {"win": ".."}}`
    /// keeps the rest of the preset copy. Keys the config does not have are
    /// rejected.
    pub fn from_json(variant: Variant, json: &str) -> Result<Self> {
        let mut base = serde_json::to_value(Self::preset(variant))?;
        let patch: serde_json::Value = serde_json::from_str(json)?;
        if !patch.is_object() {
            return Err(Error::InvalidConfig("config must be a JSON object".into()));
        }
        merge(&mut base, patch, "")?;
        let cfg: Self = serde_json::from_value(base)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.mouth_open_threshold.is_finite() || self.mouth_open_threshold <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "mouthOpenThreshold must be positive, got {}",
                self.mouth_open_threshold
            )));
        }
        if !self.sustain_ms.is_finite() || self.sustain_ms < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "sustainMs must be non-negative, got {}",
                self.sustain_ms
            )));
        }
        if self.countdown_seconds == 0 {
            return Err(Error::InvalidConfig("countdownSeconds must be at least 1".into()));
        }
        if !self.drain_rate_hp_per_sec.is_finite() || self.drain_rate_hp_per_sec < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "drainRateHpPerSec must be non-negative, got {}",
                self.drain_rate_hp_per_sec
            )));
        }
        if self.poll_interval_ms == 0 {
            return Err(Error::InvalidConfig("pollIntervalMs must be at least 1".into()));
        }
        Ok(())
    }

    pub fn classifier(&self) -> MouthOpenClassifier {
        MouthOpenClassifier::new(self.mouth_open_threshold, self.layout)
    }
}

fn merge(base: &mut serde_json::Value, patch: serde_json::Value, path: &str) -> Result<()> {
    use serde_json::Value;

    let Value::Object(fields) = patch else {
        *base = patch;
        return Ok(());
    };
    let Value::Object(target) = base else {
        return Err(Error::InvalidConfig(format!("'{path}' is not an object")));
    };
    for (key, value) in fields {
        let key_path = if path.is_empty() { key.clone() } else { format!("{path}.{key}") };
        let Some(slot) = target.get_mut(&key) else {
            return Err(Error::InvalidConfig(format!("unknown config key '{key_path}'")));
        };
        if slot.is_object() {
            merge(slot, value, &key_path)?;
        } else {
            *slot = value;
        }
    }
    Ok(())
}

/// One config per variant; read at view entry.
#[derive(Clone, Debug, PartialEq)]
pub struct ConfigSet {
    cheers: GameConfig,
    world: GameConfig,
    battle: GameConfig,
}

impl Default for ConfigSet {
    fn default() -> Self {
        Self {
            cheers: GameConfig::preset(Variant::Cheers),
            world: GameConfig::preset(Variant::World),
            battle: GameConfig::preset(Variant::Battle),
        }
    }
}

impl ConfigSet {
    pub fn get(&self, variant: Variant) -> &GameConfig {
        match variant {
            Variant::Cheers => &self.cheers,
            Variant::World => &self.world,
            Variant::Battle => &self.battle,
        }
    }

    pub fn set(&mut self, variant: Variant, config: GameConfig) -> Result<()> {
        config.validate()?;
        match variant {
            Variant::Cheers => self.cheers = config,
            Variant::World => self.world = config,
            Variant::Battle => self.battle = config,
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_differ_only_where_the_games_do() {
        let cheers = GameConfig::preset(Variant::Cheers);
        let battle = GameConfig::preset(Variant::Battle);
        assert_eq!(cheers.mouth_open_threshold, 20.0);
        assert_eq!(battle.mouth_open_threshold, 30.0);
        assert_eq!(cheers.sustain_ms, battle.sustain_ms);
        assert_eq!(cheers.countdown_seconds, 3);
        assert_eq!(battle.drain_rate_hp_per_sec, 6.0);
        assert!(battle.intro_media.is_none());
        for v in Variant::ALL {
            GameConfig::preset(v).validate().unwrap();
        }
    }

    #[test]
    fn json_overlay_keeps_unspecified_fields() {
        let cfg = GameConfig::from_json(Variant::Battle, r#"{"drainRateHpPerSec": 5.0}"#).unwrap();
        assert_eq!(cfg.drain_rate_hp_per_sec, 5.0);
        assert_eq!(cfg.mouth_open_threshold, 30.0);
        assert_eq!(cfg.win_media.as_deref(), Some("assets/boss2.png"));
    }

    #[test]
    fn json_overlay_rejects_bad_values() {
        assert!(matches!(
            GameConfig::from_json(Variant::Cheers, r#"{"countdownSeconds": 0}"#),
            Err(Error::InvalidConfig(_))
        ));
        assert!(matches!(
            GameConfig::from_json(Variant::Cheers, r#"{"mouthOpenThreshold": -1}"#),
            Err(Error::InvalidConfig(_))
        ));
        assert!(matches!(
            GameConfig::from_json(Variant::Cheers, "[1, 2]"),
            Err(Error::InvalidConfig(_))
        ));
        assert!(matches!(
            GameConfig::from_json(Variant::Cheers, "{not json"),
            Err(Error::Json(_))
        ));
    }

    #[test]
    fn partial_messages_keep_the_preset_copy() {
        let preset = GameConfig::preset(Variant::Battle);
        let cfg = GameConfig::from_json(Variant::Battle, r#"{"messages": {"win": "Victory"}}"#).unwrap();
        assert_eq!(cfg.messages.win, "Victory");
        assert_eq!(cfg.messages.critical, preset.messages.critical);
        assert_eq!(cfg.messages.initial, preset.messages.initial);
        assert_eq!(cfg.mouth_open_threshold, 30.0);
    }

    #[test]
    fn misspelled_keys_are_rejected() {
        match GameConfig::from_json(Variant::Cheers, r#"{"mouthOpenThreshhold": 25}"#) {
            Err(Error::InvalidConfig(msg)) => assert!(msg.contains("mouthOpenThreshhold")),
            other => panic!("unexpected {other:?}"),
        }
        match GameConfig::from_json(Variant::Battle, r#"{"messages": {"critcal": "Boom"}}"#) {
            Err(Error::InvalidConfig(msg)) => assert!(msg.contains("messages.critcal")),
            other => panic!("unexpected {other:?}"),
        }
        let cfg = GameConfig::from_json(Variant::World, r#"{"introMedia": null}"#).unwrap();
        assert!(cfg.intro_media.is_none());
    }

    #[test]
    fn variant_names_round_trip() {
        for v in Variant::ALL {
            assert_eq!(Variant::parse(v.as_str()), Some(v));
        }
        assert_eq!(Variant::parse("menu"), None);
    }

    #[test]
    fn config_set_validates_on_set() {
        let mut set = ConfigSet::default();
        let bad = GameConfig {
            poll_interval_ms: 0,
            ..GameConfig::default()
        };
        assert!(set.set(Variant::World, bad).is_err());
        assert_eq!(set.get(Variant::World), &GameConfig::preset(Variant::World));
    }
}
