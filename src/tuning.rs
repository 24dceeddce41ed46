//! Data-driven game balance
//!
//! Every gameplay constant lives here so a session can be reproduced from a
//! seed plus a tuning file. Defaults come from [`crate::consts`].

use glam::Vec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;

/// Reasons a tuning file is rejected
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("tuning file is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("block distance {block} must be in [0, probe distance {probe})")]
    ProbeBounds { block: f32, probe: f32 },
    #[error("{name} range [{min}, {max}) is empty or negative")]
    BadRange { name: &'static str, min: f32, max: f32 },
    #[error("{name} must be positive, got {value}")]
    NotPositive { name: &'static str, value: f64 },
    #[error("{name} must be finite and not negative, got {value}")]
    Negative { name: &'static str, value: f32 },
    #[error("awareness thresholds out of order: suspicious {suspicious}, hunting {hunting}")]
    Thresholds { suspicious: f32, hunting: f32 },
    #[error("ambient chance {0} is not a probability")]
    Probability(f64),
}

/// Gameplay balance for one session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Frame ===
    pub max_frame_delta: f32,

    // === Player ===
    pub player_speed: f32,
    pub player_spawn: Vec3,
    pub probe_distance: f32,
    pub block_distance: f32,

    // === Threat ===
    pub threat_spawn: Vec3,
    pub threat_speed: f32,
    pub move_interval_ms: f64,
    pub detection_radius: f32,
    pub suspicious_threshold: f32,
    pub hunting_threshold: f32,
    pub noise_threshold: f32,
    pub hearing_range: f32,
    pub awareness_gain: f32,
    pub awareness_decay: f32,
    pub wander_distance: (f32, f32),
    pub suspicious_distance: (f32, f32),
    pub suspicious_spread: f32,

    // === Goal ===
    pub goal_position: Vec3,
    pub win_radius: f32,

    // === Feedback ===
    pub indicator_max_distance: f32,
    pub ambient_chance: f64,
    pub ambient_radius: (f32, f32),
    pub ambient_height: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            max_frame_delta: MAX_FRAME_DELTA,

            player_speed: PLAYER_SPEED,
            player_spawn: PLAYER_SPAWN,
            probe_distance: PROBE_DISTANCE,
            block_distance: BLOCK_DISTANCE,

            threat_spawn: THREAT_SPAWN,
            threat_speed: THREAT_SPEED,
            move_interval_ms: THREAT_MOVE_INTERVAL_MS,
            detection_radius: THREAT_DETECTION_RADIUS,
            suspicious_threshold: SUSPICIOUS_THRESHOLD,
            hunting_threshold: HUNTING_THRESHOLD,
            noise_threshold: NOISE_THRESHOLD,
            hearing_range: HEARING_RANGE,
            awareness_gain: AWARENESS_GAIN,
            awareness_decay: AWARENESS_DECAY,
            wander_distance: WANDER_DISTANCE,
            suspicious_distance: SUSPICIOUS_DISTANCE,
            suspicious_spread: SUSPICIOUS_SPREAD,

            goal_position: GOAL_POSITION,
            win_radius: WIN_RADIUS,

            indicator_max_distance: INDICATOR_MAX_DISTANCE,
            ambient_chance: AMBIENT_CHANCE,
            ambient_radius: AMBIENT_RADIUS,
            ambient_height: AMBIENT_HEIGHT,
        }
    }
}

impl Tuning {
    /// Parse and validate a JSON tuning file. Missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Self = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Check the invariants the simulation relies on
    pub fn validate(&self) -> Result<(), TuningError> {
        if !(0.0 <= self.block_distance && self.block_distance < self.probe_distance) {
            return Err(TuningError::ProbeBounds {
                block: self.block_distance,
                probe: self.probe_distance,
            });
        }

        for (name, (min, max)) in [
            ("wander_distance", self.wander_distance),
            ("suspicious_distance", self.suspicious_distance),
            ("ambient_radius", self.ambient_radius),
        ] {
            if !(min >= 0.0 && min < max) {
                return Err(TuningError::BadRange { name, min, max });
            }
        }

        for (name, value) in [
            ("max_frame_delta", self.max_frame_delta as f64),
            ("player_speed", self.player_speed as f64),
            ("threat_speed", self.threat_speed as f64),
            ("move_interval_ms", self.move_interval_ms),
            ("detection_radius", self.detection_radius as f64),
            ("win_radius", self.win_radius as f64),
            ("indicator_max_distance", self.indicator_max_distance as f64),
            ("hearing_range", self.hearing_range as f64),
            ("suspicious_spread", self.suspicious_spread as f64),
        ] {
            if !(value > 0.0) {
                return Err(TuningError::NotPositive { name, value });
            }
        }

        for (name, value) in [
            ("noise_threshold", self.noise_threshold),
            ("awareness_gain", self.awareness_gain),
            ("awareness_decay", self.awareness_decay),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(TuningError::Negative { name, value });
            }
        }

        if !(0.0 <= self.suspicious_threshold
            && self.suspicious_threshold < self.hunting_threshold
            && self.hunting_threshold <= 1.0)
        {
            return Err(TuningError::Thresholds {
                suspicious: self.suspicious_threshold,
                hunting: self.hunting_threshold,
            });
        }

        if !(0.0..=1.0).contains(&self.ambient_chance) {
            return Err(TuningError::Probability(self.ambient_chance));
        }

        Ok(())
    }

    /// Load from the JSON file named by `DARK_PURSUIT_TUNING`, falling back to defaults
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from_env() -> Self {
        let Ok(path) = std::env::var("DARK_PURSUIT_TUNING") else {
            return Self::default();
        };

        match std::fs::read_to_string(&path) {
            Ok(json) => match Self::from_json(&json) {
                Ok(tuning) => {
                    log::info!("Loaded tuning from {}", path);
                    tuning
                }
                Err(e) => {
                    log::warn!("Ignoring tuning file {}: {}", path, e);
                    Self::default()
                }
            },
            Err(e) => {
                log::warn!("Cannot read tuning file {}: {}", path, e);
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(Tuning::default().validate().is_ok());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let tuning = Tuning::from_json(r#"{ "threat_speed": 0.1, "win_radius": 2.0 }"#).unwrap();
        assert_eq!(tuning.threat_speed, 0.1);
        assert_eq!(tuning.win_radius, 2.0);
        assert_eq!(tuning.detection_radius, THREAT_DETECTION_RADIUS);
        assert_eq!(tuning.goal_position, GOAL_POSITION);
    }

    #[test]
    fn rejects_block_distance_beyond_probe() {
        let err = Tuning::from_json(r#"{ "probe_distance": 0.5, "block_distance": 0.5 }"#)
            .unwrap_err();
        assert!(matches!(err, TuningError::ProbeBounds { .. }));
    }

    #[test]
    fn rejects_negative_probe_bounds() {
        let err = Tuning::from_json(r#"{ "probe_distance": -0.1, "block_distance": -0.5 }"#)
            .unwrap_err();
        assert!(matches!(err, TuningError::ProbeBounds { .. }));
    }

    #[test]
    fn rejects_empty_suspicious_spread() {
        for spread in ["0.0", "-0.5"] {
            let json = format!(r#"{{ "suspicious_spread": {spread} }}"#);
            assert!(matches!(
                Tuning::from_json(&json),
                Err(TuningError::NotPositive { name: "suspicious_spread", .. })
            ));
        }
    }

    #[test]
    fn rejects_negative_hearing_terms() {
        for name in ["noise_threshold", "awareness_gain", "awareness_decay"] {
            let json = format!(r#"{{ "{name}": -0.01 }}"#);
            match Tuning::from_json(&json) {
                Err(TuningError::Negative { name: rejected, .. }) => assert_eq!(rejected, name),
                other => panic!("{name}: expected rejection, got {other:?}"),
            }
        }

        let mut tuning = Tuning::default();
        tuning.awareness_gain = f32::INFINITY;
        assert!(matches!(
            tuning.validate(),
            Err(TuningError::Negative { name: "awareness_gain", .. })
        ));
    }

    #[test]
    fn rejects_inverted_range() {
        let mut tuning = Tuning::default();
        tuning.wander_distance = (7.0, 2.0);
        assert!(matches!(
            tuning.validate(),
            Err(TuningError::BadRange { name: "wander_distance", .. })
        ));
    }

    #[test]
    fn rejects_thresholds_out_of_order() {
        let mut tuning = Tuning::default();
        tuning.suspicious_threshold = 0.8;
        assert!(matches!(tuning.validate(), Err(TuningError::Thresholds { .. })));
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(Tuning::from_json("not json"), Err(TuningError::Parse(_))));
    }
}
