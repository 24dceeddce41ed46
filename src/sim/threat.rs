//! Threat awareness and pursuit
//!
//! Awareness is a leaky integrator fed by player noise. It is continuous, but
//! behavior falls into three bands that decide how the next target is chosen.
//! Targets are re-chosen on a wall-clock timer while steering runs every frame.

use glam::Vec3;
use rand::Rng;

use super::state::{Player, Threat};
use crate::consts::REFERENCE_FPS;
use crate::tuning::Tuning;
use crate::{bearing, bearing_to_dir, flatten};

/// Closest distance used for inverse-distance gain (avoids dividing by zero)
const MIN_HEARING_DISTANCE: f32 = 1e-3;

/// Behavioral band of the awareness scalar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AwarenessBand {
    /// Wander randomly
    Unaware,
    /// Drift toward the player's general direction
    Suspicious,
    /// Head straight for the player
    Hunting,
}

impl AwarenessBand {
    pub fn classify(awareness: f32, tuning: &Tuning) -> Self {
        if awareness > tuning.hunting_threshold {
            AwarenessBand::Hunting
        } else if awareness > tuning.suspicious_threshold {
            AwarenessBand::Suspicious
        } else {
            AwarenessBand::Unaware
        }
    }
}

/// What happened to the threat this frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThreatUpdate {
    /// Threat-player distance measured before steering
    pub distance: f32,
    /// New target, if the retarget timer fired
    pub retargeted: Option<Vec3>,
    /// Player is inside the detection radius
    pub caught: bool,
}

impl Threat {
    pub fn band(&self, tuning: &Tuning) -> AwarenessBand {
        AwarenessBand::classify(self.awareness, tuning)
    }

    /// Integrate player noise into awareness; result is clamped to [0, 1]
    pub fn hear(&mut self, player_speed: f32, distance: f32, dt: f32, tuning: &Tuning) {
        let noisy = player_speed > tuning.noise_threshold && distance < tuning.hearing_range;
        let delta = if noisy {
            dt * (1.0 / distance.max(MIN_HEARING_DISTANCE)) * tuning.awareness_gain
        } else {
            -dt * tuning.awareness_decay
        };

        let next = self.awareness + delta;
        self.awareness = if next.is_nan() { 0.0 } else { next.clamp(0.0, 1.0) };
    }

    /// Whether the wall-clock retarget timer has elapsed
    pub fn retarget_due(&self, now_ms: f64) -> bool {
        match self.last_retarget_ms {
            None => true,
            Some(last) => now_ms - last > self.move_interval_ms,
        }
    }

    /// Choose a new steering target for the current awareness band
    pub fn choose_target(&self, player_position: Vec3, rng: &mut impl Rng, tuning: &Tuning) -> Vec3 {
        match self.band(tuning) {
            AwarenessBand::Hunting => player_position,
            AwarenessBand::Suspicious => {
                let spread = tuning.suspicious_spread;
                let theta = bearing(self.position, player_position) + rng.random_range(-spread..spread);
                let (min, max) = tuning.suspicious_distance;
                self.position + bearing_to_dir(theta) * rng.random_range(min..max)
            }
            AwarenessBand::Unaware => {
                let theta = rng.random_range(0.0..std::f32::consts::TAU);
                let (min, max) = tuning.wander_distance;
                self.position + bearing_to_dir(theta) * rng.random_range(min..max)
            }
        }
    }

    /// Step toward the target on the horizontal plane without overshooting
    pub fn steer(&mut self, dt: f32) {
        let to_target = flatten(self.target - self.position);
        let remaining = to_target.length();
        let step = (self.speed * dt * REFERENCE_FPS).min(remaining);
        self.position += to_target.normalize_or_zero() * step;
    }

    /// One frame of awareness, retargeting, steering and capture detection
    pub fn update(
        &mut self,
        player: &Player,
        now_ms: f64,
        dt: f32,
        rng: &mut impl Rng,
        tuning: &Tuning,
    ) -> ThreatUpdate {
        let distance = self.position.distance(player.position);

        self.hear(player.speed(), distance, dt, tuning);

        let retargeted = if self.retarget_due(now_ms) {
            self.last_retarget_ms = Some(now_ms);
            self.target = self.choose_target(player.position, rng, tuning);
            log::debug!(
                "Threat retarget ({:?}, awareness {:.2}) -> {:?}",
                self.band(tuning),
                self.awareness,
                self.target
            );
            Some(self.target)
        } else {
            None
        };

        self.steer(dt);

        ThreatUpdate {
            distance,
            retargeted,
            caught: distance < self.detection_radius,
        }
    }
}
