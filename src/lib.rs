//! Dark Pursuit - A first-person audio horror maze
//!
//! Core modules:
//! - `sim`: Simulation (collision probe, movement, threat pursuit, session state)
//! - `game`: Frame orchestration and session lifecycle
//! - `audio`: Spatial audio feedback and the proximity cue
//! - `platform`: Frame scheduling seam
//! - `renderer`: Scene rendering seam
//! - `ui`: Screen controller seam
//! - `tuning`: Data-driven game balance
//! - `settings`: Player preferences

pub mod audio;
pub mod game;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;
pub mod tuning;
pub mod ui;

pub use game::Game;
pub use settings::Settings;
pub use tuning::{Tuning, TuningError};

use glam::Vec3;

/// Game configuration constants (defaults for [`Tuning`])
pub mod consts {
    use glam::Vec3;

    /// Frame delta cap (seconds) so tab stalls don't teleport entities
    pub const MAX_FRAME_DELTA: f32 = 0.1;
    /// Movement is authored against a 60 fps reference frame
    pub const REFERENCE_FPS: f32 = 60.0;

    /// Player defaults
    pub const PLAYER_SPEED: f32 = 0.08; // slow movement for vulnerability
    pub const EYE_HEIGHT: f32 = 1.6;
    pub const PLAYER_SPAWN: Vec3 = Vec3::new(1.0, EYE_HEIGHT, 1.0);

    /// Collision probe
    pub const PROBE_DISTANCE: f32 = 0.5;
    pub const BLOCK_DISTANCE: f32 = 0.3;

    /// Threat defaults - spawns in the far corner of the player's quadrant
    pub const THREAT_SPAWN: Vec3 = Vec3::new(10.0, 1.0, 10.0);
    pub const THREAT_SPEED: f32 = 0.05;
    pub const THREAT_MOVE_INTERVAL_MS: f64 = 2000.0;
    pub const THREAT_DETECTION_RADIUS: f32 = 3.0;

    /// Awareness model
    pub const SUSPICIOUS_THRESHOLD: f32 = 0.3;
    pub const HUNTING_THRESHOLD: f32 = 0.7;
    /// Player speed below this is silent
    pub const NOISE_THRESHOLD: f32 = 0.01;
    /// Footsteps further than this are never heard
    pub const HEARING_RANGE: f32 = 8.0;
    pub const AWARENESS_GAIN: f32 = 0.1;
    pub const AWARENESS_DECAY: f32 = 0.02;

    /// Retarget distances (units)
    pub const WANDER_DISTANCE: (f32, f32) = (2.0, 7.0);
    pub const SUSPICIOUS_DISTANCE: (f32, f32) = (5.0, 10.0);
    /// Half-width of the bearing perturbation while suspicious (radians, 45°)
    pub const SUSPICIOUS_SPREAD: f32 = std::f32::consts::FRAC_PI_4;

    /// Goal / escape point in the far corner of the map
    pub const GOAL_POSITION: Vec3 = Vec3::new(-12.0, 1.0, -12.0);
    pub const WIN_RADIUS: f32 = 1.5;

    /// Proximity indicator fades out beyond this distance
    pub const INDICATOR_MAX_DISTANCE: f32 = 15.0;

    /// Ambient one-shots
    pub const AMBIENT_CHANCE: f64 = 0.005; // 0.5% per frame
    pub const AMBIENT_RADIUS: (f32, f32) = (5.0, 15.0);
    pub const AMBIENT_HEIGHT: f32 = 1.0;
}

/// Unit vector on the horizontal plane for a bearing measured from +X toward +Z
#[inline]
pub fn bearing_to_dir(theta: f32) -> Vec3 {
    Vec3::new(theta.cos(), 0.0, theta.sin())
}

/// Bearing (radians, from +X toward +Z) from `from` to `to` on the horizontal plane
#[inline]
pub fn bearing(from: Vec3, to: Vec3) -> f32 {
    (to.z - from.z).atan2(to.x - from.x)
}

/// Drop the vertical component
#[inline]
pub fn flatten(v: Vec3) -> Vec3 {
    Vec3::new(v.x, 0.0, v.z)
}
