//! Session state and core simulation types
//!
//! One [`GameSession`] owns everything a play-through mutates.

use glam::Vec3;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::collision::{CollisionProbe, CollisionWorld};
use super::level::build_level;
use super::movement::CameraPose;
use crate::tuning::Tuning;

/// Session lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPhase {
    /// Nothing started yet (start screen)
    #[default]
    Idle,
    /// Frames are being simulated
    Active,
    /// Player reached the goal
    Won,
    /// Threat caught the player
    Lost,
}

impl SessionPhase {
    pub fn is_active(self) -> bool {
        self == SessionPhase::Active
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, SessionPhase::Won | SessionPhase::Lost)
    }
}

/// The player is the camera
#[derive(Debug, Clone)]
pub struct Player {
    pub position: Vec3,
    /// Velocity intent of the current frame (zero when no key is held)
    pub velocity: Vec3,
    pub camera: CameraPose,
}

impl Player {
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            velocity: Vec3::ZERO,
            camera: CameraPose::default(),
        }
    }

    /// How loud the player currently is
    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }
}

/// The pursuer
#[derive(Debug, Clone)]
pub struct Threat {
    pub position: Vec3,
    /// Where the threat is currently steering
    pub target: Vec3,
    /// 0 = oblivious, 1 = locked on; always within [0, 1]
    pub awareness: f32,
    pub speed: f32,
    pub move_interval_ms: f64,
    pub detection_radius: f32,
    /// Wall-clock time of the last retarget (None = retarget on next update)
    pub last_retarget_ms: Option<f64>,
}

impl Threat {
    pub fn spawn(tuning: &Tuning) -> Self {
        Self {
            position: tuning.threat_spawn,
            target: tuning.threat_spawn,
            awareness: 0.0,
            speed: tuning.threat_speed,
            move_interval_ms: tuning.move_interval_ms,
            detection_radius: tuning.detection_radius,
            last_retarget_ms: None,
        }
    }
}

/// Escape point
#[derive(Debug, Clone, Copy)]
pub struct Goal {
    pub position: Vec3,
}

/// Something the frame orchestrator must react to
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GameEvent {
    /// Player position was committed; camera and listener follow
    PlayerMoved { position: Vec3, forward: Vec3 },
    /// Candidate position rejected by the collision probe
    MoveBlocked { candidate: Vec3 },
    /// Threat picked a new destination
    ThreatRetargeted { target: Vec3, awareness: f32 },
    /// Play a random environmental sound here
    AmbientSound { position: Vec3, variant: u32 },
    /// Threat reached the player
    Caught { player_position: Vec3 },
    /// Player reached the goal
    Escaped,
}

/// Complete state of one play-through
#[derive(Debug, Clone)]
pub struct GameSession {
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    pub phase: SessionPhase,
    pub tuning: Tuning,
    pub player: Player,
    pub threat: Threat,
    pub goal: Goal,
    pub level: CollisionWorld,
    pub probe: CollisionProbe,
    /// Simulated frames
    pub frames: u64,
    /// Simulated (clamped) seconds
    pub elapsed: f32,
}

impl GameSession {
    /// Fresh level, player, threat and goal. The session starts `Idle`.
    pub fn new(seed: u64, tuning: Tuning) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let level = build_level(&mut rng);

        Self {
            seed,
            rng,
            phase: SessionPhase::Idle,
            player: Player::new(tuning.player_spawn),
            threat: Threat::spawn(&tuning),
            goal: Goal {
                position: tuning.goal_position,
            },
            level,
            probe: CollisionProbe::new(tuning.probe_distance, tuning.block_distance),
            tuning,
            frames: 0,
            elapsed: 0.0,
        }
    }

    pub fn is_active(&self) -> bool {
        self.phase.is_active()
    }

    pub fn threat_distance(&self) -> f32 {
        self.threat.position.distance(self.player.position)
    }

    pub fn goal_distance(&self) -> f32 {
        self.goal.position.distance(self.player.position)
    }
}
