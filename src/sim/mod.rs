//! Simulation module
//!
//! All gameplay logic lives here. This module must stay free of platform code:
//! - Seeded RNG only
//! - Time arrives as arguments (frame delta and wall-clock ms)
//! - No rendering, audio or DOM dependencies

pub mod ambient;
pub mod collision;
pub mod level;
pub mod movement;
pub mod state;
pub mod threat;
pub mod tick;

pub use ambient::roll_ambient;
pub use collision::{Aabb, Collider, CollisionProbe, CollisionWorld, PROBE_DIRECTIONS, RayCaster};
pub use level::build_level;
pub use movement::{CameraPose, KeyStates, MoveKey, MoveOutcome, movement_intent, resolve_movement};
pub use state::{GameEvent, GameSession, Goal, Player, SessionPhase, Threat};
pub use threat::{AwarenessBand, ThreatUpdate};
pub use tick::{TickInput, clamp_frame_delta, tick};
