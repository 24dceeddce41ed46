//! Random environmental one-shots around the player

use glam::Vec3;
use rand::Rng;

use super::state::GameEvent;
use crate::bearing_to_dir;
use crate::tuning::Tuning;

/// Roll the per-frame ambient chance; on success pick a fresh point on the
/// annulus around the player and a variant used to choose the sound.
pub fn roll_ambient(player_position: Vec3, rng: &mut impl Rng, tuning: &Tuning) -> Option<GameEvent> {
    let chance = tuning.ambient_chance;
    if !(chance > 0.0) || !rng.random_bool(chance.min(1.0)) {
        return None;
    }

    let theta = rng.random_range(0.0..std::f32::consts::TAU);
    let (min, max) = tuning.ambient_radius;
    let offset = bearing_to_dir(theta) * rng.random_range(min..max);
    let position = Vec3::new(
        player_position.x + offset.x,
        tuning.ambient_height,
        player_position.z + offset.z,
    );

    Some(GameEvent::AmbientSound {
        position,
        variant: rng.random(),
    })
}
