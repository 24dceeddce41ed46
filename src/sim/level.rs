//! Standard maze layout
//!
//! Produces the collision geometry only; meshes, materials and lights are the
//! renderer's business. A renderer can mirror [`CollisionWorld::colliders`].

use glam::Vec3;
use rand::Rng;

use super::collision::{Aabb, Collider, CollisionWorld};

/// Floor is a 30x30 slab just below y = 0
pub const FLOOR_SIZE: f32 = 30.0;
pub const WALL_HEIGHT: f32 = 3.0;
pub const WALL_THICKNESS: f32 = 0.2;
/// Clutter boxes are scattered over [-CLUTTER_SPREAD, CLUTTER_SPREAD]²
pub const CLUTTER_SPREAD: f32 = 10.0;
pub const CLUTTER_ATTEMPTS: usize = 10;
/// Clutter whose centre is within this distance of the origin on both axes is skipped
pub const CLEAR_START_AREA: f32 = 2.0;

/// Wall footprints as (center x, center z, width along X, depth along Z)
const WALLS: [(f32, f32, f32, f32); 8] = [
    // Main corridors
    (-5.0, 0.0, 10.0, WALL_THICKNESS),
    (5.0, 0.0, 10.0, WALL_THICKNESS),
    (0.0, -5.0, WALL_THICKNESS, 10.0),
    (0.0, 5.0, WALL_THICKNESS, 10.0),
    // Inner maze walls
    (-2.5, 2.0, 5.0, WALL_THICKNESS),
    (2.5, -2.0, 5.0, WALL_THICKNESS),
    (-3.0, -3.0, WALL_THICKNESS, 4.0),
    (3.0, 3.0, WALL_THICKNESS, 4.0),
];

/// A wall standing on the floor
pub fn wall(x: f32, z: f32, width: f32, depth: f32, height: f32) -> Collider {
    Collider::solid(Aabb::from_center_size(
        Vec3::new(x, height / 2.0, z),
        Vec3::new(width, height, depth),
    ))
}

/// Build the standard level; clutter placement draws from `rng`
pub fn build_level(rng: &mut impl Rng) -> CollisionWorld {
    let mut world = CollisionWorld::new();

    let half = FLOOR_SIZE / 2.0;
    world.add(Collider::solid(Aabb::new(
        Vec3::new(-half, -0.1, -half),
        Vec3::new(half, 0.0, half),
    )));

    for (x, z, width, depth) in WALLS {
        world.add(wall(x, z, width, depth, WALL_HEIGHT));
    }

    for _ in 0..CLUTTER_ATTEMPTS {
        let size = rng.random_range(0.5..1.0);
        let x = rng.random_range(-CLUTTER_SPREAD..CLUTTER_SPREAD);
        let z = rng.random_range(-CLUTTER_SPREAD..CLUTTER_SPREAD);

        if x.abs() < CLEAR_START_AREA && z.abs() < CLEAR_START_AREA {
            continue; // keep the starting area clear
        }

        world.add(Collider::solid(Aabb::from_center_size(
            Vec3::new(x, size, z),
            Vec3::new(size, size * 2.0, size),
        )));
    }

    log::debug!("Built level with {} colliders", world.len());
    world
}
