//! Directional collision probe against static level geometry
//!
//! The player is approximated by four short axis-aligned rays instead of a
//! proper circular volume. Rays miss box corners, so the player can slip
//! diagonally along walls. That approximation is kept on purpose.

use glam::Vec3;
use serde::Serialize;

/// Probe directions: +X, -X, +Z, -Z
pub const PROBE_DIRECTIONS: [Vec3; 4] = [Vec3::X, Vec3::NEG_X, Vec3::Z, Vec3::NEG_Z];

/// Axis-aligned box
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self {
            min: min.min(max),
            max: min.max(max),
        }
    }

    /// Box of `size` centred on `center`
    pub fn from_center_size(center: Vec3, size: Vec3) -> Self {
        let half = size.abs() / 2.0;
        Self::new(center - half, center + half)
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) / 2.0
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    pub fn contains(&self, point: Vec3) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }

    /// Distance along `dir` at which a ray from `origin` enters this box.
    ///
    /// Only faces approached from outside count: a ray that starts inside the
    /// box never hits it. A ray starting on a face and heading inward hits at
    /// distance 0. Returns `None` outside `[near, far]`.
    pub fn ray_entry(&self, origin: Vec3, dir: Vec3, near: f32, far: f32) -> Option<f32> {
        let mut t_enter = f32::NEG_INFINITY;
        let mut t_exit = f32::INFINITY;

        for axis in 0..3 {
            let o = origin[axis];
            let d = dir[axis];
            let (lo, hi) = (self.min[axis], self.max[axis]);

            if d == 0.0 {
                // Parallel: must already be within the slab
                if o < lo || o > hi {
                    return None;
                }
                continue;
            }

            let t1 = (lo - o) / d;
            let t2 = (hi - o) / d;
            t_enter = t_enter.max(t1.min(t2));
            t_exit = t_exit.min(t1.max(t2));
        }

        if t_enter > t_exit || t_enter < 0.0 {
            return None;
        }
        (near..=far).contains(&t_enter).then_some(t_enter)
    }
}

/// A piece of static geometry
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Collider {
    pub bounds: Aabb,
    /// Only collidable pieces are ray targets
    pub collidable: bool,
}

impl Collider {
    pub fn solid(bounds: Aabb) -> Self {
        Self {
            bounds,
            collidable: true,
        }
    }

    pub fn decoration(bounds: Aabb) -> Self {
        Self {
            bounds,
            collidable: false,
        }
    }
}

/// Ray intersection query against collidable geometry
pub trait RayCaster {
    /// Nearest hit distance in `[near, far]` along unit `dir`, if any
    fn nearest_hit(&self, origin: Vec3, dir: Vec3, near: f32, far: f32) -> Option<f32>;
}

/// Static geometry of one level
#[derive(Debug, Clone, Default)]
pub struct CollisionWorld {
    colliders: Vec<Collider>,
}

impl CollisionWorld {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, collider: Collider) {
        self.colliders.push(collider);
    }

    pub fn colliders(&self) -> &[Collider] {
        &self.colliders
    }

    pub fn len(&self) -> usize {
        self.colliders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colliders.is_empty()
    }
}

impl RayCaster for CollisionWorld {
    fn nearest_hit(&self, origin: Vec3, dir: Vec3, near: f32, far: f32) -> Option<f32> {
        self.colliders
            .iter()
            .filter(|c| c.collidable)
            .filter_map(|c| c.bounds.ray_entry(origin, dir, near, far))
            .min_by(|a, b| a.total_cmp(b))
    }
}

/// Four-ray obstruction test for candidate player positions
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionProbe {
    /// Far bound of each probe ray
    pub probe_distance: f32,
    /// Hits closer than this block the move (smaller than `probe_distance`)
    pub block_distance: f32,
}

impl Default for CollisionProbe {
    fn default() -> Self {
        Self {
            probe_distance: crate::consts::PROBE_DISTANCE,
            block_distance: crate::consts::BLOCK_DISTANCE,
        }
    }
}

impl CollisionProbe {
    pub fn new(probe_distance: f32, block_distance: f32) -> Self {
        Self {
            probe_distance,
            block_distance,
        }
    }

    /// Whether moving to `candidate` would put the player too close to a wall
    pub fn is_blocked(&self, geometry: &impl RayCaster, candidate: Vec3) -> bool {
        PROBE_DIRECTIONS.iter().any(|&dir| {
            geometry
                .nearest_hit(candidate, dir, 0.0, self.probe_distance)
                .is_some_and(|d| d < self.block_distance)
        })
    }
}
