//! Player movement: key intent -> camera-relative world move -> collision check

use std::collections::HashMap;

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use super::collision::{CollisionProbe, RayCaster};
use crate::consts::REFERENCE_FPS;

/// Logical movement keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveKey {
    Forward,
    Back,
    Left,
    Right,
}

impl MoveKey {
    /// Evaluation order for last-write-wins per axis
    pub const ALL: [MoveKey; 4] = [MoveKey::Forward, MoveKey::Back, MoveKey::Left, MoveKey::Right];

    /// Physical key codes (`KeyboardEvent.code`) bound to this key
    pub fn bindings(self) -> [&'static str; 2] {
        match self {
            MoveKey::Forward => ["KeyW", "ArrowUp"],
            MoveKey::Back => ["KeyS", "ArrowDown"],
            MoveKey::Left => ["KeyA", "ArrowLeft"],
            MoveKey::Right => ["KeyD", "ArrowRight"],
        }
    }
}

/// Pressed/released state per key code, written by the input layer
#[derive(Debug, Clone, Default)]
pub struct KeyStates {
    pressed: HashMap<String, bool>,
}

impl KeyStates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, code: &str, down: bool) {
        self.pressed.insert(code.to_owned(), down);
    }

    pub fn press(&mut self, code: &str) {
        self.set(code, true);
    }

    pub fn release(&mut self, code: &str) {
        self.set(code, false);
    }

    pub fn is_down(&self, code: &str) -> bool {
        self.pressed.get(code).copied().unwrap_or(false)
    }

    /// Either binding of a logical key is held
    pub fn holds(&self, key: MoveKey) -> bool {
        key.bindings().iter().any(|code| self.is_down(code))
    }

    pub fn clear(&mut self) {
        self.pressed.clear();
    }
}

/// Camera orientation. Yaw 0 looks down -Z; positive yaw turns left.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CameraPose {
    pub yaw: f32,
    pub pitch: f32,
}

impl CameraPose {
    pub fn new(yaw: f32, pitch: f32) -> Self {
        Self { yaw, pitch }
    }

    /// World-space view direction
    pub fn forward(&self) -> Vec3 {
        let (sy, cy) = self.yaw.sin_cos();
        let (sp, cp) = self.pitch.sin_cos();
        Vec3::new(-sy * cp, sp, -cy * cp)
    }

    /// View direction flattened onto the floor
    pub fn flat_forward(&self) -> Vec3 {
        let (sy, cy) = self.yaw.sin_cos();
        Vec3::new(-sy, 0.0, -cy)
    }

    /// Right-hand vector on the floor
    pub fn flat_right(&self) -> Vec3 {
        let f = self.flat_forward();
        Vec3::new(-f.z, 0.0, f.x)
    }
}

/// Local intent: x = strafe right, y = forward.
///
/// Each axis is last-write-wins in [`MoveKey::ALL`] order, so holding
/// Forward and Back moves back and holding Left and Right moves right.
pub fn movement_intent(keys: &KeyStates) -> Vec2 {
    let mut intent = Vec2::ZERO;
    for key in MoveKey::ALL {
        if !keys.holds(key) {
            continue;
        }
        match key {
            MoveKey::Forward => intent.y = 1.0,
            MoveKey::Back => intent.y = -1.0,
            MoveKey::Left => intent.x = -1.0,
            MoveKey::Right => intent.x = 1.0,
        }
    }
    intent
}

/// Result of one movement attempt
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MoveOutcome {
    /// No key held: nothing checked, nothing moved
    Idle,
    /// Candidate rejected; position unchanged
    Blocked { candidate: Vec3, velocity: Vec3 },
    /// Candidate committed
    Moved { from: Vec3, to: Vec3, velocity: Vec3 },
}

impl MoveOutcome {
    /// Frame velocity intent (noise the player made)
    pub fn velocity(&self) -> Vec3 {
        match *self {
            MoveOutcome::Idle => Vec3::ZERO,
            MoveOutcome::Blocked { velocity, .. } | MoveOutcome::Moved { velocity, .. } => velocity,
        }
    }

    /// Position after this frame
    pub fn position_or(&self, current: Vec3) -> Vec3 {
        match *self {
            MoveOutcome::Moved { to, .. } => to,
            _ => current,
        }
    }
}

/// Turn held keys into a validated position update
pub fn resolve_movement(
    keys: &KeyStates,
    camera: &CameraPose,
    position: Vec3,
    speed: f32,
    dt: f32,
    probe: &CollisionProbe,
    geometry: &impl RayCaster,
) -> MoveOutcome {
    let intent = movement_intent(keys);
    if intent == Vec2::ZERO {
        return MoveOutcome::Idle;
    }

    let step = intent.normalize() * (speed * dt * REFERENCE_FPS);
    let velocity = camera.flat_right() * step.x + camera.flat_forward() * step.y;
    let candidate = position + velocity;

    if probe.is_blocked(geometry, candidate) {
        MoveOutcome::Blocked {
            candidate,
            velocity,
        }
    } else {
        MoveOutcome::Moved {
            from: position,
            to: candidate,
            velocity,
        }
    }
}
