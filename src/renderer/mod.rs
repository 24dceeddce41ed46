//! Rendering seam
//!
//! Meshes, lights and materials live in the host renderer. The core only
//! tells it what the level looks like and where the camera is each frame.

use glam::Vec3;
use serde::Serialize;

use crate::sim::{CameraPose, Collider, GameSession};

/// Everything a renderer needs for one frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SceneView {
    pub camera_position: Vec3,
    pub camera: CameraPose,
    /// Invisible in normal play; available for debug markers
    pub threat_position: Vec3,
    pub goal_position: Vec3,
    pub awareness: f32,
}

impl SceneView {
    pub fn of(session: &GameSession) -> Self {
        Self {
            camera_position: session.player.position,
            camera: session.player.camera,
            threat_position: session.threat.position,
            goal_position: session.goal.position,
            awareness: session.threat.awareness,
        }
    }
}

/// Host renderer
pub trait SceneRenderer {
    /// A new session started: rebuild the scene from its static geometry
    fn build_scene(&mut self, colliders: &[Collider], goal: Vec3);

    fn render(&mut self, view: &SceneView);
}

/// Renderer that draws nothing (headless runs)
#[derive(Debug, Default)]
pub struct NullRenderer {
    pub frames: u64,
}

impl SceneRenderer for NullRenderer {
    fn build_scene(&mut self, colliders: &[Collider], _goal: Vec3) {
        log::debug!("Scene rebuilt with {} colliders", colliders.len());
        self.frames = 0;
    }

    fn render(&mut self, _view: &SceneView) {
        self.frames += 1;
    }
}
