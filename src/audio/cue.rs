//! Screen-space proximity cue derived from threat distance

use serde::Serialize;

/// 1 when the threat is on top of the player, 0 at or beyond `max_distance`
pub fn proximity_intensity(distance: f32, max_distance: f32) -> f32 {
    if !(max_distance > 0.0) || distance.is_nan() {
        return 0.0;
    }
    1.0 - (distance / max_distance).clamp(0.0, 1.0)
}

/// Indicator styling handed to the UI layer
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProximityCue {
    pub intensity: f32,
    /// Red fill alpha
    pub alpha: f32,
    /// Glow blur radius (px)
    pub glow_blur: f32,
    /// Glow spread radius (px)
    pub glow_spread: f32,
    pub glow_alpha: f32,
    /// Indicator scale factor
    pub scale: f32,
}

impl ProximityCue {
    pub fn silent() -> Self {
        Self::from_intensity(0.0)
    }

    pub fn from_intensity(intensity: f32) -> Self {
        let i = intensity.clamp(0.0, 1.0);
        Self {
            intensity: i,
            alpha: i * 0.7,
            glow_blur: i * 30.0,
            glow_spread: i * 10.0,
            glow_alpha: i * 0.5,
            scale: 1.0 + i,
        }
    }

    pub fn from_distance(distance: f32, max_distance: f32) -> Self {
        Self::from_intensity(proximity_intensity(distance, max_distance))
    }

    /// Keep the colour but drop the scale pulse
    pub fn without_motion(self) -> Self {
        Self { scale: 1.0, ..self }
    }

    pub fn is_visible(&self) -> bool {
        self.intensity > 0.0
    }
}
