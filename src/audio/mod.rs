//! Spatial audio feedback
//!
//! The threat is heard, not seen. Looped voices follow the threat and the goal,
//! the listener follows the camera, environmental one-shots play around the
//! player and a screen-space cue mirrors threat proximity.
//!
//! Decoding and playback belong to the host engine behind [`AudioSpatializer`].

mod bank;
mod cue;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use bank::SoundBank;
pub use cue::{ProximityCue, proximity_intensity};

use glam::Vec3;
use thiserror::Error;

/// Environmental one-shots, in [`SoundId::Ambient`] index order
pub const AMBIENT_SOUND_FILES: [&str; 4] = [
    "sounds/creak.mp3",
    "sounds/wind.mp3",
    "sounds/drip.mp3",
    "sounds/distant_moan.mp3",
];

/// Every sound the game knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundId {
    /// Threat drone (also reused for the jump scare)
    Threat,
    /// Goal beacon
    Goal,
    /// Index into [`AMBIENT_SOUND_FILES`]
    Ambient(usize),
}

impl SoundId {
    pub fn asset_path(self) -> &'static str {
        match self {
            SoundId::Threat => "sounds/threat.mp3",
            SoundId::Goal => "sounds/goal.mp3",
            SoundId::Ambient(i) => AMBIENT_SOUND_FILES
                .get(i)
                .copied()
                .unwrap_or("sounds/missing.mp3"),
        }
    }

    pub fn all() -> impl Iterator<Item = SoundId> {
        [SoundId::Threat, SoundId::Goal]
            .into_iter()
            .chain((0..AMBIENT_SOUND_FILES.len()).map(SoundId::Ambient))
    }
}

/// Audio failures. None of them are fatal to a session.
#[derive(Debug, Error)]
pub enum AudioError {
    #[error("audio engine unavailable: {0}")]
    Unavailable(String),
    #[error("failed to decode {path}: {reason}")]
    Decode { path: &'static str, reason: String },
    #[error("playback failed: {0}")]
    Playback(String),
}

/// Identifies which session a decode request belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    pub generation: u64,
}

/// The host audio engine
pub trait AudioSpatializer {
    /// Decoded audio data
    type Buffer: Clone;
    /// A playing source plus its positional panner
    type Voice;

    /// Start decoding `id`. The host hands the result back through
    /// [`crate::Game::deliver_sound`] together with `ticket`.
    fn request_decode(&mut self, id: SoundId, ticket: LoadTicket) -> Result<(), AudioError>;

    /// Play `buffer` from `position`
    fn start(
        &mut self,
        buffer: &Self::Buffer,
        position: Vec3,
        looped: bool,
    ) -> Result<Self::Voice, AudioError>;

    fn move_voice(&mut self, voice: &Self::Voice, position: Vec3);

    fn stop(&mut self, voice: Self::Voice);

    /// Listener pose (up is always +Y)
    fn set_listener(&mut self, position: Vec3, forward: Vec3);

    /// Master volume (0.0 - 1.0)
    fn set_volume(&mut self, volume: f32);
}

/// Lifecycle of one sound
#[derive(Debug, Clone)]
pub enum SoundHandle<B, V> {
    /// Buffer not decoded yet; playing is a silent no-op
    NotLoaded,
    Ready(B),
    /// A looped voice is running
    Playing { buffer: B, voice: V },
}

impl<B, V> Default for SoundHandle<B, V> {
    fn default() -> Self {
        SoundHandle::NotLoaded
    }
}

impl<B, V> SoundHandle<B, V> {
    pub fn is_loaded(&self) -> bool {
        !matches!(self, SoundHandle::NotLoaded)
    }

    pub fn is_playing(&self) -> bool {
        matches!(self, SoundHandle::Playing { .. })
    }

    pub fn buffer(&self) -> Option<&B> {
        match self {
            SoundHandle::NotLoaded => None,
            SoundHandle::Ready(buffer) | SoundHandle::Playing { buffer, .. } => Some(buffer),
        }
    }

    pub fn voice(&self) -> Option<&V> {
        match self {
            SoundHandle::Playing { voice, .. } => Some(voice),
            _ => None,
        }
    }

    /// A buffer arrived. A running voice keeps playing the old buffer.
    pub fn loaded(self, buffer: B) -> Self {
        match self {
            SoundHandle::Playing { voice, .. } => SoundHandle::Playing { buffer, voice },
            _ => SoundHandle::Ready(buffer),
        }
    }

    /// A voice started from the ready buffer; ignored unless `Ready`
    pub fn started(self, voice: V) -> (Self, Option<V>) {
        match self {
            SoundHandle::Ready(buffer) => (SoundHandle::Playing { buffer, voice }, None),
            other => (other, Some(voice)),
        }
    }

    /// Back to `Ready`, handing out the voice that must be stopped
    pub fn stopped(self) -> (Self, Option<V>) {
        match self {
            SoundHandle::Playing { buffer, voice } => (SoundHandle::Ready(buffer), Some(voice)),
            other => (other, None),
        }
    }
}

/// Engine for hosts without audio output. Nothing ever loads, so every
/// sound stays a silent no-op.
#[derive(Debug, Default, Clone, Copy)]
pub struct Silence;

impl AudioSpatializer for Silence {
    type Buffer = ();
    type Voice = ();

    fn request_decode(&mut self, _id: SoundId, _ticket: LoadTicket) -> Result<(), AudioError> {
        Ok(())
    }

    fn start(&mut self, _buffer: &(), _position: Vec3, _looped: bool) -> Result<(), AudioError> {
        Ok(())
    }

    fn move_voice(&mut self, _voice: &(), _position: Vec3) {}

    fn stop(&mut self, _voice: ()) {}

    fn set_listener(&mut self, _position: Vec3, _forward: Vec3) {}

    fn set_volume(&mut self, _volume: f32) {}
}

/// Log an engine construction failure and carry on without audio
pub fn engine_or_silence<A>(engine: Result<A, AudioError>) -> Option<A> {
    match engine {
        Ok(engine) => Some(engine),
        Err(e) => {
            log::error!("{} - continuing without audio", e);
            None
        }
    }
}
