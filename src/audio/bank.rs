//! Sound handles for one game and the session generation guard

use glam::Vec3;

use super::{AMBIENT_SOUND_FILES, AudioSpatializer, LoadTicket, SoundHandle, SoundId};

type Handle<A> = SoundHandle<<A as AudioSpatializer>::Buffer, <A as AudioSpatializer>::Voice>;

/// All sounds of the game and their playback state
pub struct SoundBank<A: AudioSpatializer> {
    threat: Handle<A>,
    goal: Handle<A>,
    ambient: Vec<Handle<A>>,
    /// Bumped on every session start; decodes from older sessions are dropped
    generation: u64,
}

impl<A: AudioSpatializer> Default for SoundBank<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: AudioSpatializer> SoundBank<A> {
    pub fn new() -> Self {
        Self {
            threat: SoundHandle::NotLoaded,
            goal: SoundHandle::NotLoaded,
            ambient: AMBIENT_SOUND_FILES.iter().map(|_| SoundHandle::NotLoaded).collect(),
            generation: 0,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn ticket(&self) -> LoadTicket {
        LoadTicket {
            generation: self.generation,
        }
    }

    pub fn handle(&self, id: SoundId) -> Option<&Handle<A>> {
        match id {
            SoundId::Threat => Some(&self.threat),
            SoundId::Goal => Some(&self.goal),
            SoundId::Ambient(i) => self.ambient.get(i),
        }
    }

    fn handle_mut(&mut self, id: SoundId) -> Option<&mut Handle<A>> {
        match id {
            SoundId::Threat => Some(&mut self.threat),
            SoundId::Goal => Some(&mut self.goal),
            SoundId::Ambient(i) => self.ambient.get_mut(i),
        }
    }

    /// Stop the previous session's loops, open a new generation and request
    /// every buffer that is still missing.
    pub fn begin_session(&mut self, engine: &mut A) -> LoadTicket {
        self.stop_loops(engine);
        self.generation += 1;
        let ticket = self.ticket();

        let missing: Vec<SoundId> = SoundId::all()
            .filter(|&id| self.handle(id).is_some_and(|h| !h.is_loaded()))
            .collect();
        for id in missing {
            if let Err(e) = engine.request_decode(id, ticket) {
                log::warn!("Cannot load {}: {}", id.asset_path(), e);
            }
        }

        ticket
    }

    /// Accept a decoded buffer. Deliveries for an older session are dropped.
    pub fn deliver(&mut self, ticket: LoadTicket, id: SoundId, buffer: A::Buffer) -> bool {
        if ticket.generation != self.generation {
            log::debug!(
                "Dropping stale decode of {} (generation {} != {})",
                id.asset_path(),
                ticket.generation,
                self.generation
            );
            return false;
        }

        let Some(slot) = self.handle_mut(id) else {
            log::warn!("Decoded unknown sound {:?}", id);
            return false;
        };
        *slot = std::mem::take(slot).loaded(buffer);
        log::debug!("Loaded {}", id.asset_path());
        true
    }

    /// Keep the threat and goal loops running at their current positions.
    /// Loops whose buffer arrived late start here.
    pub fn sync_loops(&mut self, engine: &mut A, threat: Vec3, goal: Vec3) {
        Self::sync_loop(&mut self.threat, engine, threat);
        Self::sync_loop(&mut self.goal, engine, goal);
    }

    fn sync_loop(handle: &mut Handle<A>, engine: &mut A, position: Vec3) {
        let started = match handle {
            SoundHandle::NotLoaded => return,
            SoundHandle::Playing { voice, .. } => {
                engine.move_voice(voice, position);
                return;
            }
            SoundHandle::Ready(buffer) => engine.start(buffer, position, true),
        };

        match started {
            Ok(voice) => {
                let (next, rejected) = std::mem::take(handle).started(voice);
                *handle = next;
                if let Some(voice) = rejected {
                    engine.stop(voice);
                }
            }
            Err(e) => log::warn!("Loop failed to start: {}", e),
        }
    }

    pub fn stop_loops(&mut self, engine: &mut A) {
        for handle in [&mut self.threat, &mut self.goal] {
            let (next, voice) = std::mem::take(handle).stopped();
            *handle = next;
            if let Some(voice) = voice {
                engine.stop(voice);
            }
        }
    }

    /// Fire-and-forget environmental sound. `variant` picks among loaded ones.
    pub fn play_ambient(&mut self, engine: &mut A, variant: u32, position: Vec3) {
        let loaded: Vec<&A::Buffer> = self.ambient.iter().filter_map(|h| h.buffer()).collect();
        if loaded.is_empty() {
            return;
        }
        let buffer = loaded[variant as usize % loaded.len()];
        if let Err(e) = engine.start(buffer, position, false) {
            log::warn!("Ambient sound failed: {}", e);
        }
    }

    /// One-shot scream at the player's position (reuses the threat buffer)
    pub fn play_jump_scare(&mut self, engine: &mut A, position: Vec3) {
        let Some(buffer) = self.threat.buffer() else {
            return;
        };
        if let Err(e) = engine.start(buffer, position, false) {
            log::warn!("Jump scare failed: {}", e);
        }
    }
}
