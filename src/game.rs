//! Frame orchestration and session lifecycle
//!
//! `Idle -> Active -> {Won, Lost}`, and `Won | Lost -> Active` on restart.
//! The host calls [`Game::frame`] whenever the scheduler fires; the game asks
//! for the next frame only while the session is still active.

use crate::audio::{AudioSpatializer, LoadTicket, ProximityCue, SoundBank, SoundId};
use crate::platform::FrameScheduler;
use crate::renderer::{SceneRenderer, SceneView};
use crate::settings::Settings;
use crate::sim::{AwarenessBand, GameEvent, GameSession, SessionPhase, TickInput, tick};
use crate::tuning::Tuning;
use crate::ui::{Ending, Screen, ScreenController};

/// One game: the current session plus every host collaborator
pub struct Game<A: AudioSpatializer> {
    session: GameSession,
    tuning: Tuning,
    settings: Settings,
    /// None when the audio engine could not be created
    audio: Option<A>,
    sounds: SoundBank<A>,
    renderer: Box<dyn SceneRenderer>,
    ui: Box<dyn ScreenController>,
    scheduler: Box<dyn FrameScheduler>,
    last_frame_ms: f64,
    cue: ProximityCue,
    /// Band the threat was in at its last retarget
    threat_band: AwarenessBand,
}

impl<A: AudioSpatializer> Game<A> {
    pub fn new(
        tuning: Tuning,
        settings: Settings,
        audio: Option<A>,
        renderer: Box<dyn SceneRenderer>,
        mut ui: Box<dyn ScreenController>,
        scheduler: Box<dyn FrameScheduler>,
    ) -> Self {
        ui.show(Screen::Start);
        Self {
            session: GameSession::new(0, tuning.clone()),
            tuning,
            settings,
            audio,
            sounds: SoundBank::new(),
            renderer,
            ui,
            scheduler,
            last_frame_ms: 0.0,
            cue: ProximityCue::silent(),
            threat_band: AwarenessBand::Unaware,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.session.phase
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut GameSession {
        &mut self.session
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn audio_mut(&mut self) -> Option<&mut A> {
        self.audio.as_mut()
    }

    pub fn sounds(&self) -> &SoundBank<A> {
        &self.sounds
    }

    /// Last proximity cue pushed to the UI
    pub fn cue(&self) -> ProximityCue {
        self.cue
    }

    pub fn threat_band(&self) -> AwarenessBand {
        self.threat_band
    }

    pub fn set_settings(&mut self, settings: Settings) {
        self.settings = settings;
        if let Some(engine) = self.audio.as_mut() {
            engine.set_volume(self.settings.effective_volume());
        }
    }

    /// Start the first session. Ignored unless idle.
    pub fn start(&mut self, seed: u64, now_ms: f64) -> bool {
        if self.session.phase != SessionPhase::Idle {
            log::warn!("Start ignored in {:?}", self.session.phase);
            return false;
        }
        self.begin_session(seed, now_ms);
        true
    }

    /// Start over after a win or loss. Ignored otherwise.
    pub fn restart(&mut self, seed: u64, now_ms: f64) -> bool {
        if !self.session.phase.is_terminal() {
            log::warn!("Restart ignored in {:?}", self.session.phase);
            return false;
        }
        self.begin_session(seed, now_ms);
        true
    }

    fn begin_session(&mut self, seed: u64, now_ms: f64) {
        self.session = GameSession::new(seed, self.tuning.clone());
        self.session.phase = SessionPhase::Active;
        self.last_frame_ms = now_ms;
        self.threat_band = AwarenessBand::Unaware;

        self.renderer
            .build_scene(self.session.level.colliders(), self.session.goal.position);

        if let Some(engine) = self.audio.as_mut() {
            engine.set_volume(self.settings.effective_volume());
            self.sounds.begin_session(engine);
            engine.set_listener(self.session.player.position, self.session.player.camera.forward());
        }

        self.ui.show(Screen::Playing);
        self.refresh_feedback();
        self.scheduler.request_frame();

        log::info!("Session started with seed {}", seed);
    }

    /// Hand a decoded buffer back to the game
    pub fn deliver_sound(&mut self, ticket: LoadTicket, id: SoundId, buffer: A::Buffer) -> bool {
        self.sounds.deliver(ticket, id, buffer)
    }

    /// Run one scheduled frame
    pub fn frame(&mut self, input: &TickInput) {
        if !self.session.is_active() {
            return;
        }

        let raw_dt = ((input.now_ms - self.last_frame_ms) / 1000.0) as f32;
        self.last_frame_ms = input.now_ms;

        for event in tick(&mut self.session, input, raw_dt) {
            self.apply(event);
        }

        if self.session.is_active() {
            self.scheduler.request_frame();
        }

        self.renderer.render(&SceneView::of(&self.session));
        self.refresh_feedback();
    }

    fn apply(&mut self, event: GameEvent) {
        match event {
            GameEvent::PlayerMoved { position, forward } => {
                if let Some(engine) = self.audio.as_mut() {
                    engine.set_listener(position, forward);
                }
            }
            GameEvent::AmbientSound { position, variant } => {
                if let Some(engine) = self.audio.as_mut() {
                    self.sounds.play_ambient(engine, variant, position);
                }
            }
            GameEvent::Caught { player_position } => {
                if let Some(engine) = self.audio.as_mut() {
                    self.sounds.play_jump_scare(engine, player_position);
                }
                self.ui.show(Screen::GameOver(Ending::Caught));
            }
            GameEvent::Escaped => {
                self.ui.show(Screen::GameOver(Ending::Escaped));
            }
            GameEvent::ThreatRetargeted { target, awareness } => {
                let band = AwarenessBand::classify(awareness, &self.tuning);
                if band != self.threat_band {
                    log::info!("Threat is now {:?} (awareness {:.2})", band, awareness);
                    self.threat_band = band;
                }
                log::debug!("Threat heading for {:?}", target);
            }
            GameEvent::MoveBlocked { .. } => {}
        }
    }

    /// Positional audio and the proximity indicator
    fn refresh_feedback(&mut self) {
        if let Some(engine) = self.audio.as_mut() {
            if self.session.is_active() {
                self.sounds.sync_loops(
                    engine,
                    self.session.threat.position,
                    self.session.goal.position,
                );
            } else {
                self.sounds.stop_loops(engine);
            }
        }

        self.cue = if self.settings.proximity_indicator {
            let cue = ProximityCue::from_distance(
                self.session.threat_distance(),
                self.tuning.indicator_max_distance,
            );
            if self.settings.reduced_motion {
                cue.without_motion()
            } else {
                cue
            }
        } else {
            ProximityCue::silent()
        };
        self.ui.set_proximity(&self.cue);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::testing::{Call, RecordingAudio};
    use crate::platform::ManualScheduler;
    use crate::renderer::NullRenderer;
    use glam::Vec3;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default, Clone)]
    struct SharedScreens(Rc<RefCell<Vec<Screen>>>);

    impl ScreenController for SharedScreens {
        fn show(&mut self, screen: Screen) {
            self.0.borrow_mut().push(screen);
        }

        fn set_proximity(&mut self, _cue: &ProximityCue) {}
    }

    struct Harness {
        game: Game<RecordingAudio>,
        screens: SharedScreens,
        scheduler: ManualScheduler,
    }

    fn harness(audio: Option<RecordingAudio>) -> Harness {
        let mut tuning = Tuning::default();
        tuning.ambient_chance = 0.0;
        let screens = SharedScreens::default();
        let scheduler = ManualScheduler::new();
        let game = Game::new(
            tuning,
            Settings::default(),
            audio,
            Box::new(NullRenderer::default()),
            Box::new(screens.clone()),
            Box::new(scheduler.clone()),
        );
        Harness {
            game,
            screens,
            scheduler,
        }
    }

    fn input(now_ms: f64) -> TickInput {
        TickInput {
            now_ms,
            ..Default::default()
        }
    }

    fn calls(game: &mut Game<RecordingAudio>) -> &mut Vec<Call> {
        &mut game.audio_mut().unwrap().calls
    }

    #[test]
    fn test_start_activates_and_schedules() {
        let mut h = harness(None);
        assert_eq!(h.game.phase(), SessionPhase::Idle);
        assert_eq!(h.screens.0.borrow().as_slice(), &[Screen::Start]);

        assert!(h.game.start(1, 0.0));
        assert_eq!(h.game.phase(), SessionPhase::Active);
        assert!(h.scheduler.take_pending());
        assert_eq!(h.screens.0.borrow().last(), Some(&Screen::Playing));

        // Second start is ignored
        assert!(!h.game.start(2, 0.0));
    }

    #[test]
    fn test_idle_frames_do_nothing() {
        let mut h = harness(None);
        h.game.frame(&input(16.0));
        assert!(!h.scheduler.is_pending());
        assert_eq!(h.game.session().frames, 0);
    }

    #[test]
    fn test_each_frame_requests_the_next() {
        let mut h = harness(None);
        h.game.start(1, 0.0);
        for i in 1..=10 {
            assert!(h.scheduler.take_pending());
            h.game.frame(&input(i as f64 * 16.0));
        }
        assert_eq!(h.game.session().frames, 10);
        assert_eq!(h.scheduler.requested(), 11);
    }

    #[test]
    fn test_frame_delta_comes_from_timestamps() {
        let mut h = harness(None);
        h.game.start(1, 1_000.0);
        h.game.frame(&input(1_050.0));
        assert!((h.game.session().elapsed - 0.05).abs() < 1e-6);
        // Tab stall
        h.game.frame(&input(6_050.0));
        assert!((h.game.session().elapsed - 0.15).abs() < 1e-6);
    }

    #[test]
    fn test_loss_stops_scheduling_and_screams() {
        let mut h = harness(Some(RecordingAudio::default()));
        h.game.start(1, 0.0);
        let ticket = h.game.sounds().ticket();
        h.game.deliver_sound(ticket, SoundId::Threat, "drone");
        h.scheduler.take_pending();

        let player = h.game.session().player.position;
        h.game.session_mut().threat.position = player + Vec3::new(1.0, 0.0, 0.0);
        calls(&mut h.game).clear();
        h.game.frame(&input(16.0));

        assert_eq!(h.game.phase(), SessionPhase::Lost);
        assert!(!h.scheduler.is_pending());
        assert_eq!(
            h.screens.0.borrow().last(),
            Some(&Screen::GameOver(Ending::Caught))
        );
        assert!(calls(&mut h.game).contains(&Call::Start {
            buffer: "drone",
            position: player,
            looped: false
        }));

        // Further frames are no-ops
        let frames = h.game.session().frames;
        h.game.frame(&input(32.0));
        assert_eq!(h.game.session().frames, frames);
    }

    #[test]
    fn test_win_shows_escape_screen() {
        let mut h = harness(None);
        h.game.start(1, 0.0);
        let player = h.game.session().player.position;
        h.game.session_mut().goal.position = player + Vec3::new(1.0, 0.0, 0.0);
        h.scheduler.take_pending();
        h.game.frame(&input(16.0));

        assert_eq!(h.game.phase(), SessionPhase::Won);
        assert!(!h.scheduler.is_pending());
        assert_eq!(
            h.screens.0.borrow().last(),
            Some(&Screen::GameOver(Ending::Escaped))
        );
    }

    #[test]
    fn test_restart_only_after_terminal() {
        let mut h = harness(None);
        assert!(!h.game.restart(5, 0.0));
        h.game.start(1, 0.0);
        assert!(!h.game.restart(5, 0.0));

        h.game.session_mut().phase = SessionPhase::Lost;
        assert!(h.game.restart(5, 100.0));
        assert_eq!(h.game.phase(), SessionPhase::Active);
        assert_eq!(h.game.session().seed, 5);
        assert_eq!(h.game.session().frames, 0);
        assert_eq!(h.game.session().threat.awareness, 0.0);
    }

    #[test]
    fn test_restart_drops_late_decodes() {
        let mut h = harness(Some(RecordingAudio::default()));
        h.game.start(1, 0.0);
        let first = h.game.sounds().ticket();
        h.game.session_mut().phase = SessionPhase::Won;
        h.game.restart(2, 0.0);

        assert!(!h.game.deliver_sound(first, SoundId::Goal, "beacon"));
        assert!(!h.game.sounds().handle(SoundId::Goal).unwrap().is_loaded());

        let second = h.game.sounds().ticket();
        assert!(h.game.deliver_sound(second, SoundId::Goal, "beacon"));
    }

    #[test]
    fn test_listener_follows_committed_moves_only() {
        let mut h = harness(Some(RecordingAudio::default()));
        h.game.start(1, 0.0);
        calls(&mut h.game).clear();

        h.game.frame(&input(16.0));
        assert!(!calls(&mut h.game).iter().any(|c| matches!(c, Call::Listener(..))));

        let mut walk = input(32.0);
        walk.keys.press("KeyW");
        h.game.frame(&walk);
        let position = h.game.session().player.position;
        assert!(calls(&mut h.game).iter().any(|c| *c == Call::Listener(position, Vec3::NEG_Z)));
    }

    #[test]
    fn test_late_loop_starts_on_next_frame() {
        let mut h = harness(Some(RecordingAudio::default()));
        h.game.start(1, 0.0);
        let ticket = h.game.sounds().ticket();
        h.game.deliver_sound(ticket, SoundId::Threat, "drone");
        assert!(!h.game.sounds().handle(SoundId::Threat).unwrap().is_playing());

        h.game.frame(&input(16.0));
        assert!(h.game.sounds().handle(SoundId::Threat).unwrap().is_playing());

        // Loops go quiet once the session ends
        let player = h.game.session().player.position;
        h.game.session_mut().goal.position = player;
        h.game.frame(&input(32.0));
        assert_eq!(h.game.phase(), SessionPhase::Won);
        assert!(!h.game.sounds().handle(SoundId::Threat).unwrap().is_playing());
        assert!(calls(&mut h.game).contains(&Call::Stop(1)));
    }

    #[test]
    fn test_proximity_cue_tracks_distance() {
        let mut h = harness(None);
        h.game.start(1, 0.0);
        let player = h.game.session().player.position;
        h.game.session_mut().threat.position = player + Vec3::new(7.5, 0.0, 0.0);
        h.game.session_mut().threat.target = player + Vec3::new(7.5, 0.0, 0.0);
        h.game.session_mut().threat.last_retarget_ms = Some(0.0);
        h.game.frame(&input(16.0));
        assert!((h.game.cue().intensity - 0.5).abs() < 1e-4);

        let mut settings = Settings::default();
        settings.proximity_indicator = false;
        h.game.set_settings(settings);
        h.game.frame(&input(32.0));
        assert_eq!(h.game.cue(), ProximityCue::silent());
    }

    #[test]
    fn test_threat_band_follows_retargets() {
        let mut h = harness(None);
        h.game.start(1, 0.0);
        assert_eq!(h.game.threat_band(), AwarenessBand::Unaware);

        // First update always retargets
        h.game.session_mut().threat.awareness = 1.0;
        h.game.frame(&input(16.0));
        assert_eq!(h.game.threat_band(), AwarenessBand::Hunting);

        // Awareness drops, but the band only changes on the next retarget
        h.game.session_mut().threat.awareness = 0.5;
        h.game.frame(&input(32.0));
        assert_eq!(h.game.threat_band(), AwarenessBand::Hunting);
        h.game.frame(&input(2_100.0));
        assert_eq!(h.game.threat_band(), AwarenessBand::Suspicious);

        h.game.session_mut().phase = SessionPhase::Lost;
        h.game.restart(2, 3_000.0);
        assert_eq!(h.game.threat_band(), AwarenessBand::Unaware);
    }

    #[test]
    fn test_runs_without_audio() {
        let mut h = harness(None);
        h.game.start(1, 0.0);
        let mut walk = input(16.0);
        walk.keys.press("KeyW");
        h.game.frame(&walk);
        assert!(h.game.audio_mut().is_none());
        assert_eq!(h.game.session().frames, 1);
    }
}
