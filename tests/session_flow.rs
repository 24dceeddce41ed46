//! Full game flow through the public API with recording hosts

use std::cell::RefCell;
use std::rc::Rc;

use dark_pursuit::audio::{AudioError, AudioSpatializer, LoadTicket, ProximityCue, SoundId};
use dark_pursuit::platform::ManualScheduler;
use dark_pursuit::renderer::{SceneRenderer, SceneView};
use dark_pursuit::sim::{Collider, CollisionWorld, SessionPhase, TickInput};
use dark_pursuit::ui::{Ending, Screen, ScreenController};
use dark_pursuit::{Game, Settings, Tuning};
use glam::Vec3;

const FRAME_MS: f64 = 1000.0 / 60.0;

#[derive(Debug, Clone, PartialEq)]
enum Sound {
    Decode(SoundId, u64),
    Start(&'static str, Vec3, bool),
    Stop(usize),
}

#[derive(Default)]
struct Log {
    screens: Vec<Screen>,
    cues: Vec<ProximityCue>,
    scenes: usize,
    renders: Vec<SceneView>,
    sounds: Vec<Sound>,
}

type SharedLog = Rc<RefCell<Log>>;

struct Speakers {
    log: SharedLog,
    voices: usize,
}

impl AudioSpatializer for Speakers {
    type Buffer = &'static str;
    type Voice = usize;

    fn request_decode(&mut self, id: SoundId, ticket: LoadTicket) -> Result<(), AudioError> {
        self.log.borrow_mut().sounds.push(Sound::Decode(id, ticket.generation));
        Ok(())
    }

    fn start(&mut self, buffer: &&'static str, position: Vec3, looped: bool) -> Result<usize, AudioError> {
        self.log.borrow_mut().sounds.push(Sound::Start(*buffer, position, looped));
        self.voices += 1;
        Ok(self.voices)
    }

    fn move_voice(&mut self, _voice: &usize, _position: Vec3) {}

    fn stop(&mut self, voice: usize) {
        self.log.borrow_mut().sounds.push(Sound::Stop(voice));
    }

    fn set_listener(&mut self, _position: Vec3, _forward: Vec3) {}

    fn set_volume(&mut self, _volume: f32) {}
}

struct Screens(SharedLog);

impl ScreenController for Screens {
    fn show(&mut self, screen: Screen) {
        self.0.borrow_mut().screens.push(screen);
    }

    fn set_proximity(&mut self, cue: &ProximityCue) {
        self.0.borrow_mut().cues.push(*cue);
    }
}

struct Canvas(SharedLog);

impl SceneRenderer for Canvas {
    fn build_scene(&mut self, _colliders: &[Collider], _goal: Vec3) {
        self.0.borrow_mut().scenes += 1;
    }

    fn render(&mut self, view: &SceneView) {
        self.0.borrow_mut().renders.push(*view);
    }
}

fn new_game() -> (Game<Speakers>, ManualScheduler, SharedLog) {
    let mut tuning = Tuning::default();
    tuning.ambient_chance = 0.0;
    let log = SharedLog::default();
    let scheduler = ManualScheduler::new();
    let game = Game::new(
        tuning,
        Settings::default(),
        Some(Speakers {
            log: log.clone(),
            voices: 0,
        }),
        Box::new(Canvas(log.clone())),
        Box::new(Screens(log.clone())),
        Box::new(scheduler.clone()),
    );
    (game, scheduler, log)
}

/// Run scheduled frames until the game stops asking or `limit` is reached
fn run_frames(
    game: &mut Game<Speakers>,
    scheduler: &ManualScheduler,
    now_ms: &mut f64,
    limit: usize,
    template: &TickInput,
) -> usize {
    let mut frames = 0;
    while scheduler.take_pending() && frames < limit {
        *now_ms += FRAME_MS;
        let input = TickInput {
            now_ms: *now_ms,
            ..template.clone()
        };
        game.frame(&input);
        frames += 1;
    }
    frames
}

#[test]
fn hunting_threat_catches_a_still_player() {
    let (mut game, scheduler, log) = new_game();
    let mut now_ms = 0.0;
    assert!(game.start(3, now_ms));

    let ticket = game.sounds().ticket();
    assert!(game.deliver_sound(ticket, SoundId::Threat, "drone"));

    let player = game.session().player.position;
    {
        let threat = &mut game.session_mut().threat;
        threat.position = player + Vec3::new(5.0, -0.6, 0.0);
        threat.awareness = 1.0;
    }

    let frames = run_frames(&mut game, &scheduler, &mut now_ms, 200, &TickInput::default());
    assert_eq!(game.phase(), SessionPhase::Lost);
    assert!(frames > 30 && frames < 60, "caught after {frames} frames");
    assert!(!scheduler.is_pending());

    let log = log.borrow();
    assert_eq!(log.screens.last(), Some(&Screen::GameOver(Ending::Caught)));
    assert_eq!(log.renders.len(), frames);
    assert!(log.sounds.contains(&Sound::Start("drone", player, false)));
    assert!(log.sounds.contains(&Sound::Stop(1)));

    // Cue grew as the threat closed in
    let first = log.cues.first().map(|c| c.intensity).unwrap_or_default();
    let last = log.cues.last().map(|c| c.intensity).unwrap_or_default();
    assert!(last > first);
    assert!(last > 0.79);
}

#[test]
fn walking_to_the_goal_escapes() {
    let (mut game, scheduler, log) = new_game();
    let mut now_ms = 0.0;
    game.start(9, now_ms);

    let player = game.session().player.position;
    game.session_mut().level = CollisionWorld::new();
    game.session_mut().goal.position = player + Vec3::new(0.0, 0.0, -3.0);

    let mut walk = TickInput::default();
    walk.keys.press("KeyW");
    let frames = run_frames(&mut game, &scheduler, &mut now_ms, 200, &walk);

    assert_eq!(game.phase(), SessionPhase::Won);
    assert!(frames < 30, "escaped after {frames} frames");
    assert!(game.session().goal_distance() < 1.5);
    assert_eq!(
        log.borrow().screens.last(),
        Some(&Screen::GameOver(Ending::Escaped))
    );
}

#[test]
fn restart_begins_a_fresh_session() {
    let (mut game, scheduler, log) = new_game();
    let mut now_ms = 0.0;
    game.start(1, now_ms);
    let first_ticket = game.sounds().ticket();
    game.deliver_sound(first_ticket, SoundId::Goal, "beacon");
    run_frames(&mut game, &scheduler, &mut now_ms, 10, &TickInput::default());

    let player = game.session().player.position;
    game.session_mut().goal.position = player;
    run_frames(&mut game, &scheduler, &mut now_ms, 10, &TickInput::default());
    assert_eq!(game.phase(), SessionPhase::Won);

    assert!(game.restart(2, now_ms));
    assert_eq!(game.phase(), SessionPhase::Active);
    assert_eq!(game.session().seed, 2);
    assert_eq!(game.session().frames, 0);
    assert_eq!(game.session().threat.awareness, 0.0);
    assert!(scheduler.is_pending());

    // The goal loop decoded last time is reused; missing ones are requested again
    let second = game.sounds().ticket();
    assert_ne!(second, first_ticket);
    {
        let log = log.borrow();
        assert_eq!(log.scenes, 2);
        assert_eq!(
            log.screens,
            vec![
                Screen::Start,
                Screen::Playing,
                Screen::GameOver(Ending::Escaped),
                Screen::Playing
            ]
        );
        assert!(log.sounds.contains(&Sound::Decode(SoundId::Threat, second.generation)));
        assert!(!log.sounds.contains(&Sound::Decode(SoundId::Goal, second.generation)));
    }

    // Late decode from the first session is ignored
    assert!(!game.deliver_sound(first_ticket, SoundId::Threat, "late"));

    let frames = run_frames(&mut game, &scheduler, &mut now_ms, 5, &TickInput::default());
    assert_eq!(frames, 5);
    assert_eq!(game.session().frames, 5);
}

#[test]
fn same_seed_same_game() {
    let play = |seed| {
        let (mut game, scheduler, _log) = new_game();
        let mut now_ms = 0.0;
        game.start(seed, now_ms);
        let mut walk = TickInput::default();
        walk.keys.press("KeyW");
        walk.camera.yaw = 0.7;
        run_frames(&mut game, &scheduler, &mut now_ms, 300, &walk);
        (game.session().player.position, game.session().threat.position)
    };
    assert_eq!(play(11), play(11));
}
