//! Dark Pursuit entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, HtmlElement, KeyboardEvent, MouseEvent};

    use dark_pursuit::audio::web::WebAudio;
    use dark_pursuit::audio::{ProximityCue, engine_or_silence};
    use dark_pursuit::platform::ManualScheduler;
    use dark_pursuit::renderer::{SceneRenderer, SceneView};
    use dark_pursuit::sim::{Collider, TickInput};
    use dark_pursuit::ui::{Screen, ScreenController, dom};
    use dark_pursuit::{Game, Settings, Tuning};
    use glam::Vec3;

    // Bridge to the page's scene code and pointer lock. Page markup is listed in `ui::dom`.
    #[wasm_bindgen(inline_js = "
        export function build_scene(colliders, goal) {
            const host = window.darkPursuit;
            if (host && host.buildScene) {
                host.buildScene(JSON.parse(colliders), JSON.parse(goal));
            }
        }

        export function render_scene(view) {
            const host = window.darkPursuit;
            if (host && host.render) {
                host.render(JSON.parse(view));
            }
        }

        export function request_pointer_lock() {
            const canvas = document.getElementById('game-canvas');
            if (canvas) {
                canvas.requestPointerLock();
            }
        }

        export function pointer_locked() {
            return document.pointerLockElement !== null;
        }
    ")]
    extern "C" {
        fn build_scene(colliders: &str, goal: &str);
        fn render_scene(view: &str);
        fn request_pointer_lock();
        fn pointer_locked() -> bool;
    }

    /// Radians per pixel of mouse movement
    const MOUSE_SENSITIVITY: f32 = 0.002;
    const PITCH_LIMIT: f32 = 1.5;
    const MUTE_KEY: &str = "KeyM";

    /// Forwards scene data to the page as JSON
    struct JsRenderer;

    impl SceneRenderer for JsRenderer {
        fn build_scene(&mut self, colliders: &[Collider], goal: Vec3) {
            match (serde_json::to_string(colliders), serde_json::to_string(&goal)) {
                (Ok(colliders), Ok(goal)) => build_scene(&colliders, &goal),
                (Err(e), _) | (_, Err(e)) => log::error!("Failed to serialize scene: {}", e),
            }
        }

        fn render(&mut self, view: &SceneView) {
            if let Ok(json) = serde_json::to_string(view) {
                render_scene(&json);
            }
        }
    }

    /// Screens are plain DOM elements toggled with the `hidden` class
    struct DomScreens {
        document: Document,
    }

    impl DomScreens {
        fn set_hidden(&self, id: &str, hidden: bool) {
            if let Some(el) = self.document.get_element_by_id(id) {
                let classes = el.class_list();
                let _ = if hidden {
                    classes.add_1("hidden")
                } else {
                    classes.remove_1("hidden")
                };
            }
        }

        fn set_text(&self, selector: &str, text: &str) {
            if let Ok(Some(el)) = self.document.query_selector(selector) {
                el.set_text_content(Some(text));
            }
        }
    }

    impl ScreenController for DomScreens {
        fn show(&mut self, screen: Screen) {
            if let Screen::GameOver(ending) = screen {
                self.set_text(dom::GAME_OVER_TITLE, ending.title());
                self.set_text(dom::GAME_OVER_MESSAGE, ending.message());
            }
            for id in dom::SCREENS {
                self.set_hidden(id, id != screen.element_id());
            }
        }

        fn set_proximity(&mut self, cue: &ProximityCue) {
            let Some(el) = self
                .document
                .get_element_by_id(dom::AUDIO_INDICATOR)
                .and_then(|el| el.dyn_into::<HtmlElement>().ok())
            else {
                return;
            };
            let style = el.style();
            let _ = style.set_property(
                "background-color",
                &format!("rgba(255, 0, 0, {:.3})", cue.alpha),
            );
            let _ = style.set_property(
                "box-shadow",
                &format!(
                    "0 0 {:.1}px {:.1}px rgba(255, 0, 0, {:.3})",
                    cue.glow_blur, cue.glow_spread, cue.glow_alpha
                ),
            );
            let _ = style.set_property(
                "transform",
                &format!("translateX(-50%) scale({:.3})", cue.scale),
            );
        }
    }

    /// Browser-side state around the game
    struct Host {
        game: Game<WebAudio>,
        scheduler: ManualScheduler,
        input: TickInput,
    }

    type Shared = Rc<RefCell<Host>>;

    fn now_ms() -> f64 {
        web_sys::window()
            .and_then(|w| w.performance())
            .map(|p| p.now())
            .unwrap_or(0.0)
    }

    pub fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;

        log::info!("Dark Pursuit starting...");

        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("no document"))?;

        let scheduler = ManualScheduler::new();
        let game = Game::new(
            Tuning::default(),
            Settings::load(),
            engine_or_silence(WebAudio::new()),
            Box::new(JsRenderer),
            Box::new(DomScreens {
                document: document.clone(),
            }),
            Box::new(scheduler.clone()),
        );
        let host = Rc::new(RefCell::new(Host {
            game,
            scheduler,
            input: TickInput::default(),
        }));

        setup_keyboard(&document, host.clone());
        setup_mouse_look(&document, host.clone());
        setup_focus_loss(&window, host.clone());
        setup_start_button(&document, dom::START_BUTTON, host.clone());
        setup_start_button(&document, dom::RESTART_BUTTON, host);

        Ok(())
    }

    fn setup_keyboard(document: &Document, host: Shared) {
        for (kind, down) in [("keydown", true), ("keyup", false)] {
            let host = host.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let code = event.code();
                let mut h = host.borrow_mut();
                h.input.keys.set(&code, down);

                if down && code == MUTE_KEY && !event.repeat() {
                    let settings = h.game.settings().toggled_mute();
                    settings.save();
                    h.game.set_settings(settings);
                }
            });
            let _ = document.add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_mouse_look(document: &Document, host: Shared) {
        let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
            if !pointer_locked() {
                return;
            }
            let mut h = host.borrow_mut();
            let camera = &mut h.input.camera;
            camera.yaw -= event.movement_x() as f32 * MOUSE_SENSITIVITY;
            camera.pitch = (camera.pitch - event.movement_y() as f32 * MOUSE_SENSITIVITY)
                .clamp(-PITCH_LIMIT, PITCH_LIMIT);
        });
        let _ = document
            .add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    /// Keys released while the window is unfocused never arrive
    fn setup_focus_loss(window: &web_sys::Window, host: Shared) {
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            host.borrow_mut().input.keys.clear();
        });
        let _ = window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    /// Start and restart share one handler: whichever the current phase allows
    fn setup_start_button(document: &Document, id: &str, host: Shared) {
        let Some(btn) = document.get_element_by_id(id) else {
            log::warn!("Missing #{}", id);
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
            let seed = js_sys::Date::now() as u64;
            let now = now_ms();
            let started = {
                let mut h = host.borrow_mut();
                if let Some(audio) = h.game.audio_mut() {
                    audio.resume();
                }
                h.input.keys.clear();
                if h.game.phase().is_terminal() {
                    h.game.restart(seed, now)
                } else {
                    h.game.start(seed, now)
                }
            };
            if started {
                log::info!("Started new game with seed: {}", seed);
                request_pointer_lock();
                schedule(host.clone());
            }
        });
        let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    /// Hand a pending frame request to the browser
    fn schedule(host: Shared) {
        let pending = host.borrow().scheduler.take_pending();
        if pending {
            request_animation_frame(host);
        }
    }

    fn request_animation_frame(host: Shared) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(host, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(host: Shared, time: f64) {
        {
            let mut h = host.borrow_mut();

            let decoded = h
                .game
                .audio_mut()
                .map(|audio| audio.take_decoded())
                .unwrap_or_default();
            for sound in decoded {
                h.game.deliver_sound(sound.ticket, sound.id, sound.buffer);
            }

            h.input.now_ms = time;
            let input = h.input.clone();
            h.game.frame(&input);
        }

        schedule(host);
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use dark_pursuit::audio::Silence;
    use dark_pursuit::platform::ManualScheduler;
    use dark_pursuit::renderer::NullRenderer;
    use dark_pursuit::sim::{GameSession, SessionPhase, TickInput};
    use dark_pursuit::ui::LogScreens;
    use dark_pursuit::{Game, Settings, Tuning, flatten};
    use glam::Vec3;
    use std::f32::consts::FRAC_PI_2;

    const FRAME_MS: f64 = 1000.0 / 60.0;
    /// Five minutes of play
    const MAX_FRAMES: u64 = 60 * 60 * 5;
    /// Frames spent walking sideways after bumping into something
    const DETOUR_FRAMES: u32 = 45;

    /// Walks straight at the goal and sidesteps whatever is in the way
    struct Autopilot {
        last_position: Option<Vec3>,
        detour_frames: u32,
        detour_sign: f32,
    }

    impl Autopilot {
        fn new() -> Self {
            Self {
                last_position: None,
                detour_frames: 0,
                detour_sign: 1.0,
            }
        }

        fn input(&mut self, session: &GameSession, now_ms: f64) -> TickInput {
            let position = session.player.position;
            let to_goal = flatten(session.goal.position - position);
            let mut yaw = (-to_goal.x).atan2(-to_goal.z);

            let stuck = self
                .last_position
                .is_some_and(|last| last.distance_squared(position) < 1e-8);
            if stuck {
                self.detour_frames = DETOUR_FRAMES;
                self.detour_sign = -self.detour_sign;
            }
            if self.detour_frames > 0 {
                yaw += self.detour_sign * FRAC_PI_2;
                self.detour_frames -= 1;
            }
            self.last_position = Some(position);

            let mut input = TickInput {
                now_ms,
                ..Default::default()
            };
            input.camera.yaw = yaw;
            input.keys.press("KeyW");
            input
        }
    }

    pub fn run(seed: u64) {
        let scheduler = ManualScheduler::new();
        let mut game: Game<Silence> = Game::new(
            Tuning::load_from_env(),
            Settings::load(),
            None,
            Box::new(NullRenderer::default()),
            Box::new(LogScreens::default()),
            Box::new(scheduler.clone()),
        );

        let mut now_ms = 0.0;
        game.start(seed, now_ms);

        let mut autopilot = Autopilot::new();
        let mut frames = 0;
        while scheduler.take_pending() && frames < MAX_FRAMES {
            now_ms += FRAME_MS;
            let input = autopilot.input(game.session(), now_ms);
            game.frame(&input);
            frames += 1;
        }

        let session = game.session();
        match session.phase {
            SessionPhase::Won => log::info!("Escaped after {:.1}s", session.elapsed),
            SessionPhase::Lost => log::info!("Caught after {:.1}s", session.elapsed),
            phase => log::info!(
                "Stopped in {:?} after {} frames, goal {:.1} away",
                phase,
                frames,
                session.goal_distance()
            ),
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() -> Result<(), JsValue> {
    wasm_game::run()
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Dark Pursuit (native, headless) starting...");

    let seed = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(42);
    headless::run(seed);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
