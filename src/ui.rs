//! Screen controller seam
//!
//! The DOM (or any other front end) shows the named screens and the
//! proximity indicator; the core only says which and what.

use crate::audio::ProximityCue;

/// How a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ending {
    Caught,
    Escaped,
}

impl Ending {
    pub fn title(self) -> &'static str {
        match self {
            Ending::Caught => "It found you.",
            Ending::Escaped => "You escaped!",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Ending::Caught => "Something in the dark heard every step you took.",
            Ending::Escaped => "You found your way out of the darkness.",
        }
    }
}

/// Element ids the browser page must provide.
///
/// ```html
/// <div id="start-screen"><button id="start-button">Start</button></div>
/// <div id="game-screen" class="hidden">
///   <canvas id="game-canvas"></canvas>
///   <div id="audio-indicator"></div>
/// </div>
/// <div id="game-over-screen" class="hidden">
///   <h2></h2><p></p>
///   <button id="restart-button">Play again</button>
/// </div>
/// ```
pub mod dom {
    pub const START_SCREEN: &str = "start-screen";
    pub const GAME_SCREEN: &str = "game-screen";
    pub const GAME_OVER_SCREEN: &str = "game-over-screen";
    pub const START_BUTTON: &str = "start-button";
    pub const RESTART_BUTTON: &str = "restart-button";
    pub const CANVAS: &str = "game-canvas";
    pub const AUDIO_INDICATOR: &str = "audio-indicator";
    /// Ending title and message inside the game-over screen
    pub const GAME_OVER_TITLE: &str = "#game-over-screen h2";
    pub const GAME_OVER_MESSAGE: &str = "#game-over-screen p";

    /// Every screen container; exactly one is visible at a time
    pub const SCREENS: [&str; 3] = [START_SCREEN, GAME_SCREEN, GAME_OVER_SCREEN];
}

/// Named screens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Start,
    Playing,
    GameOver(Ending),
}

impl Screen {
    /// Container element shown for this screen
    pub fn element_id(self) -> &'static str {
        match self {
            Screen::Start => dom::START_SCREEN,
            Screen::Playing => dom::GAME_SCREEN,
            Screen::GameOver(_) => dom::GAME_OVER_SCREEN,
        }
    }
}

/// Host UI
pub trait ScreenController {
    fn show(&mut self, screen: Screen);

    /// Threat proximity indicator
    fn set_proximity(&mut self, cue: &ProximityCue);
}

/// UI that only logs screen changes (headless runs)
#[derive(Debug, Default)]
pub struct LogScreens {
    pub current: Option<Screen>,
}

impl ScreenController for LogScreens {
    fn show(&mut self, screen: Screen) {
        match screen {
            Screen::GameOver(ending) => log::info!("{} {}", ending.title(), ending.message()),
            other => log::info!("Screen: {:?}", other),
        }
        self.current = Some(screen);
    }

    fn set_proximity(&mut self, _cue: &ProximityCue) {}
}
