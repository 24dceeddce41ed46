//! Player preferences
//!
//! Persisted separately from tuning in LocalStorage.

use serde::{Deserialize, Serialize};

/// Player preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Mute all audio
    pub muted: bool,

    // === HUD ===
    /// Show the threat proximity indicator
    pub proximity_indicator: bool,

    // === Accessibility ===
    /// Reduced motion (no indicator pulse)
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            master_volume: 0.8,
            muted: false,
            proximity_indicator: true,
            reduced_motion: false,
        }
    }
}

impl Settings {
    /// Volume handed to the audio engine
    pub fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume.clamp(0.0, 1.0)
        }
    }

    /// Same preferences with audio muted or unmuted
    pub fn toggled_mute(&self) -> Self {
        Self {
            muted: !self.muted,
            ..self.clone()
        }
    }

    #[cfg(target_arch = "wasm32")]
    const STORAGE_KEY: &'static str = "dark_pursuit_settings";

    #[cfg(target_arch = "wasm32")]
    fn storage() -> Option<web_sys::Storage> {
        web_sys::window()?.local_storage().ok()?
    }

    /// Stored preferences, or defaults when missing or unreadable
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let stored = Self::storage().and_then(|s| s.get_item(Self::STORAGE_KEY).ok().flatten());
        match stored.map(|json| serde_json::from_str::<Self>(&json)) {
            Some(Ok(settings)) => {
                log::info!("Loaded settings from LocalStorage");
                settings
            }
            Some(Err(e)) => {
                log::warn!("Discarding stored settings: {}", e);
                Self::default()
            }
            None => Self::default(),
        }
    }

    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let Some(storage) = Self::storage() else {
            return;
        };
        match serde_json::to_string(self) {
            Ok(json) => {
                if storage.set_item(Self::STORAGE_KEY, &json).is_err() {
                    log::warn!("LocalStorage rejected settings");
                }
            }
            Err(e) => log::warn!("Cannot serialize settings: {}", e),
        }
    }

    /// Headless runs never persist anything
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {}
}
