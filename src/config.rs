//! Application configuration.
//!
//! The configuration is loaded from a JSON file, either the one passed with
//! `--config <path>` or `$XDG_CONFIG_HOME/acpi-volumed/config.json`.
//! Command-line flags are applied on top of it with
//! [`Config::apply_overrides`].
//!
//! # Example
//!
//! ```json
//! {
//!   "socket": "/var/run/acpid.socket",
//!   "mixer": {
//!     "card": "hw:0",
//!     "playback": "Master",
//!     "capture": "Capture",
//!     "step": 2
//!   },
//!   "keymap": [
//!     { "event": "button/volumeup VOLUP", "action": "volume-up" },
//!     { "event": "button/volumedown VOLDN", "action": "volume-down" },
//!     { "event": "button/mute MUTE", "action": "toggle-playback-mute" },
//!     { "event": "button/micmute MICMUTE", "action": "toggle-capture-mute" }
//!   ]
//! }
//! ```

use crate::backend::acpid::DEFAULT_SOCKET;
use crate::backend::mixer::DEFAULT_CARD;
use crate::event::Keymap;
use log::info;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration.
///
/// Every field is optional; a minimal `{}` file is valid and all sections
/// fall back to their compiled-in defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Path of the acpid event socket.
    pub socket: PathBuf,

    /// Which card and elements to drive.
    pub mixer: MixerConfig,

    /// Event prefix → action table.
    pub keymap: Keymap,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            socket: PathBuf::from(DEFAULT_SOCKET),
            mixer: MixerConfig::default(),
            keymap: Keymap::default(),
        }
    }
}

/// Mixer selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MixerConfig {
    /// ALSA card name passed to `snd_mixer_attach`.
    pub card: String,
    /// Simple element for volume and mute (`Master`, `PCM`, `Speaker`, …).
    pub playback: String,
    /// Simple element for microphone mute.
    pub capture: String,
    /// Raw volume units per key press.
    pub step: u32,
}

impl Default for MixerConfig {
    fn default() -> Self {
        Self {
            card: DEFAULT_CARD.into(),
            playback: "Master".into(),
            capture: "Capture".into(),
            step: 1,
        }
    }
}

/// Values taken from the command line.  `None` keeps the file value.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub socket: Option<PathBuf>,
    pub card: Option<String>,
    pub playback: Option<String>,
    pub capture: Option<String>,
    pub step: Option<u32>,
}

impl Config {
    /// Load configuration from a JSON file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError(format!("failed to read {}: {}", path.display(), e)))?;
        let config: Self = serde_json::from_str(&contents)
            .map_err(|e| ConfigError(format!("failed to parse {}: {}", path.display(), e)))?;
        Ok(config)
    }

    /// Pick and load the configuration file.
    ///
    /// An `explicit` path (from `--config`) must exist.  Without one,
    /// `default_path` is used if present, otherwise compiled-in defaults.
    pub fn resolve(explicit: Option<&Path>, default_path: &Path) -> Result<Self, ConfigError> {
        let path = match explicit {
            Some(path) => path,
            None if default_path.exists() => default_path,
            None => {
                info!("no config file at {}, using defaults", default_path.display());
                return Ok(Self::default());
            }
        };
        let config = Self::load(path)?;
        info!("loaded config from {}", path.display());
        Ok(config)
    }

    /// Replace file values with any values given on the command line.
    pub fn apply_overrides(&mut self, o: Overrides) {
        if let Some(socket) = o.socket {
            self.socket = socket;
        }
        if let Some(card) = o.card {
            self.mixer.card = card;
        }
        if let Some(playback) = o.playback {
            self.mixer.playback = playback;
        }
        if let Some(capture) = o.capture {
            self.mixer.capture = capture;
        }
        if let Some(step) = o.step {
            self.mixer.step = step;
        }
    }

    /// Reject settings that would make the daemon misbehave silently.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.mixer.step == 0 {
            return Err(ConfigError("mixer.step must be at least 1".into()));
        }
        if self.mixer.card.is_empty() {
            return Err(ConfigError("mixer.card must not be empty".into()));
        }
        if self.mixer.playback.is_empty() || self.mixer.capture.is_empty() {
            return Err(ConfigError("mixer element names must not be empty".into()));
        }
        if let Some(i) = self.keymap.bindings().iter().position(|b| b.event.is_empty()) {
            return Err(ConfigError(format!("keymap entry {} has an empty event", i)));
        }
        Ok(())
    }
}

/// Resolve the config directory (`$XDG_CONFIG_HOME/acpi-volumed`).
pub fn config_dir() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME").unwrap_or_else(|_| {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
        format!("{}/.config", home)
    });
    PathBuf::from(base).join("acpi-volumed")
}

/// Error from loading, parsing or validating a configuration file.
#[derive(Debug, thiserror::Error)]
#[error("config error: {0}")]
pub struct ConfigError(String);
