//! Actions and the event-to-action keymap.
//!
//! acpid broadcasts one event per line, for example:
//!
//! ```text
//! button/volumeup VOLUP 00000080 00000000 K
//! button/mute MUTE 00000080 00000000 K
//! ```
//!
//! Only the leading `class id` part identifies the key; the trailing
//! type/data fields vary between firmwares and are ignored.  A [`Keymap`]
//! maps those leading prefixes onto an [`Action`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// Something the daemon can do to the mixer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Action {
    VolumeUp,
    VolumeDown,
    TogglePlaybackMute,
    ToggleCaptureMute,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::VolumeUp => write!(f, "volume-up"),
            Action::VolumeDown => write!(f, "volume-down"),
            Action::TogglePlaybackMute => write!(f, "toggle-playback-mute"),
            Action::ToggleCaptureMute => write!(f, "toggle-capture-mute"),
        }
    }
}

/// Which simple mixer element an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Control {
    Playback,
    Capture,
}

impl fmt::Display for Control {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Control::Playback => write!(f, "playback"),
            Control::Capture => write!(f, "capture"),
        }
    }
}

/// A single `event prefix → action` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyBinding {
    /// Prefix of the acpid event line, e.g. `"button/volumeup VOLUP"`.
    pub event: String,
    pub action: Action,
}

impl KeyBinding {
    pub fn new(event: impl Into<String>, action: Action) -> Self {
        Self {
            event: event.into(),
            action,
        }
    }

    /// `true` if `line` starts with this binding's event prefix.
    pub fn matches(&self, line: &str) -> bool {
        !self.event.is_empty() && line.starts_with(&self.event)
    }
}

/// Ordered list of key bindings.  The first matching binding wins.
///
/// Serialized as a plain JSON array:
///
/// ```json
/// [
///   { "event": "button/volumeup VOLUP", "action": "volume-up" },
///   { "event": "button/f20 F20", "action": "toggle-capture-mute" }
/// ]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Keymap(Vec<KeyBinding>);

impl Default for Keymap {
    fn default() -> Self {
        Self(vec![
            KeyBinding::new("button/volumedown VOLDN", Action::VolumeDown),
            KeyBinding::new("button/volumeup VOLUP", Action::VolumeUp),
            KeyBinding::new("button/mute MUTE", Action::TogglePlaybackMute),
            KeyBinding::new("button/f20 F20", Action::ToggleCaptureMute),
        ])
    }
}

impl Keymap {
    pub fn new(bindings: Vec<KeyBinding>) -> Self {
        Self(bindings)
    }

    pub fn bindings(&self) -> &[KeyBinding] {
        &self.0
    }

    /// Resolve an acpid event line to an action.
    ///
    /// Leading whitespace is ignored; matching is otherwise an exact,
    /// case-sensitive prefix comparison.
    pub fn lookup(&self, line: &str) -> Option<Action> {
        let line = line.trim_start();
        if line.is_empty() {
            return None;
        }
        self.0.iter().find(|b| b.matches(line)).map(|b| b.action)
    }
}

//  Tests
