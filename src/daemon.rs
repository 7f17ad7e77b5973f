//! The orchestrator that ties the mixer and the event source together.
//!
//! [`VolumeDaemon`] reacts to [`Action`]s by reading and writing mixer
//! controls through the [`Mixer`] trait.  The first mixer failure ends
//! [`VolumeDaemon::run`]; there is no retry.

use crate::event::{Action, Control};
use crate::traits::{Channel, Mixer};
use log::{debug, info, warn};
use std::sync::mpsc;

/// Possible errors from the daemon.
#[derive(Debug, thiserror::Error)]
pub enum DaemonError {
    /// The mixer returned an error.
    #[error("mixer error: {0}")]
    Mixer(String),
}

fn mixer_err<E: std::fmt::Display>(what: impl std::fmt::Display) -> impl FnOnce(E) -> DaemonError {
    move |e| DaemonError::Mixer(format!("{}: {}", what, e))
}

/// Add `delta` to `current` and clamp the result to `[min, max]`.
///
/// Never panics, even for a bogus range where `min > max`.
pub fn clamp_volume(current: i64, delta: i64, min: i64, max: i64) -> i64 {
    current.saturating_add(delta).max(min).min(max)
}

/// Translates actions into mixer calls.
///
/// Generic over any [`Mixer`], so it is independent of ALSA.
///
/// ```ignore
/// let mixer = AlsaMixer::open("default", "Master", "Capture")?;
/// let mut daemon = VolumeDaemon::new(mixer, 1);
/// daemon.handle(Action::VolumeUp)?;
/// ```
pub struct VolumeDaemon<M: Mixer> {
    mixer: M,
    step: i64,
}

impl<M: Mixer> VolumeDaemon<M> {
    /// Create a daemon that moves the playback volume by `step` raw units
    /// per key press.
    pub fn new(mixer: M, step: u32) -> Self {
        Self {
            mixer,
            step: i64::from(step),
        }
    }

    /// Shared access to the underlying mixer.
    pub fn mixer(&self) -> &M {
        &self.mixer
    }

    pub fn step(&self) -> i64 {
        self.step
    }

    /// Process a single [`Action`].
    pub fn handle(&mut self, action: Action) -> Result<(), DaemonError> {
        self.mixer
            .refresh()
            .map_err(mixer_err("refresh mixer state"))?;

        match action {
            Action::VolumeUp => {
                let vol = self.adjust_playback_volume(self.step)?;
                info!("volume up: playback volume {}", vol);
            }
            Action::VolumeDown => {
                let vol = self.adjust_playback_volume(-self.step)?;
                info!("volume down: playback volume {}", vol);
            }
            Action::TogglePlaybackMute => {
                if let Some(on) = self.toggle_playback_mute()? {
                    info!("playback {}", if on { "unmuted" } else { "muted" });
                }
            }
            Action::ToggleCaptureMute => {
                if let Some(on) = self.toggle_capture_mute()? {
                    info!("capture {}", if on { "unmuted" } else { "muted" });
                }
            }
        }
        Ok(())
    }

    /// Handle actions until the channel closes or the mixer fails.
    pub fn run(&mut self, rx: mpsc::Receiver<Action>) -> Result<(), DaemonError> {
        for action in rx {
            debug!("received {}", action);
            self.handle(action)?;
        }
        info!("event source closed");
        Ok(())
    }

    /// Move every playback channel by `delta`, clamped to the element's
    /// range.  Returns the new value of the first channel.
    pub fn adjust_playback_volume(&mut self, delta: i64) -> Result<i64, DaemonError> {
        let control = Control::Playback;
        let (min, max) = self
            .mixer
            .volume_range(control)
            .map_err(mixer_err("get playback volume range"))?;
        let mono = self
            .mixer
            .is_mono(control)
            .map_err(mixer_err("query playback channels"))?;

        let mut first = None;
        for &channel in Channel::for_element(mono) {
            let current = self
                .mixer
                .volume(control, channel)
                .map_err(mixer_err(format!("get playback volume {:?}", channel)))?;
            let next = clamp_volume(current, delta, min, max);
            self.mixer
                .set_volume(control, channel, next)
                .map_err(mixer_err(format!("set playback volume {:?}", channel)))?;
            debug!("playback {:?}: {} -> {}", channel, current, next);
            first.get_or_insert(next);
        }
        Ok(first.unwrap_or(min))
    }

    /// Flip the playback mute switch.  `None` if the element has no switch.
    pub fn toggle_playback_mute(&mut self) -> Result<Option<bool>, DaemonError> {
        self.toggle_switch(Control::Playback)
    }

    /// Flip the capture mute switch.  `None` if the element has no switch.
    pub fn toggle_capture_mute(&mut self) -> Result<Option<bool>, DaemonError> {
        self.toggle_switch(Control::Capture)
    }

    fn toggle_switch(&mut self, control: Control) -> Result<Option<bool>, DaemonError> {
        let has_switch = self
            .mixer
            .has_switch(control)
            .map_err(mixer_err(format!("query {} switch", control)))?;
        if !has_switch {
            warn!("{} element has no mute switch, ignoring", control);
            return Ok(None);
        }
        let mono = self
            .mixer
            .is_mono(control)
            .map_err(mixer_err(format!("query {} channels", control)))?;

        let mut first = None;
        for &channel in Channel::for_element(mono) {
            let on = self
                .mixer
                .switch(control, channel)
                .map_err(mixer_err(format!("get {} switch {:?}", control, channel)))?;
            self.mixer
                .set_switch(control, channel, !on)
                .map_err(mixer_err(format!("set {} switch {:?}", control, channel)))?;
            first.get_or_insert(!on);
        }
        Ok(first)
    }
}

//  Tests
