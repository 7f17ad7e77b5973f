//! [`Mixer`] implementation on top of the alsa-lib simple mixer interface.
//!
//! One mixer handle is opened per card and kept for the daemon's lifetime.
//! Simple elements are looked up by name (index 0) for every operation;
//! [`Selem`] borrows the handle, so it cannot be stored next to it.

use crate::event::Control;
use crate::traits::{Channel, Mixer};
use alsa::mixer::{Mixer as Handle, Selem, SelemChannelId, SelemId};
use log::{debug, info};

/// Default card name, as understood by `snd_mixer_attach`.
pub const DEFAULT_CARD: &str = "default";

/// Errors from the ALSA mixer backend.
#[derive(Debug, thiserror::Error)]
pub enum AlsaMixerError {
    #[error("mixer {card} open error: {source}")]
    Open {
        card: String,
        #[source]
        source: alsa::Error,
    },
    #[error("unable to find simple control '{name}',{index}")]
    ElementNotFound { name: String, index: u32 },
    #[error("mixer {op} error: {source}")]
    Alsa {
        op: String,
        #[source]
        source: alsa::Error,
    },
}

/// A [`Mixer`] backed by alsa-lib.
pub struct AlsaMixer {
    card: String,
    handle: Handle,
    playback: String,
    capture: String,
}

impl AlsaMixer {
    /// Open, attach, register and load the mixer for `card`, then make sure
    /// both simple elements exist.
    pub fn open(card: &str, playback: &str, capture: &str) -> Result<Self, AlsaMixerError> {
        let handle = Handle::new(card, false).map_err(|source| AlsaMixerError::Open {
            card: card.to_string(),
            source,
        })?;
        let mixer = Self {
            card: card.to_string(),
            handle,
            playback: playback.to_string(),
            capture: capture.to_string(),
        };

        for control in [Control::Playback, Control::Capture] {
            let selem = mixer.selem(control)?;
            debug!(
                "{} element '{}': mono={} switch={}",
                control,
                mixer.element_name(control),
                selem_is_mono(&selem, control),
                selem_has_switch(&selem, control)
            );
        }
        info!(
            "opened mixer {} (playback '{}', capture '{}')",
            mixer.card, mixer.playback, mixer.capture
        );
        Ok(mixer)
    }

    pub fn card(&self) -> &str {
        &self.card
    }

    fn element_name(&self, control: Control) -> &str {
        match control {
            Control::Playback => &self.playback,
            Control::Capture => &self.capture,
        }
    }

    fn selem(&self, control: Control) -> Result<Selem<'_>, AlsaMixerError> {
        let name = self.element_name(control);
        self.handle
            .find_selem(&SelemId::new(name, 0))
            .ok_or_else(|| AlsaMixerError::ElementNotFound {
                name: name.to_string(),
                index: 0,
            })
    }
}

fn alsa_err(op: impl Into<String>) -> impl FnOnce(alsa::Error) -> AlsaMixerError {
    let op = op.into();
    move |source| AlsaMixerError::Alsa { op, source }
}

/// Map a logical channel to the alsa-lib channel id.  Channel 0 doubles as
/// the mono channel.
fn channel_id(channel: Channel) -> SelemChannelId {
    match channel {
        Channel::FrontLeft => SelemChannelId::FrontLeft,
        Channel::FrontRight => SelemChannelId::FrontRight,
    }
}

fn selem_is_mono(selem: &Selem<'_>, control: Control) -> bool {
    match control {
        Control::Playback => selem.is_playback_mono(),
        Control::Capture => selem.is_capture_mono(),
    }
}

fn selem_has_switch(selem: &Selem<'_>, control: Control) -> bool {
    match control {
        Control::Playback => selem.has_playback_switch(),
        Control::Capture => selem.has_capture_switch(),
    }
}

impl Mixer for AlsaMixer {
    type Error = AlsaMixerError;

    fn refresh(&mut self) -> Result<(), Self::Error> {
        let n = self
            .handle
            .handle_events()
            .map_err(alsa_err("handle events"))?;
        if n > 0 {
            debug!("processed {} pending mixer events", n);
        }
        Ok(())
    }

    fn is_mono(&self, control: Control) -> Result<bool, Self::Error> {
        Ok(selem_is_mono(&self.selem(control)?, control))
    }

    fn volume_range(&self, control: Control) -> Result<(i64, i64), Self::Error> {
        let selem = self.selem(control)?;
        Ok(match control {
            Control::Playback => selem.get_playback_volume_range(),
            Control::Capture => selem.get_capture_volume_range(),
        })
    }

    fn volume(&self, control: Control, channel: Channel) -> Result<i64, Self::Error> {
        let selem = self.selem(control)?;
        let id = channel_id(channel);
        match control {
            Control::Playback => selem.get_playback_volume(id),
            Control::Capture => selem.get_capture_volume(id),
        }
        .map_err(alsa_err(format!("get {} volume {:?}", control, channel)))
    }

    fn set_volume(&mut self, control: Control, channel: Channel, value: i64) -> Result<(), Self::Error> {
        let selem = self.selem(control)?;
        let id = channel_id(channel);
        match control {
            Control::Playback => selem.set_playback_volume(id, value),
            Control::Capture => selem.set_capture_volume(id, value),
        }
        .map_err(alsa_err(format!("set {} volume {:?}", control, channel)))
    }

    fn has_switch(&self, control: Control) -> Result<bool, Self::Error> {
        Ok(selem_has_switch(&self.selem(control)?, control))
    }

    fn switch(&self, control: Control, channel: Channel) -> Result<bool, Self::Error> {
        let selem = self.selem(control)?;
        let id = channel_id(channel);
        let sw = match control {
            Control::Playback => selem.get_playback_switch(id),
            Control::Capture => selem.get_capture_switch(id),
        }
        .map_err(alsa_err(format!("get {} switch {:?}", control, channel)))?;
        Ok(sw != 0)
    }

    fn set_switch(&mut self, control: Control, channel: Channel, on: bool) -> Result<(), Self::Error> {
        let selem = self.selem(control)?;
        let id = channel_id(channel);
        let value = i32::from(on);
        match control {
            Control::Playback => selem.set_playback_switch(id, value),
            Control::Capture => selem.set_capture_switch(id, value),
        }
        .map_err(alsa_err(format!("set {} switch {:?}", control, channel)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_ids_match_alsa_numbering() {
        assert_eq!(channel_id(Channel::FrontLeft) as i32, 0);
        assert_eq!(channel_id(Channel::FrontRight) as i32, 1);
    }

    #[test]
    fn missing_element_message_names_control() {
        let err = AlsaMixerError::ElementNotFound {
            name: "Master".into(),
            index: 0,
        };
        assert_eq!(err.to_string(), "unable to find simple control 'Master',0");
    }
}
