//! Core traits that decouple acpi-volumed from the sound hardware and from
//! the event transport.
//!
//! [`VolumeDaemon`](crate::daemon::VolumeDaemon) only depends on these
//! abstractions; ALSA and acpid live behind them in [`backend`](crate::backend).

use crate::event::{Action, Control};
use std::sync::mpsc;

/// A mixer channel.
///
/// Mono elements only have [`Channel::FrontLeft`] (ALSA's channel 0 doubles
/// as the mono channel).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    FrontLeft,
    FrontRight,
}

impl Channel {
    /// The channels an element exposes, given whether it is mono.
    pub fn for_element(mono: bool) -> &'static [Channel] {
        if mono {
            &[Channel::FrontLeft]
        } else {
            &[Channel::FrontLeft, Channel::FrontRight]
        }
    }
}

/// Abstraction over a mixer with one playback and one capture element.
///
/// An implementation might talk to alsa-lib, or it might be an in-memory
/// stub used in tests.  Switch values follow ALSA: `true` means the
/// channel is *on*, i.e. not muted.
pub trait Mixer {
    /// The error type produced by this mixer.
    type Error: std::error::Error + Send + 'static;

    /// Pull pending change notifications so that subsequent reads see
    /// values changed by other programs.
    fn refresh(&mut self) -> Result<(), Self::Error>;

    /// `true` if the element has a single channel.
    fn is_mono(&self, control: Control) -> Result<bool, Self::Error>;

    /// Inclusive `(min, max)` raw volume range of the element.
    fn volume_range(&self, control: Control) -> Result<(i64, i64), Self::Error>;

    /// Raw volume of one channel.
    fn volume(&self, control: Control, channel: Channel) -> Result<i64, Self::Error>;

    /// Set the raw volume of one channel.  Callers clamp to
    /// [`volume_range`](Mixer::volume_range) first.
    fn set_volume(&mut self, control: Control, channel: Channel, value: i64)
        -> Result<(), Self::Error>;

    /// `true` if the element has a mute switch.
    fn has_switch(&self, control: Control) -> Result<bool, Self::Error>;

    /// Current switch state of one channel.
    fn switch(&self, control: Control, channel: Channel) -> Result<bool, Self::Error>;

    /// Set the switch state of one channel.
    fn set_switch(&mut self, control: Control, channel: Channel, on: bool)
        -> Result<(), Self::Error>;
}

/// A source of [`Action`]s.
///
/// Implementations listen on some transport (the acpid socket, an
/// in-memory list in tests) and forward matched actions into the provided
/// [`mpsc::Sender`].
///
/// # Contract
///
/// * [`run`](EventSource::run) **blocks** until the source is exhausted or
///   an unrecoverable error occurs.
/// * Each matched event is sent through `sink` exactly once.
/// * If `sink` is closed the source stops and returns `Ok(())`.
pub trait EventSource: Send {
    /// The error type produced by this source.
    type Error: std::error::Error + Send + 'static;

    /// Start listening and forward every matched [`Action`] into `sink`.
    fn run(&mut self, sink: mpsc::Sender<Action>) -> Result<(), Self::Error>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, thiserror::Error)]
    #[error("mock error")]
    struct MockError;

    /// A test double that emits a fixed sequence of actions.
    struct MockSource {
        actions: Vec<Action>,
    }

    impl EventSource for MockSource {
        type Error = MockError;

        fn run(&mut self, sink: mpsc::Sender<Action>) -> Result<(), MockError> {
            for action in self.actions.drain(..) {
                if sink.send(action).is_err() {
                    return Ok(());
                }
            }
            Ok(())
        }
    }

    #[test]
    fn mock_source_emits_actions() {
        let mut src = MockSource {
            actions: vec![Action::VolumeUp, Action::ToggleCaptureMute],
        };
        let (tx, rx) = mpsc::channel();
        src.run(tx).unwrap();
        let actions: Vec<Action> = rx.try_iter().collect();
        assert_eq!(actions, vec![Action::VolumeUp, Action::ToggleCaptureMute]);
    }

    #[test]
    fn mock_source_stops_when_sink_closed() {
        let mut src = MockSource {
            actions: vec![Action::VolumeUp, Action::VolumeDown],
        };
        let (tx, rx) = mpsc::channel();
        drop(rx);
        assert!(src.run(tx).is_ok());
    }

    #[test]
    fn mono_element_has_one_channel() {
        assert_eq!(Channel::for_element(true), &[Channel::FrontLeft]);
        assert_eq!(
            Channel::for_element(false),
            &[Channel::FrontLeft, Channel::FrontRight]
        );
    }
}
