//! **acpi-volumed**: hardware volume keys for machines without a desktop
//! session.
//!
//! acpid reports hotkeys (volume up/down, mute, mic mute) as text lines on
//! its event socket.  This daemon reads those lines, maps them to an
//! [`event::Action`] through a configurable [`event::Keymap`], and applies
//! the action to an ALSA simple-mixer element.
//!
//! # Architecture
//!
//! The crate is organised around two core traits:
//!
//! * [`traits::Mixer`]: abstracts the sound hardware so the volume and mute
//!   logic in [`daemon`] is not coupled to alsa-lib.
//! * [`traits::EventSource`]: abstracts the transport that delivers
//!   hotkey events so the main loop is not coupled to acpid.
//!
//! Concrete implementations live in [`backend`].

pub mod backend;
pub mod config;
pub mod daemon;
pub mod event;
pub mod traits;
