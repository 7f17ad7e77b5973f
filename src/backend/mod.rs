//! Concrete backends.
//!
//! This module provides the [`Mixer`](crate::traits::Mixer) implementation
//! backed by alsa-lib and the [`EventSource`](crate::traits::EventSource)
//! implementation backed by the acpid event socket.
//!
//! Nothing outside this module should reference ALSA or acpid directly.

pub mod acpid;
pub mod mixer;
