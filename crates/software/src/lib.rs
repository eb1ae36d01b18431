//! This crate contains architecture-agnostic logic for Octave Keys, a device which turns a handful of momentary
//! pushbuttons into a [MIDI](https://midi.org/midi-1-0) keyboard. Each note button plays one key of a fixed base
//! octave; two more buttons shift the octave up or down, optionally retriggering notes which are still held so they
//! continue sounding at the new pitch.
//!
//! The board-specific pieces (pin assignments, UART transport, task spawning) live in the firmware crate. Everything
//! here can be exercised on the host.

#![deny(missing_docs)]
#![no_std]

// must be declared first so the logging macros are visible to the modules below
#[macro_use]
mod fmt;

pub mod configuration;
pub mod controller;
mod error;
pub mod midi;
pub mod note_stack;
pub mod octave;
pub mod translator;

pub use error::Error;

/// Pressed (1) or released (0) state of each note button, where bit `i` belongs to button `i`.
pub type ButtonBitmask = u32;
