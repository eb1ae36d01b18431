//! Provides [`Controller`], which feeds the output of a [`KeyEventTranslator`] to wherever MIDI is being sent.
//!
//! Button scanning and octave shifting are driven by different tasks. To keep them from interleaving their changes
//! to the held notes or the active octave, a single [`Controller`] is shared between them behind a mutex (see
//! [`SharedController`]). Each operation holds the lock until all of its events have been emitted, so events from
//! one cycle are always delivered before those of the next.

use crate::{
    ButtonBitmask, Error, configuration::ControllerConfig, midi::NoteEvent, octave::OctaveShift,
    translator::KeyEventTranslator,
};
use embassy_sync::mutex::Mutex;

/// A destination for encoded MIDI messages, e.g., a UART running at 31250 baud.
///
/// Delivery is fire-and-forget: the controller doesn't retry, so any error handling belongs to the implementation.
#[allow(async_fn_in_trait)]
pub trait MidiSink {
    /// Send one 3-byte message.
    async fn emit(&mut self, message: [u8; 3]);
}

/// A [`Controller`] guarded by an async mutex so that it may be shared between tasks.
pub type SharedController<M, S> = Mutex<M, Controller<S>>;

/// Owns the [`KeyEventTranslator`] and the [`MidiSink`] its events are sent to.
pub struct Controller<S> {
    translator: KeyEventTranslator,
    sink: S,
    faults: u32,
}

impl<S: MidiSink> Controller<S> {
    /// Constructs a [`Controller`] with no buttons held, in octave 0.
    pub fn new(config: ControllerConfig, sink: S) -> Self {
        Self {
            translator: KeyEventTranslator::new(config),
            sink,
            faults: 0,
        }
    }

    /// Getter.
    pub fn translator(&self) -> &KeyEventTranslator {
        &self.translator
    }

    /// Getter.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Number of events skipped because of an [`Error`] since construction.
    pub fn faults(&self) -> u32 {
        self.faults
    }

    /// Handles one polling cycle: emits an event for each button which changed state since the last cycle.
    pub async fn poll(&mut self, latest_mask: ButtonBitmask) {
        let channel = self.translator.config().channel();
        for result in self.translator.process_button_edges(latest_mask) {
            match result {
                Ok(event) => {
                    log_event(&event);
                    self.sink.emit(event.to_bytes(channel)).await;
                }
                Err(error) => {
                    self.faults = self.faults.wrapping_add(1);
                    log_fault(error);
                }
            }
        }
    }

    /// Handles an octave button press: shifts the octave and emits any retrigger events.
    pub async fn shift_octave(&mut self, shift: OctaveShift) {
        let channel = self.translator.config().channel();
        for result in self.translator.shift_octave(shift) {
            match result {
                Ok(event) => {
                    log_event(&event);
                    self.sink.emit(event.to_bytes(channel)).await;
                }
                Err(error) => {
                    self.faults = self.faults.wrapping_add(1);
                    log_fault(error);
                }
            }
        }
    }
}

fn log_event(event: &NoteEvent) {
    match event {
        NoteEvent::NoteOn(note, velocity) => info!(
            "Sending NoteOn: note {}, velocity: {}",
            note.to_str(),
            u8::from(*velocity)
        ),
        NoteEvent::NoteOff(note, velocity) => info!(
            "Sending NoteOff: note {}, velocity: {}",
            note.to_str(),
            u8::from(*velocity)
        ),
    }
}

fn log_fault(error: Error) {
    warn!("Skipping event: {}", error);
}
