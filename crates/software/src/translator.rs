//! Provides [`KeyEventTranslator`], which turns button and octave-shift input into MIDI note events while keeping a
//! [`NoteStack`] in step with the buttons held down.

use crate::{
    ButtonBitmask, Error,
    configuration::ControllerConfig,
    midi::NoteEvent,
    note_stack::{NoteStack, Retriggered},
    octave::OctaveShift,
};

/// Translates raw button state into MIDI note events.
///
/// Two kinds of input are accepted:
/// - a fresh [`ButtonBitmask`] each polling cycle, which is compared against the previous one to find the buttons
///   that were pressed or released since ([`process_button_edges`](Self::process_button_edges)), and
/// - octave shift requests from the dedicated octave buttons ([`shift_octave`](Self::shift_octave)).
///
/// Both return lazy iterators over the events to send. The translator's state is updated as the iterators advance;
/// dropping one early finishes the remaining work without yielding, so the state never lags behind the input.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct KeyEventTranslator {
    config: ControllerConfig,
    stack: NoteStack,
    previous_mask: ButtonBitmask,
    octave: i8,
}

#[cfg(feature = "defmt")]
impl defmt::Format for KeyEventTranslator {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(
            fmt,
            "KeyEventTranslator {{ octave: {}, previous_mask: {=u32:b}, stack: {} }}",
            self.octave,
            self.previous_mask,
            self.stack
        );
    }
}

impl KeyEventTranslator {
    /// Constructs a [`KeyEventTranslator`] with no buttons held, in octave 0.
    pub fn new(config: ControllerConfig) -> Self {
        Self {
            stack: NoteStack::new(config.retrigger_policy()),
            config,
            previous_mask: 0,
            octave: 0,
        }
    }

    /// Getter.
    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    /// Getter.
    pub fn note_stack(&self) -> &NoteStack {
        &self.stack
    }

    /// The bitmask seen on the last polling cycle.
    pub fn previous_mask(&self) -> ButtonBitmask {
        self.previous_mask
    }

    /// The active octave offset.
    pub fn octave(&self) -> i8 {
        self.octave
    }

    /// Compares `latest_mask` against the bitmask from the previous cycle and returns the resulting events.
    ///
    /// Changed buttons are handled in ascending index order. A newly pressed button yields a Note On in the active
    /// octave. A newly released button yields a Note Off in the octave its note was struck in (or last retriggered
    /// in), which is not necessarily the active one. Bits beyond the configured number of buttons are ignored.
    pub fn process_button_edges(&mut self, latest_mask: ButtonBitmask) -> ButtonEdges<'_> {
        let latest = latest_mask & self.config.button_mask();
        let changed = self.previous_mask ^ latest;
        self.previous_mask = latest;

        ButtonEdges {
            translator: self,
            latest,
            changed,
        }
    }

    /// Moves the active octave one step in the direction of `shift` and returns the resulting retrigger events.
    ///
    /// Shifting past the lowest or highest allowed octave clamps instead. If the octave ends up where it was, nothing
    /// is retriggered. Otherwise each note selected by the [`RetriggerPolicy`](crate::configuration::RetriggerPolicy)
    /// yields a Note Off at its old pitch followed by a Note On at its new one.
    pub fn shift_octave(&mut self, shift: OctaveShift) -> Retrigger<'_> {
        let candidate = self.config.octaves().step(self.octave, shift);

        let pending = if candidate == self.octave {
            Retriggered::new()
        } else {
            info!("Octave changed from {} to {}", self.octave, candidate);
            self.octave = candidate;
            self.stack.notes_to_retrigger()
        };

        Retrigger {
            translator: self,
            pending,
            next: 0,
            note_on: None,
        }
    }

    fn press(&mut self, index: u8) -> Result<NoteEvent, Error> {
        let note = self.config.button_note(index)?;
        // the entry goes on the stack even if the pitch is bad, so the stack keeps mirroring the buttons
        self.stack.add(note, self.octave);
        self.config
            .octaves()
            .apply_octave(note, self.octave)
            .map(NoteEvent::on)
    }

    fn release(&mut self, index: u8) -> Result<NoteEvent, Error> {
        let note = self.config.button_note(index)?;
        let struck = self.stack.remove(note)?;
        self.config
            .octaves()
            .apply_octave(struck.note(), struck.octave())
            .map(NoteEvent::off)
    }
}

/// Events caused by buttons changing state between two polling cycles. See
/// [`KeyEventTranslator::process_button_edges`].
pub struct ButtonEdges<'a> {
    translator: &'a mut KeyEventTranslator,
    latest: ButtonBitmask,
    changed: ButtonBitmask,
}

impl Iterator for ButtonEdges<'_> {
    type Item = Result<NoteEvent, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.changed == 0 {
            return None;
        }

        // lowest set bit first
        let index = self.changed.trailing_zeros();
        let bit = 1 << index;
        self.changed &= !bit;

        let index = index as u8;
        Some(if self.latest & bit != 0 {
            self.translator.press(index)
        } else {
            self.translator.release(index)
        })
    }
}

impl Drop for ButtonEdges<'_> {
    fn drop(&mut self) {
        self.for_each(drop);
    }
}

/// Events caused by an octave shift. See [`KeyEventTranslator::shift_octave`].
pub struct Retrigger<'a> {
    translator: &'a mut KeyEventTranslator,
    pending: Retriggered,
    next: usize,
    note_on: Option<Result<NoteEvent, Error>>,
}

impl Iterator for Retrigger<'_> {
    type Item = Result<NoteEvent, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(note_on) = self.note_on.take() {
            return Some(note_on);
        }

        let entry = *self.pending.get(self.next)?;
        self.next += 1;

        let octaves = self.translator.config.octaves();
        let octave = self.translator.octave;
        let note_off = octaves
            .apply_octave(entry.note(), entry.octave())
            .map(NoteEvent::off);
        let note_on = octaves.apply_octave(entry.note(), octave).map(NoteEvent::on);

        // a stack fault takes the place of the Note On; the controller counts it like any other skipped event
        self.note_on = Some(self.translator.stack.replace(entry.note(), octave).and(note_on));
        Some(note_off)
    }
}

impl Drop for Retrigger<'_> {
    fn drop(&mut self) {
        self.for_each(drop);
    }
}
