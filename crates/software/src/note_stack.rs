//! Provides a struct [`NoteStack`] for tracking which notes are currently held down and the octave each was struck
//! in. Remembering the octave is what allows the correct Note Off to be sent after the performer shifts octaves while
//! still holding a key.

use crate::{Error, configuration::RetriggerPolicy, octave::SEMITONES_PER_OCTAVE};
use tinyvec::{ArrayVec, array_vec};
use wmidi::{Note, U7};

/// One entry per bit of the [`ButtonBitmask`](crate::ButtonBitmask), which is more than the controller can ever hold.
pub const STACK_CAPACITY: usize = 32;

/// The entries [`NoteStack::notes_to_retrigger`] selects.
pub type Retriggered = ArrayVec<[StackEntry; STACK_CAPACITY]>;

/// A held note along with the octave offset that was active when it was struck.
///
/// Internally the note is stored as a [`U7`] because [`tinyvec`] requires that `Items` implement [`Default`]. Public
/// interfaces deal with the related [`Note`] type instead.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StackEntry {
    note: U7,
    octave: i8,
}

impl StackEntry {
    /// Constructs a [`StackEntry`] for `note`, a key in the base octave, struck while `octave` was active.
    pub fn new(note: Note, octave: i8) -> Self {
        Self {
            note: U7::from_u8_lossy(note as u8),
            octave,
        }
    }

    /// The note in the base octave.
    pub fn note(&self) -> Note {
        Note::from(self.note)
    }

    /// The octave offset the note sounds in.
    pub fn octave(&self) -> i8 {
        self.octave
    }

    /// The sounding pitch as a plain number. May fall outside the MIDI note range; see
    /// [`Octaves::apply_octave`](crate::octave::Octaves::apply_octave) for a checked conversion.
    pub fn pitch(&self) -> i16 {
        i16::from(u8::from(self.note)) + SEMITONES_PER_OCTAVE * i16::from(self.octave)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for StackEntry {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(
            fmt,
            "{} ({}) @ octave {}",
            self.note().to_str(),
            u8::from(self.note),
            self.octave
        );
    }
}

/// An ordered record of the notes currently held down.
///
/// Order is significant: the first entry was struck earliest and the last entry most recently. The stack itself
/// doesn't guard against the same note being added twice; the bitmask it mirrors already guarantees that.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NoteStack {
    policy: RetriggerPolicy,
    data: ArrayVec<[StackEntry; STACK_CAPACITY]>,
}

impl Default for NoteStack {
    fn default() -> Self {
        Self::new(RetriggerPolicy::default())
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for NoteStack {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "NoteStack {{ policy: {}, ", self.policy);
        defmt::write!(fmt, "data: [");
        for (i, entry) in self.data.iter().enumerate() {
            if i == 0 {
                defmt::write!(fmt, " ");
            } else {
                defmt::write!(fmt, ", ");
            }
            defmt::write!(fmt, "{}", entry);
        }
        defmt::write!(fmt, " ]");
        defmt::write!(fmt, " }}");
    }
}

impl NoteStack {
    /// Construct an empty `NoteStack` which selects notes to retrigger according to `policy`.
    pub fn new(policy: RetriggerPolicy) -> Self {
        Self {
            policy,
            data: array_vec!(),
        }
    }

    /// The policy this stack was constructed with.
    pub fn policy(&self) -> RetriggerPolicy {
        self.policy
    }

    /// Push `note`, struck while `octave` was active, onto the stack. Equivalent to pressing a button.
    pub fn add(&mut self, note: Note, octave: i8) {
        if self.data.try_push(StackEntry::new(note, octave)).is_some() {
            error!(
                "Note stack is full; dropping {} @ octave {}",
                note.to_str(),
                octave
            );
        }
    }

    /// Remove the most recent entry for `note` and return it. Equivalent to releasing a button.
    ///
    /// The returned entry carries the octave the note was struck in, which may differ from the active octave.
    pub fn remove(&mut self, note: Note) -> Result<StackEntry, Error> {
        let index = self.position(note)?;
        Ok(self.data.remove(index))
    }

    /// Update the octave of the most recent entry for `note` in place, preserving its position in the stack.
    pub fn replace(&mut self, note: Note, octave: i8) -> Result<(), Error> {
        let index = self.position(note)?;
        self.data[index].octave = octave;
        Ok(())
    }

    /// Returns copies of the entries which should be retriggered after an octave change, as selected by the
    /// [`RetriggerPolicy`]. The stack is left unchanged.
    pub fn notes_to_retrigger(&self) -> Retriggered {
        self.policy.select(self.iter())
    }

    /// Determine if any notes are held.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Number of held notes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns an [`Iterator`] over the held notes, earliest first.
    pub fn iter(&self) -> impl Iterator<Item = StackEntry> + '_ {
        self.data.iter().copied()
    }

    fn position(&self, note: Note) -> Result<usize, Error> {
        let u7 = U7::from_u8_lossy(note as u8);
        self.data
            .iter()
            .rposition(|entry| entry.note == u7)
            .ok_or(Error::StackConsistencyFault(note as u8))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chord() -> NoteStack {
        let mut stack = NoteStack::new(RetriggerPolicy::All);
        stack.add(Note::E4, 0);
        stack.add(Note::C4, -1);
        stack.add(Note::G4, 1);

        stack
    }

    fn entries(stack: &NoteStack) -> Retriggered {
        stack.iter().collect()
    }

    #[test]
    fn new() {
        let stack = NoteStack::new(RetriggerPolicy::Lowest);
        assert!(stack.is_empty());
        assert_eq!(RetriggerPolicy::Lowest, stack.policy(), "Expected left but got right");
    }

    #[test]
    fn add_appends() {
        let mut stack = chord();
        stack.add(Note::D4, 2);

        assert_eq!(
            &[
                StackEntry::new(Note::E4, 0),
                StackEntry::new(Note::C4, -1),
                StackEntry::new(Note::G4, 1),
                StackEntry::new(Note::D4, 2),
            ][..],
            entries(&stack).as_slice(),
            "Expected left but got right"
        );
    }

    #[test]
    fn add_ignores_rather_than_overflow() {
        let mut stack = NoteStack::default();
        for _ in 0..STACK_CAPACITY {
            stack.add(Note::C4, 0);
        }
        assert_eq!(STACK_CAPACITY, stack.len(), "Expected stack to be at capacity");

        stack.add(Note::D4, 0);
        assert_eq!(STACK_CAPACITY, stack.len(), "Expected stack length not to change");
        assert!(stack.iter().all(|entry| entry.note() != Note::D4));
    }

    #[test]
    fn remove_returns_original_octave() {
        let mut stack = chord();
        let removed = stack.remove(Note::C4);

        assert_eq!(Ok(StackEntry::new(Note::C4, -1)), removed, "Expected left but got right");
        assert_eq!(
            &[StackEntry::new(Note::E4, 0), StackEntry::new(Note::G4, 1)][..],
            entries(&stack).as_slice(),
            "Expected left but got right"
        );
    }

    #[test]
    fn remove_takes_most_recent_duplicate() {
        let mut stack = NoteStack::default();
        stack.add(Note::C4, 0);
        stack.add(Note::E4, 0);
        stack.add(Note::C4, 1);

        assert_eq!(Ok(StackEntry::new(Note::C4, 1)), stack.remove(Note::C4));
        assert_eq!(
            &[StackEntry::new(Note::C4, 0), StackEntry::new(Note::E4, 0)][..],
            entries(&stack).as_slice(),
            "Expected left but got right"
        );
    }

    #[test]
    fn remove_missing_note_is_a_fault() {
        let mut stack = chord();
        assert_eq!(
            Err(Error::StackConsistencyFault(62)),
            stack.remove(Note::D4),
            "Expected left but got right"
        );
        assert_eq!(3, stack.len(), "Expected stack to be untouched");
    }

    #[test]
    fn replace_preserves_position() {
        let mut stack = chord();
        assert_eq!(Ok(()), stack.replace(Note::C4, 2));

        assert_eq!(
            &[
                StackEntry::new(Note::E4, 0),
                StackEntry::new(Note::C4, 2),
                StackEntry::new(Note::G4, 1),
            ][..],
            entries(&stack).as_slice(),
            "Expected left but got right"
        );
    }

    #[test]
    fn replace_missing_note_is_a_fault() {
        let mut stack = chord();
        let before = stack;
        assert_eq!(Err(Error::StackConsistencyFault(62)), stack.replace(Note::D4, 1));
        assert_eq!(before, stack, "Expected stack to be untouched");
    }

    #[test]
    fn notes_to_retrigger_leaves_stack_alone() {
        let stack = chord();
        let retriggered = stack.notes_to_retrigger();

        assert_eq!(entries(&stack), retriggered, "Expected left but got right");
        assert_eq!(3, stack.len(), "Expected stack to be untouched");
    }

    #[test]
    fn notes_to_retrigger_last_on_empty_stack() {
        let stack = NoteStack::new(RetriggerPolicy::Last);
        assert!(stack.notes_to_retrigger().is_empty());
    }

    #[test]
    fn tracks_pressed_notes_through_interleaved_presses() {
        // press C, E, G across octave changes, then release in a different order
        let mut stack = NoteStack::new(RetriggerPolicy::None);
        stack.add(Note::C4, 0);
        stack.add(Note::E4, 1);
        assert_eq!(Ok(StackEntry::new(Note::C4, 0)), stack.remove(Note::C4));
        stack.add(Note::G4, -2);
        stack.add(Note::C4, 2);
        assert_eq!(Ok(StackEntry::new(Note::E4, 1)), stack.remove(Note::E4));
        assert_eq!(Ok(StackEntry::new(Note::C4, 2)), stack.remove(Note::C4));
        assert_eq!(Ok(StackEntry::new(Note::G4, -2)), stack.remove(Note::G4));
        assert!(stack.is_empty());
    }

    #[test]
    fn pitch() {
        assert_eq!(60, StackEntry::new(Note::C4, 0).pitch(), "Expected left but got right");
        assert_eq!(36, StackEntry::new(Note::C4, -2).pitch(), "Expected left but got right");
        assert_eq!(84, StackEntry::new(Note::C4, 2).pitch(), "Expected left but got right");
    }
}
