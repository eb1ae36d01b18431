//! Provides [`Octaves`], the set of octave offsets a performer may shift between, along with the arithmetic for
//! applying an offset to a base note.

use crate::Error;
use tinyvec::{ArrayVec, array_vec};
use wmidi::{Note, U7};

/// Number of semitones in an octave.
pub const SEMITONES_PER_OCTAVE: i16 = 12;

/// Upper bound on the number of allowed octaves. Eleven offsets span the entire MIDI note range.
const MAX_OCTAVES: usize = 11;

/// Which way an octave button shifts the active octave.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OctaveShift {
    /// One octave lower.
    Down,
    /// One octave higher.
    Up,
}

/// The octave offsets which may be applied on top of the base notes.
///
/// Offsets are kept in strictly ascending order and always include 0, the octave the controller starts in.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Octaves {
    allowed: ArrayVec<[i8; MAX_OCTAVES]>,
}

impl Default for Octaves {
    /// Two octaves in either direction.
    fn default() -> Self {
        Self {
            allowed: array_vec!([i8; MAX_OCTAVES] => -2, -1, 0, 1, 2),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Octaves {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "Octaves {{ allowed: {} }}", self.allowed.as_slice());
    }
}

impl Octaves {
    /// Constructs [`Octaves`] from a slice of offsets.
    ///
    /// Fails with [`Error::InvalidOctaveSet`] unless the slice is non-empty, strictly ascending, contains 0, and holds
    /// no more than eleven offsets.
    pub fn new(allowed: &[i8]) -> Result<Self, Error> {
        if allowed.is_empty()
            || allowed.len() > MAX_OCTAVES
            || !allowed.contains(&0)
            || allowed.windows(2).any(|pair| pair[0] >= pair[1])
        {
            return Err(Error::InvalidOctaveSet);
        }

        let mut octaves = ArrayVec::new();
        octaves.extend_from_slice(allowed);
        Ok(Self { allowed: octaves })
    }

    /// Determine if `octave` may be applied.
    pub fn contains(&self, octave: i8) -> bool {
        self.allowed.contains(&octave)
    }

    /// The lowest allowed offset.
    pub fn min(&self) -> i8 {
        // construction guarantees at least one element
        self.allowed.first().copied().unwrap_or_default()
    }

    /// The highest allowed offset.
    pub fn max(&self) -> i8 {
        self.allowed.last().copied().unwrap_or_default()
    }

    /// Returns the offset one octave below `current`, clamping to the lowest allowed offset.
    pub fn step_down(&self, current: i8) -> i8 {
        let candidate = current.saturating_sub(1);
        if self.contains(candidate) {
            candidate
        } else {
            self.min()
        }
    }

    /// Returns the offset one octave above `current`, clamping to the highest allowed offset.
    pub fn step_up(&self, current: i8) -> i8 {
        let candidate = current.saturating_add(1);
        if self.contains(candidate) {
            candidate
        } else {
            self.max()
        }
    }

    /// Returns the shifted offset for `shift`.
    pub fn step(&self, current: i8, shift: OctaveShift) -> i8 {
        match shift {
            OctaveShift::Down => self.step_down(current),
            OctaveShift::Up => self.step_up(current),
        }
    }

    /// Computes the sounding pitch of `note` played `octave` octaves away from the base octave.
    ///
    /// Fails with [`Error::InvalidOctave`] if `octave` is not allowed, or with [`Error::InvalidValue`] if the result
    /// would fall outside the MIDI note range.
    pub fn apply_octave(&self, note: Note, octave: i8) -> Result<Note, Error> {
        if !self.contains(octave) {
            return Err(Error::InvalidOctave(octave));
        }

        let pitch = i16::from(u8::from(note)) + SEMITONES_PER_OCTAVE * i16::from(octave);
        note_from_i16(pitch)
    }
}

/// Converts an integer into a [`Note`], refusing anything outside 0-127 rather than truncating.
pub(crate) fn note_from_i16(value: i16) -> Result<Note, Error> {
    u8::try_from(value)
        .ok()
        .filter(|&v| v <= 127)
        .map(|v| Note::from(U7::from_u8_lossy(v)))
        .ok_or(Error::InvalidValue(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_spans_two_octaves_either_way() {
        let octaves = Octaves::default();
        assert_eq!(-2, octaves.min(), "Expected left but got right");
        assert_eq!(2, octaves.max(), "Expected left but got right");
        assert!(octaves.contains(0));
        assert!(!octaves.contains(3));
    }

    #[test]
    fn new_rejects_malformed_sets() {
        assert_eq!(Err(Error::InvalidOctaveSet), Octaves::new(&[]));
        assert_eq!(
            Err(Error::InvalidOctaveSet),
            Octaves::new(&[-1, 1]),
            "Should require 0"
        );
        assert_eq!(
            Err(Error::InvalidOctaveSet),
            Octaves::new(&[1, 0, -1]),
            "Should require ascending order"
        );
        assert_eq!(
            Err(Error::InvalidOctaveSet),
            Octaves::new(&[0, 0, 1]),
            "Should reject duplicates"
        );
        assert_eq!(
            Err(Error::InvalidOctaveSet),
            Octaves::new(&[-6, -5, -4, -3, -2, -1, 0, 1, 2, 3, 4, 5]),
            "Should reject more offsets than fit"
        );
    }

    #[test]
    fn new_accepts_asymmetric_sets() {
        let octaves = Octaves::new(&[-1, 0, 1, 2, 3]).unwrap();
        assert_eq!(-1, octaves.min(), "Expected left but got right");
        assert_eq!(3, octaves.max(), "Expected left but got right");
    }

    #[test]
    fn apply_octave() {
        let octaves = Octaves::default();
        assert_eq!(Ok(Note::C4), octaves.apply_octave(Note::C4, 0));
        assert_eq!(Ok(Note::C2), octaves.apply_octave(Note::C4, -2));
        assert_eq!(Ok(Note::C6), octaves.apply_octave(Note::C4, 2));
        assert_eq!(36, octaves.apply_octave(Note::C4, -2).unwrap() as u8);
        assert_eq!(84, octaves.apply_octave(Note::C4, 2).unwrap() as u8);
    }

    #[test]
    fn apply_octave_rejects_disallowed_octave() {
        let octaves = Octaves::default();
        assert_eq!(
            Err(Error::InvalidOctave(3)),
            octaves.apply_octave(Note::C4, 3),
            "Expected left but got right"
        );
    }

    #[test]
    fn apply_octave_rejects_pitch_out_of_range() {
        let octaves = Octaves::default();
        assert_eq!(
            Err(Error::InvalidValue(144)),
            octaves.apply_octave(Note::C9, 2),
            "Expected left but got right"
        );
        assert_eq!(
            Err(Error::InvalidValue(-12)),
            octaves.apply_octave(Note::C0, -2),
            "Expected left but got right"
        );
    }

    #[test]
    fn steps_clamp_at_the_edges() {
        let octaves = Octaves::default();
        assert_eq!(-1, octaves.step_down(0), "Expected left but got right");
        assert_eq!(-2, octaves.step_down(-2), "Should clamp to the minimum");
        assert_eq!(1, octaves.step_up(0), "Expected left but got right");
        assert_eq!(2, octaves.step_up(2), "Should clamp to the maximum");
        assert_eq!(2, octaves.step(1, OctaveShift::Up), "Expected left but got right");
        assert_eq!(0, octaves.step(1, OctaveShift::Down), "Expected left but got right");
    }
}
