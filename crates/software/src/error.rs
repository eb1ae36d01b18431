use core::fmt;

/// Everything that can go wrong while configuring the controller or translating button input into MIDI.
///
/// Only [`Error::InvalidChannel`], [`Error::InvalidOctaveSet`], [`Error::InvalidButtonCount`] and
/// [`Error::InvalidRetriggerPolicy`] arise at startup. The rest surface while the control loop runs; they indicate a
/// bug upstream but are never fatal. The affected event is skipped and the loop keeps polling, since a stuck note
/// clears itself on the next edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// A MIDI channel outside 1-16.
    InvalidChannel(u8),
    /// An octave offset outside the allowed set reached pitch calculation.
    InvalidOctave(i8),
    /// A key, velocity or computed pitch outside 0-127.
    InvalidValue(i16),
    /// A note was released or retriggered but the note stack holds no entry for it. Carries the base note.
    StackConsistencyFault(u8),
    /// The allowed octaves are empty, not strictly ascending, missing 0, or too numerous.
    InvalidOctaveSet,
    /// The number of note buttons is zero or exceeds the width of the button bitmask.
    InvalidButtonCount(u8),
    /// An unknown numeric retrigger policy code.
    InvalidRetriggerPolicy(u8),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidChannel(channel) => {
                write!(f, "MIDI channel should be between 1 and 16, got {channel}")
            }
            Self::InvalidOctave(octave) => write!(f, "octave {octave} is not allowed"),
            Self::InvalidValue(value) => {
                write!(f, "MIDI data should be between 0 and 127, got {value}")
            }
            Self::StackConsistencyFault(note) => {
                write!(f, "note {note} is not in the note stack")
            }
            Self::InvalidOctaveSet => write!(
                f,
                "allowed octaves should be strictly ascending, include 0, and number at most 11"
            ),
            Self::InvalidButtonCount(count) => {
                write!(f, "number of buttons should be between 1 and 32, got {count}")
            }
            Self::InvalidRetriggerPolicy(code) => {
                write!(f, "unknown retrigger policy code {code:#04x}")
            }
        }
    }
}

impl core::error::Error for Error {}
