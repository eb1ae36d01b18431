use crate::{
    Error,
    note_stack::{Retriggered, StackEntry},
};
use num_derive::{FromPrimitive, ToPrimitive};
use num_traits::FromPrimitive as _;

/// Determines which held notes are played again at the new pitch when the octave changes.
///
/// Notes which are not retriggered keep sounding at the pitch they were struck with until their button is released.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, FromPrimitive, ToPrimitive)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RetriggerPolicy {
    /// Held notes are left alone; only notes struck after the shift use the new octave.
    None = 0x00,
    /// Currently the same as [`RetriggerPolicy::Last`].
    NoddleToaster = 0x01,
    /// Every held note is retriggered, oldest first.
    All = 0x02,
    /// Only the most recently struck note is retriggered.
    #[default]
    Last = 0x04,
    /// Only the note sounding at the lowest pitch is retriggered. Among notes sounding at the same pitch, the one struck
    /// earliest wins.
    Lowest = 0x08,
}

impl RetriggerPolicy {
    /// Selects the entries to retrigger from `entries`, which must be in the order they were struck.
    pub fn select(&self, entries: impl Iterator<Item = StackEntry>) -> Retriggered {
        let mut selected = Retriggered::new();
        match self {
            Self::None => {}
            Self::All => selected.extend(entries),
            Self::Last | Self::NoddleToaster => selected.extend(entries.last()),
            Self::Lowest => {
                // `min_by_key` favors the last of equal elements, so reduce by hand to keep the earliest
                let lowest = entries.reduce(|lowest, entry| {
                    if entry.pitch() < lowest.pitch() {
                        entry
                    } else {
                        lowest
                    }
                });
                selected.extend(lowest);
            }
        }
        selected
    }
}

impl TryFrom<u8> for RetriggerPolicy {
    type Error = Error;

    /// Decodes the single-bit policy codes used by earlier revisions of the controller.
    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Self::from_u8(code).ok_or(Error::InvalidRetriggerPolicy(code))
    }
}
