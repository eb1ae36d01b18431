use super::RetriggerPolicy;
use crate::{ButtonBitmask, Error, midi, octave::Octaves};
use embassy_time::Duration;
use wmidi::{Channel, Note};

/// The highest number of note buttons a [`ButtonBitmask`] can describe.
pub const MAX_BUTTONS: u8 = ButtonBitmask::BITS as u8;

/// Settings for the controller as a whole.
///
/// Earlier iterations of this device came in several flavors (two buttons or four, with or without retriggering).
/// Each of them is one of these configurations: the button count, allowed octaves and [`RetriggerPolicy`] cover the
/// differences, with [`RetriggerPolicy::None`] standing in for the flavor without retriggering.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ControllerConfig {
    num_buttons: u8,
    base_note: Note,
    channel: Channel,
    octaves: Octaves,
    retrigger_policy: RetriggerPolicy,
    scan_interval: Duration,
}

impl Default for ControllerConfig {
    /// Four buttons starting at middle C, sent on channel 1, with two octaves of range either way.
    fn default() -> Self {
        Self {
            num_buttons: 4,
            base_note: Note::C4,
            channel: Channel::Ch1,
            octaves: Octaves::default(),
            retrigger_policy: RetriggerPolicy::default(),
            scan_interval: Duration::from_millis(5),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for ControllerConfig {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(
            fmt,
            "ControllerConfig {{ num_buttons: {}, base_note: {}, channel: {}, octaves: {}, retrigger_policy: {}, scan_interval: {} }}",
            self.num_buttons,
            self.base_note.to_str(),
            self.channel.number(),
            self.octaves,
            self.retrigger_policy,
            self.scan_interval
        );
    }
}

impl ControllerConfig {
    /// Constructs a [`ControllerConfig`] for `num_buttons` note buttons, the first of which plays `base_note`, sending
    /// on MIDI channel `channel` (1-16). Octaves, retrigger policy and scan interval take their default values.
    ///
    /// Fails if `channel` is out of range, if `num_buttons` is zero or exceeds [`MAX_BUTTONS`], or if the highest
    /// button would play a note beyond the MIDI range.
    pub fn new(num_buttons: u8, base_note: Note, channel: u8) -> Result<Self, Error> {
        let channel = midi::channel(channel)?;

        if num_buttons == 0 || num_buttons > MAX_BUTTONS {
            return Err(Error::InvalidButtonCount(num_buttons));
        }

        let highest = i16::from(base_note as u8) + i16::from(num_buttons) - 1;
        if highest > 127 {
            return Err(Error::InvalidValue(highest));
        }

        Ok(Self {
            num_buttons,
            base_note,
            channel,
            ..Self::default()
        })
    }

    /// Replaces the allowed octaves.
    pub fn with_octaves(self, octaves: Octaves) -> Self {
        Self { octaves, ..self }
    }

    /// Replaces the retrigger policy.
    pub fn with_retrigger_policy(self, retrigger_policy: RetriggerPolicy) -> Self {
        Self {
            retrigger_policy,
            ..self
        }
    }

    /// Replaces the interval between button scans.
    pub fn with_scan_interval(self, scan_interval: Duration) -> Self {
        Self {
            scan_interval,
            ..self
        }
    }

    /// Getter.
    pub fn num_buttons(&self) -> u8 {
        self.num_buttons
    }

    /// Getter.
    pub fn base_note(&self) -> Note {
        self.base_note
    }

    /// Getter.
    pub fn channel(&self) -> Channel {
        self.channel
    }

    /// Getter.
    pub fn octaves(&self) -> &Octaves {
        &self.octaves
    }

    /// Getter.
    pub fn retrigger_policy(&self) -> RetriggerPolicy {
        self.retrigger_policy
    }

    /// Getter.
    pub fn scan_interval(&self) -> Duration {
        self.scan_interval
    }

    /// Bitmask with one bit set per configured button.
    pub fn button_mask(&self) -> ButtonBitmask {
        ButtonBitmask::MAX >> (ButtonBitmask::BITS - u32::from(self.num_buttons))
    }

    /// The base note played by the button at `index`.
    pub fn button_note(&self, index: u8) -> Result<Note, Error> {
        crate::octave::note_from_i16(i16::from(self.base_note as u8) + i16::from(index))
    }
}
