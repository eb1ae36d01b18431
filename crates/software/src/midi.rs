//! Note On and Note Off events, the only MIDI messages the controller sends, and their encoding for the wire.
//!
//! Each message consists of 3 bytes. The first (status) byte is the sum of the command and the MIDI channel, where
//! channels 1-16 map onto 0x0-0xF. The second byte is the key number and the third the velocity, both 0-127.
//!
//! | command   | data 1        | data 2                 | description |
//! |-----------|---------------|------------------------|-------------|
//! | 0x80-0x8F | Key # (0-127) | Off Velocity (0-127)   | Note Off    |
//! | 0x90-0x9F | Key # (0-127) | On Velocity (0-127)    | Note On     |

use crate::Error;
use wmidi::{Channel, MidiMessage, Note, U7, Velocity};

/// Velocity sent with every Note On.
pub const NOTE_ON_VELOCITY: Velocity = U7::from_u8_lossy(127);
/// Velocity sent with every Note Off.
pub const NOTE_OFF_VELOCITY: Velocity = U7::from_u8_lossy(0);

/// The two commands the controller knows how to send.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    /// Status nibble 0x8.
    NoteOff,
    /// Status nibble 0x9.
    NoteOn,
}

impl Command {
    /// The status byte for this command on channel 1.
    pub fn base(&self) -> u8 {
        match self {
            Self::NoteOff => 0x80,
            Self::NoteOn => 0x90,
        }
    }
}

/// A MIDI note event, with the pitch already shifted into the octave it should sound in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoteEvent {
    /// Start sounding a note.
    NoteOn(Note, Velocity),
    /// Stop sounding a note.
    NoteOff(Note, Velocity),
}

#[cfg(feature = "defmt")]
impl defmt::Format for NoteEvent {
    fn format(&self, fmt: defmt::Formatter) {
        let (name, note, velocity) = match *self {
            Self::NoteOn(note, velocity) => ("NoteOn", note, velocity),
            Self::NoteOff(note, velocity) => ("NoteOff", note, velocity),
        };
        defmt::write!(
            fmt,
            "{} {{ note: {} ({}), velocity: {} }}",
            name,
            note.to_str(),
            note as u8,
            u8::from(velocity)
        );
    }
}

impl NoteEvent {
    /// A Note On at full velocity.
    pub fn on(note: Note) -> Self {
        Self::NoteOn(note, NOTE_ON_VELOCITY)
    }

    /// A Note Off with zero release velocity.
    pub fn off(note: Note) -> Self {
        Self::NoteOff(note, NOTE_OFF_VELOCITY)
    }

    /// Getter.
    pub fn command(&self) -> Command {
        match self {
            Self::NoteOn(..) => Command::NoteOn,
            Self::NoteOff(..) => Command::NoteOff,
        }
    }

    /// Getter.
    pub fn note(&self) -> Note {
        match *self {
            Self::NoteOn(note, _) | Self::NoteOff(note, _) => note,
        }
    }

    /// Getter.
    pub fn velocity(&self) -> Velocity {
        match *self {
            Self::NoteOn(_, velocity) | Self::NoteOff(_, velocity) => velocity,
        }
    }

    /// Returns the 3-byte wire form of this event: `(status, key, velocity)`.
    pub fn to_bytes(&self, channel: Channel) -> [u8; 3] {
        [
            self.command().base() + channel.index(),
            self.note() as u8,
            u8::from(self.velocity()),
        ]
    }

    /// Returns the equivalent [`wmidi`] message, for transports which speak [`MidiMessage`] rather than bytes.
    pub fn to_midi_message(&self, channel: Channel) -> MidiMessage<'static> {
        match *self {
            Self::NoteOn(note, velocity) => MidiMessage::NoteOn(channel, note, velocity),
            Self::NoteOff(note, velocity) => MidiMessage::NoteOff(channel, note, velocity),
        }
    }
}

/// Validates a channel number in the range 1-16, as printed on hardware, and converts it to a [`Channel`].
pub fn channel(number: u8) -> Result<Channel, Error> {
    if !(1..=16).contains(&number) {
        return Err(Error::InvalidChannel(number));
    }
    Channel::from_index(number - 1).map_err(|_| Error::InvalidChannel(number))
}

/// Encodes a message from raw values.
///
/// Out-of-range input is rejected rather than truncated: `channel` must be 1-16 and both `key` and `velocity` 0-127.
pub fn encode(command: Command, channel: u8, key: u8, velocity: u8) -> Result<[u8; 3], Error> {
    let channel = self::channel(channel)?;
    let key = data_byte(key)?;
    let velocity = data_byte(velocity)?;
    Ok([command.base() + channel.index(), key, velocity])
}

fn data_byte(value: u8) -> Result<u8, Error> {
    if value > 127 {
        Err(Error::InvalidValue(i16::from(value)))
    } else {
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_note_on() {
        assert_eq!(
            Ok([0x90, 60, 127]),
            encode(Command::NoteOn, 1, 60, 127),
            "Expected left but got right"
        );
    }

    #[test]
    fn encode_note_off() {
        assert_eq!(
            Ok([0x80, 60, 0]),
            encode(Command::NoteOff, 1, 60, 0),
            "Expected left but got right"
        );
    }

    #[test]
    fn encode_adds_channel_to_status() {
        assert_eq!(
            Ok([0x92, 60, 127]),
            encode(Command::NoteOn, 3, 60, 127),
            "Expected left but got right"
        );
        assert_eq!(
            Ok([0x8F, 60, 0]),
            encode(Command::NoteOff, 16, 60, 0),
            "Expected left but got right"
        );
    }

    #[test]
    fn encode_rejects_bad_channel() {
        assert_eq!(Err(Error::InvalidChannel(0)), encode(Command::NoteOn, 0, 60, 127));
        assert_eq!(Err(Error::InvalidChannel(17)), encode(Command::NoteOn, 17, 60, 127));
    }

    #[test]
    fn encode_rejects_rather_than_truncates() {
        assert_eq!(Err(Error::InvalidValue(128)), encode(Command::NoteOn, 1, 128, 127));
        assert_eq!(Err(Error::InvalidValue(200)), encode(Command::NoteOn, 1, 60, 200));
    }

    #[test]
    fn channel_numbers() {
        assert_eq!(1, channel(1).unwrap().number(), "Expected left but got right");
        assert_eq!(16, channel(16).unwrap().number(), "Expected left but got right");
        assert_eq!(Err(Error::InvalidChannel(0)), channel(0));
    }

    #[test]
    fn note_event_bytes() {
        let ch1 = channel(1).unwrap();
        let ch3 = channel(3).unwrap();
        assert_eq!([0x90, 60, 127], NoteEvent::on(Note::C4).to_bytes(ch1));
        assert_eq!([0x80, 60, 0], NoteEvent::off(Note::C4).to_bytes(ch1));
        assert_eq!([0x92, 60, 127], NoteEvent::on(Note::C4).to_bytes(ch3));
    }

    #[test]
    fn note_event_bytes_match_wmidi() {
        let ch = channel(10).unwrap();
        for event in [NoteEvent::on(Note::A3), NoteEvent::off(Note::G5)] {
            let mut expected = [0_u8; 3];
            event.to_midi_message(ch).copy_to_slice(&mut expected).unwrap();
            assert_eq!(expected, event.to_bytes(ch), "Expected left but got right");
        }
    }

    #[test]
    fn getters() {
        let event = NoteEvent::off(Note::G2);
        assert_eq!(Command::NoteOff, event.command());
        assert_eq!(Note::G2, event.note());
        assert_eq!(0, u8::from(event.velocity()));
    }
}
