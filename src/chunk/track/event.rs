//! MIDI channel events and the note-on records kept from them

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::TrackError;
use crate::reader::MidiStream;

/// A note being pressed, stamped with the absolute tick it happens on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NoteOnEvent {
    /// Note number
    note: u8,
    /// Channel, the low nibble of the status byte
    channel: u8,
    /// Velocity. Decoded but not used by the piano roll
    velocity: u8,
    /// Sum of all delta times up to and including this event
    absolute_time: u64,
}

impl NoteOnEvent {
    /// Creates a new note-on record
    pub fn new(note: u8, channel: u8, velocity: u8, absolute_time: u64) -> Self {
        Self {
            note,
            channel,
            velocity,
            absolute_time,
        }
    }

    /// Note number
    pub fn note(&self) -> u8 {
        self.note
    }

    /// Channel the note was played on
    pub fn channel(&self) -> u8 {
        self.channel
    }

    /// Velocity the note was struck with
    pub fn velocity(&self) -> u8 {
        self.velocity
    }

    /// Absolute time in ticks
    pub fn absolute_time(&self) -> u64 {
        self.absolute_time
    }
}

/// Error type for a status byte that is not a handled channel message
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("{0:#04X}")]
pub struct UnsupportedStatusByte(pub u8);

/// The kinds of channel message a track may hold, keyed by the status byte's high nibble
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelMessage {
    /// Note released, `0x8n`
    NoteOff,
    /// Note depressed, `0x9n`
    NoteOn,
    /// Controller value change, `0xBn`. Read with a single data byte
    ControlChange,
    /// Patch number change, `0xCn`
    ProgramChange,
    /// Channel wide aftertouch, `0xDn`
    ChannelPressure,
    /// Pitch wheel change, `0xEn`
    PitchBend,
}

impl ChannelMessage {
    /// Number of data bytes following the status byte
    pub fn data_len(self) -> usize {
        match self {
            Self::ControlChange | Self::ProgramChange | Self::ChannelPressure => 1,
            Self::NoteOff | Self::NoteOn | Self::PitchBend => 2,
        }
    }
}

impl TryFrom<u8> for ChannelMessage {
    type Error = UnsupportedStatusByte;
    fn try_from(status: u8) -> Result<Self, Self::Error> {
        match status & 0xF0 {
            0x80 => Ok(Self::NoteOff),
            0x90 => Ok(Self::NoteOn),
            0xB0 => Ok(Self::ControlChange),
            0xC0 => Ok(Self::ProgramChange),
            0xD0 => Ok(Self::ChannelPressure),
            0xE0 => Ok(Self::PitchBend),
            _ => Err(UnsupportedStatusByte(status)),
        }
    }
}

/// A decoded channel message with its raw data bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelEvent {
    /// Message kind
    message: ChannelMessage,
    /// Low nibble of the status byte
    channel: u8,
    /// Data bytes, only the first `message.data_len()` are meaningful
    data: [u8; 2],
}

impl ChannelEvent {
    /// Reads the data bytes of a channel message with the given status. Under running status the
    /// first data byte has already been read in place of a status byte and is passed as `first`
    pub fn read<STREAM: MidiStream>(
        stream: &mut STREAM,
        status: u8,
        first: Option<u8>,
    ) -> Result<Self, TrackError> {
        let message = ChannelMessage::try_from(status)?;
        let mut first = first;
        let mut data = [0u8; 2];

        for byte in data.iter_mut().take(message.data_len()) {
            *byte = match first.take() {
                Some(byte) => byte,
                None => stream.read_u8()?,
            };
        }

        Ok(Self {
            message,
            channel: status & 0x0F,
            data,
        })
    }

    /// Message kind
    pub fn message(&self) -> ChannelMessage {
        self.message
    }

    /// Channel the message was sent on
    pub fn channel(&self) -> u8 {
        self.channel
    }

    /// Number of data bytes the message carried
    pub fn data_len(&self) -> usize {
        self.message.data_len()
    }

    /// The note-on record for this event at `absolute_time`, or `None` for any other message.
    /// Velocity zero stays a note-on
    pub fn to_note_on(&self, absolute_time: u64) -> Result<Option<NoteOnEvent>, TrackError> {
        if self.message != ChannelMessage::NoteOn {
            return Ok(None);
        }

        let [note, velocity] = self.data;
        if note > 0x7F {
            return Err(TrackError::NoteNumberOutOfRange(note));
        }

        Ok(Some(NoteOnEvent::new(
            note,
            self.channel,
            velocity,
            absolute_time,
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::{ChannelEvent, ChannelMessage, NoteOnEvent, UnsupportedStatusByte};
    use crate::reader::MidiStream;

    #[test]
    fn status_nibbles_map_to_messages() {
        assert_eq!(ChannelMessage::try_from(0x8F), Ok(ChannelMessage::NoteOff));
        assert_eq!(ChannelMessage::try_from(0x90), Ok(ChannelMessage::NoteOn));
        assert_eq!(
            ChannelMessage::try_from(0xB1),
            Ok(ChannelMessage::ControlChange)
        );
        assert_eq!(
            ChannelMessage::try_from(0xC2),
            Ok(ChannelMessage::ProgramChange)
        );
        assert_eq!(
            ChannelMessage::try_from(0xD3),
            Ok(ChannelMessage::ChannelPressure)
        );
        assert_eq!(ChannelMessage::try_from(0xE4), Ok(ChannelMessage::PitchBend));
        assert_eq!(
            ChannelMessage::try_from(0xA0),
            Err(UnsupportedStatusByte(0xA0))
        );
    }

    #[test]
    fn midi_event_status_parsing() {
        let key = 0b01010101;
        let velocity = 0b01111111;

        let mut stream = [key, velocity, 0x33].into_iter();
        let event = ChannelEvent::read(&mut stream, 0b10011111, None).expect("Parse note on");

        assert_eq!(event.message(), ChannelMessage::NoteOn);
        assert_eq!(event.channel(), 0x0F);
        assert_eq!(
            event.to_note_on(7),
            Ok(Some(NoteOnEvent::new(key, 0x0F, velocity, 7)))
        );
        assert_eq!(stream.read_u8(), Ok(0x33));
    }

    #[test]
    fn running_status_only_reads_remaining_data() {
        let mut stream = [0x40, 0x33].into_iter();
        let event = ChannelEvent::read(&mut stream, 0x92, Some(0x3C)).expect("Parse note on");

        let note = event
            .to_note_on(0)
            .expect("Valid note number")
            .expect("Note on is recorded");
        assert_eq!(note.note(), 0x3C);
        assert_eq!(note.channel(), 2);
        assert_eq!(note.velocity(), 0x40);
        assert_eq!(note.absolute_time(), 0);
        assert_eq!(stream.read_u8(), Ok(0x33));
    }

    #[test]
    fn non_note_on_messages_are_not_recorded() {
        let mut stream = [0x3C, 0x40].into_iter();
        let event = ChannelEvent::read(&mut stream, 0x80, None).expect("Parse note off");

        assert_eq!(event.to_note_on(0), Ok(None));
    }
}
