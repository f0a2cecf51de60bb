//! Meta events. Their payloads are skipped, only the tag and length are kept for logging

use super::{read_variable_length, TrackError};
use crate::reader::MidiStream;

/// Status byte that introduces a meta event
pub const META_PREFIX: u8 = 0xFF;

/// The kind of a meta event, named after its tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetaKind {
    /// Sequence Number, tag 0x00
    SequenceNumber,
    /// Text metadata, tag 0x01
    Text,
    /// Copyright, tag 0x02
    Copyright,
    /// Track name, tag 0x03
    TrackName,
    /// Instrument name, tag 0x04
    InstrumentName,
    /// Lyric, tag 0x05
    Lyric,
    /// Marker, tag 0x06
    Marker,
    /// Cue Point, tag 0x07
    CuePoint,
    /// Midi Channel Prefix, tag 0x20
    MidiChannelPrefix,
    /// End of Track Identifier, tag 0x2F
    EndOfTrack,
    /// Tempo, tag 0x51
    Tempo,
    /// Smpte Offset, tag 0x54
    SmpteOffset,
    /// Time signature, tag 0x58
    TimeSignature,
    /// Key Signature, tag 0x59
    KeySignature,
    /// Sequencer Specific, tag 0x7F
    SequencerSpecific,
    /// An unknown meta event
    Unknown(u8),
}

impl From<u8> for MetaKind {
    fn from(tag: u8) -> Self {
        match tag {
            0x00 => Self::SequenceNumber,
            0x01 => Self::Text,
            0x02 => Self::Copyright,
            0x03 => Self::TrackName,
            0x04 => Self::InstrumentName,
            0x05 => Self::Lyric,
            0x06 => Self::Marker,
            0x07 => Self::CuePoint,
            0x20 => Self::MidiChannelPrefix,
            0x2F => Self::EndOfTrack,
            0x51 => Self::Tempo,
            0x54 => Self::SmpteOffset,
            0x58 => Self::TimeSignature,
            0x59 => Self::KeySignature,
            0x7F => Self::SequencerSpecific,
            other => Self::Unknown(other),
        }
    }
}

/// A skipped meta event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetaEvent {
    /// Meta type tag
    tag: u8,
    /// Declared payload length
    length: u32,
    /// Bytes the length quantity was encoded in
    length_bytes: usize,
}

impl MetaEvent {
    /// Reads the tag and length of a meta event whose `0xFF` prefix was already consumed, then
    /// discards its payload
    pub fn skip<STREAM: MidiStream>(stream: &mut STREAM) -> Result<Self, TrackError> {
        let tag = stream.read_u8()?;
        let (length, length_bytes) = read_variable_length(stream)?;
        stream.discard(length as usize)?;

        Ok(Self {
            tag,
            length,
            length_bytes,
        })
    }

    /// Kind of meta event
    pub fn kind(&self) -> MetaKind {
        self.tag.into()
    }

    /// Payload length
    pub fn length(&self) -> u32 {
        self.length
    }

    /// Bytes consumed after the `0xFF` prefix: tag, length and payload
    pub fn encoded_len(&self) -> usize {
        1 + self.length_bytes + self.length as usize
    }
}
