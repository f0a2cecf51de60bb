//! Header Chunk decoding and Struct Definitions

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    chunk::chunk_types::HEADER_CHUNK,
    reader::{MidiStream, ReadError},
};

/// Declared body length of a header chunk
const HEADER_LENGTH: u32 = 6;

/// Error types from decoding the header chunk
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderError {
    /// Chunk tag is not `MThd` or its declared length is not 6
    #[error("Malformed header chunk {tag:?} with length {length}")]
    MalformedHeader {
        /// Tag that was read
        tag: [u8; 4],
        /// Length that was declared
        length: u32,
    },
    /// Stream ended inside the header
    #[error("Header chunk is truncated")]
    Read(#[from] ReadError),
}

/// Header chunk data, including format, ntrks and division as 3 16 bit unsigned integers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct HeaderChunk {
    /// The raw MIDI format word
    format: u16,
    /// Number of tracks
    ntrks: u16,
    /// Time signature/division
    division: Division,
}

impl HeaderChunk {
    /// Reads the 14 byte header chunk: tag, length, format, track count and division
    pub fn decode<STREAM: MidiStream>(stream: &mut STREAM) -> Result<Self, HeaderError> {
        let chunk = stream.read_chunk()?;
        if chunk.chunk_type != HEADER_CHUNK || chunk.length != HEADER_LENGTH {
            return Err(HeaderError::MalformedHeader {
                tag: chunk.chunk_type,
                length: chunk.length,
            });
        }

        let format = stream.read_u16_be()?;
        let ntrks = stream.read_u16_be()?;
        let division = stream.read_u16_be()?.into();

        Ok(Self {
            format,
            ntrks,
            division,
        })
    }

    /// The raw format word as declared in the file
    pub fn raw_format(&self) -> u16 {
        self.format
    }

    /// The format, if it is one of the three defined by the standard
    pub fn format(&self) -> Option<Format> {
        Format::try_from(self.format).ok()
    }

    /// Number of track chunks that follow the header
    pub fn ntrks(&self) -> u16 {
        self.ntrks
    }

    /// Meaning of the delta-times in the tracks
    pub fn division(&self) -> Division {
        self.division
    }
}

/// The overall organization of the MIDI file. Only three values are valid, making most of the 16
/// bits irrelevant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Format {
    /// The file contains a single multi-channel track
    Zero,
    /// The file contains one or more simultaneous tracks (or MIDI outputs) of a sequence
    One,
    /// The file contains one or more sequentially independent single-track patterns
    Two,
}

/// Error struct representing an invalid format specifier
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Invalid header format {0}")]
pub struct InvalidFormat(pub u16);

impl TryFrom<u16> for Format {
    type Error = InvalidFormat;
    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Format::Zero),
            1 => Ok(Format::One),
            2 => Ok(Format::Two),
            other => Err(InvalidFormat(other)),
        }
    }
}

/// The meaning of the delta-times in the MIDI sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Division {
    /// When bit 15 is a 0, bits 14-0 represent ticks per quarter note
    Metrical(u16),
    /// When bit 15 is 1, bits 14-8 represent the negative SMPTE format,
    /// and bits 7-0 represent ticks per frame
    TimeCodeBased(SmpteTicks),
}

/// Division defined by time-code-based time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SmpteTicks {
    /// 7 bits of negative timecode
    smpte: i8,
    /// 8 bits of ticks per frame
    tpf: u8,
}

impl SmpteTicks {
    /// Frames per second, e.g. -25 for 25 fps
    pub fn smpte(&self) -> i8 {
        self.smpte
    }

    /// Ticks per frame
    pub fn tpf(&self) -> u8 {
        self.tpf
    }
}

impl From<u16> for Division {
    fn from(value: u16) -> Self {
        const MASK: u16 = 0x7FFF;

        if value & !MASK == 0 {
            return Division::Metrical(value);
        }

        let tpf = value as u8;
        // Sign extend the 7 bit two's complement frame rate
        let smpte = ((((value >> 8) as u8) << 1) as i8) >> 1;

        Division::TimeCodeBased(SmpteTicks { smpte, tpf })
    }
}

#[cfg(test)]
mod tests {
    use super::{Division, Format, HeaderChunk, HeaderError, SmpteTicks};
    use crate::reader::{MidiStream, ReadError};

    const HEADER: [u8; 14] = [
        b'M', b'T', b'h', b'd', 0x00, 0x00, 0x00, 0x06, 0x00, 0x01, 0x00, 0x0A, 0x01, 0x80,
    ];

    #[test]
    fn parsing_division_to_metrical_works() {
        let test: Division = (0x000au16).into();
        let expected = Division::Metrical(10);

        assert_eq!(test, expected)
    }

    #[test]
    fn parsing_division_to_timecode_works() {
        let test: Division = (0xE728u16).into();
        let expected = Division::TimeCodeBased(SmpteTicks {
            smpte: -25,
            tpf: 40,
        });

        assert_eq!(test, expected);

        let test: Division = (0xFFE8u16).into();
        let expected = Division::TimeCodeBased(SmpteTicks {
            smpte: -1,
            tpf: 232,
        });

        assert_eq!(test, expected)
    }

    #[test]
    fn header_chunk_reads_properly() {
        let mut stream = HEADER.into_iter().chain([0xAA]);

        let header = HeaderChunk::decode(&mut stream).expect("Decode header chunk");
        let expected = HeaderChunk {
            format: 1,
            ntrks: 10,
            division: Division::Metrical(384),
        };

        assert_eq!(header, expected);
        assert_eq!(header.format(), Some(Format::One));
        assert_eq!(header.division(), Division::Metrical(384));
        // Exactly 14 bytes consumed
        assert_eq!(stream.read_u8(), Ok(0xAA));
    }

    #[test]
    fn timecode_division_is_read_from_header() {
        let mut bytes = HEADER;
        bytes[12] = 0xE7;
        bytes[13] = 0x28;

        let header = HeaderChunk::decode(&mut bytes.into_iter()).expect("Decode header chunk");

        let Division::TimeCodeBased(ticks) = header.division() else {
            panic!("Expected a time code division, got {:?}", header.division());
        };
        assert_eq!(ticks.smpte(), -25);
        assert_eq!(ticks.tpf(), 40);
    }

    #[test]
    fn unknown_format_is_kept_raw() {
        let mut bytes = HEADER;
        bytes[9] = 0x07;

        let header = HeaderChunk::decode(&mut bytes.into_iter()).expect("Decode header chunk");

        assert_eq!(header.raw_format(), 7);
        assert_eq!(header.format(), None);
    }

    #[test]
    fn wrong_tag_is_malformed() {
        let mut bytes = HEADER;
        bytes[..4].copy_from_slice(b"MTrk");

        let result = HeaderChunk::decode(&mut bytes.into_iter());

        assert_eq!(
            result,
            Err(HeaderError::MalformedHeader {
                tag: *b"MTrk",
                length: 6
            })
        );
    }

    #[test]
    fn wrong_length_is_malformed() {
        let mut bytes = HEADER;
        bytes[7] = 0x08;

        let result = HeaderChunk::decode(&mut bytes.into_iter());

        assert!(matches!(
            result,
            Err(HeaderError::MalformedHeader { length: 8, .. })
        ));
    }

    #[test]
    fn truncated_header_fails() {
        let result = HeaderChunk::decode(&mut HEADER[..12].iter().copied());

        assert_eq!(result, Err(HeaderError::Read(ReadError::Truncated)));
    }
}
