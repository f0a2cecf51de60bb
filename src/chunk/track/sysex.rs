//! System Exclusive Messages. Skipped whole

use super::{read_variable_length, TrackError};
use crate::reader::MidiStream;

/// Status byte that starts a system exclusive message
pub const SYSEX_START: u8 = 0xF0;
/// Status byte of a continuation or escaped system exclusive packet
pub const SYSEX_ESCAPE: u8 = 0xF7;

/// A skipped system exclusive event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SysexEvent {
    /// Declared payload length
    length: u32,
    /// Bytes the length quantity was encoded in
    length_bytes: usize,
}

impl SysexEvent {
    /// Reads the length of a sysex event whose status byte was already consumed, then discards
    /// its payload, including any trailing `0xF7`
    pub fn skip<STREAM: MidiStream>(stream: &mut STREAM) -> Result<Self, TrackError> {
        let (length, length_bytes) = read_variable_length(stream)?;
        stream.discard(length as usize)?;

        Ok(Self {
            length,
            length_bytes,
        })
    }

    /// Payload length
    pub fn length(&self) -> u32 {
        self.length
    }

    /// Bytes consumed after the status byte
    pub fn encoded_len(&self) -> usize {
        self.length_bytes + self.length as usize
    }
}
