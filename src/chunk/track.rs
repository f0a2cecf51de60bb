//! Track chunk decoding. Walks the delta-time/event stream of one `MTrk` chunk and keeps only
//! its note-on events, stamped with absolute tick times

use event::{ChannelEvent, NoteOnEvent, UnsupportedStatusByte};
use meta::{MetaEvent, META_PREFIX};
use sysex::{SysexEvent, SYSEX_ESCAPE, SYSEX_START};
use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    chunk::chunk_types::TRACK_DATA_CHUNK,
    reader::{MidiStream, ReadError},
    Chunk,
};

pub mod event;
pub mod meta;
pub mod sysex;

/// Error types from decoding a track
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackError {
    /// Stream ended before the track was fully decoded
    #[error("Reached end of stream before done parsing track")]
    Read(#[from] ReadError),
    /// Status byte is not a handled channel, meta or sysex status
    #[error("Unsupported status byte {0}")]
    UnsupportedStatusByte(#[from] UnsupportedStatusByte),
    /// Note-on carried a note number outside of the MIDI data byte range
    #[error("Note number {0} is outside of the MIDI note range")]
    NoteNumberOutOfRange(u8),
    /// Variable length quantity kept its continuation bit set past 4 bytes
    #[error("Variable length quantity is longer than 4 bytes")]
    VariableLengthOverflow,
}

/// A decoded track chunk, holding the note-on events it contained in stream order
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TrackChunk {
    /// Every note-on event of the track
    notes: Vec<NoteOnEvent>,
}

impl TrackChunk {
    /// Decodes the next track chunk from the stream. Chunks with an unknown tag are skipped whole,
    /// then the `MTrk` chunk's declared length is used as the byte budget for its events
    pub fn decode<STREAM: MidiStream>(stream: &mut STREAM) -> Result<Self, TrackError> {
        let chunk = next_track_chunk(stream)?;

        let mut decoder = TrackDecoder::new(chunk.length);
        while decoder.remaining > 0 {
            decoder.decode_event(stream)?;
        }

        Ok(Self {
            notes: decoder.notes,
        })
    }

    /// Note-on events of the track
    pub fn notes(&self) -> &[NoteOnEvent] {
        &self.notes
    }

    /// Hands over the note-on events
    pub fn into_notes(self) -> Vec<NoteOnEvent> {
        self.notes
    }

    /// Number of note-on events
    pub fn len(&self) -> usize {
        self.notes.len()
    }

    /// True if the track held no note-on events
    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }
}

/// Reads chunk prologues until an `MTrk` one is found, discarding the body of any other chunk
fn next_track_chunk<STREAM: MidiStream>(stream: &mut STREAM) -> Result<Chunk, TrackError> {
    loop {
        let chunk = stream.read_chunk()?;
        if chunk.chunk_type == TRACK_DATA_CHUNK {
            return Ok(chunk);
        }

        tracing::debug!(
            chunk_type = %chunk.type_name(),
            length = chunk.len(),
            "Skipping alien chunk"
        );
        stream.discard(chunk.len())?;
    }
}

/// State carried across the events of a single track
struct TrackDecoder {
    /// Bytes of the declared chunk length not yet accounted for. May end below zero
    remaining: i64,
    /// Sum of every delta time decoded so far
    absolute_time: u64,
    /// Status byte of the last channel message, reused by running status
    running_status: Option<u8>,
    /// Note-on events collected so far
    notes: Vec<NoteOnEvent>,
}

impl TrackDecoder {
    /// A decoder with `length` bytes of budget
    fn new(length: u32) -> Self {
        Self {
            remaining: i64::from(length),
            absolute_time: 0,
            running_status: None,
            notes: vec![],
        }
    }

    /// Decodes one delta-time and event pair and deducts the bytes it took from the budget
    fn decode_event<STREAM: MidiStream>(&mut self, stream: &mut STREAM) -> Result<(), TrackError> {
        let (delta_time, delta_len) = read_variable_length(stream)?;
        self.absolute_time += u64::from(delta_time);

        let consumed = match stream.read_u8()? {
            META_PREFIX => {
                self.running_status = None;
                let meta = MetaEvent::skip(stream)?;
                tracing::trace!(kind = ?meta.kind(), length = meta.length(), "Skipped meta event");

                1 + meta.encoded_len()
            }

            SYSEX_START | SYSEX_ESCAPE => {
                self.running_status = None;
                let sysex = SysexEvent::skip(stream)?;
                tracing::trace!(length = sysex.length(), "Skipped sysex event");

                1 + sysex.encoded_len()
            }

            status if status & 0x80 != 0 => {
                let event = ChannelEvent::read(stream, status, None)?;
                self.running_status = Some(status);
                self.record(event)?;

                1 + event.data_len()
            }

            data => {
                let status = self.running_status.ok_or(UnsupportedStatusByte(data))?;
                let event = ChannelEvent::read(stream, status, Some(data))?;
                self.record(event)?;

                event.data_len()
            }
        };

        self.remaining -= (delta_len + consumed) as i64;
        Ok(())
    }

    /// Keeps note-on events, drops everything else
    fn record(&mut self, event: ChannelEvent) -> Result<(), TrackError> {
        match event.to_note_on(self.absolute_time)? {
            Some(note) => self.notes.push(note),
            None => tracing::trace!(message = ?event.message(), "Skipped channel event"),
        }

        Ok(())
    }
}

/// Reads a MIDI variable length quantity, returning its value and how many bytes it spanned
pub fn read_variable_length<STREAM: MidiStream>(
    stream: &mut STREAM,
) -> Result<(u32, usize), TrackError> {
    const MASK: u8 = 0x7F;
    const MAX_BYTES: usize = 4;

    let mut result: u32 = 0;
    for count in 1..=MAX_BYTES {
        let byte = stream.read_u8()?;
        result <<= 7;
        result |= (byte & MASK) as u32;

        if !msb_is_one(byte) {
            return Ok((result, count));
        }
    }

    Err(TrackError::VariableLengthOverflow)
}

/// Returns true if the msb of a byte is 1
fn msb_is_one(byte: u8) -> bool {
    byte >> 7 == 1
}
