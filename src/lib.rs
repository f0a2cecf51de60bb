//! # midiroll
//!
//! Reduces a Standard MIDI File into a fixed-size, quantized piano roll. The first track that
//! carries note-on events is folded into a grid of [`ROW_COUNT`] note rows by [`MAX_ITERATION`]
//! time buckets, and the grid is written back as raw occupancy bytes in a block-interleaved
//! layout.
//!
//! ## Overview
//!
//! MIDI files are structured as a series of chunks. Each chunk contains a 4-character ASCII
//! type identifier and a 32-bit length that specifies how many bytes of data follow. The header
//! chunk (`MThd`) declares how many track chunks (`MTrk`) follow it, and each track chunk holds
//! a stream of delta-timed events.
//!
//! - **Streaming decode**: every stage reads from any implementor of [`reader::MidiStream`],
//!   which is implemented for all `Iterator<Item = u8>` types.
//! - **Budgeted tracks**: a track's declared length is the only thing that ends its event loop,
//!   and every event deducts exactly the bytes it consumed.
//! - **Checked grid**: notes and times that do not fit the grid are errors, never wrapped.
//!
//! ## Example Usage
//!
//! ```rust
//! use midiroll::{decode_piano_roll, reader::{MidiData, MidiReadable}, writer::RollWriteable};
//!
//! let bytes = vec![
//!     b'M', b'T', b'h', b'd', 0, 0, 0, 6, 0, 0, 0, 1, 0, 96,
//!     b'M', b'T', b'r', b'k', 0, 0, 0, 8,
//!     0x00, 0x90, 5, 100,
//!     0x00, 0xFF, 0x2F, 0x00,
//! ];
//! let mut stream = MidiData::from(bytes).get_midi_bytes().unwrap();
//!
//! let roll = decode_piano_roll(&mut stream).expect("Decode piano roll");
//! assert!(roll.is_set(5, 0));
//! assert_eq!(roll.to_roll_bytes().len(), midiroll::ROW_COUNT * midiroll::MAX_ITERATION);
//! ```
//!
//! ## Library Structure
//!
//! - **[`reader`]**: byte sources and the primitive sequential reads.
//! - **[`chunk`]**: the header decoder and the track event decoder.
//! - **[`roll`]**: the piano roll grid and the reducer that fills it.
//! - **[`writer`]**: the block-interleaved grid serializer.

use std::path::{Path, PathBuf};

use chunk::{
    header::{HeaderChunk, HeaderError},
    track::{TrackChunk, TrackError},
};
use reader::{MidiReadable, MidiStream};
use roll::{PianoRoll, RollError};
use writer::RollWriteable;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub mod chunk;
pub mod reader;
pub mod roll;
pub mod writer;

/// Number of note rows in the piano roll
pub const ROW_COUNT: usize = 24;
/// Number of time buckets in the piano roll
pub const MAX_ITERATION: usize = 128;
/// Ticks folded into a single time bucket
pub const TICKS_PER_BUCKET: u64 = 24;

/// Represents a raw MIDI Chunk prologue.
/// A MIDI Chunk consists of a 4-character ASCII type identifier and a 32-bit unsigned integer
/// specifying the length of its data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Chunk {
    /// 4 character ASCII chunk type
    pub chunk_type: [u8; 4],
    /// Length of the data that follows
    length: u32,
}

impl Chunk {
    /// Gets the length of the chunk as a usize
    pub fn len(&self) -> usize {
        self.length as usize
    }

    /// Returns if the chunk has no attributed data
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// The chunk type as text, for diagnostics
    pub fn type_name(&self) -> String {
        String::from_utf8_lossy(&self.chunk_type).into_owned()
    }
}

/// Every way turning a MIDI file into a piano roll can fail
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The input path could not be opened because it does not exist
    #[error("MIDI file not found: {}", .0.display())]
    FileNotFound(PathBuf),
    /// Any other I/O failure on the input or output file
    #[error("I/O error on {}", .path.display())]
    Io {
        /// File being read or written
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
    /// Header chunk could not be decoded
    #[error("Failed to decode header chunk")]
    Header(#[from] HeaderError),
    /// A track chunk could not be decoded
    #[error("Failed to decode track chunk")]
    Track(#[from] TrackError),
    /// The selected notes do not fit the piano roll
    #[error("Failed to build piano roll")]
    Roll(#[from] RollError),
}

impl Error {
    /// Classifies an I/O error from opening `path`
    fn open(path: &Path, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            Self::FileNotFound(path.to_path_buf())
        } else {
            Self::io(path, source)
        }
    }

    /// Wraps an I/O error with the path it happened on
    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Decodes the header and every declared track from `stream`, then reduces the first track that
/// holds at least one note-on event. Tracks after the selected one are still decoded so the
/// stream stays positioned on chunk boundaries, but their notes are dropped.
pub fn decode_piano_roll<STREAM: MidiStream>(stream: &mut STREAM) -> Result<PianoRoll, Error> {
    let header = HeaderChunk::decode(stream)?;
    tracing::info!(tracks = header.ntrks(), "MIDI block count");

    let mut selected: Option<(u16, TrackChunk)> = None;
    for index in 0..header.ntrks() {
        let track = TrackChunk::decode(stream)?;

        if selected.is_none() && !track.is_empty() {
            selected = Some((index, track));
        } else {
            tracing::debug!(index, notes = track.len(), "Discarding track");
        }
    }

    let (index, track) = selected.ok_or(RollError::NoNotesFound)?;
    tracing::info!(index, notes = track.len(), "Reducing track into piano roll");

    Ok(roll::reduce(track.into_notes())?)
}

/// Reads the MIDI file at `path`, reduces it into a piano roll and overwrites the same file with
/// the serialized roll. The file is left untouched if decoding fails.
pub fn convert_file<PATH: AsRef<Path>>(path: PATH) -> Result<PianoRoll, Error> {
    let path = path.as_ref();
    let mut stream = path
        .get_midi_bytes()
        .map_err(|source| Error::open(path, source))?;

    let roll = decode_piano_roll(&mut stream)?;
    let bytes = roll.to_roll_bytes();

    std::fs::write(path, &bytes).map_err(|source| Error::io(path, source))?;
    tracing::info!(path = %path.display(), bytes = bytes.len(), "Wrote piano roll");

    Ok(roll)
}
