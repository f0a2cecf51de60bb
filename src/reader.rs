//! MIDI file reader traits, allows for in memory byte spans or files to be read sequentially

use std::{convert::Infallible, path::Path};

use thiserror::Error;

use crate::Chunk;

/// Error type for running out of bytes before a read completes
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadError {
    /// The byte source was exhausted partway through a read
    #[error("Reached end of byte source before done reading")]
    Truncated,
}

/// Trait that allows certain amount of bytes to be yielded by an iterator
pub trait Yieldable<T> {
    /// Gets up to `n` elements while advancing the iterator
    fn get(&mut self, n: usize) -> Vec<T>;
}

impl<ITER: Iterator> Yieldable<ITER::Item> for ITER {
    fn get(&mut self, n: usize) -> Vec<ITER::Item> {
        self.by_ref().take(n).collect()
    }
}

/// Trait that allows for different types to be translated to a MIDI parseable format
pub trait MidiReadable {
    /// Error type that may be returned from the Midi Sequence
    type Error;
    /// Creates a byte iterator from the type
    fn get_midi_bytes(self) -> Result<impl Iterator<Item = u8>, Self::Error>;
}

/// Wrapper struct to allow passing Vec<u8> to MidiReadable trait
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MidiData(Vec<u8>);

impl From<Vec<u8>> for MidiData {
    fn from(value: Vec<u8>) -> Self {
        Self(value)
    }
}

impl MidiReadable for MidiData {
    type Error = Infallible;
    fn get_midi_bytes(self) -> Result<impl Iterator<Item = u8>, Self::Error> {
        Ok(self.0.into_iter())
    }
}

impl<PATH> MidiReadable for PATH
where
    PATH: AsRef<Path>,
{
    type Error = std::io::Error;
    /// Reads the whole file up front so the same path can be rewritten once decoding is done
    fn get_midi_bytes(self) -> Result<impl Iterator<Item = u8>, Self::Error> {
        let bytes = std::fs::read(self.as_ref())?;
        Ok(bytes.into_iter())
    }
}

/// Sequential, non-seeking primitive reads over a MIDI byte stream. Every multi-byte read either
/// yields its whole value or fails with [`ReadError::Truncated`]
pub trait MidiStream {
    /// Reads the next byte
    fn read_u8(&mut self) -> Result<u8, ReadError>;

    /// Reads a big-endian 16 bit unsigned integer
    fn read_u16_be(&mut self) -> Result<u16, ReadError> {
        let high = self.read_u8()?;
        let low = self.read_u8()?;
        Ok(u16::from_be_bytes([high, low]))
    }

    /// Reads a big-endian 32 bit unsigned integer
    fn read_u32_be(&mut self) -> Result<u32, ReadError> {
        let mut bytes = [0u8; 4];
        for byte in bytes.iter_mut() {
            *byte = self.read_u8()?;
        }
        Ok(u32::from_be_bytes(bytes))
    }

    /// Reads the next `n` bytes as an opaque block
    fn read_bytes(&mut self, n: usize) -> Result<Vec<u8>, ReadError>;

    /// Consumes and drops the next `n` bytes
    fn discard(&mut self, n: usize) -> Result<(), ReadError> {
        for _ in 0..n {
            self.read_u8()?;
        }
        Ok(())
    }

    /// Reads a 4 byte chunk type tag
    fn read_tag(&mut self) -> Result<[u8; 4], ReadError> {
        let bytes = self.read_bytes(4)?;
        Ok([bytes[0], bytes[1], bytes[2], bytes[3]])
    }

    /// Reads a chunk prologue, the tag followed by its 32 bit length
    fn read_chunk(&mut self) -> Result<Chunk, ReadError> {
        let chunk_type = self.read_tag()?;
        let length = self.read_u32_be()?;
        Ok(Chunk { chunk_type, length })
    }
}

impl<ITER> MidiStream for ITER
where
    ITER: Iterator<Item = u8>,
{
    fn read_u8(&mut self) -> Result<u8, ReadError> {
        self.next().ok_or(ReadError::Truncated)
    }

    fn read_bytes(&mut self, n: usize) -> Result<Vec<u8>, ReadError> {
        let bytes = self.get(n);
        if bytes.len() == n {
            Ok(bytes)
        } else {
            Err(ReadError::Truncated)
        }
    }
}
