//! Chunk decoders for the header and track chunks of a Standard MIDI File

pub mod chunk_types;
pub mod header;
pub mod track;
