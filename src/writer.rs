//! The `RollWriteable` trait turns a piano roll into the bytes written over the input file. The
//! layout is not row-major: rows are grouped into blocks of [`BLOCK_ROWS`], and each block is
//! emitted one [`SLICE_WIDTH`] wide column slice at a time, every row of the block per slice.

use crate::{roll::PianoRoll, MAX_ITERATION, ROW_COUNT};

/// Rows per block
pub const BLOCK_ROWS: usize = 6;
/// Columns per slice
pub const SLICE_WIDTH: usize = 32;

/// A trait for types that can be encoded as piano roll output bytes
pub trait RollWriteable {
    /// Converts the data to its output byte sequence
    fn to_roll_bytes(&self) -> Vec<u8>;
}

impl RollWriteable for PianoRoll {
    /// One byte per cell, `0x01` occupied and `0x00` empty, `ROW_COUNT * MAX_ITERATION` in total
    fn to_roll_bytes(&self) -> Vec<u8> {
        let rows = self.rows();
        let mut bytes = Vec::with_capacity(ROW_COUNT * MAX_ITERATION);

        for block in 0..ROW_COUNT / BLOCK_ROWS {
            for slice in 0..MAX_ITERATION / SLICE_WIDTH {
                for cells in &rows[block * BLOCK_ROWS..(block + 1) * BLOCK_ROWS] {
                    let span = &cells[slice * SLICE_WIDTH..(slice + 1) * SLICE_WIDTH];
                    bytes.extend(span.iter().map(|cell| u8::from(*cell)));
                }
            }
        }

        bytes
    }
}
