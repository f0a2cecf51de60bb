//! The piano roll grid and the reducer that folds note-on events into it

use thiserror::Error;

use crate::{chunk::track::event::NoteOnEvent, MAX_ITERATION, ROW_COUNT, TICKS_PER_BUCKET};

/// Error types from building a piano roll
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RollError {
    /// Note number has no row in the grid
    #[error("Note {row} does not fit in {} rows", ROW_COUNT)]
    RowOutOfRange {
        /// Offending row
        row: usize,
    },
    /// Time bucket lies past the end of the grid
    #[error("Time bucket {col} does not fit in {} columns", MAX_ITERATION)]
    ColOutOfRange {
        /// Offending column
        col: u64,
    },
    /// No note-on events to reduce
    #[error("MIDI does not contain notes")]
    NoNotesFound,
}

/// Occupancy grid of note rows by quantized time buckets. Cells are only ever set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PianoRoll {
    /// Row-major cells
    cells: [[bool; MAX_ITERATION]; ROW_COUNT],
}

impl Default for PianoRoll {
    fn default() -> Self {
        Self::new()
    }
}

impl PianoRoll {
    /// An empty grid
    pub fn new() -> Self {
        Self {
            cells: [[false; MAX_ITERATION]; ROW_COUNT],
        }
    }

    /// Marks `(row, col)` as occupied
    pub fn set(&mut self, row: usize, col: u64) -> Result<(), RollError> {
        let cells = self
            .cells
            .get_mut(row)
            .ok_or(RollError::RowOutOfRange { row })?;
        let cell = usize::try_from(col)
            .ok()
            .and_then(|index| cells.get_mut(index))
            .ok_or(RollError::ColOutOfRange { col })?;

        *cell = true;
        Ok(())
    }

    /// Marks the cell a note-on event falls into
    pub fn insert(&mut self, event: &NoteOnEvent) -> Result<(), RollError> {
        let row = usize::from(event.note());
        let col = event.absolute_time() / TICKS_PER_BUCKET;

        self.set(row, col)
    }

    /// True if `(row, col)` is occupied. Out of range cells are never occupied
    pub fn is_set(&self, row: usize, col: usize) -> bool {
        self.cells
            .get(row)
            .and_then(|cells| cells.get(col))
            .copied()
            .unwrap_or(false)
    }

    /// One row of cells
    pub fn row(&self, row: usize) -> Option<&[bool; MAX_ITERATION]> {
        self.cells.get(row)
    }

    /// Every row of cells, row-major
    pub fn rows(&self) -> &[[bool; MAX_ITERATION]; ROW_COUNT] {
        &self.cells
    }

    /// Number of occupied cells
    pub fn occupied(&self) -> usize {
        self.cells.iter().flatten().filter(|cell| **cell).count()
    }
}

/// Folds note-on events into a fresh piano roll. Row is the note number, column the absolute time
/// divided by [`TICKS_PER_BUCKET`]
pub fn reduce(events: Vec<NoteOnEvent>) -> Result<PianoRoll, RollError> {
    if events.is_empty() {
        return Err(RollError::NoNotesFound);
    }

    let mut roll = PianoRoll::new();
    for event in &events {
        roll.insert(event)?;
    }

    Ok(roll)
}
