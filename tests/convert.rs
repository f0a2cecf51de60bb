//! End to end conversion of MIDI files on disk

use std::fs;

use midiroll::{convert_file, roll::RollError, Error, MAX_ITERATION, ROW_COUNT};
use tempfile::tempdir;

/// A format 1 file with a tempo track followed by one note track
fn two_track_file() -> Vec<u8> {
    let mut bytes = b"MThd".to_vec();
    bytes.extend([0, 0, 0, 6, 0, 1, 0, 2, 0, 96]);

    let tempo = [
        0x00, 0xFF, 0x51, 0x03, 0x07, 0xA1, 0x20, // tempo
        0x00, 0xFF, 0x2F, 0x00, // end of track
    ];
    bytes.extend(b"MTrk");
    bytes.extend((tempo.len() as u32).to_be_bytes());
    bytes.extend(tempo);

    let notes = [
        0x00, 0xC0, 0x00, // program change
        0x00, 0x90, 5, 100, // note 5 at tick 0
        0x30, 0x80, 5, 0, // note off at tick 48
        0x00, 0x90, 12, 80, // note 12 at tick 48
        0x60, 0x90, 23, 0, // note 23 at tick 144, zero velocity
        0x00, 0xFF, 0x2F, 0x00,
    ];
    bytes.extend(b"MTrk");
    bytes.extend((notes.len() as u32).to_be_bytes());
    bytes.extend(notes);

    bytes
}

#[test]
fn file_is_rewritten_as_piano_roll() {
    let dir = tempdir().expect("Create temp dir");
    let path = dir.path().join("song.mid");
    fs::write(&path, two_track_file()).expect("Write MIDI file");

    let roll = convert_file(&path).expect("Convert file");

    assert!(roll.is_set(5, 0));
    assert!(roll.is_set(12, 2));
    assert!(roll.is_set(23, 6));
    assert_eq!(roll.occupied(), 3);

    let written = fs::read(&path).expect("Read rewritten file");
    assert_eq!(written.len(), ROW_COUNT * MAX_ITERATION);
    assert!(written.iter().all(|byte| *byte <= 1));
    // Row 5 is the last row of the first slice of block 0
    assert_eq!(written[5 * 32], 1);
    // Row 12 is the first row of block 2
    assert_eq!(written[2 * 6 * MAX_ITERATION + 2], 1);
    assert_eq!(written.iter().filter(|byte| **byte == 1).count(), 3);
}

#[test]
fn missing_file_is_not_found() {
    let dir = tempdir().expect("Create temp dir");
    let path = dir.path().join("missing.mid");

    let result = convert_file(&path);

    assert!(matches!(result, Err(Error::FileNotFound(missing)) if missing == path));
}

#[test]
fn failed_decode_leaves_file_untouched() {
    let dir = tempdir().expect("Create temp dir");
    let path = dir.path().join("empty.mid");
    let mut bytes = b"MThd".to_vec();
    bytes.extend([0, 0, 0, 6, 0, 0, 0, 1, 0, 96]);
    bytes.extend(b"MTrk");
    bytes.extend([0, 0, 0, 4, 0x00, 0xFF, 0x2F, 0x00]);
    fs::write(&path, &bytes).expect("Write MIDI file");

    let result = convert_file(&path);

    assert!(matches!(result, Err(Error::Roll(RollError::NoNotesFound))));
    assert_eq!(fs::read(&path).expect("Read file"), bytes);
}
