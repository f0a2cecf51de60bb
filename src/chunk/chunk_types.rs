//! Chunk type constants

/// Creates a chunk type identifier
macro_rules! chunk_type {
    ($const_name:ident, $a:expr_2021, $b:expr_2021, $c:expr_2021, $d:expr_2021) => {
        /// MIDI chunk type
        pub const $const_name: [u8; 4] = [$a, $b, $c, $d];
    };
}

chunk_type!(HEADER_CHUNK, b'M', b'T', b'h', b'd');
chunk_type!(TRACK_DATA_CHUNK, b'M', b'T', b'r', b'k');
