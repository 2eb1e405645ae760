use std::io;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BufferError {
    #[error("Range {pos}..{} is out of bounds for buffer of length {buffer_len}", .pos + .len)]
    OutOfBounds { pos: u64, len: u64, buffer_len: u64 },

    #[error("Positions must be ascending and at least {len} bytes apart")]
    InvalidPositions { len: u64 },

    #[error("Nothing to undo")]
    NothingToUndo,

    #[error("Nothing to redo")]
    NothingToRedo,

    #[error("Byte source ended after {got} of {expected} bytes")]
    SourceExhausted { expected: u64, got: u64 },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}
