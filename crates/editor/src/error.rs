use hexed_buffer::BufferError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EditError {
    #[error(transparent)]
    Buffer(#[from] BufferError),

    #[error("Invalid hex digit {0:?}")]
    InvalidDigit(char),

    #[error("Hex text has an odd number of digits: {0}")]
    OddDigits(u64),

    #[error("Selection {start}..{end} is out of bounds for buffer of length {len}")]
    InvalidSelection { start: u64, end: u64, len: u64 },

    #[error("Buffer has no file path")]
    NoPath,

    #[error("Failed to write file: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Clipboard(#[from] anyhow::Error),
}
