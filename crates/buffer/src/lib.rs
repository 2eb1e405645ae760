mod buffer;
mod bytelog;
mod error;
mod operation;
mod source;
mod splice;
mod stack;

pub use buffer::{Buffer, BufferObserver};
pub use error::BufferError;
pub use operation::Tag;
pub use source::{ByteSource, SliceSource};
