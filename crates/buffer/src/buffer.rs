
use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::ops::{Bound, RangeBounds};
use std::path::Path;

use crate::bytelog::ByteLog;
use crate::error::BufferError;
use crate::operation::{Operation, Positions, Tag};
use crate::source::ByteSource;
use crate::splice;
use crate::stack::OperationStack;

/// Receives notifications after the buffer has been changed.
/// All methods are called synchronously after the change has completed.
pub trait BufferObserver: fmt::Debug {
    /// Called when the buffer length changed
    fn length_changed(&mut self, _len: u64) {}

    /// Called after every change to the buffer contents
    fn data_changed(&mut self) {}

    /// Called when undo or redo availability changed
    fn undo_redo_changed(&mut self, _undo: bool, _redo: bool) {}
}

/// Snapshot of the state observers are interested in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Status {
    len: u64,
    undo: bool,
    redo: bool,
}

/// Log lengths before an operation started appending to them
#[derive(Debug, Clone, Copy)]
struct Marks {
    inserted: u64,
    deleted: u64,
}

/// Buffer holds the document bytes and the history used to undo and redo
/// changes to them.
///
/// Every byte ever inserted is appended to the inserted log and every byte
/// ever removed to the deleted log. Operations on the stack reference these
/// logs using offsets, so undo and redo only copy bytes back and forth and
/// never need to recompute anything.
#[derive(Debug)]
pub struct Buffer {
    data: Vec<u8>,
    inserted: ByteLog,
    deleted: ByteLog,
    stack: OperationStack,

    /// Stack top at the last save point, None if that state is gone from the
    /// history
    saved: Option<usize>,
    /// Redoable history has been discarded since the last save point
    history_truncated: bool,

    observer: Option<Box<dyn BufferObserver>>,
}

impl Buffer {
    /// Create a new empty buffer
    pub fn new() -> Buffer {
        Buffer::from(Vec::new())
    }

    /// Create a new buffer from a reader, the content is read to memory
    pub fn from_reader<R: io::Read>(mut reader: R) -> Result<Buffer, BufferError> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Ok(Buffer::from(data))
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Buffer, BufferError> {
        let data = fs::read(path.as_ref())?;
        log::info!("Opened {:?}, {} bytes", path.as_ref(), data.len());
        Ok(Buffer::from(data))
    }

    /// Open a file or create an empty buffer if no path is given
    pub fn open(path: Option<&Path>) -> Result<Buffer, BufferError> {
        match path {
            Some(path) => Buffer::from_path(path),
            None => Ok(Buffer::new()),
        }
    }

    /// Replace the buffer content with the file content, or empty it if no
    /// path is given. All history is dropped.
    pub fn reload(&mut self, path: Option<&Path>) -> Result<(), BufferError> {
        let data = match path {
            Some(path) => fs::read(path)?,
            None => Vec::new(),
        };

        log::info!("Reloading buffer from {:?}, {} bytes", path, data.len());

        let status = self.status();
        self.data = data;
        self.inserted.clear();
        self.deleted.clear();
        self.stack.clear();
        self.saved = Some(0);
        self.history_truncated = false;
        self.notify(status);
        Ok(())
    }

    pub fn set_observer(&mut self, observer: Box<dyn BufferObserver>) {
        self.observer = Some(observer);
    }

    pub fn take_observer(&mut self) -> Option<Box<dyn BufferObserver>> {
        self.observer.take()
    }

    #[inline]
    pub fn len(&self) -> u64 {
        self.data.len() as u64
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Borrow a range of the buffer.
    /// Panics if the range is out of bounds.
    #[inline]
    pub fn slice<R: RangeBounds<u64>>(&self, range: R) -> &[u8] {
        let start = match range.start_bound() {
            Bound::Included(n) => *n,
            Bound::Excluded(n) => *n + 1,
            Bound::Unbounded => 0,
        };

        let end = match range.end_bound() {
            Bound::Included(n) => *n + 1,
            Bound::Excluded(n) => *n,
            Bound::Unbounded => self.len(),
        };

        debug_assert!(
            end <= self.len(),
            "slice: Attempting to index {} over buffer len {}",
            end,
            self.len()
        );

        &self.data[start as usize..end as usize]
    }

    #[inline]
    pub fn byte_at(&self, pos: u64) -> Option<u8> {
        self.data.get(pos as usize).copied()
    }

    pub fn write_to<W: Write>(&self, mut writer: W) -> io::Result<usize> {
        writer.write_all(&self.data)?;
        Ok(self.data.len())
    }

    pub fn insert_byte_at(&mut self, pos: u64, tag: Tag, byte: u8) -> Result<(), BufferError> {
        self.insert_bytes_at(pos, tag, &[byte])
    }

    pub fn insert_bytes_at(&mut self, pos: u64, tag: Tag, bytes: &[u8]) -> Result<(), BufferError> {
        self.check_range(pos, 0)?;
        if bytes.is_empty() {
            return Ok(());
        }

        let marks = self.marks();
        self.inserted.append(bytes);
        self.commit(marks, tag, Positions::Single(pos), 0, bytes.len() as u64);
        Ok(())
    }

    pub fn delete_byte_at(&mut self, pos: u64, tag: Tag) -> Result<(), BufferError> {
        self.delete_bytes_at(pos, tag, 1)
    }

    pub fn delete_bytes_at(&mut self, pos: u64, tag: Tag, len: u64) -> Result<(), BufferError> {
        self.check_range(pos, len)?;
        if len == 0 {
            return Ok(());
        }

        let marks = self.marks();
        self.deleted
            .append(&self.data[pos as usize..(pos + len) as usize]);
        self.commit(marks, tag, Positions::Single(pos), len, 0);
        Ok(())
    }

    pub fn replace_byte_at(&mut self, pos: u64, tag: Tag, byte: u8) -> Result<(), BufferError> {
        self.replace_bytes_at(pos, tag, 1, &[byte])
    }

    /// Replace `len` bytes at `pos` with `bytes`, the lengths may differ.
    pub fn replace_bytes_at(
        &mut self,
        pos: u64,
        tag: Tag,
        len: u64,
        bytes: &[u8],
    ) -> Result<(), BufferError> {
        self.check_range(pos, len)?;
        if len == 0 && bytes.is_empty() {
            return Ok(());
        }

        let marks = self.marks();
        self.deleted
            .append(&self.data[pos as usize..(pos + len) as usize]);
        self.inserted.append(bytes);
        self.commit(marks, tag, Positions::Single(pos), len, bytes.len() as u64);
        Ok(())
    }

    /// Replace `n + 1` bytes at `pos` with `byte` followed by `n` zeroes.
    /// Used to overwrite a selection without creating the zeroes first.
    pub fn replace_byte_and_erase_following(
        &mut self,
        pos: u64,
        tag: Tag,
        byte: u8,
        n: u64,
    ) -> Result<(), BufferError> {
        let len = n.checked_add(1).ok_or(BufferError::OutOfBounds {
            pos,
            len: n,
            buffer_len: self.len(),
        })?;
        self.check_range(pos, len)?;

        let marks = self.marks();
        self.deleted
            .append(&self.data[pos as usize..(pos + len) as usize]);
        self.inserted.push(byte);
        self.inserted.append_zeroes(n);
        self.commit(marks, tag, Positions::Single(pos), len, len);
        Ok(())
    }

    /// Replace `len` bytes at every position with `bytes`.
    ///
    /// Positions are given in the current document, that is before any of
    /// the replacements are made. They must be ascending and the replaced
    /// windows may not overlap.
    pub fn replace_bytes_at_multiple_locations(
        &mut self,
        positions: &[u64],
        tag: Tag,
        len: u64,
        bytes: &[u8],
    ) -> Result<(), BufferError> {
        if positions.is_empty() || (len == 0 && bytes.is_empty()) {
            return Ok(());
        }

        let ascending = positions.windows(2).all(|pair| match pair[0].checked_add(len) {
            Some(end) => end <= pair[1],
            None => false,
        });
        if !ascending {
            return Err(BufferError::InvalidPositions { len });
        }

        if let Some(last) = positions.last() {
            self.check_range(*last, len)?;
        }

        let marks = self.marks();
        for pos in positions {
            self.deleted
                .append(&self.data[*pos as usize..(*pos + len) as usize]);
        }
        self.inserted.append(bytes);
        self.commit(
            marks,
            tag,
            Positions::Multi(positions.to_vec()),
            len,
            bytes.len() as u64,
        );
        Ok(())
    }

    /// Insert the bytes a source produces at `pos`
    pub fn insert_from_source<S: ByteSource + ?Sized>(
        &mut self,
        pos: u64,
        tag: Tag,
        src: &mut S,
    ) -> Result<(), BufferError> {
        self.check_range(pos, 0)?;
        let size = src.size();
        if size == 0 {
            return Ok(());
        }

        let marks = self.marks();
        self.pull(src, size, marks)?;
        self.commit(marks, tag, Positions::Single(pos), 0, size);
        Ok(())
    }

    /// Replace `len` bytes at `pos` with the bytes a source produces
    pub fn replace_with_source<S: ByteSource + ?Sized>(
        &mut self,
        pos: u64,
        tag: Tag,
        len: u64,
        src: &mut S,
    ) -> Result<(), BufferError> {
        self.check_range(pos, len)?;
        let size = src.size();
        if size == 0 && len == 0 {
            return Ok(());
        }

        let marks = self.marks();
        self.pull(src, size, marks)?;
        self.deleted
            .append(&self.data[pos as usize..(pos + len) as usize]);
        self.commit(marks, tag, Positions::Single(pos), len, size);
        Ok(())
    }

    /// Undo the latest operation.
    /// Returns the position and the tag the operation was created with.
    pub fn undo(&mut self) -> Result<(u64, Tag), BufferError> {
        let status = self.status();
        let op = self.stack.undo().ok_or(BufferError::NothingToUndo)?;
        backward(&mut self.data, op, &self.deleted);
        log::debug!("Undo {:?}", op);

        let result = (op.position(), op.tag);
        self.notify(status);
        Ok(result)
    }

    /// Redo the next undone operation.
    /// Returns the position and the tag the operation was created with.
    pub fn redo(&mut self) -> Result<(u64, Tag), BufferError> {
        let status = self.status();
        let op = self.stack.redo().ok_or(BufferError::NothingToRedo)?;
        forward(&mut self.data, op, &self.inserted);
        log::debug!("Redo {:?}", op);

        let result = (op.position(), op.tag);
        self.notify(status);
        Ok(result)
    }

    /// Returns whether undo and redo are possible
    pub fn can_undo_redo(&self) -> (bool, bool) {
        (self.stack.can_undo(), self.stack.can_redo())
    }

    /// Whether the buffer differs from the last save point, or the history
    /// can no longer prove it does not.
    pub fn is_dirty(&self) -> bool {
        self.history_truncated || self.saved != Some(self.stack.top())
    }

    /// Mark the current state as saved
    pub fn mark_saved(&mut self) {
        self.saved = Some(self.stack.top());
        self.history_truncated = false;
    }

    fn check_range(&self, pos: u64, len: u64) -> Result<(), BufferError> {
        match pos.checked_add(len) {
            Some(end) if end <= self.len() => Ok(()),
            _ => Err(BufferError::OutOfBounds {
                pos,
                len,
                buffer_len: self.len(),
            }),
        }
    }

    fn marks(&self) -> Marks {
        Marks {
            inserted: self.inserted.len(),
            deleted: self.deleted.len(),
        }
    }

    fn rollback(&mut self, marks: Marks) {
        self.inserted.truncate(marks.inserted);
        self.deleted.truncate(marks.deleted);
    }

    /// Pull exactly `size` bytes from a source to the inserted log
    fn pull<S: ByteSource + ?Sized>(
        &mut self,
        src: &mut S,
        size: u64,
        marks: Marks,
    ) -> Result<(), BufferError> {
        for got in 0..size {
            match src.get() {
                Some(byte) => self.inserted.push(byte),
                None => {
                    self.rollback(marks);
                    return Err(BufferError::SourceExhausted {
                        expected: size,
                        got,
                    });
                }
            }
        }

        Ok(())
    }

    /// Record an operation whose bytes have been appended to the logs after
    /// `marks` and apply it to the data.
    fn commit(
        &mut self,
        marks: Marks,
        tag: Tag,
        positions: Positions,
        deleted_len: u64,
        inserted_len: u64,
    ) {
        let status = self.status();
        let mut op = Operation {
            tag,
            positions,
            deleted_len,
            inserted_len,
            deleted_offset: marks.deleted,
            inserted_offset: marks.inserted,
        };

        // Discarded operations own everything in the logs from their smallest
        // offsets up to the marks, the new operation's bytes come after.
        if let Some(discarded) = self.stack.discard_redo() {
            self.inserted
                .cut(discarded.inserted_offset..marks.inserted);
            self.deleted.cut(discarded.deleted_offset..marks.deleted);
            op.inserted_offset = discarded.inserted_offset;
            op.deleted_offset = discarded.deleted_offset;

            self.history_truncated = true;
            if matches!(self.saved, Some(saved) if saved > self.stack.top()) {
                self.saved = None;
            }

            log::debug!("Discarded {} redoable operations", discarded.count);
        }

        assert_eq!(
            op.inserted_offset + op.inserted_len,
            self.inserted.len(),
            "inserted log out of sync"
        );
        assert_eq!(
            op.deleted_offset + op.deleted_log_len(),
            self.deleted.len(),
            "deleted log out of sync"
        );

        log::debug!("Push {:?}", op);
        self.stack.push(op);
        if let Some(op) = self.stack.latest() {
            forward(&mut self.data, op, &self.inserted);
        }

        self.notify(status);
    }

    fn status(&self) -> Status {
        let (undo, redo) = self.can_undo_redo();
        Status {
            len: self.len(),
            undo,
            redo,
        }
    }

    fn notify(&mut self, before: Status) {
        let after = self.status();
        let Some(observer) = self.observer.as_mut() else {
            return;
        };

        if before.len != after.len {
            observer.length_changed(after.len);
        }

        observer.data_changed();

        if (before.undo, before.redo) != (after.undo, after.redo) {
            observer.undo_redo_changed(after.undo, after.redo);
        }
    }
}

impl Default for Buffer {
    fn default() -> Self {
        Buffer::new()
    }
}

impl From<Vec<u8>> for Buffer {
    fn from(data: Vec<u8>) -> Self {
        Buffer {
            data,
            inserted: ByteLog::new(),
            deleted: ByteLog::new(),
            stack: OperationStack::new(),
            saved: Some(0),
            history_truncated: false,
            observer: None,
        }
    }
}

impl From<&[u8]> for Buffer {
    fn from(data: &[u8]) -> Self {
        Buffer::from(data.to_vec())
    }
}

impl From<&Buffer> for Vec<u8> {
    fn from(buf: &Buffer) -> Self {
        buf.data.clone()
    }
}

/// Apply an operation to the data using the inserted bytes.
///
/// Multi position operations store positions in the document before the
/// operation, so each replacement is moved by the length change of the
/// replacements before it.
fn forward(data: &mut Vec<u8>, op: &Operation, inserted: &ByteLog) {
    let len = data.len();
    let bytes = inserted.slice(op.inserted_offset, op.inserted_len);
    let del = op.deleted_len as usize;
    let ins = bytes.len();

    match &op.positions {
        Positions::Single(pos) => splice::apply(data, *pos as usize, del, bytes),
        Positions::Multi(positions) => {
            for (i, pos) in positions.iter().enumerate() {
                let pos = *pos as usize;
                let at = if ins >= del {
                    pos + i * (ins - del)
                } else {
                    pos - i * (del - ins)
                };
                splice::apply(data, at, del, bytes);
            }
        }
    }

    assert_eq!(
        data.len() as i128 - len as i128,
        op.len_delta(),
        "redo: length changed by an unexpected amount"
    );
}

/// Revert an operation using the deleted bytes.
///
/// Multi position operations are reverted in position order. Every earlier
/// restoration has already taken back its length change, so the recorded
/// positions are used as is.
fn backward(data: &mut Vec<u8>, op: &Operation, deleted: &ByteLog) {
    let len = data.len();
    let ins = op.inserted_len as usize;

    match &op.positions {
        Positions::Single(pos) => {
            let bytes = deleted.slice(op.deleted_offset, op.deleted_len);
            splice::apply(data, *pos as usize, ins, bytes);
        }
        Positions::Multi(positions) => {
            for (i, pos) in positions.iter().enumerate() {
                let bytes = deleted.slice(op.deleted_offset_of(i as u64), op.deleted_len);
                splice::apply(data, *pos as usize, ins, bytes);
            }
        }
    }

    assert_eq!(
        len as i128 - data.len() as i128,
        op.len_delta(),
        "undo: length changed by an unexpected amount"
    );
}
