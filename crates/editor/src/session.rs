
use std::fs::File;
use std::io::{BufWriter, Write};
use std::ops::Range;
use std::path::{Path, PathBuf};

use hexed_buffer::{Buffer, BufferError, BufferObserver, ByteSource};

use crate::clipboard::{new_clipboard, Clipboard};
use crate::error::EditError;
use crate::hex::{self, HexSource};
use crate::nibble::{self, ByteEdit, CaretTag, NibbleEvent, NibbleState, Parity};
use crate::options::{EditMode, Options};
use crate::search;

/// An editing session on a single buffer.
///
/// The caret is a nibble position in `0..=2 * len`. Even positions are at
/// the high nibble of a byte and odd positions at the low nibble. The
/// selection is a byte range and is cleared by any edit, undo or redo.
#[derive(Debug)]
pub struct Session {
    buf: Buffer,
    path: Option<PathBuf>,
    caret: u64,
    selection: Option<Range<u64>>,
    mode: EditMode,
    state: NibbleState,
    clipboard: Box<dyn Clipboard>,
    options: Options,
}

impl Session {
    pub fn new(buf: Buffer, path: Option<PathBuf>, options: Options) -> Session {
        let clipboard = new_clipboard(options.clipboard);
        Session::with_clipboard(buf, path, options, clipboard)
    }

    pub fn with_clipboard(
        buf: Buffer,
        path: Option<PathBuf>,
        options: Options,
        clipboard: Box<dyn Clipboard>,
    ) -> Session {
        Session {
            buf,
            path,
            caret: 0,
            selection: None,
            mode: options.mode,
            state: NibbleState::Even,
            clipboard,
            options,
        }
    }

    /// Open a file, or an empty buffer if no path is given
    pub fn open(path: Option<&Path>, options: Options) -> Result<Session, EditError> {
        let buf = Buffer::open(path)?;
        Ok(Session::new(buf, path.map(Path::to_path_buf), options))
    }

    pub fn buffer(&self) -> &Buffer {
        &self.buf
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn caret(&self) -> u64 {
        self.caret
    }

    pub fn state(&self) -> NibbleState {
        self.state
    }

    pub fn mode(&self) -> EditMode {
        self.mode
    }

    pub fn selection(&self) -> Option<Range<u64>> {
        self.selection.clone()
    }

    pub fn is_dirty(&self) -> bool {
        self.buf.is_dirty()
    }

    pub fn set_observer(&mut self, observer: Box<dyn BufferObserver>) {
        self.buf.set_observer(observer);
    }

    /// Switch between insert and replace. Anything pending is kept in the
    /// document as a zero nibble.
    pub fn set_mode(&mut self, mode: EditMode) {
        self.mode = mode;
        self.state = NibbleState::at(self.caret);
    }

    /// Move the caret to a nibble position, clamped to the document
    pub fn move_to(&mut self, caret: u64) {
        self.selection = None;
        self.set_caret(caret.min(self.buf.len() * 2));
    }

    /// Select a byte range, an empty range clears the selection. The caret
    /// moves to the selection start.
    pub fn select(&mut self, range: Range<u64>) -> Result<(), EditError> {
        let len = self.buf.len();
        if range.start > range.end || range.end > len {
            return Err(EditError::InvalidSelection {
                start: range.start,
                end: range.end,
                len,
            });
        }

        self.set_caret(range.start * 2);
        self.selection = if range.is_empty() { None } else { Some(range) };
        Ok(())
    }

    /// Handle a keystroke
    pub fn input(&mut self, event: NibbleEvent) -> Result<(), EditError> {
        if let Some(selection) = self.selection.take() {
            return self.input_selection(selection, event);
        }

        match self.mode {
            EditMode::Insert => self.input_insert(event),
            EditMode::Replace => self.input_replace(event),
        }
    }

    fn input_selection(&mut self, sel: Range<u64>, event: NibbleEvent) -> Result<(), EditError> {
        let n = sel.end - sel.start;

        match (self.mode, event) {
            (EditMode::Replace, NibbleEvent::Insert(u)) => {
                let tag = CaretTag::new(0, 1).pack();
                self.buf
                    .replace_byte_and_erase_following(sel.start, tag, (u & 0xF) << 4, n - 1)?;
                self.set_caret(sel.start * 2 + 1);
            }
            (EditMode::Replace, _) => {
                let tag = CaretTag::new(0, 0).pack();
                self.buf
                    .replace_byte_and_erase_following(sel.start, tag, 0, n - 1)?;
                self.set_caret(sel.start * 2);
            }
            (EditMode::Insert, event) => {
                let tag = CaretTag::new(0, 0).pack();
                self.buf.delete_bytes_at(sel.start, tag, n)?;
                self.set_caret(sel.start * 2);

                if let NibbleEvent::Insert(_) = event {
                    self.input_insert(event)?;
                }
            }
        }

        Ok(())
    }

    fn input_insert(&mut self, event: NibbleEvent) -> Result<(), EditError> {
        let t = nibble::transition(self.state, event);
        let Some(edit) = t.edit.resolve(self.caret / 2, &self.buf) else {
            log::debug!(
                "Ignored {event:?} at {} in state {}, no bytes to edit",
                self.caret,
                self.state
            );
            return Ok(());
        };

        self.apply(&edit, t.tag)?;
        self.caret = self.caret.saturating_add_signed(t.caret_delta as i64);
        self.state = t.next;
        Ok(())
    }

    fn input_replace(&mut self, event: NibbleEvent) -> Result<(), EditError> {
        let pos = self.caret / 2;
        let parity = Parity::of(self.caret);

        match event {
            NibbleEvent::Insert(u) => {
                let u = u & 0xF;
                match (self.buf.byte_at(pos), parity) {
                    (Some(b), Parity::Odd) => {
                        let tag = CaretTag::new(1, 2).pack();
                        self.buf.replace_byte_at(pos, tag, (b & 0xF0) | u)?;
                    }
                    (Some(b), Parity::Even) => {
                        let tag = CaretTag::new(0, 1).pack();
                        self.buf.replace_byte_at(pos, tag, (u << 4) | (b & 0x0F))?;
                    }
                    (None, _) => {
                        let tag = CaretTag::new(0, 1).pack();
                        self.buf.insert_byte_at(pos, tag, u << 4)?;
                    }
                }
                self.set_caret(self.caret + 1);
            }
            NibbleEvent::Delete => {
                let Some(b) = self.buf.byte_at(pos) else {
                    return Ok(());
                };
                let (byte, tag) = match parity {
                    Parity::Even => (b & 0x0F, CaretTag::new(0, 0)),
                    Parity::Odd => (b & 0xF0, CaretTag::new(1, 1)),
                };
                self.buf.replace_byte_at(pos, tag.pack(), byte)?;
            }
            NibbleEvent::Backspace => {
                let Some(caret) = self.caret.checked_sub(1) else {
                    return Ok(());
                };
                let pos = caret / 2;
                let Some(b) = self.buf.byte_at(pos) else {
                    return Ok(());
                };
                let (byte, tag) = match Parity::of(caret) {
                    Parity::Even => (b & 0x0F, CaretTag::new(1, 0)),
                    Parity::Odd => (b & 0xF0, CaretTag::new(2, 1)),
                };
                self.buf.replace_byte_at(pos, tag.pack(), byte)?;
                self.set_caret(caret);
            }
        }

        Ok(())
    }

    fn apply(&mut self, edit: &ByteEdit, tag: CaretTag) -> Result<(), BufferError> {
        let tag = tag.pack();
        match (edit.delete, edit.bytes.as_slice()) {
            (0, bytes) => self.buf.insert_bytes_at(edit.pos, tag, bytes),
            (n, []) => self.buf.delete_bytes_at(edit.pos, tag, n),
            (1, [byte]) => self.buf.replace_byte_at(edit.pos, tag, *byte),
            (n, bytes) => self.buf.replace_bytes_at(edit.pos, tag, n, bytes),
        }
    }

    pub fn undo(&mut self) -> Result<(), EditError> {
        let (pos, tag) = self.buf.undo()?;
        let caret = CaretTag::unpack(tag).undo_caret(pos);
        self.selection = None;
        self.set_caret(caret.min(self.buf.len() * 2));
        Ok(())
    }

    pub fn redo(&mut self) -> Result<(), EditError> {
        let (pos, tag) = self.buf.redo()?;
        let caret = CaretTag::unpack(tag).redo_caret(pos);
        self.selection = None;
        self.set_caret(caret.min(self.buf.len() * 2));
        Ok(())
    }

    /// Copy the selection to the clipboard as hex text.
    /// Returns false if nothing was selected.
    pub fn copy(&mut self) -> Result<bool, EditError> {
        let Some(sel) = self.selection.clone() else {
            return Ok(false);
        };

        let text = hex::encode(self.buf.slice(sel), self.options.uppercase);
        self.clipboard.copy(&text)?;
        Ok(true)
    }

    /// Copy and delete the selection
    pub fn cut(&mut self) -> Result<bool, EditError> {
        if !self.copy()? {
            return Ok(false);
        }

        if let Some(sel) = self.selection.take() {
            let tag = CaretTag::new(0, 0).pack();
            self.buf.delete_bytes_at(sel.start, tag, sel.end - sel.start)?;
            self.set_caret(sel.start * 2);
        }
        Ok(true)
    }

    /// Paste hex text from the clipboard. Replaces the selection if there is
    /// one, otherwise inserts at the byte under the caret, or overwrites from
    /// it in replace mode. The caret moves past the pasted bytes.
    pub fn paste(&mut self) -> Result<(), EditError> {
        let Some(text) = self.clipboard.paste()? else {
            log::debug!("Nothing to paste");
            return Ok(());
        };
        let mut src = HexSource::new(&text)?;
        let size = src.size();
        if size == 0 {
            return Ok(());
        }

        let (pos, delete, tag) = match self.selection.take() {
            Some(sel) => (sel.start, sel.end - sel.start, CaretTag::new(0, 0)),
            None => {
                let pos = self.caret / 2;
                let delete = match self.mode {
                    EditMode::Insert => 0,
                    EditMode::Replace => size.min(self.buf.len() - pos),
                };
                (pos, delete, CaretTag::new((self.caret % 2) as u8, 0))
            }
        };

        if delete == 0 {
            self.buf.insert_from_source(pos, tag.pack(), &mut src)?;
        } else {
            self.buf
                .replace_with_source(pos, tag.pack(), delete, &mut src)?;
        }

        self.set_caret((pos + size) * 2);
        Ok(())
    }

    /// Replace every non overlapping occurrence of `pattern` with
    /// `replacement` as a single undoable operation. Returns the number of
    /// replaced occurrences.
    pub fn replace_all(&mut self, pattern: &[u8], replacement: &[u8]) -> Result<usize, EditError> {
        let positions = search::find_all(self.buf.slice(..), pattern);
        let Some(first) = positions.first().copied() else {
            return Ok(0);
        };

        self.buf.replace_bytes_at_multiple_locations(
            &positions,
            CaretTag::new(0, 0).pack(),
            pattern.len() as u64,
            replacement,
        )?;

        log::info!("Replaced {} occurrences", positions.len());
        self.selection = None;
        self.set_caret(first * 2);
        Ok(positions.len())
    }

    /// Save to the current path
    pub fn save(&mut self) -> Result<(), EditError> {
        let path = self.path.clone().ok_or(EditError::NoPath)?;
        self.save_as(&path)
    }

    /// Save to a path, which becomes the current path
    pub fn save_as(&mut self, path: &Path) -> Result<(), EditError> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        let written = self.buf.write_to(&mut writer)?;
        writer.flush()?;

        log::info!("Saved {written} bytes to {path:?}");
        self.buf.mark_saved();
        self.path = Some(path.to_path_buf());
        Ok(())
    }

    /// Read the file again, dropping all changes and history
    pub fn reload(&mut self) -> Result<(), EditError> {
        self.buf.reload(self.path.as_deref())?;
        self.selection = None;
        self.set_caret(0);
        Ok(())
    }

    fn set_caret(&mut self, caret: u64) {
        self.caret = caret;
        self.state = NibbleState::at(caret);
    }
}
