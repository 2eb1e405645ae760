use hexed_buffer::{Buffer, Tag};
use strum_macros::{Display, EnumIter};

/// Which nibble of a byte the caret is on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Parity {
    Even,
    Odd,
}

impl Parity {
    pub fn of(caret: u64) -> Parity {
        if caret % 2 == 0 {
            Parity::Even
        } else {
            Parity::Odd
        }
    }
}

/// Input state of the nibble editor.
///
/// A pending state means the byte under the caret has a placeholder zero
/// as its low nibble. The placeholder keeps the document made of whole
/// bytes while the user has typed or removed only half of one. The pending
/// kind tells which event created the placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumIter)]
pub enum NibbleState {
    #[default]
    Even,
    EvenPendingInsert,
    EvenPendingDelete,
    EvenPendingBackspace,
    Odd,
    OddPendingInsert,
    OddPendingDelete,
    OddPendingBackspace,
}

impl NibbleState {
    /// State without anything pending for a caret position
    pub fn at(caret: u64) -> NibbleState {
        match Parity::of(caret) {
            Parity::Even => NibbleState::Even,
            Parity::Odd => NibbleState::Odd,
        }
    }

    pub fn parity(&self) -> Parity {
        use NibbleState::*;
        match self {
            Even | EvenPendingInsert | EvenPendingDelete | EvenPendingBackspace => Parity::Even,
            Odd | OddPendingInsert | OddPendingDelete | OddPendingBackspace => Parity::Odd,
        }
    }

    pub fn is_pending(&self) -> bool {
        !matches!(self, NibbleState::Even | NibbleState::Odd)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NibbleEvent {
    /// Type a nibble, only the low 4 bits are used
    Insert(u8),
    Delete,
    Backspace,
}

impl NibbleEvent {
    /// Event for a typed hex digit
    pub fn from_digit(ch: char) -> Option<NibbleEvent> {
        let digit = ch.to_digit(16)?;
        Some(NibbleEvent::Insert(digit as u8))
    }
}

/// Caret offsets to restore after undo and redo, packed into the tag of an
/// operation. Offsets are in nibbles from the start of the byte the
/// operation was made at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CaretTag {
    pub undo: u8,
    pub redo: u8,
}

impl CaretTag {
    pub const fn new(undo: u8, redo: u8) -> CaretTag {
        CaretTag { undo, redo }
    }

    pub fn pack(self) -> Tag {
        Tag::new(((self.undo & 0b11) | ((self.redo & 0b11) << 2)) as i64)
    }

    pub fn unpack(tag: Tag) -> CaretTag {
        let value = tag.get();
        CaretTag {
            undo: (value & 0b11) as u8,
            redo: ((value >> 2) & 0b11) as u8,
        }
    }

    pub fn undo_caret(self, pos: u64) -> u64 {
        pos * 2 + self.undo as u64
    }

    pub fn redo_caret(self, pos: u64) -> u64 {
        pos * 2 + self.redo as u64
    }
}

impl From<CaretTag> for Tag {
    fn from(value: CaretTag) -> Self {
        value.pack()
    }
}

/// What to do to the bytes around the caret. `H` and `L` refer to the
/// nibbles of the byte under the caret, `H'` and `L'` to the byte before it
/// and `H2` and `L2` to the byte after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edit {
    /// Insert `[u0]`
    Insert(u8),
    /// Replace with `[Hu, L0]`, moving the low nibble to a new byte
    Split(u8),
    /// Replace the placeholder, `[Hu]`
    Complete(u8),
    /// Byte holds `L` as its high nibble, replace with `[uL]`
    PushFront(u8),
    /// Replace with `[L0]`
    ShiftUp,
    /// Replace with `[H0]`
    ClearLow,
    /// Replace the previous byte with `[H'0]`
    ClearLowBefore,
    /// Replace this and the next byte with `[H L2]`. If there is no next
    /// byte the placeholder becomes a real zero.
    JoinNext,
    /// Byte holds `L` as its high nibble, replace the previous byte and this
    /// one with `[H' L]`
    JoinPrevious,
    /// Delete the byte
    Remove,
}

/// Byte level change, replaces `delete` bytes at `pos` with `bytes`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ByteEdit {
    pub pos: u64,
    pub delete: u64,
    pub bytes: Vec<u8>,
}

impl ByteEdit {
    fn new(pos: u64, delete: u64, bytes: Vec<u8>) -> ByteEdit {
        ByteEdit { pos, delete, bytes }
    }
}

impl Edit {
    /// Resolve to a byte level change with the caret on byte `pos`.
    /// Returns None if the bytes the edit needs do not exist.
    pub fn resolve(self, pos: u64, buf: &Buffer) -> Option<ByteEdit> {
        use Edit::*;

        let edit = match self {
            Insert(u) => {
                if pos > buf.len() {
                    return None;
                }
                ByteEdit::new(pos, 0, vec![u << 4])
            }
            Split(u) => {
                let b = buf.byte_at(pos)?;
                ByteEdit::new(pos, 1, vec![(b & 0xF0) | u, b << 4])
            }
            Complete(u) => {
                let b = buf.byte_at(pos)?;
                ByteEdit::new(pos, 1, vec![(b & 0xF0) | u])
            }
            PushFront(u) => {
                let b = buf.byte_at(pos)?;
                ByteEdit::new(pos, 1, vec![(u << 4) | (b >> 4)])
            }
            ShiftUp => {
                let b = buf.byte_at(pos)?;
                ByteEdit::new(pos, 1, vec![b << 4])
            }
            ClearLow => {
                let b = buf.byte_at(pos)?;
                ByteEdit::new(pos, 1, vec![b & 0xF0])
            }
            ClearLowBefore => {
                let prev = pos.checked_sub(1)?;
                let b = buf.byte_at(prev)?;
                ByteEdit::new(prev, 1, vec![b & 0xF0])
            }
            JoinNext => {
                let b = buf.byte_at(pos)?;
                match buf.byte_at(pos + 1) {
                    Some(next) => ByteEdit::new(pos, 2, vec![(b & 0xF0) | (next & 0x0F)]),
                    None => ByteEdit::new(pos, 1, vec![b]),
                }
            }
            JoinPrevious => {
                let prev = pos.checked_sub(1)?;
                let p = buf.byte_at(prev)?;
                let b = buf.byte_at(pos)?;
                ByteEdit::new(prev, 2, vec![(p & 0xF0) | (b >> 4)])
            }
            Remove => {
                buf.byte_at(pos)?;
                ByteEdit::new(pos, 1, vec![])
            }
        };

        Some(edit)
    }
}

/// Result of feeding an event to the state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub edit: Edit,
    /// Caret movement in nibbles
    pub caret_delta: i8,
    pub next: NibbleState,
    pub tag: CaretTag,
}

impl Transition {
    const fn new(edit: Edit, caret_delta: i8, next: NibbleState, tag: CaretTag) -> Transition {
        Transition {
            edit,
            caret_delta,
            next,
            tag,
        }
    }
}

/// The nibble input state machine
pub fn transition(state: NibbleState, event: NibbleEvent) -> Transition {
    use NibbleEvent::*;
    use NibbleState::*;

    match (state, event) {
        (Even, Insert(u)) => Transition::new(
            Edit::Insert(u & 0xF),
            1,
            OddPendingInsert,
            CaretTag::new(0, 1),
        ),
        (Even, Delete) => Transition::new(Edit::ShiftUp, 0, EvenPendingDelete, CaretTag::new(0, 0)),
        (Even, Backspace) => Transition::new(
            Edit::ClearLowBefore,
            -1,
            OddPendingBackspace,
            CaretTag::new(2, 1),
        ),

        (Odd, Insert(u)) => Transition::new(
            Edit::Split(u & 0xF),
            1,
            EvenPendingInsert,
            CaretTag::new(1, 2),
        ),
        (Odd, Delete) => Transition::new(Edit::ClearLow, 0, OddPendingDelete, CaretTag::new(1, 1)),
        (Odd, Backspace) => Transition::new(
            Edit::ShiftUp,
            -1,
            EvenPendingBackspace,
            CaretTag::new(1, 0),
        ),

        (OddPendingInsert | OddPendingDelete | OddPendingBackspace, Insert(u)) => {
            Transition::new(Edit::Complete(u & 0xF), 1, Even, CaretTag::new(1, 2))
        }
        (OddPendingInsert | OddPendingDelete | OddPendingBackspace, Delete) => {
            Transition::new(Edit::JoinNext, 0, Odd, CaretTag::new(1, 1))
        }
        (OddPendingInsert | OddPendingDelete | OddPendingBackspace, Backspace) => {
            Transition::new(Edit::Remove, -1, Even, CaretTag::new(1, 0))
        }

        (EvenPendingInsert | EvenPendingDelete | EvenPendingBackspace, Insert(u)) => {
            Transition::new(Edit::PushFront(u & 0xF), 1, Odd, CaretTag::new(0, 1))
        }
        (EvenPendingInsert | EvenPendingDelete | EvenPendingBackspace, Delete) => {
            Transition::new(Edit::Remove, 0, Even, CaretTag::new(0, 0))
        }
        (EvenPendingInsert | EvenPendingDelete | EvenPendingBackspace, Backspace) => {
            Transition::new(Edit::JoinPrevious, -1, Odd, CaretTag::new(2, 1))
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use strum::IntoEnumIterator;

    const EVENTS: [NibbleEvent; 3] = [
        NibbleEvent::Insert(0xA),
        NibbleEvent::Delete,
        NibbleEvent::Backspace,
    ];

    #[test]
    fn caret_parity_follows_state() {
        for state in NibbleState::iter() {
            for event in EVENTS {
                let t = transition(state, event);
                let flips = t.caret_delta % 2 != 0;
                let expected = match (state.parity(), flips) {
                    (Parity::Even, false) | (Parity::Odd, true) => Parity::Even,
                    _ => Parity::Odd,
                };
                assert_eq!(expected, t.next.parity(), "{state} {event:?}");
            }
        }
    }

    #[test]
    fn tags_fit() {
        for state in NibbleState::iter() {
            for event in EVENTS {
                let t = transition(state, event);
                assert!(t.tag.undo < 4 && t.tag.redo < 4);
                assert_eq!(t.tag, CaretTag::unpack(t.tag.pack()));
            }
        }
    }

    #[test]
    fn pending_states_are_reachable() {
        let mut reached = vec![NibbleState::Even, NibbleState::Odd];
        let mut queue = reached.clone();

        while let Some(state) = queue.pop() {
            for event in EVENTS {
                let next = transition(state, event).next;
                if !reached.contains(&next) {
                    reached.push(next);
                    queue.push(next);
                }
            }
        }

        assert_eq!(NibbleState::iter().count(), reached.len());
    }

    #[test]
    fn insert_tag() {
        let t = transition(NibbleState::Even, NibbleEvent::Insert(0x1));
        assert_eq!(Tag::new(1 << 2), t.tag.pack());
        assert_eq!(NibbleState::OddPendingInsert, t.next);
        assert_eq!(Edit::Insert(0x1), t.edit);
    }

    #[test]
    fn masks_nibble() {
        let t = transition(NibbleState::Odd, NibbleEvent::Insert(0xFA));
        assert_eq!(Edit::Split(0xA), t.edit);
    }

    #[test]
    fn resolve_edits() {
        let buf = Buffer::from(&[0x12u8, 0x34][..]);

        assert_eq!(
            Some(ByteEdit::new(0, 1, vec![0x1A, 0x20])),
            Edit::Split(0xA).resolve(0, &buf)
        );
        assert_eq!(
            Some(ByteEdit::new(1, 1, vec![0xA3])),
            Edit::PushFront(0xA).resolve(1, &buf)
        );
        assert_eq!(
            Some(ByteEdit::new(0, 1, vec![0x20])),
            Edit::ShiftUp.resolve(0, &buf)
        );
        assert_eq!(
            Some(ByteEdit::new(0, 1, vec![0x10])),
            Edit::ClearLowBefore.resolve(1, &buf)
        );
        assert_eq!(
            Some(ByteEdit::new(0, 2, vec![0x14])),
            Edit::JoinNext.resolve(0, &buf)
        );
        assert_eq!(
            Some(ByteEdit::new(1, 1, vec![0x34])),
            Edit::JoinNext.resolve(1, &buf)
        );
        assert_eq!(
            Some(ByteEdit::new(0, 2, vec![0x13])),
            Edit::JoinPrevious.resolve(1, &buf)
        );
        assert_eq!(
            Some(ByteEdit::new(2, 0, vec![0x50])),
            Edit::Insert(0x5).resolve(2, &buf)
        );
    }

    #[test]
    fn resolve_missing_bytes() {
        let buf = Buffer::from(&[0x12u8][..]);
        assert_eq!(None, Edit::ClearLowBefore.resolve(0, &buf));
        assert_eq!(None, Edit::JoinPrevious.resolve(0, &buf));
        assert_eq!(None, Edit::ShiftUp.resolve(1, &buf));
        assert_eq!(None, Edit::Remove.resolve(1, &buf));
        assert_eq!(None, Edit::Insert(1).resolve(2, &buf));
    }
}
