use crate::operation::Operation;

/// Log offsets the logs should be cut from after operations were discarded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Discarded {
    pub(crate) inserted_offset: u64,
    pub(crate) deleted_offset: u64,
    /// Number of discarded operations
    pub(crate) count: usize,
}

/// Operations in order of application. Operations under `top` can be undone,
/// operations at and above `top` can be redone.
#[derive(Debug, Default)]
pub(crate) struct OperationStack {
    operations: Vec<Operation>,
    top: usize,
}

impl OperationStack {
    pub fn new() -> OperationStack {
        OperationStack {
            operations: Vec::new(),
            top: 0,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    #[inline]
    pub fn top(&self) -> usize {
        self.top
    }

    #[inline]
    pub fn can_undo(&self) -> bool {
        self.top > 0
    }

    #[inline]
    pub fn can_redo(&self) -> bool {
        self.top < self.len()
    }

    /// Forget the redoable operations. Returns the smallest log offsets the
    /// discarded operations referenced, the logs should be cut from there.
    pub fn discard_redo(&mut self) -> Option<Discarded> {
        if !self.can_redo() {
            return None;
        }

        let discarded = &self.operations[self.top..];
        let inserted_offset = discarded
            .iter()
            .map(|op| op.inserted_offset)
            .min()
            .unwrap_or(0);
        let deleted_offset = discarded
            .iter()
            .map(|op| op.deleted_offset)
            .min()
            .unwrap_or(0);
        let count = discarded.len();

        self.operations.truncate(self.top);

        Some(Discarded {
            inserted_offset,
            deleted_offset,
            count,
        })
    }

    /// Push an operation on top of the stack discarding any redoable
    /// operations.
    pub fn push(&mut self, op: Operation) -> Option<Discarded> {
        let discarded = self.discard_redo();
        self.operations.push(op);
        self.top += 1;
        debug_assert_eq!(self.top, self.len());
        discarded
    }

    /// The most recent undoable operation
    pub fn latest(&self) -> Option<&Operation> {
        self.top.checked_sub(1).and_then(|i| self.operations.get(i))
    }

    /// Move top down and return the operation to undo
    pub fn undo(&mut self) -> Option<&Operation> {
        if !self.can_undo() {
            return None;
        }

        self.top -= 1;
        self.operations.get(self.top)
    }

    /// Move top up and return the operation to redo
    pub fn redo(&mut self) -> Option<&Operation> {
        if !self.can_redo() {
            return None;
        }

        self.top += 1;
        self.operations.get(self.top - 1)
    }

    pub fn clear(&mut self) {
        self.operations.clear();
        self.top = 0;
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::operation::{Positions, Tag};

    fn op(pos: u64, inserted_offset: u64, deleted_offset: u64) -> Operation {
        Operation {
            tag: Tag::default(),
            positions: Positions::Single(pos),
            deleted_len: 1,
            inserted_len: 1,
            deleted_offset,
            inserted_offset,
        }
    }

    #[test]
    fn push_undo_redo() {
        let mut stack = OperationStack::new();
        assert!(!stack.can_undo());
        assert!(!stack.can_redo());

        stack.push(op(0, 0, 0));
        stack.push(op(1, 1, 1));
        assert_eq!(2, stack.top());

        assert_eq!(Some(1), stack.undo().map(Operation::position));
        assert!(stack.can_redo());
        assert_eq!(Some(0), stack.undo().map(Operation::position));
        assert_eq!(None, stack.undo());

        assert_eq!(Some(0), stack.redo().map(Operation::position));
        assert_eq!(1, stack.top());
    }

    #[test]
    fn push_discards_redo() {
        let mut stack = OperationStack::new();
        stack.push(op(0, 0, 0));
        stack.push(op(1, 1, 3));
        stack.push(op(2, 2, 4));
        stack.undo();
        stack.undo();

        let discarded = stack.push(op(5, 1, 3));
        assert_eq!(
            Some(Discarded {
                inserted_offset: 1,
                deleted_offset: 3,
                count: 2,
            }),
            discarded
        );
        assert_eq!(2, stack.len());
        assert!(!stack.can_redo());
        assert_eq!(Some(5), stack.undo().map(Operation::position));
    }

    #[test]
    fn nothing_to_discard() {
        let mut stack = OperationStack::new();
        assert_eq!(None, stack.push(op(0, 0, 0)));
        assert_eq!(None, stack.discard_redo());
    }
}
