/// Caller supplied value stored with each operation and handed back on undo
/// and redo. The buffer never looks inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Tag(i64);

impl Tag {
    pub const fn new(value: i64) -> Tag {
        Tag(value)
    }

    pub const fn get(self) -> i64 {
        self.0
    }
}

impl From<i64> for Tag {
    fn from(value: i64) -> Self {
        Tag(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Positions {
    Single(u64),
    /// Ascending positions in the document as it was before the operation
    /// was first applied
    Multi(Vec<u64>),
}

/// A recorded mutation. The bytes themselves live in the inserted and
/// deleted logs, operation only stores where.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Operation {
    pub(crate) tag: Tag,
    pub(crate) positions: Positions,

    pub(crate) deleted_len: u64,
    pub(crate) inserted_len: u64,

    /// Offset to deleted log. Multi position operations store one
    /// `deleted_len` sized slice per position starting from here.
    pub(crate) deleted_offset: u64,
    /// Offset to inserted log. Inserted content is stored once even for
    /// multi position operations.
    pub(crate) inserted_offset: u64,
}

impl Operation {
    /// First position the operation applies to
    pub fn position(&self) -> u64 {
        match &self.positions {
            Positions::Single(pos) => *pos,
            Positions::Multi(positions) => positions.first().copied().unwrap_or(0),
        }
    }

    pub fn count(&self) -> u64 {
        match &self.positions {
            Positions::Single(_) => 1,
            Positions::Multi(positions) => positions.len() as u64,
        }
    }

    /// Total length change of the document when applied forward
    pub fn len_delta(&self) -> i128 {
        (self.inserted_len as i128 - self.deleted_len as i128) * self.count() as i128
    }

    /// Where the deleted bytes of the nth position are in the deleted log
    pub fn deleted_offset_of(&self, n: u64) -> u64 {
        self.deleted_offset + n * self.deleted_len
    }

    /// How many bytes this operation holds in the deleted log
    pub fn deleted_log_len(&self) -> u64 {
        self.deleted_len * self.count()
    }
}
