use std::ops::Range;

/// Append only byte storage. Operations reference the stored bytes using
/// offsets, so bytes never move unless the log is cut.
#[derive(Debug, Default)]
pub(crate) struct ByteLog {
    bytes: Vec<u8>,
}

impl ByteLog {
    pub fn new() -> ByteLog {
        ByteLog { bytes: Vec::new() }
    }

    #[inline]
    pub fn len(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Append bytes and return the offset they were written to
    pub fn append(&mut self, bytes: &[u8]) -> u64 {
        let offset = self.len();
        self.bytes.extend_from_slice(bytes);
        offset
    }

    pub fn push(&mut self, byte: u8) {
        self.bytes.push(byte);
    }

    /// Append `n` zero bytes
    pub fn append_zeroes(&mut self, n: u64) {
        let len = self.bytes.len() + n as usize;
        self.bytes.resize(len, 0);
    }

    /// Get the bytes of an operation.
    /// Referencing bytes past the end of the log means the operation stack
    /// and the log have gone out of sync.
    #[inline]
    pub fn slice(&self, offset: u64, len: u64) -> &[u8] {
        let end = offset + len;
        assert!(
            end <= self.len(),
            "log slice {}..{} over log len {}",
            offset,
            end,
            self.len()
        );
        &self.bytes[offset as usize..end as usize]
    }

    /// Remove a range of bytes, moving anything after it down.
    pub fn cut(&mut self, range: Range<u64>) {
        debug_assert!(range.start <= range.end && range.end <= self.len());
        self.bytes.drain(range.start as usize..range.end as usize);
    }

    pub fn truncate(&mut self, len: u64) {
        self.bytes.truncate(len as usize);
    }

    pub fn clear(&mut self) {
        self.bytes.clear();
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn append_offsets() {
        let mut log = ByteLog::new();
        assert_eq!(0, log.append(b"abc"));
        assert_eq!(3, log.append(b"de"));
        log.push(b'f');
        log.append_zeroes(2);
        assert_eq!(b"abcdef\0\0", log.slice(0, 8));
        assert_eq!(b"de", log.slice(3, 2));
    }

    #[test]
    fn cut_keeps_tail() {
        let mut log = ByteLog::new();
        log.append(b"abcdef");
        log.cut(1..4);
        assert_eq!(b"aef", log.slice(0, 3));
        log.truncate(1);
        assert_eq!(1, log.len());
    }

    #[test]
    #[should_panic]
    fn slice_past_end() {
        let mut log = ByteLog::new();
        log.append(b"abc");
        log.slice(2, 2);
    }
}
