/// Sequential source of bytes with a known size, clipboard contents for
/// example. The buffer pulls exactly `size` bytes using `get`.
pub trait ByteSource {
    /// Number of bytes this source will produce
    fn size(&self) -> u64;

    /// Consume the next byte
    fn get(&mut self) -> Option<u8>;
}

/// Byte source reading from a slice
#[derive(Debug, Clone)]
pub struct SliceSource<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> SliceSource<'a> {
    pub fn new(bytes: &'a [u8]) -> SliceSource<'a> {
        SliceSource { bytes, pos: 0 }
    }
}

impl<'a> ByteSource for SliceSource<'a> {
    fn size(&self) -> u64 {
        (self.bytes.len() - self.pos) as u64
    }

    fn get(&mut self) -> Option<u8> {
        let byte = self.bytes.get(self.pos).copied()?;
        self.pos += 1;
        Some(byte)
    }
}

impl<'a> From<&'a [u8]> for SliceSource<'a> {
    fn from(value: &'a [u8]) -> Self {
        SliceSource::new(value)
    }
}

impl<S: ByteSource + ?Sized> ByteSource for &mut S {
    fn size(&self) -> u64 {
        (**self).size()
    }

    fn get(&mut self) -> Option<u8> {
        (**self).get()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn slice_source() {
        let mut src = SliceSource::new(b"ab");
        assert_eq!(2, src.size());
        assert_eq!(Some(b'a'), src.get());
        assert_eq!(1, src.size());
        assert_eq!(Some(b'b'), src.get());
        assert_eq!(None, src.get());
    }
}
