use hexed_buffer::ByteSource;

use crate::error::EditError;

/// Format bytes as hex separated by spaces
pub fn encode(bytes: &[u8], uppercase: bool) -> String {
    let mut text = String::with_capacity(bytes.len() * 3);
    for (i, byte) in bytes.iter().enumerate() {
        if i != 0 {
            text.push(' ');
        }
        let digits = if uppercase {
            format!("{byte:02X}")
        } else {
            format!("{byte:02x}")
        };
        text.push_str(&digits);
    }
    text
}

/// Parse hex text into bytes, whitespace between digits is ignored
pub fn decode(text: &str) -> Result<Vec<u8>, EditError> {
    let mut src = HexSource::new(text)?;
    let mut bytes = Vec::with_capacity(src.size() as usize);
    while let Some(byte) = src.get() {
        bytes.push(byte);
    }
    Ok(bytes)
}

/// Byte source reading hex text, used to paste from text clipboards
#[derive(Debug, Clone)]
pub struct HexSource<'a> {
    digits: std::str::Chars<'a>,
    remaining: u64,
}

impl<'a> HexSource<'a> {
    pub fn new(text: &'a str) -> Result<HexSource<'a>, EditError> {
        let mut count = 0u64;
        for ch in text.chars() {
            if ch.is_whitespace() {
                continue;
            }
            if !ch.is_ascii_hexdigit() {
                return Err(EditError::InvalidDigit(ch));
            }
            count += 1;
        }

        if count % 2 != 0 {
            return Err(EditError::OddDigits(count));
        }

        Ok(HexSource {
            digits: text.chars(),
            remaining: count / 2,
        })
    }

    fn digit(&mut self) -> Option<u8> {
        let ch = self.digits.find(|ch| !ch.is_whitespace())?;
        ch.to_digit(16).map(|d| d as u8)
    }
}

impl<'a> ByteSource for HexSource<'a> {
    fn size(&self) -> u64 {
        self.remaining
    }

    fn get(&mut self) -> Option<u8> {
        if self.remaining == 0 {
            return None;
        }
        let high = self.digit()?;
        let low = self.digit()?;
        self.remaining -= 1;
        Some((high << 4) | low)
    }
}
