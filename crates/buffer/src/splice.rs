//! In place array surgery on the document bytes.
//!
//! All functions expect their bounds to be validated by the caller and treat
//! a length mismatch after the mutation as a bug.

/// Insert `bytes` to `data` at `pos`.
pub(crate) fn insert(data: &mut Vec<u8>, pos: usize, bytes: &[u8]) {
    let len = data.len();
    let n = bytes.len();
    debug_assert!(
        pos <= len,
        "insert: Attempting to index {} over buffer len {}",
        pos,
        len
    );

    if n == 0 {
        return;
    }

    if pos == len {
        data.extend_from_slice(bytes);
    } else if pos + n > len {
        // Inserted bytes reach over the old end. Grow with the part that
        // lands after the old end, then move the displaced tail after it.
        let head = len - pos;
        data.extend_from_slice(&bytes[head..]);
        data.extend_from_within(pos..len);
        data[pos..len].copy_from_slice(&bytes[..head]);
    } else {
        data.extend_from_within(len - n..len);
        data.copy_within(pos..len - n, pos + n);
        data[pos..pos + n].copy_from_slice(bytes);
    }

    assert_eq!(
        data.len(),
        len + n,
        "insert: length changed by {} instead of {}",
        data.len() as i128 - len as i128,
        n
    );
}

/// Remove `n` bytes from `data` starting at `pos`.
pub(crate) fn remove(data: &mut Vec<u8>, pos: usize, n: usize) {
    let len = data.len();
    debug_assert!(
        pos + n <= len,
        "remove: Attempting to index {} over buffer len {}",
        pos + n,
        len
    );

    if n == 0 {
        return;
    }

    data.copy_within(pos + n..len, pos);
    data.truncate(len - n);

    assert_eq!(data.len(), len - n, "remove: length mismatch");
}

/// Replace `del` bytes starting at `pos` with `bytes`.
pub(crate) fn replace(data: &mut Vec<u8>, pos: usize, del: usize, bytes: &[u8]) {
    let len = data.len();
    let ins = bytes.len();
    debug_assert!(
        pos + del <= len,
        "replace: Attempting to index {} over buffer len {}",
        pos + del,
        len
    );

    if ins <= del {
        data[pos..pos + ins].copy_from_slice(bytes);
        if ins < del {
            data.copy_within(pos + del..len, pos + ins);
            data.truncate(len - (del - ins));
        }
    } else if pos + ins > len {
        // Grows past the old end
        let head = len - pos;
        data.extend_from_slice(&bytes[head..]);
        data.extend_from_within(pos + del..len);
        data[pos..len].copy_from_slice(&bytes[..head]);
    } else {
        let extra = ins - del;
        data.extend_from_within(len - extra..len);
        data.copy_within(pos + del..len - extra, pos + ins);
        data[pos..pos + ins].copy_from_slice(bytes);
    }

    assert_eq!(
        data.len() as i128 - len as i128,
        ins as i128 - del as i128,
        "replace: length changed by an unexpected amount"
    );
}

/// Apply an edit of any shape, picking the matching primitive.
pub(crate) fn apply(data: &mut Vec<u8>, pos: usize, del: usize, bytes: &[u8]) {
    match (del, bytes.len()) {
        (0, _) => insert(data, pos, bytes),
        (_, 0) => remove(data, pos, del),
        _ => replace(data, pos, del, bytes),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn reference(data: &[u8], pos: usize, del: usize, bytes: &[u8]) -> Vec<u8> {
        let mut result = data[..pos].to_vec();
        result.extend_from_slice(bytes);
        result.extend_from_slice(&data[pos + del..]);
        result
    }

    #[test]
    fn insert_append() {
        let mut data = b"hello".to_vec();
        insert(&mut data, 5, b" world");
        assert_eq!(b"hello world", data.as_slice());
    }

    #[test]
    fn insert_over_end() {
        // 3 bytes inserted one before the end
        let mut data = b"abcd".to_vec();
        insert(&mut data, 3, b"XYZ");
        assert_eq!(b"abcXYZd", data.as_slice());

        let mut data = b"ab".to_vec();
        insert(&mut data, 0, b"0123456");
        assert_eq!(b"0123456ab", data.as_slice());
    }

    #[test]
    fn insert_middle() {
        let mut data = b"abcdefgh".to_vec();
        insert(&mut data, 2, b"XY");
        assert_eq!(b"abXYcdefgh", data.as_slice());
    }

    #[test]
    fn insert_every_shape() {
        let data: Vec<u8> = (0..12).collect();
        let bytes: Vec<u8> = (100..120).collect();

        for pos in 0..=data.len() {
            for n in 0..bytes.len() {
                let mut result = data.clone();
                insert(&mut result, pos, &bytes[..n]);
                assert_eq!(reference(&data, pos, 0, &bytes[..n]), result);
            }
        }
    }

    #[test]
    fn remove_every_shape() {
        let data: Vec<u8> = (0..12).collect();

        for pos in 0..=data.len() {
            for n in 0..=data.len() - pos {
                let mut result = data.clone();
                remove(&mut result, pos, n);
                assert_eq!(reference(&data, pos, n, &[]), result);
            }
        }
    }

    #[test]
    fn replace_shrink() {
        let mut data = b"abcdefgh".to_vec();
        replace(&mut data, 1, 4, b"X");
        assert_eq!(b"aXfgh", data.as_slice());
    }

    #[test]
    fn replace_grow_past_end() {
        let mut data = b"abcdef".to_vec();
        replace(&mut data, 4, 1, b"WXYZ");
        assert_eq!(b"abcdWXYZf", data.as_slice());
    }

    #[test]
    fn replace_grow_within() {
        let mut data = b"abcdefgh".to_vec();
        replace(&mut data, 1, 2, b"WXYZ");
        assert_eq!(b"aWXYZdefgh", data.as_slice());
    }

    #[test]
    fn replace_every_shape() {
        let data: Vec<u8> = (0..10).collect();
        let bytes: Vec<u8> = (100..115).collect();

        for pos in 0..=data.len() {
            for del in 0..=data.len() - pos {
                for ins in 0..bytes.len() {
                    let mut result = data.clone();
                    apply(&mut result, pos, del, &bytes[..ins]);
                    assert_eq!(
                        reference(&data, pos, del, &bytes[..ins]),
                        result,
                        "pos {pos} del {del} ins {ins}"
                    );
                }
            }
        }
    }
}
