use aho_corasick::AhoCorasick;

/// Find the start positions of all non overlapping occurrences of
/// `pattern`, in ascending order.
pub fn find_all(haystack: &[u8], pattern: &[u8]) -> Vec<u64> {
    if pattern.is_empty() {
        return vec![];
    }

    let searcher = match AhoCorasick::new([pattern]) {
        Ok(searcher) => searcher,
        Err(e) => {
            log::error!("Failed to build searcher: {e}");
            return vec![];
        }
    };

    searcher
        .find_iter(haystack)
        .map(|mat| mat.start() as u64)
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn non_overlapping() {
        assert_eq!(vec![0, 2], find_all(b"aaaaa", b"aa"));
        assert_eq!(vec![1, 5], find_all(b"xabcxabc", b"abc"));
    }

    #[test]
    fn nothing() {
        assert!(find_all(b"abc", b"").is_empty());
        assert!(find_all(b"abc", b"abcd").is_empty());
        assert!(find_all(b"", b"a").is_empty());
    }
}
