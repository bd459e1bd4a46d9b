//! Shared key-range helpers for the state backends

use std::ops::Bound;

/// Smallest key strictly greater than every key starting with `prefix`.
///
/// Returns `None` when no such key exists (empty prefix or all `0xFF`),
/// meaning the range is unbounded above.
pub fn prefix_end_bytes(prefix: &[u8]) -> Option<Vec<u8>> {
    let mut end = prefix.to_vec();
    while let Some(last) = end.pop() {
        if last < 0xFF {
            end.push(last + 1);
            return Some(end);
        }
    }
    None
}

/// Smallest key strictly greater than `key`
pub fn key_successor(key: &[u8]) -> Vec<u8> {
    let mut next = Vec::with_capacity(key.len() + 1);
    next.extend_from_slice(key);
    next.push(0);
    next
}

/// `[start, end)` with either side optionally open
pub fn range_bounds<'a>(
    start: Option<&'a [u8]>,
    end: Option<&'a [u8]>,
) -> (Bound<&'a [u8]>, Bound<&'a [u8]>) {
    let lower = start.map_or(Bound::Unbounded, Bound::Included);
    let upper = end.map_or(Bound::Unbounded, Bound::Excluded);
    (lower, upper)
}

/// True when `[start, end)` cannot contain any key
pub fn range_is_empty(start: Option<&[u8]>, end: Option<&[u8]>) -> bool {
    matches!((start, end), (Some(s), Some(e)) if s >= e)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_end_bytes() {
        assert_eq!(prefix_end_bytes(&[0x01]), Some(vec![0x02]));
        assert_eq!(prefix_end_bytes(&[0x01, 0xFF]), Some(vec![0x02]));
        assert_eq!(prefix_end_bytes(&[0xFF, 0xFF]), None);
        assert_eq!(prefix_end_bytes(&[]), None);
    }

    #[test]
    fn test_key_successor_orders_next() {
        let key = b"abc".to_vec();
        let next = key_successor(&key);
        assert!(next > key);
        assert!(next < b"abd".to_vec());
    }

    #[test]
    fn test_range_checks() {
        assert!(range_is_empty(Some(&b"b"[..]), Some(&b"a"[..])));
        assert!(range_is_empty(Some(&b"a"[..]), Some(&b"a"[..])));
        assert!(!range_is_empty(None, Some(&b"a"[..])));
    }
}
