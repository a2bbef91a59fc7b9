//! Helpers shared by the binary table and container writers.

/// Returns the OpenType checksum of `data`: the wrapping sum of its big-endian `u32` words, the last word zero-padded.
pub fn checksum(data: &[u8]) -> u32 {
    let words = data.chunks_exact(4);
    let remainder = words.remainder();

    let sum = words.fold(0u32, |sum, word| {
        sum.wrapping_add(u32::from_be_bytes([word[0], word[1], word[2], word[3]]))
    });

    let mut rest = [0; 4];
    rest[..remainder.len()].copy_from_slice(remainder);

    sum.wrapping_add(u32::from_be_bytes(rest))
}

/// The number of zero bytes that align `len` to a multiple of four.
pub fn padding(len: usize) -> usize {
    (4 - (len % 4)) % 4
}

/// The binary search header values `(searchRange, entrySelector, rangeShift)` for `count` items of `unit` bytes each.
///
/// Used by the table directory (unit 16) and `cmap` format 4 (unit 2).
pub fn search_params(count: u16, unit: u16) -> (u16, u16, u16) {
    if count == 0 {
        return (0, 0, 0);
    }
    let entry_selector = 15 - count.leading_zeros() as u16;
    let search_range = unit.wrapping_mul(1 << entry_selector);
    let range_shift = count.wrapping_mul(unit).wrapping_sub(search_range);
    (search_range, entry_selector, range_shift)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checksum() {
        assert_eq!(checksum(b"abcd"), 1633837924);
        assert_eq!(checksum(b"abcdxyz"), 3655064932);
        assert_eq!(checksum(&[0xFF; 8]), 0xFFFF_FFFE);
    }

    #[test]
    fn test_padding() {
        assert_eq!(padding(0), 0);
        assert_eq!(padding(1), 3);
        assert_eq!(padding(4), 0);
        assert_eq!(padding(54), 2);
    }

    #[test]
    fn test_search_params() {
        assert_eq!(search_params(10, 16), (128, 3, 32));
        assert_eq!(search_params(16, 16), (256, 4, 0));
        assert_eq!(search_params(1, 2), (2, 0, 0));
        assert_eq!(search_params(39, 2), (64, 5, 14));
    }
}
