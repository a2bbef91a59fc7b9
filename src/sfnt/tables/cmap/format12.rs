//! # Format 12: Segmented coverage
//!
//! Implementation of the `cmap` format 12 subtable.
//!
//! *Specification:*
//! [OpenType](https://docs.microsoft.com/en-us/typography/opentype/spec/cmap#format-12-segmented-coverage),
//! [TrueType](https://developer.apple.com/fonts/TrueType-Reference-Manual/RM06/Chap6cmap.html).
//!
//! Format 12 covers the full Unicode codespace and is added to the `cmap` table when the character map reaches beyond the Basic Multilingual Plane.
//!
//! ```
//! # use fontmask::data::CharacterMap;
//! # use fontmask::sfnt::tables::cmap::format12::{compile, form_groups};
//! let mut map = CharacterMap::new();
//! map.insert('\u{1F600}', 1);
//! map.insert('\u{1F601}', 2);
//! map.insert('\u{E000}', 3);
//! assert_eq!(form_groups(&map).len(), 2);
//! let subtable = compile(&map);
//! ```

use crate::data::CharacterMap;
use bytes::{BufMut, Bytes, BytesMut};
use std::mem::size_of;

/// The size in bytes of the subtable header: `format`, `reserved`, `length`, `language` and `numGroups`.
const HEADER_SIZE: usize = 2 * size_of::<u16>() + 3 * size_of::<u32>();
/// The size in bytes of a sequential map group.
const GROUP_SIZE: usize = 3 * size_of::<u32>();

/// Returns a `cmap` format 12 subtable representing the given character map.
pub fn compile(map: &CharacterMap) -> Bytes {
    let groups = form_groups(map);
    let length = HEADER_SIZE + groups.len() * GROUP_SIZE;
    let mut buf = BytesMut::with_capacity(length);

    buf.put_u16(12); // format
    buf.put_u16(0); // reserved
    buf.put_u32(length as u32);
    buf.put_u32(0); // language
    buf.put_u32(groups.len() as u32);

    for group in &groups {
        buf.put_u32(group.start_char_code);
        buf.put_u32(group.end_char_code);
        buf.put_u32(group.start_glyph_id);
    }

    debug_assert_eq!(length, buf.len());

    buf.freeze()
}

/// Returns the groups representing the given character map in order of increasing `start_char_code`.
pub fn form_groups(map: &CharacterMap) -> Vec<SequentialMapGroup> {
    let mut groups: Vec<SequentialMapGroup> = Vec::new();

    for (&code, &gid) in map {
        let code = code as u32;
        match groups.last_mut() {
            Some(group) if group.extends_to(code, gid) => group.end_char_code = code,
            _ => groups.push(SequentialMapGroup {
                start_char_code: code,
                end_char_code: code,
                start_glyph_id: gid,
            }),
        }
    }

    groups
}

/// A continuous range of character codes mapped to continuous glyph ids.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub struct SequentialMapGroup {
    /// The character code of the start of the range.
    pub start_char_code: u32,
    /// The character code of the end of the range.
    pub end_char_code: u32,
    /// The glyph id corresponding to `start_char_code`.
    pub start_glyph_id: u32,
}

impl SequentialMapGroup {
    /// The glyph id of the last code of the group.
    pub fn end_glyph_id(&self) -> u32 {
        self.start_glyph_id + (self.end_char_code - self.start_char_code)
    }

    /// Whether appending `code → gid` keeps the group sequential.
    fn extends_to(&self, code: u32, gid: u32) -> bool {
        self.end_char_code + 1 == code && self.end_glyph_id() + 1 == gid
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_groups() {
        let map: CharacterMap = [('a', 1), ('b', 2), ('c', 4), ('e', 5), ('\u{1F600}', 6)]
            .into_iter()
            .collect();
        let groups = form_groups(&map);

        let ranges: Vec<(u32, u32, u32)> = groups
            .iter()
            .map(|x| (x.start_char_code, x.end_char_code, x.start_glyph_id))
            .collect();
        assert_eq!(
            ranges,
            [
                (0x61, 0x62, 1),
                (0x63, 0x63, 4),
                (0x65, 0x65, 5),
                (0x1F600, 0x1F600, 6)
            ]
        );
        assert_eq!(groups[0].end_glyph_id(), 2);
    }

    #[test]
    fn test_layout() {
        let map: CharacterMap = [('\u{10000}', 3), ('\u{10001}', 4)].into_iter().collect();
        let subtable = compile(&map);
        assert_eq!(subtable.len(), HEADER_SIZE + GROUP_SIZE);
        assert_eq!(&subtable[..4], [0, 12, 0, 0]);
        assert_eq!(&subtable[4..8], 28u32.to_be_bytes());
        assert_eq!(&subtable[12..16], 1u32.to_be_bytes());
        assert_eq!(
            &subtable[16..28],
            [0, 1, 0, 0, 0, 1, 0, 1, 0, 0, 0, 3]
        );
    }
}
