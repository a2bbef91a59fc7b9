//! Types used throughout an SFNT file.

use std::fmt;

/// Interpretation of four bytes as a four-letter tag.
///
/// Tags order by their bytes, which is the order of the table directory.
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Copy, Clone)]
pub struct Tag(pub [u8; 4]);

impl Tag {
    /// Creates a tag by interpreting a `u32` as 4 bytes with a big-endian layout.
    ///
    /// Returns `None` if any of the bytes are not in the range from `0x20` to `0x7E` (both inclusive). This value restriction matches the [OpenType specification for tags](https://docs.microsoft.com/en-us/typography/opentype/spec/otff#data-types).
    #[inline]
    pub fn from_u32(value: u32) -> Option<Tag> {
        let bytes = value.to_be_bytes();

        if bytes.iter().any(|&x| !(0x20..=0x7E).contains(&x)) {
            None
        } else {
            Some(Tag(bytes))
        }
    }

    /// Returns the tag as a big-endian `u32`.
    #[inline]
    pub fn as_u32(self) -> u32 {
        u32::from_be_bytes(self.0)
    }
}

impl From<Tag> for u32 {
    fn from(tag: Tag) -> u32 {
        tag.as_u32()
    }
}

impl From<Tag> for [u8; 4] {
    fn from(tag: Tag) -> [u8; 4] {
        let Tag(bytes) = tag;
        bytes
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Tag(bytes) = self;
        write!(
            f,
            "'{}{}{}{}'",
            bytes[0] as char, bytes[1] as char, bytes[2] as char, bytes[3] as char
        )
    }
}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0 {
            write!(f, "{}", std::ascii::escape_default(byte))?;
        }
        Ok(())
    }
}

/// The `Fixed` 16.16 number `1.0`, used for table versions.
pub const FIXED_ONE: u32 = 0x0001_0000;
