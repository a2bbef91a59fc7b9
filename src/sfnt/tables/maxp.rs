//! # maxp — Maximum Profile
//!
//! *Specification:*
//! [OpenType](https://docs.microsoft.com/en-us/typography/opentype/spec/maxp).
//!
//! Version 1.0, as required for TrueType outlines.
//! Glyphs carry no instructions and there are no composite glyphs, so only the glyph count and the point and contour maxima are non-trivial.

use super::glyf::GlyfTable;
use crate::sfnt::types::FIXED_ONE;
use bytes::{BufMut, Bytes, BytesMut};

/// The size in bytes of the table.
pub const SIZE: usize = 32;

/// Returns a `maxp` table for the glyphs.
pub fn compile(glyf: &GlyfTable) -> Bytes {
    let mut buf = BytesMut::with_capacity(SIZE);

    buf.put_u32(FIXED_ONE);
    buf.put_u16(glyf.glyphs.len() as u16);
    buf.put_u16(glyf.max_points());
    buf.put_u16(glyf.max_contours());
    buf.put_u16(0); // maxCompositePoints
    buf.put_u16(0); // maxCompositeContours
    buf.put_u16(2); // maxZones
    buf.put_bytes(0, 6 * 2); // maxTwilightPoints to maxSizeOfInstructions
    buf.put_u16(0); // maxComponentElements
    buf.put_u16(0); // maxComponentDepth

    debug_assert_eq!(SIZE, buf.len());

    buf.freeze()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{FontSpec, GlyphName, GlyphRecord};
    use crate::font::fake::square;
    use crate::sfnt::tables::glyf;

    #[test]
    fn test_counts() {
        let mut spec = FontSpec::default();
        for (name, size) in [("a", 0), ("b", 10), ("c", 20)] {
            let name = GlyphName::new(name);
            let outline = if size == 0 {
                Default::default()
            } else {
                square(size)
            };
            spec.glyph_order.push(name.clone());
            spec.glyphs.insert(
                name,
                GlyphRecord {
                    outline,
                    ..GlyphRecord::default()
                },
            );
        }

        let table = compile(&glyf::compile(&spec).unwrap());
        assert_eq!(table.len(), SIZE);
        assert_eq!(&table[4..10], [0, 3, 0, 4, 0, 1]);
        assert_eq!(&table[14..16], [0, 2]);
    }
}
