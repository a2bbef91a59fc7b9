//! # hhea — Horizontal Header Table
//!
//! *Specification:*
//! [OpenType](https://docs.microsoft.com/en-us/typography/opentype/spec/hhea).

use super::glyf::GlyfTable;
use super::hmtx;
use crate::data::FontSpec;
use crate::sfnt::types::FIXED_ONE;
use bytes::{BufMut, Bytes, BytesMut};

/// The size in bytes of the table.
pub const SIZE: usize = 36;

/// Returns an `hhea` table for the font.
///
/// The extrema are computed from the glyphs with contours.
pub fn compile(spec: &FontSpec, glyf: &GlyfTable) -> Bytes {
    let mut buf = BytesMut::with_capacity(SIZE);

    let advance_width_max = glyf
        .glyphs
        .iter()
        .map(|x| x.metrics.advance_width)
        .max()
        .unwrap_or(0);

    let drawn = || {
        glyf.glyphs
            .iter()
            .filter_map(|x| x.bounds.map(|bounds| (x.metrics.advance_width as i32, bounds)))
    };
    let min_left_side_bearing = drawn().map(|(_, b)| b.x_min).min().unwrap_or(0);
    let min_right_side_bearing = drawn()
        .map(|(advance, b)| clamp(advance - b.x_max as i32))
        .min()
        .unwrap_or(0);
    let x_max_extent = drawn().map(|(_, b)| b.x_max).max().unwrap_or(0);

    buf.put_u32(FIXED_ONE); // version
    buf.put_i16(spec.ascent);
    buf.put_i16(spec.descent);
    buf.put_i16(0); // lineGap
    buf.put_u16(advance_width_max);
    buf.put_i16(min_left_side_bearing);
    buf.put_i16(min_right_side_bearing);
    buf.put_i16(x_max_extent);
    buf.put_i16(1); // caretSlopeRise
    buf.put_i16(0); // caretSlopeRun
    buf.put_i16(0); // caretOffset
    buf.put_bytes(0, 4 * 2); // reserved
    buf.put_i16(0); // metricDataFormat
    buf.put_u16(hmtx::number_of_h_metrics(glyf));

    debug_assert_eq!(SIZE, buf.len());

    buf.freeze()
}

fn clamp(value: i32) -> i16 {
    value.clamp(i16::MIN as i32, i16::MAX as i32) as i16
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::fake::FakeFont;
    use crate::font::SourceFont;
    use crate::glyphs;
    use crate::sfnt::tables::glyf;

    #[test]
    fn test_extrema() {
        let source = FakeFont::with_chars("ab");
        let plain = "ab".chars().collect();
        let (spec, _) = glyphs::build(
            &source,
            &plain,
            &['\u{E000}', '\u{E001}'],
            &Default::default(),
        )
        .unwrap();
        let table = compile(&spec, &glyf::compile(&spec).unwrap());

        assert_eq!(table.len(), SIZE);
        assert_eq!(&table[4..6], source.ascent().to_be_bytes());
        assert_eq!(&table[6..8], source.descent().to_be_bytes());
        // glyph "b" is the widest: a square of 201 units advancing 251
        assert_eq!(&table[10..12], 251u16.to_be_bytes());
        assert_eq!(&table[12..14], 0i16.to_be_bytes());
        assert_eq!(&table[14..16], 50i16.to_be_bytes());
        assert_eq!(&table[16..18], 201i16.to_be_bytes());
    }
}
