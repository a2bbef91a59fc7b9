//! # head — Font Header Table
//!
//! *Specification:*
//! [OpenType](https://docs.microsoft.com/en-us/typography/opentype/spec/head).
//!
//! `checkSumAdjustment` is written as zero and patched by [`sfnt::compile`](crate::sfnt::compile) once the whole font is assembled.

use super::glyf::GlyfTable;
use crate::data::FontSpec;
use crate::sfnt::types::FIXED_ONE;
use bytes::{BufMut, Bytes, BytesMut};
use std::time::{SystemTime, UNIX_EPOCH};

/// The size in bytes of the table.
pub const SIZE: usize = 54;
/// Seconds from 1904-01-01 to 1970-01-01.
const MAC_EPOCH_OFFSET: i64 = 2_082_844_800;
const MAGIC_NUMBER: u32 = 0x5F0F_3CF5;
/// Baseline at y = 0, left sidebearing point at x = 0, integer scaling.
const FLAGS: u16 = 0b1011;
const LONG_OFFSETS: i16 = 1;

/// Returns a `head` table for the font.
pub fn compile(spec: &FontSpec, glyf: &GlyfTable) -> Bytes {
    let mut buf = BytesMut::with_capacity(SIZE);
    let bounds = glyf.bounds().unwrap_or_default();
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |x| x.as_secs() as i64)
        + MAC_EPOCH_OFFSET;

    buf.put_u16(1); // majorVersion
    buf.put_u16(0); // minorVersion
    buf.put_u32(FIXED_ONE); // fontRevision
    buf.put_u32(0); // checkSumAdjustment
    buf.put_u32(MAGIC_NUMBER);
    buf.put_u16(FLAGS);
    buf.put_u16(spec.units_per_em);
    buf.put_i64(now); // created
    buf.put_i64(now); // modified
    buf.put_i16(bounds.x_min);
    buf.put_i16(bounds.y_min);
    buf.put_i16(bounds.x_max);
    buf.put_i16(bounds.y_max);
    buf.put_u16(mac_style(&spec.names.style_name));
    buf.put_u16(3); // lowestRecPPEM
    buf.put_i16(2); // fontDirectionHint
    buf.put_i16(LONG_OFFSETS);
    buf.put_i16(0); // glyphDataFormat

    debug_assert_eq!(SIZE, buf.len());

    buf.freeze()
}

/// The `macStyle` bits for a style name: bold is bit 0, italic is bit 1.
pub fn mac_style(style_name: &str) -> u16 {
    let style = style_name.to_ascii_lowercase();
    let mut bits = 0;
    if style.contains("bold") {
        bits |= 1;
    }
    if style.contains("italic") || style.contains("oblique") {
        bits |= 2;
    }
    bits
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::NameTableSpec;
    use crate::sfnt::tables::glyf;

    #[test]
    fn test_layout() {
        let spec = FontSpec {
            units_per_em: 2048,
            names: NameTableSpec::new("Test", "Bold Italic"),
            ..FontSpec::default()
        };
        let table = compile(&spec, &glyf::compile(&spec).unwrap());
        assert_eq!(table.len(), SIZE);
        assert_eq!(&table[12..16], MAGIC_NUMBER.to_be_bytes());
        assert_eq!(&table[18..20], 2048u16.to_be_bytes());
        assert_eq!(&table[44..46], 3u16.to_be_bytes());
        assert_eq!(&table[50..52], [0, 1]);
    }

    #[test]
    fn test_mac_style() {
        assert_eq!(mac_style("Regular"), 0);
        assert_eq!(mac_style("Bold"), 1);
        assert_eq!(mac_style("Italic"), 2);
        assert_eq!(mac_style("bold oblique"), 3);
    }
}
