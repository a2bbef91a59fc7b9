//! # post — PostScript Table
//!
//! *Specification:*
//! [OpenType](https://docs.microsoft.com/en-us/typography/opentype/spec/post).
//!
//! Version 2.0, carrying the glyph names of the font.
//! Names among the first standard Macintosh glyph names use their standard index; every other name is stored as a Pascal string with an index from 258 on.

use crate::data::FontSpec;
use crate::error::{Error, Result};
use bytes::{BufMut, Bytes, BytesMut};

const VERSION_2: u32 = 0x0002_0000;
/// The number of standard Macintosh glyph names.
const STANDARD_NAME_COUNT: u16 = 258;
/// The leading standard Macintosh glyph names; the font only uses reserved glyphs from this set.
const STANDARD_NAMES: [&str; 3] = [".notdef", ".null", "nonmarkingreturn"];

/// Returns a `post` table with the glyph names of `spec`.
///
/// # Errors
///
/// Returns [`Error::Limit`] if a glyph name is longer than 255 bytes or there are too many names.
pub fn compile(spec: &FontSpec) -> Result<Bytes> {
    let mut indices = Vec::with_capacity(spec.glyph_order.len());
    let mut strings = BytesMut::new();
    let mut custom_count: u32 = 0;

    for name in &spec.glyph_order {
        let name = name.as_str();
        if let Some(index) = STANDARD_NAMES.iter().position(|&x| x == name) {
            indices.push(index as u16);
            continue;
        }

        let len = u8::try_from(name.len())
            .map_err(|_| Error::Limit(format!("glyph name '{}' exceeds 255 bytes", name)))?;
        let index = u16::try_from(STANDARD_NAME_COUNT as u32 + custom_count)
            .map_err(|_| Error::Limit("too many glyph names".to_string()))?;

        strings.put_u8(len);
        strings.put_slice(name.as_bytes());
        indices.push(index);
        custom_count += 1;
    }

    let em = spec.units_per_em as i32;
    let mut buf = BytesMut::with_capacity(34 + indices.len() * 2 + strings.len());

    buf.put_u32(VERSION_2);
    buf.put_u32(0); // italicAngle
    buf.put_i16((-em / 10) as i16); // underlinePosition
    buf.put_i16((em / 20) as i16); // underlineThickness
    buf.put_u32(0); // isFixedPitch
    buf.put_bytes(0, 4 * 4); // memory usage hints
    buf.put_u16(indices.len() as u16);
    for index in indices {
        buf.put_u16(index);
    }
    buf.put(strings);

    Ok(buf.freeze())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::GlyphName;

    #[test]
    fn test_names() {
        let spec = FontSpec {
            units_per_em: 1000,
            glyph_order: vec![
                GlyphName::notdef(),
                GlyphName::new(".null"),
                GlyphName::new("uniE000"),
                GlyphName::new("u1F600"),
            ],
            ..FontSpec::default()
        };
        let table = compile(&spec).unwrap();

        assert_eq!(&table[..4], [0, 2, 0, 0]);
        assert_eq!(&table[8..12], [0xFF, 0x9C, 0, 50]);
        assert_eq!(&table[32..42], [0, 4, 0, 0, 0, 1, 1, 2, 1, 3]);
        assert_eq!(&table[42..50], b"\x07uniE000");
        assert_eq!(&table[50..], b"\x06u1F600");
    }

    #[test]
    fn test_long_names_are_rejected() {
        let spec = FontSpec {
            glyph_order: vec![GlyphName::new("x".repeat(256))],
            ..FontSpec::default()
        };
        assert!(matches!(compile(&spec), Err(Error::Limit(_))));
    }
}
