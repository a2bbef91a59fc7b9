//! # OS/2 — OS/2 and Windows Metrics Table
//!
//! *Specification:*
//! [OpenType](https://docs.microsoft.com/en-us/typography/opentype/spec/os2).
//!
//! Version 4 with default classification values.
//! Metrics derive from the font spec and the compiled glyphs; the Unicode ranges cover the blocks this crate emits.

use super::glyf::GlyfTable;
use super::head::mac_style;
use crate::data::{CharacterMap, FontSpec};
use bytes::{BufMut, Bytes, BytesMut};
use std::ops::RangeInclusive;

/// The size in bytes of a version 4 table.
pub const SIZE: usize = 96;
const VERSION: u16 = 4;
const VENDOR_ID: &[u8; 4] = b"NONE";
const WEIGHT_REGULAR: u16 = 400;
const WIDTH_MEDIUM: u16 = 5;

const FS_SELECTION_ITALIC: u16 = 0x0001;
const FS_SELECTION_BOLD: u16 = 0x0020;
const FS_SELECTION_REGULAR: u16 = 0x0040;

/// `ulUnicodeRange` bits for blocks, as `(bit, codepoints)`.
const UNICODE_RANGES: [(u32, RangeInclusive<u32>); 6] = [
    (0, 0x0000..=0x007F),
    (1, 0x0080..=0x00FF),
    (48, 0x3000..=0x303F),
    (59, 0x4E00..=0x9FFF),
    (60, 0xE000..=0xF8FF),
    (68, 0xFF00..=0xFFEF),
];
/// Set for any codepoint beyond the Basic Multilingual Plane.
const NON_PLANE_0_BIT: u32 = 57;

/// Returns an `OS/2` table for the font.
pub fn compile(spec: &FontSpec, map: &CharacterMap, glyf: &GlyfTable) -> Bytes {
    let mut buf = BytesMut::with_capacity(SIZE);
    let em = spec.units_per_em as i32;
    let scaled = |ratio: i32| (em * ratio / 1000) as i16;
    let bounds = glyf.bounds().unwrap_or_default();

    let first_char = map.keys().next().map_or(0, |&x| x as u32);
    let last_char = map.keys().next_back().map_or(0, |&x| x as u32);

    buf.put_u16(VERSION);
    buf.put_i16(average_char_width(glyf));
    buf.put_u16(WEIGHT_REGULAR);
    buf.put_u16(WIDTH_MEDIUM);
    buf.put_u16(0); // fsType: installable embedding
    buf.put_i16(scaled(650)); // ySubscriptXSize
    buf.put_i16(scaled(600)); // ySubscriptYSize
    buf.put_i16(0); // ySubscriptXOffset
    buf.put_i16(scaled(75)); // ySubscriptYOffset
    buf.put_i16(scaled(650)); // ySuperscriptXSize
    buf.put_i16(scaled(600)); // ySuperscriptYSize
    buf.put_i16(0); // ySuperscriptXOffset
    buf.put_i16(scaled(350)); // ySuperscriptYOffset
    buf.put_i16(scaled(50)); // yStrikeoutSize
    buf.put_i16(scaled(300)); // yStrikeoutPosition
    buf.put_i16(0); // sFamilyClass
    buf.put_bytes(0, 10); // panose
    for field in unicode_ranges(map) {
        buf.put_u32(field);
    }
    buf.put_slice(VENDOR_ID);
    buf.put_u16(fs_selection(&spec.names.style_name));
    buf.put_u16(first_char.min(0xFFFF) as u16);
    buf.put_u16(last_char.min(0xFFFF) as u16);
    buf.put_i16(spec.ascent); // sTypoAscender
    buf.put_i16(spec.descent); // sTypoDescender
    buf.put_i16(0); // sTypoLineGap
    buf.put_u16(spec.ascent.max(bounds.y_max).max(0) as u16); // usWinAscent
    buf.put_u16((-(spec.descent.min(bounds.y_min) as i32)).max(0) as u16); // usWinDescent
    buf.put_u32(0); // ulCodePageRange1
    buf.put_u32(0); // ulCodePageRange2
    buf.put_i16(0); // sxHeight
    buf.put_i16(0); // sCapHeight
    buf.put_u16(0); // usDefaultChar
    buf.put_u16(0x20); // usBreakChar
    buf.put_u16(0); // usMaxContext

    debug_assert_eq!(SIZE, buf.len());

    buf.freeze()
}

/// The average of all non-zero advance widths.
fn average_char_width(glyf: &GlyfTable) -> i16 {
    let widths: Vec<u32> = glyf
        .glyphs
        .iter()
        .map(|x| x.metrics.advance_width as u32)
        .filter(|&x| x > 0)
        .collect();

    if widths.is_empty() {
        0
    } else {
        (widths.iter().sum::<u32>() / widths.len() as u32) as i16
    }
}

/// The `ulUnicodeRange1` to `ulUnicodeRange4` fields.
fn unicode_ranges(map: &CharacterMap) -> [u32; 4] {
    let mut fields = [0u32; 4];
    let mut set = |bit: u32| fields[(bit / 32) as usize] |= 1 << (bit % 32);

    for &code in map.keys() {
        let code = code as u32;
        if code > 0xFFFF {
            set(NON_PLANE_0_BIT);
        }
        for (bit, range) in &UNICODE_RANGES {
            if range.contains(&code) {
                set(*bit);
            }
        }
    }

    fields
}

fn fs_selection(style_name: &str) -> u16 {
    let style = mac_style(style_name);
    let mut bits = 0;
    if style & 1 != 0 {
        bits |= FS_SELECTION_BOLD;
    }
    if style & 2 != 0 {
        bits |= FS_SELECTION_ITALIC;
    }
    if bits == 0 {
        bits = FS_SELECTION_REGULAR;
    }
    bits
}
