//! Implementation of the SFNT container format.
//!
//! [`compile`] assembles tables into a font file and [`read_tables`] reads the table directory of a font file back.
//! [`compile_ttf`] compiles all tables of a TrueType font from a [`FontSpec`].

pub mod tables;
pub mod types;

use crate::ctx::Context;
use crate::data::FontSpec;
use crate::error::{Error, Result};
use crate::util;
use bytes::{BufMut, Bytes, BytesMut};
use std::mem::size_of;
use types::{Tag, FIXED_ONE};

/// The `sfntVersion` of fonts with TrueType outlines.
pub const TRUE_TYPE_VERSION: u32 = FIXED_ONE;

/// The size in bytes of the table directory preamble.
const PREAMBLE_SIZE: usize = size_of::<u32>() + 4 * size_of::<u16>();
/// The size in bytes of a `TableRecord`.
const TABLE_RECORD_SIZE: usize = 4 * size_of::<u32>();
/// The offset of `checkSumAdjustment` within the `head` table.
const CHECKSUM_ADJUSTMENT_OFFSET: usize = 8;
/// The whole-font checksum after `checkSumAdjustment` is applied.
const CHECKSUM_MAGIC: u32 = 0xB1B0_AFBA;

/// Compiles an SFNT font.
///
/// `sfnt_version` is written to the first four bytes of the font.
/// The tables are written in tag order; if a `head` table is present its `checkSumAdjustment` is set so the font sums to `0xB1B0AFBA`.
///
/// # Example
///
/// ```
/// # use fontmask::sfnt::types::Tag;
/// # use fontmask::sfnt::{compile, read_tables, TRUE_TYPE_VERSION};
/// # use bytes::Bytes;
/// let tables = vec![
///     (Tag(*b"name"), Bytes::from_static(b"ab")),
///     (Tag(*b"cmap"), Bytes::from_static(b"cdef")),
/// ];
/// let font = compile(TRUE_TYPE_VERSION, tables);
/// let directory = read_tables(&font).unwrap();
/// assert_eq!(directory.tables[0].tag, Tag(*b"cmap"));
/// assert_eq!(directory.tables[1].data, b"ab");
/// ```
pub fn compile(sfnt_version: u32, mut tables: Vec<(Tag, Bytes)>) -> Bytes {
    log::info!(
        "SFNT version: 0x{:08X}{}",
        sfnt_version,
        Tag::from_u32(sfnt_version).map_or(String::new(), |x| format!(" ({})", x))
    );

    tables.sort_by_key(|(tag, _)| *tag);

    let directory_size = PREAMBLE_SIZE + tables.len() * TABLE_RECORD_SIZE;
    let length = directory_size
        + tables
            .iter()
            .map(|(_, x)| x.len() + util::padding(x.len()))
            .sum::<usize>();
    let mut buf = BytesMut::with_capacity(length);

    buf.put_u32(sfnt_version);

    let num_tables = tables.len() as u16;
    buf.put_u16(num_tables);

    let (search_range, entry_selector, range_shift) = util::search_params(num_tables, 16);
    buf.put_u16(search_range);
    buf.put_u16(entry_selector);
    buf.put_u16(range_shift);

    let mut offset = directory_size;
    let mut head_offset = None;

    for (tag, table) in &tables {
        buf.put_u32(tag.as_u32());
        buf.put_u32(util::checksum(table));
        buf.put_u32(offset as u32);
        buf.put_u32(table.len() as u32);

        if *tag == Tag(*b"head") {
            head_offset = Some(offset);
        }
        offset += table.len() + util::padding(table.len());
    }

    for (tag, table) in &tables {
        log::debug!("writing table {} ({} bytes)", tag, table.len());
        buf.put_slice(table);
        buf.put_bytes(0, util::padding(table.len()));
    }

    debug_assert_eq!(length, buf.len());

    if let Some(offset) = head_offset {
        let field = offset + CHECKSUM_ADJUSTMENT_OFFSET;
        if field + 4 <= buf.len() {
            let adjustment = CHECKSUM_MAGIC.wrapping_sub(util::checksum(&buf));
            buf[field..field + 4].copy_from_slice(&adjustment.to_be_bytes());
        }
    }

    buf.freeze()
}

/// Compiles a TrueType flavoured OpenType font.
///
/// # Errors
///
/// - [`Error::Limit`] if the font exceeds a limit of the format, such as 65535 glyphs.
/// - [`Error::UnknownGlyph`] if the font spec references a glyph it does not define.
pub fn compile_ttf(spec: &FontSpec, ctx: &Context) -> Result<Bytes> {
    log::info!("Compile TrueType font with {} glyphs", spec.glyph_order.len());

    if spec.glyph_order.len() > u16::MAX as usize {
        return Err(Error::Limit(format!(
            "{} glyphs exceed the maximum of {}",
            spec.glyph_order.len(),
            u16::MAX
        )));
    }

    let map = spec.character_map()?;
    let glyf = tables::glyf::compile(spec)?;
    let post = tables::post::compile(spec)?;

    let font_tables = vec![
        (Tag(*b"cmap"), tables::cmap::compile(&map, ctx)?),
        (Tag(*b"head"), tables::head::compile(spec, &glyf)),
        (Tag(*b"hhea"), tables::hhea::compile(spec, &glyf)),
        (Tag(*b"hmtx"), tables::hmtx::compile(&glyf)),
        (Tag(*b"maxp"), tables::maxp::compile(&glyf)),
        (Tag(*b"name"), tables::name::compile(&spec.names)?),
        (Tag(*b"OS/2"), tables::os2::compile(spec, &map, &glyf)),
        (Tag(*b"post"), post),
        (Tag(*b"glyf"), glyf.glyf.clone()),
        (Tag(*b"loca"), glyf.loca.clone()),
    ];

    Ok(compile(TRUE_TYPE_VERSION, font_tables))
}

/// The table directory of a font file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDirectory<'a> {
    /// The `sfntVersion` of the font.
    pub sfnt_version: u32,
    /// The tables in directory order.
    pub tables: Vec<TableRecord<'a>>,
}

/// A table of a font file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRecord<'a> {
    /// The table tag.
    pub tag: Tag,
    /// The checksum stored in the table directory.
    pub checksum: u32,
    /// The table data, without padding.
    pub data: &'a [u8],
}

/// Reads the table directory of an SFNT font.
///
/// # Errors
///
/// Returns [`Error::Malformed`] if the directory or a table lies outside of `font`.
pub fn read_tables<'a>(font: &'a [u8]) -> Result<TableDirectory<'a>> {
    let sfnt_version = read_u32(font, 0).ok_or(Error::Malformed("truncated SFNT header"))?;
    let num_tables = read_u16(font, 4).ok_or(Error::Malformed("truncated SFNT header"))?;

    let tables = (0..num_tables as usize)
        .map(|index| -> Result<TableRecord<'a>> {
            let record = PREAMBLE_SIZE + index * TABLE_RECORD_SIZE;
            let field = |n: usize| {
                read_u32(font, record + n * 4).ok_or(Error::Malformed("truncated table record"))
            };
            let tag = Tag(field(0)?.to_be_bytes());
            let checksum = field(1)?;
            let offset = field(2)? as usize;
            let length = field(3)? as usize;
            let data = offset
                .checked_add(length)
                .and_then(|end| font.get(offset..end))
                .ok_or(Error::Malformed("table data out of bounds"))?;
            Ok(TableRecord {
                tag,
                checksum,
                data,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(TableDirectory {
        sfnt_version,
        tables,
    })
}

fn read_u16(data: &[u8], offset: usize) -> Option<u16> {
    data.get(offset..offset + 2)
        .map(|x| u16::from_be_bytes([x[0], x[1]]))
}

fn read_u32(data: &[u8], offset: usize) -> Option<u32> {
    data.get(offset..offset + 4)
        .map(|x| u32::from_be_bytes([x[0], x[1], x[2], x[3]]))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn head_table() -> Bytes {
        let mut head = BytesMut::new();
        head.put_u32(FIXED_ONE);
        head.put_u32(FIXED_ONE);
        head.put_u32(0);
        head.put_u32(0x5F0F_3CF5);
        Bytes::from(head)
    }

    #[test]
    fn test_tables_are_sorted_and_padded() {
        let font = compile(
            TRUE_TYPE_VERSION,
            vec![
                (Tag(*b"post"), Bytes::from_static(b"xyz")),
                (Tag(*b"OS/2"), Bytes::from_static(b"12345")),
            ],
        );
        assert_eq!(font.len(), 12 + 2 * 16 + 8 + 4);

        let directory = read_tables(&font).unwrap();
        assert_eq!(directory.sfnt_version, TRUE_TYPE_VERSION);
        let tags: Vec<Tag> = directory.tables.iter().map(|x| x.tag).collect();
        assert_eq!(tags, [Tag(*b"OS/2"), Tag(*b"post")]);
        assert_eq!(directory.tables[0].data, b"12345");
        assert_eq!(directory.tables[1].data, b"xyz");
        assert_eq!(directory.tables[1].checksum, util::checksum(b"xyz"));
    }

    #[test]
    fn test_checksum_adjustment() {
        let font = compile(
            TRUE_TYPE_VERSION,
            vec![
                (Tag(*b"head"), head_table()),
                (Tag(*b"cmap"), Bytes::from_static(b"abcdef")),
            ],
        );
        assert_eq!(util::checksum(&font), CHECKSUM_MAGIC);

        // the head record keeps the checksum computed with a zero adjustment
        let directory = read_tables(&font).unwrap();
        let head = &directory.tables[1];
        assert_eq!(head.tag, Tag(*b"head"));
        assert_eq!(head.checksum, util::checksum(&head_table()));
    }

    #[test]
    fn test_read_rejects_truncated_fonts() {
        let font = compile(
            TRUE_TYPE_VERSION,
            vec![(Tag(*b"cmap"), Bytes::from_static(b"abcdef"))],
        );
        assert!(matches!(read_tables(&font[..3]), Err(Error::Malformed(_))));
        assert!(matches!(read_tables(&font[..20]), Err(Error::Malformed(_))));
        assert!(matches!(
            read_tables(&font[..font.len() - 4]),
            Err(Error::Malformed(_))
        ));
    }
}
