//! # WOFF 2.0
//!
//! *Specification:*
//! [W3C](https://www.w3.org/TR/WOFF2/).
//!
//! All tables are concatenated in directory order and compressed as a single brotli stream.
//! Tables are stored with the null transform, which for `glyf` and `loca` is transform version 3.

use crate::error::{Error, Result};
use crate::sfnt::read_tables;
use crate::sfnt::types::Tag;
use crate::util;
use brotlic::CompressorWriter;
use bytes::{BufMut, BytesMut};
use std::io::Write;
use std::mem::size_of;

const SIGNATURE: u32 = 0x774F_4632;
/// The size in bytes of the WOFF2 header.
const HEADER_SIZE: usize = 10 * size_of::<u32>() + 4 * size_of::<u16>();
/// The flag value of a table whose tag follows the flags.
const ARBITRARY_TAG: u8 = 0x3F;
/// The transform version bits of the null transform of `glyf` and `loca`.
const NULL_GLYF_TRANSFORM: u8 = 3 << 6;

/// Tags with a one-byte encoding in the table directory, indexed by their flag value.
const KNOWN_TAGS: [&[u8; 4]; 63] = [
    b"cmap", b"head", b"hhea", b"hmtx", b"maxp", b"name", b"OS/2", b"post", b"cvt ", b"fpgm",
    b"glyf", b"loca", b"prep", b"CFF ", b"VORG", b"EBDT", b"EBLC", b"gasp", b"hdmx", b"kern",
    b"LTSH", b"PCLT", b"VDMX", b"vhea", b"vmtx", b"BASE", b"GDEF", b"GPOS", b"GSUB", b"EBSC",
    b"JSTF", b"MATH", b"CBDT", b"CBLC", b"COLR", b"CPAL", b"SVG ", b"sbix", b"acnt", b"avar",
    b"bdat", b"bloc", b"bsln", b"cvar", b"fdsc", b"feat", b"fmtx", b"fvar", b"gvar", b"hsty",
    b"just", b"lcar", b"mort", b"morx", b"opbd", b"prop", b"trak", b"Zapf", b"Silf", b"Glat",
    b"Gloc", b"Feat", b"Sill",
];

/// Wraps a compiled SFNT font in a WOFF2 file.
///
/// # Errors
///
/// - [`Error::Malformed`] if `font` is not a readable SFNT font.
/// - [`Error::Compression`] if the brotli stream cannot be finished.
pub fn compile(font: &[u8]) -> Result<Vec<u8>> {
    let directory = read_tables(font)?;

    let mut entries = BytesMut::new();
    let mut compressor = CompressorWriter::new(Vec::new());

    for table in &directory.tables {
        write_entry(table.tag, table.data.len() as u32, &mut entries);
        compressor.write_all(table.data)?;
    }

    let compressed = compressor
        .into_inner()
        .map_err(|_| Error::Compression("the brotli stream could not be finished".to_string()))?;

    let data_offset = HEADER_SIZE + entries.len();
    let length = data_offset + compressed.len() + util::padding(compressed.len());
    let mut buf = BytesMut::with_capacity(length);

    buf.put_u32(SIGNATURE);
    buf.put_u32(directory.sfnt_version); // flavor
    buf.put_u32(length as u32);
    buf.put_u16(directory.tables.len() as u16);
    buf.put_u16(0); // reserved
    buf.put_u32(super::sfnt_size(&directory) as u32);
    buf.put_u32(compressed.len() as u32);
    buf.put_u16(1); // majorVersion
    buf.put_u16(0); // minorVersion
    buf.put_bytes(0, 5 * size_of::<u32>()); // metadata and private data blocks
    buf.put(entries);
    buf.put_slice(&compressed);
    buf.put_bytes(0, util::padding(compressed.len()));

    debug_assert_eq!(length, buf.len());

    log::info!("WOFF2: {} -> {} bytes", font.len(), buf.len());

    Ok(buf.to_vec())
}

/// Writes the table directory entry of a table stored with the null transform.
fn write_entry(tag: Tag, length: u32, buf: &mut BytesMut) {
    let transform = if tag == Tag(*b"glyf") || tag == Tag(*b"loca") {
        NULL_GLYF_TRANSFORM
    } else {
        0
    };

    match KNOWN_TAGS.iter().position(|&known| *known == tag.0) {
        Some(index) => buf.put_u8(index as u8 | transform),
        None => {
            buf.put_u8(ARBITRARY_TAG | transform);
            buf.put_u32(tag.as_u32());
        }
    }

    put_base128(length, buf);
}

/// Writes a `UIntBase128`: big-endian groups of seven bits, all but the last with the high bit set.
fn put_base128(value: u32, buf: &mut BytesMut) {
    let groups = (1..5).take_while(|&n| value >> (7 * n) != 0).count() + 1;

    for n in (0..groups).rev() {
        let bits = ((value >> (7 * n)) & 0x7F) as u8;
        buf.put_u8(if n == 0 { bits } else { bits | 0x80 });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sfnt::{compile as compile_sfnt, TRUE_TYPE_VERSION};
    use brotlic::DecompressorReader;
    use bytes::Bytes;
    use std::io::Read;

    fn base128(value: u32) -> Vec<u8> {
        let mut buf = BytesMut::new();
        put_base128(value, &mut buf);
        buf.to_vec()
    }

    #[test]
    fn test_base128() {
        assert_eq!(base128(0), [0x00]);
        assert_eq!(base128(127), [0x7F]);
        assert_eq!(base128(128), [0x81, 0x00]);
        assert_eq!(base128(63), [0x3F]);
        assert_eq!(base128(16384), [0x81, 0x80, 0x00]);
        assert_eq!(base128(u32::MAX), [0x8F, 0xFF, 0xFF, 0xFF, 0x7F]);
    }

    #[test]
    fn test_directory_entries() {
        let mut buf = BytesMut::new();
        write_entry(Tag(*b"cmap"), 10, &mut buf);
        write_entry(Tag(*b"loca"), 200, &mut buf);
        write_entry(Tag(*b"zzzz"), 1, &mut buf);
        assert_eq!(
            &buf[..],
            [0, 10, 11 | 0xC0, 0x81, 0x48, 0x3F, b'z', b'z', b'z', b'z', 1]
        );
    }

    #[test]
    fn test_stream_holds_all_tables() {
        let font = compile_sfnt(
            TRUE_TYPE_VERSION,
            vec![
                (Tag(*b"loca"), Bytes::from_static(b"\0\0\0\0\0\0\0\x08")),
                (Tag(*b"glyf"), Bytes::from_static(b"12345678")),
                (Tag(*b"name"), Bytes::from_static(b"xyz")),
            ],
        );
        let woff2 = compile(&font).unwrap();

        assert_eq!(&woff2[..4], b"wOF2");
        assert_eq!(woff2.len() % 4, 0);
        assert_eq!(
            u32::from_be_bytes([woff2[8], woff2[9], woff2[10], woff2[11]]) as usize,
            woff2.len()
        );
        // glyf, loca, name in tag order
        assert_eq!(&woff2[HEADER_SIZE..HEADER_SIZE + 6], [0xCA, 8, 0xCB, 8, 5, 3]);

        let compressed_size =
            u32::from_be_bytes([woff2[20], woff2[21], woff2[22], woff2[23]]) as usize;
        let start = HEADER_SIZE + 6;
        let mut stream = Vec::new();
        DecompressorReader::new(&woff2[start..start + compressed_size])
            .read_to_end(&mut stream)
            .unwrap();
        assert_eq!(stream, b"12345678\0\0\0\0\0\0\0\x08xyz");
    }
}
