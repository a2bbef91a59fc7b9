//! # WOFF 1.0
//!
//! *Specification:*
//! [W3C](https://www.w3.org/TR/WOFF/).
//!
//! Every table is compressed with zlib and stored uncompressed if compression does not make it smaller.
//! No metadata or private data blocks are written.

use crate::error::Result;
use crate::sfnt::read_tables;
use crate::util;
use bytes::{BufMut, BytesMut};
use flate2::write::ZlibEncoder;
use flate2::Compression;
use std::io::Write;
use std::mem::size_of;

const SIGNATURE: u32 = 0x774F_4646;
/// The size in bytes of the WOFF header.
const HEADER_SIZE: usize = 4 * size_of::<u32>() + 4 * size_of::<u16>() + 5 * size_of::<u32>();
/// The size in bytes of a table directory entry.
const TABLE_ENTRY_SIZE: usize = 5 * size_of::<u32>();

/// Wraps a compiled SFNT font in a WOFF file.
///
/// `level` is the zlib compression level from 0 to 9.
///
/// # Errors
///
/// - [`Error::Malformed`](crate::error::Error::Malformed) if `font` is not a readable SFNT font.
/// - [`Error::Io`](crate::error::Error::Io) if compression fails.
pub fn compile(font: &[u8], level: u32) -> Result<Vec<u8>> {
    let directory = read_tables(font)?;
    let compression = Compression::new(level.min(9));

    let mut tables = Vec::with_capacity(directory.tables.len());
    for table in &directory.tables {
        let compressed = deflate(table.data, compression)?;
        let stored = if compressed.len() < table.data.len() {
            compressed
        } else {
            table.data.to_vec()
        };
        log::debug!(
            "woff: table {} {} -> {} bytes",
            table.tag,
            table.data.len(),
            stored.len()
        );
        tables.push((table, stored));
    }

    let directory_end = HEADER_SIZE + tables.len() * TABLE_ENTRY_SIZE;
    let length = directory_end
        + tables
            .iter()
            .map(|(_, x)| x.len() + util::padding(x.len()))
            .sum::<usize>();
    let mut buf = BytesMut::with_capacity(length);

    buf.put_u32(SIGNATURE);
    buf.put_u32(directory.sfnt_version); // flavor
    buf.put_u32(length as u32);
    buf.put_u16(tables.len() as u16);
    buf.put_u16(0); // reserved
    buf.put_u32(super::sfnt_size(&directory) as u32);
    buf.put_u16(1); // majorVersion
    buf.put_u16(0); // minorVersion
    buf.put_bytes(0, 5 * size_of::<u32>()); // metadata and private data blocks

    let mut offset = directory_end;
    for (table, stored) in &tables {
        buf.put_u32(table.tag.as_u32());
        buf.put_u32(offset as u32);
        buf.put_u32(stored.len() as u32);
        buf.put_u32(table.data.len() as u32);
        buf.put_u32(util::checksum(table.data));
        offset += stored.len() + util::padding(stored.len());
    }

    for (_, stored) in &tables {
        buf.put_slice(stored);
        buf.put_bytes(0, util::padding(stored.len()));
    }

    debug_assert_eq!(length, buf.len());

    log::info!("WOFF: {} -> {} bytes", font.len(), buf.len());

    Ok(buf.to_vec())
}

fn deflate(data: &[u8], compression: Compression) -> Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), compression);
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}
