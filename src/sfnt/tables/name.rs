//! # name — Naming Table
//!
//! *Specification:*
//! [OpenType](https://docs.microsoft.com/en-us/typography/opentype/spec/name).
//!
//! Records are written for the Windows platform with the Unicode BMP encoding and the en-US language, as UTF-16BE strings in a format 0 table.

use crate::data::NameTableSpec;
use crate::error::{Error, Result};
use bytes::{BufMut, Bytes, BytesMut};
use std::mem::size_of;

const WINDOWS_PLATFORM_ID: u16 = 3;
const UNICODE_BMP_ENCODING_ID: u16 = 1;
const EN_US_LANGUAGE_ID: u16 = 0x0409;
/// The size in bytes of the table header.
const HEADER_SIZE: usize = 3 * size_of::<u16>();
/// The size in bytes of a name record.
const NAME_RECORD_SIZE: usize = 6 * size_of::<u16>();

/// Returns a `name` table with the records of `names`.
///
/// # Errors
///
/// Returns [`Error::Limit`] if the strings do not fit the 16-bit offsets of the table.
pub fn compile(names: &NameTableSpec) -> Result<Bytes> {
    let records: Vec<(u16, Vec<u8>)> = names
        .records()
        .into_iter()
        .map(|(id, value)| {
            let encoded = value.encode_utf16().flat_map(u16::to_be_bytes).collect();
            (id.id(), encoded)
        })
        .collect();

    let storage_offset = HEADER_SIZE + records.len() * NAME_RECORD_SIZE;
    let storage_size: usize = records.iter().map(|(_, x)| x.len()).sum();
    if storage_offset + storage_size > u16::MAX as usize {
        return Err(Error::Limit(format!(
            "{} bytes of names exceed the name table",
            storage_size
        )));
    }

    let mut buf = BytesMut::with_capacity(storage_offset + storage_size);

    buf.put_u16(0); // format
    buf.put_u16(records.len() as u16);
    buf.put_u16(storage_offset as u16);

    let mut offset = 0;
    for (name_id, value) in &records {
        buf.put_u16(WINDOWS_PLATFORM_ID);
        buf.put_u16(UNICODE_BMP_ENCODING_ID);
        buf.put_u16(EN_US_LANGUAGE_ID);
        buf.put_u16(*name_id);
        buf.put_u16(value.len() as u16);
        buf.put_u16(offset as u16);
        offset += value.len();
    }

    for (_, value) in &records {
        buf.put_slice(value);
    }

    log::debug!("name: {} records", records.len());

    Ok(buf.freeze())
}
