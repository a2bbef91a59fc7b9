//! Web font formats derived from compiled SFNT fonts.
//!
//! Both wrappers read the table directory of a compiled font with [`sfnt::read_tables`](crate::sfnt::read_tables) and store the tables unchanged apart from compression.
//!
//! - [`woff`] compresses every table with zlib.
//! - [`woff2`] compresses all tables in one brotli stream.

pub mod woff;
pub mod woff2;

use crate::sfnt::TableDirectory;
use crate::util;
use std::mem::size_of;

/// The size of the SFNT font a table directory was read from, with every table padded.
fn sfnt_size(directory: &TableDirectory<'_>) -> usize {
    let header = size_of::<u32>() + 4 * size_of::<u16>();
    let records = directory.tables.len() * 4 * size_of::<u32>();
    let tables: usize = directory
        .tables
        .iter()
        .map(|x| x.data.len() + util::padding(x.data.len()))
        .sum();
    header + records + tables
}
