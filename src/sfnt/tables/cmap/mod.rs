//! # cmap — Character to Glyph Index Mapping Table
//!
//! Implementation of the `cmap` table.
//!
//! *Specification:*
//! [OpenType](https://docs.microsoft.com/en-us/typography/opentype/spec/cmap),
//! [TrueType](https://developer.apple.com/fonts/TrueType-Reference-Manual/RM06/Chap6cmap.html).
//!
//! The `cmap` table maps character codes to glyph ids.
//! In an obfuscated font it is the only link between the display codepoints of a document and the glyphs drawn for them.
//!
//! A `cmap` table consists of one or multiple subtables, accessed by encoding records.
//! A record names the platform, the encoding and the format of its subtable.
//! Records with the same format share one subtable.
//!
//! # Usage
//!
//! Use the [`compile`] function to convert a character map to a `cmap` table.
//! The [`Context::cmap_encoding_records`] field can be set to customize the encoding records used by [`compile`].
//!
//! # Example
//!
//! ```
//! # use fontmask::ctx::Context;
//! # use fontmask::data::CharacterMap;
//! # use fontmask::sfnt::tables::cmap::compile;
//! let ctx = Context::default();
//! let mut map = CharacterMap::new();
//! map.insert('\u{E000}', 1);
//! map.insert('\u{E001}', 2);
//! map.insert('\u{F123}', 3);
//! let table = compile(&map, &ctx).unwrap();
//! ```

pub mod format12;
pub mod format4;

use crate::ctx::Context;
use crate::data::CharacterMap;
use crate::error::{Error, Result};
use bytes::{BufMut, Bytes, BytesMut};
use itertools::Itertools;
use lazy_static::lazy_static;
use std::cmp;
use std::fmt;
use std::mem::size_of;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The size in bytes of an encoding record.
const ENCODING_RECORD_SIZE: usize = 2 * size_of::<u16>() + size_of::<u32>();
/// The size in bytes of the table header.
const HEADER_SIZE: usize = 2 * size_of::<u16>();
/// The largest Unicode scalar that is part of the Basic Multilingual Plane (BMP).
const MAX_BMP_SCALAR: char = '\u{FFFF}';

lazy_static! {
    /// The default records used to represent BMP only character maps in order of `Ord`.
    static ref DEFAULT_BMP_RECORDS: Vec<EncodingRecord> = vec![
        EncodingRecord {
            encoding: Encoding::Unicode(UnicodeEncoding::Bmp),
            format: RecordFormat::Format4,
        },
        EncodingRecord {
            encoding: Encoding::Windows(WindowsEncoding::Bmp),
            format: RecordFormat::Format4,
        },
    ];
    /// The default records used to represent full Unicode character maps in order of `Ord`.
    static ref DEFAULT_FULL_RECORDS: Vec<EncodingRecord> = vec![
        EncodingRecord {
            encoding: Encoding::Unicode(UnicodeEncoding::Bmp),
            format: RecordFormat::Format4,
        },
        EncodingRecord {
            encoding: Encoding::Unicode(UnicodeEncoding::Full),
            format: RecordFormat::Format12,
        },
        EncodingRecord {
            encoding: Encoding::Windows(WindowsEncoding::Bmp),
            format: RecordFormat::Format4,
        },
        EncodingRecord {
            encoding: Encoding::Windows(WindowsEncoding::Full),
            format: RecordFormat::Format12,
        },
    ];
}

/// Returns the encoding records [`compile`] uses for `map` when the context does not set any.
pub fn default_records(map: &CharacterMap) -> &'static [EncodingRecord] {
    let exceeds_bmp = map.keys().next_back().map_or(false, |&x| x > MAX_BMP_SCALAR);
    if exceeds_bmp {
        &DEFAULT_FULL_RECORDS
    } else {
        &DEFAULT_BMP_RECORDS
    }
}

/// Returns a `cmap` table for the given character map.
///
/// # Errors
///
/// Returns [`Error::Limit`] if a format 4 subtable exceeds its 16-bit length.
pub fn compile(map: &CharacterMap, ctx: &Context) -> Result<Bytes> {
    let records: &[EncodingRecord] = match &ctx.cmap_encoding_records {
        Some(records) => records,
        None => default_records(map),
    };

    let subtables: Vec<(RecordFormat, Bytes)> = records
        .iter()
        .map(|x| x.format)
        .unique()
        .map(|format| -> Result<(RecordFormat, Bytes)> {
            let subtable = match format {
                RecordFormat::Format4 => format4::compile(map, ctx)?,
                RecordFormat::Format12 => format12::compile(map),
            };
            log::debug!("cmap format {}: {} bytes", format, subtable.len());
            Ok((format, subtable))
        })
        .collect::<Result<_>>()?;

    let fixed_size = HEADER_SIZE + (records.len() * ENCODING_RECORD_SIZE);
    let length = fixed_size + subtables.iter().map(|(_, x)| x.len()).sum::<usize>();
    let mut buf = BytesMut::with_capacity(length);

    let version: u16 = 0;
    buf.put_u16(version);

    let num_tables: u16 = records.len() as u16;
    buf.put_u16(num_tables);

    for record in records {
        buf.put_u16(record.encoding.platform_id());
        buf.put_u16(record.encoding.encoding_id());

        // subtables are stored in order of first use, so the offset of a
        // shared subtable is the sum of the subtables before it
        let offset = fixed_size
            + subtables
                .iter()
                .take_while(|(format, _)| *format != record.format)
                .map(|(_, x)| x.len())
                .sum::<usize>();
        buf.put_u32(offset as u32);
    }

    for (_, subtable) in &subtables {
        buf.put_slice(subtable);
    }

    debug_assert_eq!(length, buf.len());

    Ok(buf.freeze())
}

/// An encoding record describes a `cmap` subtable.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EncodingRecord {
    /// The encoding used by the subtable.
    pub encoding: Encoding,
    /// The subtable format.
    pub format: RecordFormat,
}

impl cmp::PartialOrd for EncodingRecord {
    fn partial_cmp(&self, other: &Self) -> Option<cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl cmp::Ord for EncodingRecord {
    fn cmp(&self, other: &Self) -> cmp::Ordering {
        self.encoding.cmp(&other.encoding)
    }
}

impl FromStr for EncodingRecord {
    type Err = Error;

    /// Parses an encoding-record code.
    ///
    /// Codes are formatted as `<platform_id> "/" <encoding_id> "=" <format_id>`.
    /// Such a code is also written using the `Display` formatting of an `EncodingRecord`.
    ///
    /// ## Example
    ///
    /// ```
    /// # use fontmask::sfnt::tables::cmap::{Encoding, EncodingRecord, RecordFormat, UnicodeEncoding};
    /// let record: EncodingRecord = "0/3=4".parse().unwrap();
    /// assert_eq!(
    ///     record,
    ///     EncodingRecord {
    ///         encoding: Encoding::Unicode(UnicodeEncoding::Bmp),
    ///         format: RecordFormat::Format4
    ///     }
    /// );
    /// assert!("3/1=6".parse::<EncodingRecord>().is_err());
    /// ```
    fn from_str(code: &str) -> Result<EncodingRecord> {
        let invalid = |what: &str| Error::Configuration(format!("{} in cmap record '{}'", what, code));

        let (selection, format) = code
            .split_once('=')
            .ok_or_else(|| invalid("missing '='"))?;
        let (platform, encoding) = selection
            .split_once('/')
            .ok_or_else(|| invalid("missing '/'"))?;
        let platform_id = platform
            .parse::<u16>()
            .map_err(|_| invalid("invalid platform id"))?;
        let encoding_id = encoding
            .parse::<u16>()
            .map_err(|_| invalid("invalid encoding id"))?;
        let format_id = format
            .parse::<u16>()
            .map_err(|_| invalid("invalid format id"))?;

        let encoding = Encoding::from_ids(platform_id, encoding_id)
            .ok_or_else(|| invalid("unsupported platform or encoding"))?;
        let format = RecordFormat::from_id(format_id).ok_or_else(|| invalid("unsupported format"))?;

        Ok(EncodingRecord { encoding, format })
    }
}

impl fmt::Display for EncodingRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.encoding, self.format)
    }
}

/// The combination of a platform id and a matching encoding id.
#[derive(Debug, PartialOrd, Ord, PartialEq, Eq, Hash, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Encoding {
    /// The Unicode platform.
    Unicode(UnicodeEncoding),
    /// The Windows platform.
    Windows(WindowsEncoding),
}

impl Encoding {
    /// Creates an encoding from a given `platformID` and `encodingID`; returns `None` if the combination is unsupported.
    pub fn from_ids(platform_id: u16, encoding_id: u16) -> Option<Self> {
        match platform_id {
            0 => UnicodeEncoding::from_id(encoding_id).map(Encoding::Unicode),
            3 => WindowsEncoding::from_id(encoding_id).map(Encoding::Windows),
            _ => None,
        }
    }

    /// The `platformID` of the encoding.
    pub fn platform_id(&self) -> u16 {
        match self {
            Self::Unicode(_) => 0,
            Self::Windows(_) => 3,
        }
    }

    /// The `encodingID` of the encoding.
    pub fn encoding_id(&self) -> u16 {
        match self {
            Self::Unicode(encoding) => encoding.id(),
            Self::Windows(encoding) => encoding.id(),
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.platform_id(), self.encoding_id())
    }
}

/// The supported Unicode encodings.
#[derive(Debug, PartialOrd, Ord, PartialEq, Eq, Hash, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum UnicodeEncoding {
    /// The Unicode Basic Multilingual Plane codespace.
    Bmp,
    /// The full Unicode codespace.
    Full,
}

impl UnicodeEncoding {
    /// Returns a `UnicodeEncoding` for an `encodingID`; returns `None` if the encoding id is unsupported.
    pub fn from_id(id: u16) -> Option<Self> {
        match id {
            3 => Some(Self::Bmp),
            4 => Some(Self::Full),
            _ => None,
        }
    }

    /// Returns the `encodingID` of the encoding.
    pub fn id(&self) -> u16 {
        match self {
            Self::Bmp => 3,
            Self::Full => 4,
        }
    }
}

/// The supported Windows encodings.
#[derive(Debug, PartialOrd, Ord, PartialEq, Eq, Hash, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum WindowsEncoding {
    /// The Unicode Basic Multilingual Plane codespace.
    Bmp,
    /// The full Unicode codespace.
    Full,
}

impl WindowsEncoding {
    /// Returns a `WindowsEncoding` for an `encodingID`; returns `None` if the encoding id is unsupported.
    pub fn from_id(id: u16) -> Option<Self> {
        match id {
            1 => Some(Self::Bmp),
            10 => Some(Self::Full),
            _ => None,
        }
    }

    /// Returns the `encodingID` of the encoding.
    pub fn id(&self) -> u16 {
        match self {
            Self::Bmp => 1,
            Self::Full => 10,
        }
    }
}

/// The supported `cmap` subtable formats.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum RecordFormat {
    /// The subtable format 4.
    Format4,
    /// The subtable format 12.
    Format12,
}

impl RecordFormat {
    /// Returns the `RecordFormat` for a subtable format id; returns `None` if the format id is unsupported.
    pub fn from_id(id: u16) -> Option<Self> {
        match id {
            4 => Some(Self::Format4),
            12 => Some(Self::Format12),
            _ => None,
        }
    }

    /// Returns the id of the format.
    pub fn id(&self) -> u16 {
        match self {
            Self::Format4 => 4,
            Self::Format12 => 12,
        }
    }
}

impl fmt::Display for RecordFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}
