//! Errors raised while obfuscating a font.

use crate::data::GlyphName;
use thiserror::Error;

/// A specialized `Result` type for obfuscation operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The error type of the crate.
///
/// Every error is fatal to the obfuscation it occurs in: no font file is written and no mapping is returned.
#[derive(Debug, Error)]
pub enum Error {
    /// The configuration or the input texts are inconsistent.
    ///
    /// Raised for shadow texts shorter than the plain text and for unsupported flag combinations.
    #[error("invalid configuration: {0}")]
    Configuration(String),
    /// More distinct codepoints were requested than the private use range provides.
    #[error("cannot allocate {requested} distinct codepoints, the private use range holds {available}")]
    Capacity {
        /// The number of codepoints requested.
        requested: usize,
        /// The number of codepoints available.
        available: usize,
    },
    /// A character of the plain text has no glyph in the source font.
    #[error("character {0:?} is not covered by the source font")]
    MissingGlyph(char),
    /// A glyph name does not resolve to a glyph of the font.
    #[error("glyph {0} does not exist in the font")]
    UnknownGlyph(GlyphName),
    /// A structural limit of the font format was exceeded.
    #[error("font format limit exceeded: {0}")]
    Limit(String),
    /// Compiled font data can not be read back.
    #[error("malformed font data: {0}")]
    Malformed(&'static str),
    /// Compressing a web font failed.
    #[error("compression failed: {0}")]
    Compression(String),
    /// Reading or writing a file failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// The source font can not be parsed.
    #[error(transparent)]
    FontParse(#[from] ttf_parser::FaceParsingError),
}
