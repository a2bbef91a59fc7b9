//! The context with which an obfuscation is performed.

use crate::data::NameTableSpec;
use crate::sfnt::tables::cmap::EncodingRecord;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The font used when [`Context::source_font`] is not set.
pub const DEFAULT_SOURCE_FONT: &str =
    concat!(env!("CARGO_MANIFEST_DIR"), "/base-font/DejaVuSansMono.ttf");

/// A context defines customization options.
#[derive(Debug, PartialEq, Eq, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Context {
    /// How display codepoints are chosen.
    pub allocation: Allocation,
    /// Whether to shuffle the plain text after normalization.
    ///
    /// Shuffling breaks the positional correspondence between plain text and shadow text.
    pub shuffle: bool,
    /// Characters appended to the plain text before normalization.
    pub enrichment: Enrichment,
    /// Replaces the bundled supplementary characters used by [`Enrichment::supplement`].
    pub supplement: Option<String>,
    /// How emoji are recognized before being replaced by placeholders.
    pub emoji_matching: EmojiMatching,
    /// Seeds the random generator of [`obfuscate`](crate::obfuscate::obfuscate); fresh entropy is used if `None`.
    pub seed: Option<u64>,
    /// The font the glyphs are copied from; [`DEFAULT_SOURCE_FONT`] if `None`.
    pub source_font: Option<PathBuf>,
    /// The file formats written.
    pub output: OutputFormats,
    /// The directory output files are written to.
    pub output_path: PathBuf,
    /// The file name, without extension, of output files.
    pub output_file_name: String,
    /// The naming fields of the output font.
    pub names: NameTableSpec,
    /// The encoding records used by [`sfnt::tables::cmap`](crate::sfnt::tables::cmap).
    ///
    /// According to the [TrueType specification][spec], encoding records must be sorted first in ascending order of platform id and second by encoding id (a.k.a. platform-specific id). `EncodingRecord` implements this ordering for both `PartialOrd` and `Ord`, so the default sorting of a vector results in the required order.
    ///
    /// [spec]: https://developer.apple.com/fonts/TrueType-Reference-Manual/RM06/Chap6cmap.html
    pub cmap_encoding_records: Option<Vec<EncodingRecord>>,
    /// Whether [`sfnt::tables::cmap::format4`](crate::sfnt::tables::cmap::format4) may merge runs of character codes into a single mix segment when that is smaller.
    pub cmap_format4_merge_segments: bool,
    /// The zlib compression level (0 to 9) of WOFF tables.
    pub woff_compression_level: u32,
}

impl Context {
    /// Creates a context for an abstract optimization level.
    pub fn new(o: Optimization) -> Self {
        Context {
            allocation: Allocation::default(),
            shuffle: false,
            enrichment: Enrichment::default(),
            supplement: None,
            emoji_matching: EmojiMatching::default(),
            seed: None,
            source_font: None,
            output: OutputFormats::default(),
            output_path: PathBuf::from("output"),
            output_file_name: "obfuscated_font".to_string(),
            names: NameTableSpec::default(),
            cmap_encoding_records: None,
            cmap_format4_merge_segments: o >= Optimization::O1,
            woff_compression_level: match o {
                Optimization::O0 => 1,
                Optimization::O1 => 6,
                Optimization::O2 | Optimization::O3 => 9,
            },
        }
    }

    /// The path of the source font.
    pub fn source_font_path(&self) -> PathBuf {
        self.source_font
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SOURCE_FONT))
    }

    /// The path of the output file with the given extension: `{output_path}/{output_file_name}.{extension}`.
    ///
    /// ```
    /// # use fontmask::ctx::Context;
    /// # use std::path::Path;
    /// let ctx = Context::default();
    /// assert_eq!(ctx.output_file("ttf"), Path::new("output/obfuscated_font.ttf"));
    /// ```
    pub fn output_file(&self, extension: &str) -> PathBuf {
        self.output_path
            .join(format!("{}.{}", self.output_file_name, extension))
    }

    /// Returns the random generator for an obfuscation, seeded with [`Context::seed`] if set.
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

impl Default for Context {
    fn default() -> Self {
        Context::new(Optimization::O0)
    }
}

/// How display codepoints are assigned to plain-text characters.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Allocation {
    /// Distinct random codepoints from the Private Use Area.
    Auto,
    /// The codepoints of the shadow text, position by position.
    Shadow,
}

impl Default for Allocation {
    fn default() -> Self {
        Allocation::Auto
    }
}

/// Character groups appended to the plain text.
#[derive(Debug, Default, PartialEq, Eq, Hash, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Enrichment {
    /// Appends `0` to `9`.
    pub digits: bool,
    /// Appends `a` to `z`.
    pub lowercase: bool,
    /// Appends `A` to `Z`.
    pub uppercase: bool,
    /// Appends the supplementary block of common characters.
    pub supplement: bool,
}

/// The granularity at which emoji are detected.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum EmojiMatching {
    /// Each extended grapheme cluster is matched, so joiner and modifier sequences form one emoji.
    Grapheme,
    /// Each Unicode scalar is matched on its own.
    Scalar,
}

impl Default for EmojiMatching {
    fn default() -> Self {
        EmojiMatching::Grapheme
    }
}

/// The file formats written by an obfuscation.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OutputFormats {
    /// Writes a TrueType `.ttf` file.
    pub native: bool,
    /// Writes `.woff` and `.woff2` files.
    pub web: bool,
}

impl Default for OutputFormats {
    fn default() -> Self {
        OutputFormats {
            native: true,
            web: true,
        }
    }
}

/// An abstract optimization level.
///
/// The optimization applies to the size of the compiled fonts.
///
/// The levels are ordered by increasing optimization.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Optimization {
    /// Minimal optimization.
    ///
    /// Fonts are written as fast as possible; `cmap` segments are never merged and WOFF tables use the fastest compression.
    O0,
    /// Basic optimization.
    ///
    /// `cmap` segments are merged when that is smaller and WOFF tables use the default compression.
    O1,
    /// Advanced optimization.
    ///
    /// WOFF tables use the best compression.
    O2,
    /// Maximal optimization.
    ///
    /// Currently equivalent to `O2`.
    O3,
}

impl Optimization {
    /// Returns the optimization for the given name, or `None` if the name is invalid.
    pub fn from_name(name: &str) -> Option<Optimization> {
        match name {
            "O0" => Some(Optimization::O0),
            "O1" => Some(Optimization::O1),
            "O2" => Some(Optimization::O2),
            "O3" => Some(Optimization::O3),
            _ => None,
        }
    }
}

impl Default for Optimization {
    fn default() -> Self {
        Optimization::O0
    }
}
