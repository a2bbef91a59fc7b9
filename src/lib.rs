//! # Fontmask
//!
//! *Fontmask* obfuscates text by compiling a font that renders it from unrelated codepoints.
//!
//! Every character of a plain text is assigned a display codepoint, either a random codepoint of the Private Use Area or the character at the same position of a shadow text.
//! The glyph of the plain character is copied from a source font under its display codepoint, so a page that emits display codepoints shows the plain text only when rendered with the compiled font.
//!
//! The high-level API is [`obfuscate`], which writes the font files and returns the [`ObfuscationMap`](data::ObfuscationMap).
//! The steps of the pipeline are available on their own:
//!
//! - [`text`] normalizes plain and shadow texts into [character sets](data::CharacterSet).
//! - [`alloc`] assigns display codepoints.
//! - [`glyphs`] assembles the glyph set of the output font.
//! - [`font`] abstracts font loading and compilation behind the [`FontLibrary`](font::FontLibrary) trait.
//!
//! ## Font formats
//!
//! - The [SFNT container format](crate::sfnt) with TrueType outlines.
//! - The [`cmap` table](crate::sfnt::tables::cmap) with [format 4](crate::sfnt::tables::cmap::format4) and [format 12](crate::sfnt::tables::cmap::format12) subtables.
//! - [WOFF](crate::web::woff) and [WOFF2](crate::web::woff2) web fonts.

#![deny(missing_docs, missing_debug_implementations)]

pub mod alloc;
pub mod ctx;
pub mod data;
pub mod error;
pub mod flags;
pub mod font;
pub mod glyphs;
pub mod obfuscate;
pub mod sfnt;
pub mod text;
mod util;
pub mod web;

pub use error::{Error, Result};
pub use obfuscate::{obfuscate, obfuscate_with};
