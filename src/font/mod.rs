//! The font library the obfuscation core delegates to.
//!
//! The core only sees the [`SourceFont`] and [`FontLibrary`] traits.
//! [`TrueType`] implements them by reading fonts with `ttf-parser` and compiling TrueType fonts with [`sfnt`](crate::sfnt) and [`web`](crate::web).

#[cfg(test)]
pub(crate) mod fake;
mod pen;
mod ttf;

pub use ttf::TtfFont;

use crate::ctx::Context;
use crate::data::{FontSpec, GlyphName, HorizontalMetrics, Outline};
use crate::error::Result;
use crate::{sfnt, web};
use bytes::Bytes;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Read access to a loaded font.
pub trait SourceFont {
    /// The best Unicode character map of the font, mapping characters to glyph names.
    fn best_cmap(&self) -> BTreeMap<char, GlyphName>;

    /// All glyph names in glyph id order.
    fn glyph_order(&self) -> Vec<GlyphName>;

    /// The outline of a glyph.
    fn outline(&self, name: &GlyphName) -> Result<Outline>;

    /// The horizontal metrics of a glyph.
    fn metrics(&self, name: &GlyphName) -> Result<HorizontalMetrics>;

    /// The design units per em.
    fn units_per_em(&self) -> u16;

    /// The ascent of the horizontal header.
    fn ascent(&self) -> i16;

    /// The descent of the horizontal header.
    fn descent(&self) -> i16;
}

/// Loads source fonts and produces output fonts.
pub trait FontLibrary {
    /// The type of loaded fonts.
    type Font: SourceFont;

    /// Loads the font at `path`.
    fn load_font(&self, path: &Path) -> Result<Self::Font>;

    /// Compiles a font in the native outline format.
    fn build_font(&self, spec: &FontSpec, ctx: &Context) -> Result<Bytes>;

    /// Writes font data, native or web, to `path`.
    fn serialize_font(&self, font: &[u8], path: &Path) -> Result<()>;

    /// Compiles the web formats of a compiled font without writing them.
    fn derive_web_formats(&self, font: &[u8], ctx: &Context) -> Result<Vec<WebFont>>;
}

/// A web font derived from a compiled native font.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebFont {
    /// The file extension of the format, such as `woff2`.
    pub extension: &'static str,
    /// The file contents.
    pub data: Bytes,
}

/// The default font library: TrueType output, WOFF and WOFF2 web formats.
#[derive(Debug, Default, Clone, Copy)]
pub struct TrueType;

impl FontLibrary for TrueType {
    type Font = TtfFont;

    fn load_font(&self, path: &Path) -> Result<TtfFont> {
        log::info!("Load source font {}", path.display());
        TtfFont::from_data(fs::read(path)?)
    }

    fn build_font(&self, spec: &FontSpec, ctx: &Context) -> Result<Bytes> {
        sfnt::compile_ttf(spec, ctx)
    }

    fn serialize_font(&self, font: &[u8], path: &Path) -> Result<()> {
        log::info!("Write {}", path.display());
        fs::write(path, font)?;
        Ok(())
    }

    fn derive_web_formats(&self, font: &[u8], ctx: &Context) -> Result<Vec<WebFont>> {
        Ok(vec![
            WebFont {
                extension: "woff",
                data: web::woff::compile(font, ctx.woff_compression_level)?.into(),
            },
            WebFont {
                extension: "woff2",
                data: web::woff2::compile(font)?.into(),
            },
        ])
    }
}
