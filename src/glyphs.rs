//! Assembly of the output glyph set.
//!
//! The builder copies the glyphs of the plain-text characters from the source font, renames them after their display codepoints and records the mappings of the output font and of the [`ObfuscationMap`].
//!
//! All plain-text characters are validated against the source font before any glyph is copied, so a missing glyph never leaves a partial result behind.

use crate::data::{
    CharacterSet, DisplayCode, FontSpec, GlyphName, GlyphRecord, NameTableSpec, ObfuscationMap,
};
use crate::error::{Error, Result};
use crate::font::SourceFont;
use std::collections::{BTreeMap, HashSet};

/// Builds the font spec of the output font and the obfuscation map.
///
/// `codepoints` holds the display codepoint of each character of `plain`, in the same order.
///
/// # Errors
///
/// - [`Error::MissingGlyph`] if a character of `plain` is not covered by the source font.
/// - [`Error::Configuration`] if `codepoints` does not match `plain` in length or repeats a codepoint.
/// - Errors of the source font while reading outlines and metrics.
pub fn build<F: SourceFont + ?Sized>(
    source: &F,
    plain: &CharacterSet,
    codepoints: &[char],
    names: &NameTableSpec,
) -> Result<(FontSpec, ObfuscationMap)> {
    if codepoints.len() != plain.len() {
        return Err(Error::Configuration(format!(
            "{} codepoints were allocated for {} characters",
            codepoints.len(),
            plain.len()
        )));
    }

    let mut distinct = HashSet::with_capacity(codepoints.len());
    if let Some(code) = codepoints.iter().find(|&&code| !distinct.insert(code)) {
        return Err(Error::Configuration(format!(
            "codepoint U+{:04X} is allocated twice",
            *code as u32
        )));
    }

    let source_cmap = source.best_cmap();
    validate(&source_cmap, plain)?;

    log::info!("Copy {} glyphs", plain.len());

    let mut spec = FontSpec {
        units_per_em: source.units_per_em(),
        ascent: source.ascent(),
        descent: source.descent(),
        names: names.clone(),
        ..FontSpec::default()
    };
    let mut map = ObfuscationMap::new();

    for name in reserved_glyphs(&source.glyph_order()) {
        log::debug!("copying reserved glyph {}", name);
        copy_glyph(source, &name, name.clone(), &mut spec)?;
    }

    for (&plain_char, &code) in plain.iter().zip(codepoints) {
        let source_name = source_cmap
            .get(&plain_char)
            .ok_or(Error::MissingGlyph(plain_char))?;
        let name = GlyphName::for_codepoint(code);

        log::trace!("{:?} ({}) -> {}", plain_char, source_name, name);

        copy_glyph(source, source_name, name.clone(), &mut spec)?;
        spec.cmap.insert(code, name);
        map.insert(plain_char, DisplayCode(code));
    }

    Ok((spec, map))
}

/// Checks that every character of `plain` is mapped by the source character map.
///
/// # Errors
///
/// Returns [`Error::MissingGlyph`] with the first character that is not mapped.
pub fn validate(source_cmap: &BTreeMap<char, GlyphName>, plain: &CharacterSet) -> Result<()> {
    match plain.iter().find(|&c| !source_cmap.contains_key(c)) {
        Some(&missing) => Err(Error::MissingGlyph(missing)),
        None => Ok(()),
    }
}

/// Returns the `.notdef` and null glyphs of `glyph_order`, `.notdef` first.
fn reserved_glyphs(glyph_order: &[GlyphName]) -> Vec<GlyphName> {
    let notdef = glyph_order.iter().find(|name| name.is_notdef());
    let null = glyph_order.iter().find(|name| name.is_null());
    notdef.into_iter().chain(null).cloned().collect()
}

fn copy_glyph<F: SourceFont + ?Sized>(
    source: &F,
    source_name: &GlyphName,
    name: GlyphName,
    spec: &mut FontSpec,
) -> Result<()> {
    let record = GlyphRecord {
        outline: source.outline(source_name)?,
        metrics: source.metrics(source_name)?,
    };
    spec.glyph_order.push(name.clone());
    spec.glyphs.insert(name, record);
    Ok(())
}
