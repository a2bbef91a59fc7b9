//! The obfuscation pipeline.
//!
//! An obfuscation normalizes the plain and shadow texts, allocates a display codepoint per plain character, copies the matching glyphs from the source font into a new font and writes that font in the requested formats.
//! Every check runs before the first file is written.

use crate::alloc;
use crate::ctx::Context;
use crate::data::ObfuscationMap;
use crate::error::Result;
use crate::font::{FontLibrary, TrueType};
use crate::glyphs;
use crate::text;
use bytes::Bytes;
use rand::Rng;
use std::fs;
use std::path::PathBuf;

/// Obfuscates `plain` with the [`TrueType`] font library.
///
/// The random generator is seeded with [`Context::seed`] when set.
/// See [`obfuscate_with`] for the individual steps.
///
/// ```no_run
/// # use fontmask::ctx::{Allocation, Context};
/// let ctx = Context {
///     allocation: Allocation::Shadow,
///     ..Context::default()
/// };
/// let map = fontmask::obfuscate("ab", "xy", &ctx)?;
/// assert_eq!(map.obfuscate("abba"), "xyyx");
/// # Ok::<(), fontmask::Error>(())
/// ```
pub fn obfuscate(plain: &str, shadow: &str, ctx: &Context) -> Result<ObfuscationMap> {
    let mut rng = ctx.rng();
    obfuscate_with(&TrueType, plain, shadow, ctx, &mut rng)
}

/// Obfuscates `plain` with the given font library and random generator.
///
/// 1. Normalizes the plain text, with enrichment and shuffle, and the shadow text.
/// 2. Allocates one display codepoint per plain character.
/// 3. Loads the source font and builds the output glyph set.
/// 4. Compiles the output font and the web formats selected by [`Context::output`].
/// 5. Writes `{output_path}/{output_file_name}.ttf` and the web formats next to it.
///
/// # Errors
///
/// Errors of any step are returned unchanged.
/// No file is written if a step before the fifth fails, and files written before a failed write are removed.
pub fn obfuscate_with<L, R>(
    library: &L,
    plain: &str,
    shadow: &str,
    ctx: &Context,
    rng: &mut R,
) -> Result<ObfuscationMap>
where
    L: FontLibrary + ?Sized,
    R: Rng + ?Sized,
{
    let plain = text::prepare_plain(plain, ctx, rng);
    let shadow = text::prepare_shadow(shadow, ctx);

    log::info!(
        "Obfuscate {} characters with {:?} allocation",
        plain.len(),
        ctx.allocation
    );

    let codepoints = alloc::allocate(&plain, &shadow, ctx.allocation, rng)?;

    let source = library.load_font(&ctx.source_font_path())?;
    let (spec, map) = glyphs::build(&source, &plain, &codepoints, &ctx.names)?;

    let font = library.build_font(&spec, ctx)?;

    let mut outputs = Vec::new();
    if ctx.output.native {
        outputs.push((ctx.output_file("ttf"), font.clone()));
    }
    if ctx.output.web {
        for web_font in library.derive_web_formats(&font, ctx)? {
            outputs.push((ctx.output_file(web_font.extension), web_font.data));
        }
    }

    if outputs.is_empty() {
        log::warn!("no output format selected, no font file is written");
        return Ok(map);
    }

    fs::create_dir_all(&ctx.output_path)?;
    write_outputs(library, &outputs)?;

    Ok(map)
}

/// Writes all outputs, removing the files already written if one write fails.
fn write_outputs<L: FontLibrary + ?Sized>(
    library: &L,
    outputs: &[(PathBuf, Bytes)],
) -> Result<()> {
    for (index, (path, data)) in outputs.iter().enumerate() {
        if let Err(error) = library.serialize_font(data, path) {
            for (written, _) in &outputs[..index] {
                if let Err(remove_error) = fs::remove_file(written) {
                    log::warn!("could not remove {}: {}", written.display(), remove_error);
                }
            }
            return Err(error);
        }
    }
    Ok(())
}
